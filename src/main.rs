use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use oficina_backend::config::{DatabaseConfig, EnvironmentConfig};
use oficina_backend::{create_router, database, AppState, Stores};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🔧 Oficina - Backend de órdenes de servicio");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;

    let stores = match &config.database_url {
        Some(url) => {
            let pool = match database::connect(&DatabaseConfig::new(url.clone())).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Stores::postgres(pool)
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida, usando store en memoria");
            Stores::memory()
        }
    };

    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción, se aceptan todos los orígenes");
    }

    let addr = config.listen_addr()?;
    let state = AppState::new(config, stores);
    let app = create_router(state.clone());

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servidor");
    info!("   GET  /events - Canal de eventos (SSE)");
    info!("📋 Órdenes de servicio:");
    info!("   GET  /services - Listar órdenes");
    info!("   POST /services - Crear orden (mecánico)");
    info!("   POST /services/direct - Crear orden (administrador)");
    info!("   PATCH /services/:id/approve - Aprobar orden");
    info!("   PUT  /services/:id - Editar orden");
    info!("   DELETE /services/:id - Eliminar orden");
    info!("🚗 /vehicles  🔩 /parts  📄 /documents  📊 /dashboard-stats");

    // La señal del sistema dispara el apagado compartido, que además cierra
    // los canales de eventos abiertos
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let shutdown = state.shutdown.clone();
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
