//! Conexión a PostgreSQL
//!
//! Crea el pool y aplica las migraciones embebidas de `migrations/`.

use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::utils::errors::StorageError;

/// Conectar y dejar el esquema al día
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StorageError> {
    info!("🗄️ Conectando a PostgreSQL: {}", mask_database_url(&config.url));
    let pool = config.create_pool().await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("✅ Migraciones aplicadas");

    Ok(pool)
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    let Some(at_pos) = url.find('@') else {
        return url.to_string();
    };
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    if scheme_end + 3 > at_pos {
        return url.to_string();
    }
    let protocol = &url[..scheme_end + 3];
    let host = &url[at_pos + 1..];
    format!("{}***:***@{}", protocol, host)
}
