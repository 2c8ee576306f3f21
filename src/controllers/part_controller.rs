use crate::dto::part_dto::{CreatePartRequest, UpdatePartRequest};
use crate::models::Part;
use crate::repositories::PartStore;
use crate::utils::errors::{not_found_error, AppResult};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct PartController {
    store: Arc<dyn PartStore>,
}

impl PartController {
    pub fn new(store: Arc<dyn PartStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreatePartRequest) -> AppResult<Part> {
        request.validate()?;

        let part = self.store.insert(request.into()).await?;
        info!("📦 Pieza {} ({}) agregada al inventario", part.code, part.id);
        Ok(part)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Part> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Part", &id.to_string()))
    }

    pub async fn list(&self) -> AppResult<Vec<Part>> {
        Ok(self.store.list().await?)
    }

    pub async fn update(&self, id: Uuid, request: UpdatePartRequest) -> AppResult<Part> {
        request.validate()?;

        let part = self
            .store
            .update(id, request.into())
            .await?
            .ok_or_else(|| not_found_error("Part", &id.to_string()))?;

        if part.is_low_stock() {
            warn!("📉 Stock bajo para {}: {} (mínimo {})", part.code, part.quantity, part.min_quantity);
        }
        Ok(part)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found_error("Part", &id.to_string()));
        }
        Ok(())
    }
}
