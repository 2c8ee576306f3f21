use crate::dto::document_dto::CreateDocumentRequest;
use crate::models::WorkshopDocument;
use crate::repositories::DocumentStore;
use crate::utils::errors::{not_found_error, AppResult};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct DocumentController {
    store: Arc<dyn DocumentStore>,
}

impl DocumentController {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateDocumentRequest) -> AppResult<WorkshopDocument> {
        request.validate()?;
        Ok(self.store.insert(request.into()).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<WorkshopDocument>> {
        Ok(self.store.list().await?)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found_error("Document", &id.to_string()));
        }
        Ok(())
    }
}
