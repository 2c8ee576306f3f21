use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{DocumentCategory, NewDocument};

// Metadatos de un documento ya almacenado en otro lado
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub doc_type: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub size: i64,
    #[validate(length(min = 1))]
    pub url: String,
    #[serde(default)]
    pub category: DocumentCategory,
}

impl From<CreateDocumentRequest> for NewDocument {
    fn from(request: CreateDocumentRequest) -> Self {
        NewDocument {
            name: request.name,
            doc_type: request.doc_type,
            size: request.size,
            url: request.url,
            category: request.category,
        }
    }
}
