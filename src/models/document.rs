//! Modelo de documentos del taller (solo metadatos; el archivo vive fuera)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Invoice,
    Manual,
    Contract,
    #[default]
    Other,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::Manual => "manual",
            DocumentCategory::Contract => "contract",
            DocumentCategory::Other => "other",
        }
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocumentCategory::Invoice),
            "manual" => Ok(DocumentCategory::Manual),
            "contract" => Ok(DocumentCategory::Contract),
            "other" => Ok(DocumentCategory::Other),
            other => Err(format!("unknown document category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopDocument {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub size: i64,
    pub url: String,
    pub category: DocumentCategory,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: String,
    pub size: i64,
    pub url: String,
    pub category: DocumentCategory,
}
