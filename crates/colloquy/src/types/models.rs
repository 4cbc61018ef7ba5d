use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A model available through the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Object type, always `"model"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable name.
    pub display_name: String,
    /// Release timestamp.
    pub created_at: DateTime<Utc>,
}

/// Response from listing models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelsListResponse {
    /// Models on this page.
    pub data: Vec<ModelInfo>,
    /// Whether further pages exist.
    pub has_more: bool,
    /// First id on this page, for backwards pagination.
    pub first_id: Option<String>,
    /// Last id on this page, for forwards pagination.
    pub last_id: Option<String>,
}

/// Pagination parameters for listing models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ModelListParams {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return models before this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
    /// Return models after this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
}
