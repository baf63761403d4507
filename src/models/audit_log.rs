use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One appended audit entry. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub action: String,
    pub collection: String,
    pub document_id: Uuid,
    /// `{previous, current}` snapshots
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<Uuid>,
    #[serde(serialize_with = "fixed_millis")]
    pub timestamp: DateTime<Utc>,
}

// Fixed-width timestamps keep text ordering chronological
fn fixed_millis<S: serde::Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Query parameters accepted by `GET /logs`
pub const LOG_FILTERS: &[&str] = &["action", "collection", "documentId"];
