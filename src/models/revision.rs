//! Revision info for change detection.

use serde::{Deserialize, Serialize};

/// Current write revision. Clients compare it to decide whether to refetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub project_id: String,
    pub revision_id: i64,
    pub generated_at: String,
}
