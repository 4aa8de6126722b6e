use serde::{Deserialize, Serialize};

/// A construction site ("object" in the domain's vocabulary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSite {
    pub id: i64,
    pub title: String,
    pub address: String,
}
