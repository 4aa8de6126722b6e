use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit-of-work record on an object: what was done, in which unit, how much.
///
/// `status` is absent on freshly pushed records and moves through
/// `"pending"` → `"sent"` → `"accepted"` once the item enters review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i64,
    pub title: String,
    pub unit: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A confirmed work row as listed under `/objects/:id/finished-works`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedWork {
    pub id: i64,
    pub title: String,
    pub unit: String,
    pub quantity: f64,
    pub worker_id: i64,
    pub worker_name: String,
    pub worker_surname: String,
    pub object_id: i64,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// A work record shared to this account, from `/sendworks/received`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedWork {
    pub id: i64,
    pub title: String,
    pub unit: String,
    pub quantity: f64,
    #[serde(default)]
    pub status: Option<String>,
    pub sender_name: String,
    pub sender_surname: String,
    #[serde(default)]
    pub object_title: Option<String>,
}

/// A row in the sender's history, from `/sendworks/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryWork {
    pub id: i64,
    pub title: String,
    pub unit: String,
    pub quantity: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub object_title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A saved sharing contact, from `/recipients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i64,
    pub email: String,
}
