use serde::{Deserialize, Serialize};

/// Account role. Foremen manage objects and review work; workers record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Foreman,
    Worker,
}

/// An account as returned by `/login` and `/me`.
///
/// The backend spells `emailconfirmed` without a separator; keep it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub emailconfirmed: bool,
    pub role: Role,
}
