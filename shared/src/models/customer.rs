//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer account (minimal: enough to own orders and be counted
/// by the dashboard; authentication is an external collaborator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    /// Unix millis
    pub created_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub email: String,
}
