//! Client model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client record. Invoices are raised against clients; only active
/// clients can be invoiced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub client_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
