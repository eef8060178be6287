//! Account types for the persisted per-user endpoints.

use serde::{Deserialize, Serialize};

use super::Deal;

/// Login or registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Bearer session handed out by `/login` and `/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub token: String,
}

/// A deal the user bookmarked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDeal {
    pub id: i64,
    #[serde(flatten)]
    pub deal: Deal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Price alert for a single destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: i64,
    pub destination_city: String,
    pub max_price: f64,
    pub telegram_chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Weekly "anything under X from airport Y" alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAlert {
    pub id: i64,
    pub airport: String,
    pub max_price: f64,
    pub telegram_chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// `{"id": ..}` reply of the create endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedId {
    pub id: i64,
}
