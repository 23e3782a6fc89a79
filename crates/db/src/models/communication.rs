//! Communications: threads, per-recipient read state and replies.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::types::{DbId, Timestamp};

/// A row from the `communications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Communication {
    pub id: DbId,
    pub subject: String,
    pub body: String,
    pub sender_id: DbId,
    pub kind: String,
    pub priority: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One entry of an inbox or sent-box listing.
///
/// `is_read` / `read_at` describe the caller's own delivery row and are
/// `None` in the sent box.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommunicationListItem {
    pub id: DbId,
    pub subject: String,
    pub sender_id: DbId,
    pub sender_name: String,
    pub kind: String,
    pub priority: String,
    pub is_read: Option<bool>,
    pub read_at: Option<Timestamp>,
    pub recipient_count: i64,
    pub message_count: i64,
    pub created_at: Timestamp,
}

/// A recipient of a communication and their read state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipient {
    pub user_id: DbId,
    pub full_name: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
}

/// A communication with its recipients, as returned by `GET /communications/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CommunicationDetail {
    #[serde(flatten)]
    pub communication: Communication,
    pub recipients: Vec<Recipient>,
}

/// A reply within a communication thread.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub communication_id: DbId,
    pub sender_id: DbId,
    pub sender_name: String,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /communications`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommunication {
    #[validate(length(min = 1, max = 500))]
    pub recipient_ids: Vec<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
    pub priority: Option<String>,
}

/// Request body for `POST /communications/broadcast`.
///
/// Recipients are every active user inside the given geographic subtree,
/// narrowed further by the sender's own scope.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BroadcastCommunication {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
    pub priority: Option<String>,
    #[validate(range(min = 1))]
    pub state_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub district_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub range_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub battalion_id: Option<DbId>,
}

/// Request body for `POST /communications/{id}/messages`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMessage {
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

/// Insert DTO shared by direct and broadcast communications.
#[derive(Debug, Clone)]
pub struct NewCommunication {
    pub subject: String,
    pub body: String,
    pub sender_id: DbId,
    pub kind: &'static str,
    pub priority: String,
}

/// Query parameters for `GET /communications`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommunicationListParams {
    /// `inbox` (default) or `sent`.
    #[serde(rename = "box")]
    pub mailbox: Option<String>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolved mailbox filter handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct MailboxQuery {
    pub user_id: DbId,
    pub search: Option<String>,
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}
