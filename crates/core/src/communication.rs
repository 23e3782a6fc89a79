//! Communication kinds, priorities and content limits.

pub const KIND_DIRECT: &str = "direct";
pub const KIND_BROADCAST: &str = "broadcast";

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_NORMAL: &str = "normal";
pub const PRIORITY_HIGH: &str = "high";

/// All valid priority values.
pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_NORMAL, PRIORITY_HIGH];

pub const MAX_BODY_LENGTH: usize = 10_000;

/// Maximum number of explicit recipients on a direct communication.
pub const MAX_RECIPIENTS: usize = 500;

/// Mailbox selector for `GET /communications?box=`.
pub const BOX_INBOX: &str = "inbox";
pub const BOX_SENT: &str = "sent";

pub fn validate_priority(priority: &str) -> Result<(), String> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(format!(
            "Invalid priority '{priority}'. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        ))
    }
}

/// Validate message content: non-blank and within the length limit.
pub fn validate_body(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Message body cannot be empty".to_string());
    }
    if body.chars().count() > MAX_BODY_LENGTH {
        return Err(format!(
            "Message body exceeds maximum length of {MAX_BODY_LENGTH} characters"
        ));
    }
    Ok(())
}

/// De-duplicate a recipient list, drop the sender, and enforce the size cap.
pub fn normalize_recipients(sender_id: i64, recipients: &[i64]) -> Result<Vec<i64>, String> {
    let mut ids: Vec<i64> = recipients
        .iter()
        .copied()
        .filter(|id| *id != sender_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Err("At least one recipient other than the sender is required".to_string());
    }
    if ids.iter().any(|id| *id <= 0) {
        return Err("Recipient ids must be positive integers".to_string());
    }
    if ids.len() > MAX_RECIPIENTS {
        return Err(format!("A communication may have at most {MAX_RECIPIENTS} recipients"));
    }
    Ok(ids)
}
