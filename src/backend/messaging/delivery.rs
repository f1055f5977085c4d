/**
 * Delivery Coordinator
 *
 * Every new message goes through `send`:
 *
 * 1. Validate the request (non-blank body, known kind)
 * 2. Persist it through the message store
 * 3. If it has a direct recipient, push a `new_message` event to the
 *    recipient's live connection
 *
 * The message is durable before any push is attempted. The push is
 * best-effort: its outcome is logged and never turns a stored message into
 * an error. Group-addressed messages (no recipient) are stored only.
 */

use sqlx::SqlitePool;

use crate::backend::error::BackendError;
use crate::backend::messaging::store;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::realtime::registry::{ConnectionRegistry, DeliveryOutcome};
use crate::shared::messaging::{ChatMessage, SendMessageRequest};
use crate::shared::LiveEvent;

/// Validate, persist and (for direct messages) push a message
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `registry` - Live connections
/// * `sender` - Authenticated author
/// * `request` - Message to send
///
/// # Returns
/// The stored message, whatever happened to the push
///
/// # Errors
/// * `SharedError::ValidationError` - blank body or unknown kind; nothing is stored
/// * `StorageError` - the insert failed; nothing is pushed
pub async fn send(
    pool: &SqlitePool,
    registry: &ConnectionRegistry,
    sender: &AuthenticatedUser,
    request: SendMessageRequest,
) -> Result<ChatMessage, BackendError> {
    let kind = request.validate()?;

    let message = store::append(
        pool,
        sender.user_id,
        &sender.username,
        Some(sender.display_name.as_str()),
        request.receiver_id,
        &request.message,
        kind,
    )
    .await?;

    tracing::debug!(
        "[Delivery] Stored message {} from {} to {:?}",
        message.id,
        sender.username,
        message.receiver_id
    );

    if let Some(receiver_id) = message.receiver_id {
        match LiveEvent::new_message(&message).to_json() {
            Ok(payload) => match registry.push(receiver_id, payload).await {
                DeliveryOutcome::Delivered => {
                    tracing::debug!("[Delivery] Message {} pushed to {}", message.id, receiver_id);
                }
                DeliveryOutcome::Offline => {
                    tracing::debug!("[Delivery] Recipient {} offline, message {} stored only", receiver_id, message.id);
                }
                DeliveryOutcome::Failed => {
                    tracing::warn!("[Delivery] Push of message {} to {} failed", message.id, receiver_id);
                }
            },
            Err(e) => {
                tracing::error!("[Delivery] Could not encode notification for {}: {}", message.id, e);
            }
        }
    }

    Ok(message)
}
