//! Conversation Aggregator
//!
//! Builds the conversation list for a user from the message store: one
//! summary per correspondent with the latest message, the unread count and
//! whether the correspondent is online right now.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::messaging::store;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::messaging::ConversationSummary;

/// Conversation summaries for `user_id`, most recent first
///
/// Correspondents whose account no longer exists are left out. Summaries
/// with the same last-message time are ordered by the other user's id.
pub async fn conversations_for(
    pool: &SqlitePool,
    registry: &ConnectionRegistry,
    user_id: Uuid,
) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    let correspondents = store::correspondents_of(pool, user_id).await?;
    let mut conversations = Vec::with_capacity(correspondents.len());

    for other_id in correspondents {
        let Some(last) = store::last_message_between(pool, user_id, other_id).await? else {
            continue;
        };

        let Some(other) = get_user_by_id(pool, other_id).await? else {
            tracing::debug!("[Conversations] Skipping unknown correspondent {}", other_id);
            continue;
        };

        let unread_count = store::unread_count(pool, user_id, other_id).await?;

        conversations.push(ConversationSummary {
            user_id: other.id,
            username: other.username,
            full_name: other.full_name,
            last_message: last.message,
            last_message_time: last.created_at,
            unread_count,
            is_online: registry.is_connected(other_id).await,
        });
    }

    conversations.sort_by(|a, b| {
        b.last_message_time
            .cmp(&a.last_message_time)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    Ok(conversations)
}
