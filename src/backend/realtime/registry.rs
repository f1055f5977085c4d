/**
 * Connection Registry
 *
 * Process-wide map from user id to that user's single live connection.
 * Each connection is represented by a `ConnectionHandle`: a bounded mpsc
 * sender feeding the connection's writer task, tagged with a unique
 * connection id, plus a shutdown signal the writer watches next to its
 * queue. Closing a handle flips the signal, so the writer stops even when
 * its queue is full.
 *
 * # Locking
 *
 * The map sits behind a `tokio::sync::RwLock`. Handles are cloned out under
 * the lock and every channel send happens after it is released, so a slow
 * socket never blocks registration or other pushes.
 *
 * # Delivery
 *
 * `push` is best-effort: one attempt, bounded by the push timeout, no
 * queueing beyond the connection's own buffer.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, RwLock};
use uuid::Uuid;

/// Frame queued for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// JSON text frame
    Text(String),
}

/// Result of a single push attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Queued on the recipient's connection
    Delivered,
    /// No connection registered for the recipient
    Offline,
    /// Connection registered but the frame could not be queued in time
    Failed,
}

/// Why a frame could not be queued on a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// The writer task is gone
    Closed,
    /// The buffer stayed full for the whole timeout
    TimedOut,
}

/// Sending side of one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection_id: Uuid,
    sender: mpsc::Sender<Frame>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ConnectionHandle {
    /// Wrap an existing sender with a fresh connection id
    pub fn new(sender: mpsc::Sender<Frame>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            connection_id: Uuid::new_v4(),
            sender,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Create a handle and the receiver its writer task drains
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self::new(sender), receiver)
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Whether the writer task has dropped its receiver
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queue a text frame, waiting at most `timeout` for buffer space
    pub async fn send_text(&self, payload: String, timeout: Duration) -> Result<(), SendFailure> {
        match tokio::time::timeout(timeout, self.sender.send(Frame::Text(payload))).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SendFailure::Closed),
            Err(_) => Err(SendFailure::TimedOut),
        }
    }

    /// Receiver that flips to `true` once the connection is told to close
    ///
    /// The writer task selects on this alongside its frame queue.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Whether `close` has been called on any clone of this handle
    pub fn is_close_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Tell the writer to close the socket
    ///
    /// Does not go through the frame queue, so it is never lost behind a
    /// backlog.
    fn close(self) {
        self.shutdown.send_replace(true);
    }
}

/// Registry of live connections, one per user
///
/// Cheap to clone; all clones share the same map.
#[derive(Debug, Clone)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<Uuid, ConnectionHandle>>>,
    push_timeout: Duration,
}

impl ConnectionRegistry {
    /// Create an empty registry
    ///
    /// # Arguments
    ///
    /// * `push_timeout` - Upper bound on a single `push`
    pub fn new(push_timeout: Duration) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            push_timeout,
        }
    }

    pub fn push_timeout(&self) -> Duration {
        self.push_timeout
    }

    /// Register `handle` as the live connection of `user_id`
    ///
    /// A previously registered handle for the same user is closed and
    /// discarded.
    pub async fn register(&self, user_id: Uuid, handle: ConnectionHandle) {
        let connection_id = handle.connection_id();
        let previous = {
            let mut connections = self.connections.write().await;
            connections.insert(user_id, handle)
        };

        if let Some(previous) = previous {
            tracing::info!(
                "[Registry] User {} reconnected, closing superseded connection {}",
                user_id,
                previous.connection_id()
            );
            previous.close();
        }

        tracing::debug!("[Registry] Registered connection {} for user {}", connection_id, user_id);
    }

    /// Remove the connection of `user_id`, if any
    ///
    /// A socket shutting down uses `release` instead, which leaves a newer
    /// connection in place.
    pub async fn unregister(&self, user_id: Uuid) {
        let removed = self.connections.write().await.remove(&user_id);
        if let Some(handle) = removed {
            tracing::debug!("[Registry] Unregistered connection {} for user {}", handle.connection_id(), user_id);
            handle.close();
        }
    }

    /// Remove the registration of `user_id` only if it is still `connection_id`
    ///
    /// Returns whether an entry was removed.
    pub async fn release(&self, user_id: Uuid, connection_id: Uuid) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(current) if current.connection_id() == connection_id => {
                connections.remove(&user_id);
                tracing::debug!("[Registry] Released connection {} for user {}", connection_id, user_id);
                true
            }
            _ => false,
        }
    }

    /// Best-effort delivery of one text payload to `user_id`
    pub async fn push(&self, user_id: Uuid, payload: String) -> DeliveryOutcome {
        let handle = {
            let connections = self.connections.read().await;
            connections.get(&user_id).cloned()
        };

        let Some(handle) = handle else {
            return DeliveryOutcome::Offline;
        };

        match handle.send_text(payload, self.push_timeout).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(SendFailure::Closed) => {
                tracing::warn!("[Registry] Connection {} for user {} is closed", handle.connection_id(), user_id);
                self.release(user_id, handle.connection_id()).await;
                DeliveryOutcome::Failed
            }
            Err(SendFailure::TimedOut) => {
                tracing::warn!(
                    "[Registry] Push to user {} timed out after {:?}",
                    user_id,
                    self.push_timeout
                );
                DeliveryOutcome::Failed
            }
        }
    }

    /// Whether `user_id` currently has a registered connection
    pub async fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections.read().await.contains_key(&user_id)
    }

    /// Number of registered connections
    pub async fn connected_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
