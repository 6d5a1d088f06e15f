use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::prefix_cache::PrefixCache;

/// The default channel name for option change notifications
pub const DEFAULT_OPTIONS_CHANNEL: &str = "options_changed";

/// Notification payload structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionNotification {
    /// The table holding the option
    pub table: String,
    /// The action performed: "insert", "update", or "delete"
    pub action: String,
    /// The key of the affected option
    pub key: String,
}

/// Handler trait for option change notifications
#[async_trait]
pub trait OptionNotificationHandler: Send + Sync {
    /// Handle an option change notification
    async fn handle_notification(&self, notification: OptionNotification);

    /// Get the table name this handler is responsible for
    fn table_name(&self) -> &str;
}

/// A notification handler that resets a [`PrefixCache`] when one of its options changes
pub struct PrefixCacheHandler {
    table_name: String,
    cache: Arc<PrefixCache>,
}

impl PrefixCacheHandler {
    /// Create a new handler for the given cache
    pub fn new(table_name: String, cache: Arc<PrefixCache>) -> Self {
        Self { table_name, cache }
    }
}

#[async_trait]
impl OptionNotificationHandler for PrefixCacheHandler {
    async fn handle_notification(&self, notification: OptionNotification) {
        debug!(
            "Handling notification for table '{}': action={}, key={}",
            notification.table, notification.action, notification.key
        );

        match notification.action.as_str() {
            "insert" | "update" | "delete" => {
                let covered = match self.cache.prefix().await {
                    Some(prefix) => notification.key.starts_with(&prefix),
                    None => true,
                };
                if covered {
                    self.cache.reset().await;
                    debug!("Reset cache after {} of option '{}'", notification.action, notification.key);
                }
            }
            _ => {
                warn!("Unknown action '{}' for table '{}'", notification.action, notification.table);
            }
        }
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Listener for PostgreSQL notifications that dispatches to registered handlers
pub struct OptionNotificationListener {
    handlers: HashMap<String, Vec<Arc<dyn OptionNotificationHandler>>>,
    channel: String,
}

impl OptionNotificationListener {
    /// Create a new listener with the default channel
    pub fn new() -> Self {
        Self::with_channel(DEFAULT_OPTIONS_CHANNEL.to_string())
    }

    /// Create a new listener with a custom channel name
    pub fn with_channel(channel: String) -> Self {
        Self {
            handlers: HashMap::new(),
            channel,
        }
    }

    /// Register a handler for its table. A table may have several handlers.
    pub fn register_handler(&mut self, handler: Arc<dyn OptionNotificationHandler>) {
        let table_name = handler.table_name().to_string();
        debug!("Registering handler for table '{}'", table_name);
        self.handlers.entry(table_name).or_default().push(handler);
    }

    /// Process a single notification payload
    ///
    /// This method can be called from your own notification polling loop.
    ///
    /// # Example
    /// ```ignore
    /// // In your notification loop
    /// while let Some(notification) = get_notification().await {
    ///     listener.process_notification(&notification.payload()).await;
    /// }
    /// ```
    pub async fn process_notification(&self, payload: &str) {
        match serde_json::from_str::<OptionNotification>(payload) {
            Ok(notification) => match self.handlers.get(&notification.table) {
                Some(handlers) => {
                    for handler in handlers {
                        handler.handle_notification(notification.clone()).await;
                    }
                }
                None => {
                    debug!("No handler registered for table '{}'", notification.table);
                }
            },
            Err(e) => {
                error!("Failed to parse notification payload: {}", e);
                debug!("Payload was: {}", payload);
            }
        }
    }

    /// Get the channel name this listener is using
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Delay before reconnecting after the notification connection fails
    #[cfg(feature = "sqlx-store")]
    pub const RECONNECT_DELAY: std::time::Duration = std::time::Duration::from_secs(5);

    /// Runs the notification loop on `pool`, resetting registered caches as
    /// option changes arrive. Meant to run in its own task.
    ///
    /// A dropped connection is retried every [`RECONNECT_DELAY`](Self::RECONNECT_DELAY)
    /// until it is back.
    ///
    /// # Errors
    ///
    /// Fails only if the first subscription cannot be made.
    #[cfg(feature = "sqlx-store")]
    pub async fn listen(&self, pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
        let mut listener = self.subscribe(pool).await?;

        loop {
            match listener.recv().await {
                Ok(notification) => self.process_notification(notification.payload()).await,
                Err(e) => {
                    error!("Lost option notifications on '{}': {}", self.channel, e);
                    listener = self.resubscribe(pool).await;
                }
            }
        }
    }

    /// Opens a listener connection subscribed to this channel
    #[cfg(feature = "sqlx-store")]
    async fn subscribe(
        &self,
        pool: &sqlx::PgPool,
    ) -> Result<sqlx::postgres::PgListener, sqlx::Error> {
        let mut listener = sqlx::postgres::PgListener::connect_with(pool).await?;
        listener.listen(&self.channel).await?;
        debug!("Listening for option changes on channel '{}'", self.channel);
        Ok(listener)
    }

    #[cfg(feature = "sqlx-store")]
    async fn resubscribe(&self, pool: &sqlx::PgPool) -> sqlx::postgres::PgListener {
        loop {
            tokio::time::sleep(Self::RECONNECT_DELAY).await;
            match self.subscribe(pool).await {
                Ok(listener) => return listener,
                Err(e) => error!("Failed to reconnect option listener: {}", e),
            }
        }
    }
}

impl Default for OptionNotificationListener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serialization() {
        let notif = OptionNotification {
            table: "options".to_string(),
            action: "update".to_string(),
            key: "theme_color".to_string(),
        };

        let json = serde_json::to_string(&notif).unwrap();
        let deserialized: OptionNotification = serde_json::from_str(&json).unwrap();

        assert_eq!(notif, deserialized);
    }

    #[cfg(feature = "sqlx-store")]
    #[test]
    fn test_reconnect_delay() {
        assert_eq!(
            OptionNotificationListener::RECONNECT_DELAY,
            std::time::Duration::from_secs(5)
        );
    }
}
