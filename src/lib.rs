//! # Prefix Options Cache
//!
//! This crate caches the settings stored under a key prefix in a key-value
//! store, and serves them by exact key, by accessor name, or through a
//! translation overlay.
//!
//! ## Key Components
//!
//! - `PrefixCache`: Lazily loaded snapshot of the options under a prefix
//! - `AccessorDispatcher`: Resolves accessor names such as `getThemeColor` to option keys
//! - `TranslationOverlay`: Locale-aware identifier and text translation of option values
//! - `FilterRegistry`: Per-option value filters applied after decoding
//! - `KeyValueSource`: Trait for the backing store (`InMemoryStore`, `PgOptionsStore`)
//! - `OptionNotificationListener`: Resets caches on PostgreSQL option change notifications

mod error;
mod traits;
mod value;
mod filters;
mod prefix_cache;
mod dispatcher;
mod translation;
mod memory_store;
mod listener;
#[cfg(feature = "sqlx-store")]
mod pg_store;
#[cfg(feature = "sqlx-store")]
mod db_init;

pub use error::{CacheError, CacheResult, NotSupportedError, NullReferenceError};
pub use traits::{IdentifierTranslator, KeyValueSource, OptionsSchema, TextTranslator};
pub use value::{decode, encode, is_serialized};
pub use filters::{FilterRegistry, OptionFilter, OPTION_FILTER_PREFIX};
pub use prefix_cache::{
    CacheConfig,
    CacheStatistics,
    OptionMap,
    PrefixCache,
    UnknownAccessorPolicy,
    EMPTY_PLACEHOLDER,
};
pub use dispatcher::{accessor_name, AccessorDispatcher, ACCESSOR_PREFIX};
pub use translation::{LocaleContext, TranslationOverlay};
pub use memory_store::InMemoryStore;

// Re-export listener components
pub use listener::{
    OptionNotification,
    OptionNotificationHandler,
    OptionNotificationListener,
    PrefixCacheHandler,
    DEFAULT_OPTIONS_CHANNEL,
};

#[cfg(feature = "sqlx-store")]
pub use pg_store::{escape_like, PgOptionsStore, DEFAULT_OPTIONS_TABLE};
#[cfg(feature = "sqlx-store")]
pub use db_init::{cleanup_option_triggers, init_option_triggers};
