mod common;

use std::sync::Arc;

use common::stores::{theme_store, CountingStore};
use prefix_options_cache::{
    CacheConfig, OptionNotification, OptionNotificationListener, PrefixCache, PrefixCacheHandler,
    DEFAULT_OPTIONS_CHANNEL,
};
use serde_json::json;

fn payload(table: &str, action: &str, key: &str) -> String {
    serde_json::to_string(&OptionNotification {
        table: table.to_string(),
        action: action.to_string(),
        key: key.to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_update_under_prefix_resets_cache() {
    let store = CountingStore::new(theme_store());
    let cache = Arc::new(PrefixCache::new(store.clone(), CacheConfig::new("theme_")));

    let mut listener = OptionNotificationListener::new();
    assert_eq!(listener.channel(), DEFAULT_OPTIONS_CHANNEL);
    listener.register_handler(Arc::new(PrefixCacheHandler::new(
        "options".to_string(),
        cache.clone(),
    )));

    assert_eq!(cache.get_option("theme_color").await.unwrap(), Some(json!("blue")));

    store.store().insert("theme_color", "green");
    listener
        .process_notification(&payload("options", "update", "theme_color"))
        .await;

    assert!(!cache.is_loaded().await);
    assert_eq!(cache.get_option("theme_color").await.unwrap(), Some(json!("green")));
    assert_eq!(store.queries(), 2);
}

#[tokio::test]
async fn test_other_prefix_is_ignored() {
    let store = CountingStore::new(theme_store());
    let cache = Arc::new(PrefixCache::new(store.clone(), CacheConfig::new("theme_")));

    let mut listener = OptionNotificationListener::new();
    listener.register_handler(Arc::new(PrefixCacheHandler::new(
        "options".to_string(),
        cache.clone(),
    )));

    cache.get_options().await.unwrap();
    listener
        .process_notification(&payload("options", "delete", "widget_color"))
        .await;

    assert!(cache.is_loaded().await);
    assert_eq!(store.queries(), 1);
}

#[tokio::test]
async fn test_handlers_per_table() {
    let theme_cache = Arc::new(PrefixCache::new(
        Arc::new(theme_store()),
        CacheConfig::new("theme_"),
    ));
    let widget_cache = Arc::new(PrefixCache::new(
        Arc::new(theme_store()),
        CacheConfig::new("widget_"),
    ));
    let site_cache = Arc::new(PrefixCache::new(Arc::new(theme_store()), CacheConfig::default()));

    let mut listener = OptionNotificationListener::with_channel("site_options".to_string());
    listener.register_handler(Arc::new(PrefixCacheHandler::new(
        "options".to_string(),
        theme_cache.clone(),
    )));
    listener.register_handler(Arc::new(PrefixCacheHandler::new(
        "options".to_string(),
        widget_cache.clone(),
    )));
    listener.register_handler(Arc::new(PrefixCacheHandler::new(
        "site_options".to_string(),
        site_cache.clone(),
    )));

    theme_cache.get_options().await.unwrap();
    widget_cache.get_options().await.unwrap();
    site_cache.get_options().await.unwrap();

    listener
        .process_notification(&payload("options", "insert", "widget_size"))
        .await;
    assert!(theme_cache.is_loaded().await);
    assert!(!widget_cache.is_loaded().await);
    assert!(site_cache.is_loaded().await);

    // A cache without prefix covers every key of its table
    listener
        .process_notification(&payload("site_options", "update", "anything"))
        .await;
    assert!(!site_cache.is_loaded().await);
}

#[tokio::test]
async fn test_bad_payloads_are_ignored() {
    let cache = Arc::new(PrefixCache::new(Arc::new(theme_store()), CacheConfig::new("theme_")));

    let mut listener = OptionNotificationListener::default();
    listener.register_handler(Arc::new(PrefixCacheHandler::new(
        "options".to_string(),
        cache.clone(),
    )));
    cache.get_options().await.unwrap();

    listener.process_notification("not json").await;
    listener
        .process_notification(&payload("options", "truncate", "theme_color"))
        .await;
    listener
        .process_notification(&payload("unknown_table", "update", "theme_color"))
        .await;

    assert!(cache.is_loaded().await);
}
