//! Engine against the on-disk index cache

use std::fs;
use std::sync::Arc;

use gsecret_core::cache::{IndexStore, JsonFileIndexStore};
use gsecret_core::config::{AppSettings, ConfigManager};
use gsecret_core::secret::{
    CancellationToken, DeleteCountdown, MemoryCredentialStore, NoPrompt, OfflineRemoteStore,
    SecretEngine, SecretSource,
};
use secrecy::{ExposeSecret, SecretString};
use tempfile::TempDir;

use super::fake_remote::FakeRemote;

fn engine_with(remote: FakeRemote, store: JsonFileIndexStore) -> SecretEngine {
    SecretEngine::new(
        "proj",
        Arc::new(remote),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(store),
    )
}

#[tokio::test]
async fn test_corrupt_cache_is_empty_and_gets_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret_list_cache.json");
    fs::write(&path, "{not json").unwrap();

    let remote = FakeRemote::online();
    remote.seed("a", "1");
    let engine = engine_with(remote, JsonFileIndexStore::new(&path));

    assert_eq!(engine.resolve("0"), "0");

    let listing = engine.list().await.unwrap();
    assert_eq!(listing.ids, vec!["a"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["a"]"#);
    assert_eq!(engine.resolve("0"), "a");
}

#[tokio::test]
async fn test_offline_session_uses_cache_file() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
    let settings = AppSettings::default();
    let path = manager.index_cache_path(&settings);
    fs::write(&path, r#"["db-pass","api-token"]"#).unwrap();

    let credentials = MemoryCredentialStore::new();
    let engine = SecretEngine::new(
        "proj",
        Arc::new(OfflineRemoteStore),
        Arc::new(credentials.clone()),
        Arc::new(JsonFileIndexStore::new(&path)),
    );

    let listing = engine.list().await.unwrap();
    assert!(listing.is_degraded());
    assert_eq!(listing.ids, vec!["db-pass", "api-token"]);

    engine
        .add("new-one", &SecretString::from("v"), None)
        .await
        .unwrap();
    let on_disk = JsonFileIndexStore::new(&path).load();
    assert_eq!(on_disk.ids(), ["db-pass", "api-token", "new-one"]);

    let resolved = engine.get("2", &NoPrompt).await.unwrap();
    assert_eq!(resolved.id, "new-one");
    assert_eq!(resolved.source, SecretSource::Local);
    assert_eq!(resolved.value.expose_secret(), "v");

    engine
        .remove(
            "api-token",
            &mut DeleteCountdown::new(0),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"["db-pass","new-one"]"#
    );
}

#[tokio::test]
async fn test_missing_cache_file_is_not_created_by_reads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("cache.json");
    let engine = engine_with(FakeRemote::offline(), JsonFileIndexStore::new(&path));

    let listing = engine.list().await.unwrap();
    assert!(listing.ids.is_empty());
    assert!(engine.get("anything", &NoPrompt).await.is_none());
    assert!(!path.exists());
}
