//! Engine scenarios across remote, credential store and index cache

use std::sync::Arc;

use gsecret_core::cache::MemoryIndexStore;
use gsecret_core::error::{CryptoError, EngineError};
use gsecret_core::models::split_credential_pair;
use gsecret_core::secret::{
    CancellationToken, CountdownState, Decryption, DeleteCountdown, FixedPassword, KdfParams, ListingSource,
    MemoryCredentialStore, NoPrompt, PasswordCodec, RemoveOutcome, SecretEngine, SecretSource,
};
use secrecy::{ExposeSecret, SecretString};

use super::fake_remote::FakeRemote;

const PROJECT: &str = "acme-prod";

struct Harness {
    engine: SecretEngine,
    remote: FakeRemote,
    credentials: MemoryCredentialStore,
    index: MemoryIndexStore,
}

impl Harness {
    fn new(remote: FakeRemote, cached_ids: &[&str]) -> Self {
        Self::with_credentials(remote, cached_ids, MemoryCredentialStore::new())
    }

    fn with_credentials(
        remote: FakeRemote,
        cached_ids: &[&str],
        credentials: MemoryCredentialStore,
    ) -> Self {
        let index = MemoryIndexStore::with_ids(cached_ids.iter().copied());
        let engine = SecretEngine::new(
            PROJECT,
            Arc::new(remote.clone()),
            Arc::new(credentials.clone()),
            Arc::new(index.clone()),
        )
        .with_codec(Arc::new(PasswordCodec::with_params(
            KdfParams::insecure_fast(),
        )));
        Self {
            engine,
            remote,
            credentials,
            index,
        }
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value)
}

#[tokio::test]
async fn test_add_then_get_displays_credential_pair() {
    let h = Harness::new(FakeRemote::online(), &[]);

    let outcome = h
        .engine
        .add("db-pass", &secret("alice:s3cr3t"), None)
        .await
        .unwrap();
    assert_eq!(outcome.remote_version.as_deref(), Some("db-pass/versions/1"));
    assert!(!outcome.protected);
    assert_eq!(outcome.listing.source, ListingSource::Remote);
    assert_eq!(outcome.listing.ids, vec!["db-pass"]);

    let resolved = h.engine.get("db-pass", &NoPrompt).await.unwrap();
    assert_eq!(resolved.source, SecretSource::Remote);
    assert_eq!(resolved.value.expose_secret(), "alice:s3cr3t");
    assert_eq!(
        split_credential_pair(resolved.value.expose_secret()),
        Some(("alice", "s3cr3t"))
    );
}

#[tokio::test]
async fn test_add_writes_local_copy_before_remote() {
    let h = Harness::new(FakeRemote::online(), &[]);
    h.engine.add("api", &secret("tok"), None).await.unwrap();

    assert_eq!(
        h.credentials.peek("gsecret-value@acme-prod", "api").as_deref(),
        Some("tok")
    );
    assert_eq!(
        h.remote.calls(),
        vec!["exists api", "create api", "add_version api", "list"]
    );
}

#[tokio::test]
async fn test_offline_add_survives_in_local_fallback() {
    let h = Harness::new(FakeRemote::offline(), &["older"]);

    let outcome = h.engine.add("db-pass", &secret("v"), None).await.unwrap();
    assert!(outcome.remote_version.is_none());
    assert!(outcome.listing.is_degraded());
    assert_eq!(outcome.listing.ids, vec!["older", "db-pass"]);
    assert_eq!(h.index.snapshot(), vec!["older", "db-pass"]);

    let resolved = h.engine.get("db-pass", &NoPrompt).await.unwrap();
    assert_eq!(resolved.source, SecretSource::Local);
    assert_eq!(resolved.value.expose_secret(), "v");

    // the alias assigned by the local index reaches the same secret
    let by_alias = h.engine.get("1", &NoPrompt).await.unwrap();
    assert_eq!(by_alias.id, "db-pass");
}

#[tokio::test]
async fn test_failed_remote_version_is_tracked_locally() {
    let remote = FakeRemote::online();
    remote.fail_add_version(true);
    let h = Harness::new(remote, &[]);

    let outcome = h.engine.add("orphan", &secret("v"), None).await.unwrap();
    assert!(outcome.remote_version.is_none());
    // the container exists remotely, so the refreshed listing still shows it
    assert_eq!(outcome.listing.source, ListingSource::Remote);
    assert_eq!(h.index.snapshot(), vec!["orphan"]);
    assert!(h.remote.versions("orphan").is_empty());
}

#[tokio::test]
async fn test_add_existing_is_conflict_without_writes() {
    let remote = FakeRemote::online();
    remote.seed("taken", "old");
    let h = Harness::new(remote, &[]);

    let err = h
        .engine
        .add("taken", &secret("new"), Some(&secret("pw")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(ref id) if id == "taken"));
    assert!(h.credentials.is_empty());
    assert_eq!(h.remote.versions("taken"), vec!["old"]);
    assert_eq!(h.remote.calls(), vec!["exists taken"]);
}

#[tokio::test]
async fn test_taken_id_on_create_is_conflict_when_existence_check_times_out() {
    let remote = FakeRemote::online();
    remote.seed("prod-db", "original");
    remote.fail_exists(true);
    let h = Harness::new(remote, &[]);

    let err = h
        .engine
        .add("prod-db", &secret("overwritten"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(ref id) if id == "prod-db"));
    assert_eq!(h.remote.versions("prod-db"), vec!["original"]);
    assert_eq!(h.remote.calls(), vec!["exists prod-db", "create prod-db"]);
    assert!(h.credentials.is_empty());
    assert!(h.index.snapshot().is_empty());
}

#[tokio::test]
async fn test_remote_listing_overwrites_local_index() {
    let remote = FakeRemote::online();
    remote.seed("a", "1");
    remote.seed("b", "2");
    let h = Harness::new(remote, &["local-only", "a"]);

    let listing = h.engine.list().await.unwrap();
    assert_eq!(listing.source, ListingSource::Remote);
    assert_eq!(listing.ids, vec!["a", "b"]);
    assert_eq!(h.index.snapshot(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_unavailable_listing_returns_cache_unchanged() {
    let h = Harness::new(FakeRemote::offline(), &["x", "y"]);

    let listing = h.engine.list().await.unwrap();
    assert!(matches!(
        listing.source,
        ListingSource::LocalCache { ref reason } if reason == "connection refused"
    ));
    assert_eq!(listing.ids, vec!["x", "y"]);
    assert_eq!(h.index.snapshot(), vec!["x", "y"]);
}

#[tokio::test]
async fn test_protected_value_decrypts_with_cached_password() {
    let h = Harness::new(FakeRemote::online(), &[]);
    let outcome = h
        .engine
        .add("vault", &secret("root:hunter2"), Some(&secret("pw")))
        .await
        .unwrap();
    assert!(outcome.protected);

    let stored = h.remote.versions("vault");
    assert_eq!(stored.len(), 1);
    assert!(PasswordCodec::is_envelope(&stored[0]));
    assert!(!stored[0].contains("hunter2"));
    assert_eq!(
        h.credentials.peek("gsecret-password@acme-prod", "vault").as_deref(),
        Some("pw")
    );

    let resolved = h.engine.get("vault", &NoPrompt).await.unwrap();
    assert_eq!(resolved.decryption, Decryption::Decrypted);
    assert_eq!(resolved.value.expose_secret(), "root:hunter2");
}

#[tokio::test]
async fn test_protected_value_without_cached_password() {
    let remote = FakeRemote::online();
    let writer = Harness::new(remote.clone(), &[]);
    writer
        .engine
        .add("vault", &secret("plain"), Some(&secret("pw")))
        .await
        .unwrap();

    // a second machine: same remote, empty credential store
    let reader = Harness::new(remote, &[]);

    let declined = reader.engine.get("vault", &NoPrompt).await.unwrap();
    assert_eq!(declined.decryption, Decryption::NotAttempted);
    assert!(PasswordCodec::is_envelope(declined.value.expose_secret()));

    let prompted = reader
        .engine
        .get("vault", &FixedPassword::new("pw"))
        .await
        .unwrap();
    assert_eq!(prompted.decryption, Decryption::Decrypted);
    assert_eq!(prompted.value.expose_secret(), "plain");

    let wrong = reader
        .engine
        .get("vault", &FixedPassword::new("nope"))
        .await
        .unwrap();
    assert_eq!(
        wrong.decryption,
        Decryption::Failed(CryptoError::InvalidPassword)
    );
    assert_eq!(
        wrong.value.expose_secret(),
        declined.value.expose_secret()
    );
}

#[tokio::test]
async fn test_versioned_reads() {
    let remote = FakeRemote::online();
    remote.seed("myid", "one");
    remote.seed("myid", "two");
    let h = Harness::new(remote, &["myid"]);

    let first = h.engine.get("myid@1", &NoPrompt).await.unwrap();
    assert_eq!(first.value.expose_secret(), "one");
    assert_eq!(first.version.as_str(), "1");

    let latest = h.engine.get("0", &NoPrompt).await.unwrap();
    assert_eq!(latest.id, "myid");
    assert_eq!(latest.value.expose_secret(), "two");

    assert!(h.engine.get("myid@9", &NoPrompt).await.is_none());
}

#[tokio::test]
async fn test_remote_miss_falls_back_to_local_value() {
    let credentials = MemoryCredentialStore::new();
    let offline = Harness::with_credentials(FakeRemote::offline(), &[], credentials.clone());
    offline.engine.add("k", &secret("v"), None).await.unwrap();

    // remote reachable but holds nothing for this id
    let online = Harness::with_credentials(FakeRemote::online(), &[], credentials);
    let resolved = online.engine.get("k", &NoPrompt).await.unwrap();
    assert_eq!(resolved.source, SecretSource::Local);
    assert_eq!(resolved.value.expose_secret(), "v");
}

#[tokio::test]
async fn test_delete_failure_repairs_local_index() {
    let h = Harness::new(FakeRemote::offline(), &["a", "b"]);
    let id = h.engine.resolve("0");
    assert_eq!(id, "a");

    let mut countdown = DeleteCountdown::new(0);
    let outcome = h
        .engine
        .remove(&id, &mut countdown, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    match outcome {
        RemoveOutcome::Deleted {
            id,
            remote_deleted,
            listing,
        } => {
            assert_eq!(id, "a");
            assert!(!remote_deleted);
            assert!(listing.is_degraded());
            assert_eq!(listing.ids, vec!["b"]);
        }
        RemoveOutcome::Aborted { .. } => panic!("countdown was not cancelled"),
    }
    assert_eq!(h.index.snapshot(), vec!["b"]);
}

#[tokio::test]
async fn test_delete_keeps_local_credentials() {
    let h = Harness::new(FakeRemote::online(), &[]);
    h.engine.add("gone", &secret("v"), None).await.unwrap();

    let outcome = h
        .engine
        .remove(
            "gone",
            &mut DeleteCountdown::new(0),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RemoveOutcome::Deleted { remote_deleted: true, ref listing, .. } if listing.ids.is_empty()
    ));
    assert!(h.remote.ids().is_empty());
    assert_eq!(
        h.credentials.peek("gsecret-value@acme-prod", "gone").as_deref(),
        Some("v")
    );
}

#[tokio::test]
async fn test_remote_delete_rejected_drops_index_entry() {
    let remote = FakeRemote::online();
    remote.seed("stuck", "v");
    remote.fail_delete(true);
    let h = Harness::new(remote, &["stuck"]);

    let outcome = h
        .engine
        .remove(
            "stuck",
            &mut DeleteCountdown::new(0),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();

    // the listing refresh is authoritative again and brings the id back
    let RemoveOutcome::Deleted {
        remote_deleted,
        listing,
        ..
    } = outcome
    else {
        panic!("expected delete to run");
    };
    assert!(!remote_deleted);
    assert_eq!(listing.source, ListingSource::Remote);
    assert_eq!(listing.ids, vec!["stuck"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_countdown_deletes_nothing() {
    let remote = FakeRemote::online();
    remote.seed("keep", "v");
    let h = Harness::new(remote, &["keep"]);

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        interrupt.cancel();
    });

    let mut seen = Vec::new();
    let mut countdown = DeleteCountdown::new(20);
    let outcome = h
        .engine
        .remove("keep", &mut countdown, &token, |s| seen.push(s))
        .await
        .unwrap();

    assert!(matches!(outcome, RemoveOutcome::Aborted { ref id } if id == "keep"));
    assert_eq!(
        seen,
        vec![
            CountdownState::Confirming { remaining: 20 },
            CountdownState::Confirming { remaining: 19 },
            CountdownState::Aborted,
        ]
    );
    assert!(!h.remote.calls().iter().any(|c| c.starts_with("delete")));
    assert_eq!(h.remote.ids(), vec!["keep"]);
    assert_eq!(h.index.snapshot(), vec!["keep"]);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_expiry_runs_delete() {
    let remote = FakeRemote::online();
    remote.seed("old", "v");
    let h = Harness::new(remote, &[]);

    let mut ticks = Vec::new();
    let mut committed_before_delete = false;
    let remote = h.remote.clone();
    let outcome = h
        .engine
        .remove(
            "old",
            &mut DeleteCountdown::new(3),
            &CancellationToken::new(),
            |state| match state {
                CountdownState::Confirming { remaining } => ticks.push(remaining),
                CountdownState::Proceeding => {
                    committed_before_delete = !remote.calls().iter().any(|c| c == "delete old");
                }
                CountdownState::Idle | CountdownState::Aborted => {}
            },
        )
        .await
        .unwrap();

    assert_eq!(ticks, vec![3, 2, 1]);
    assert!(committed_before_delete);
    assert!(matches!(
        outcome,
        RemoveOutcome::Deleted {
            remote_deleted: true,
            ..
        }
    ));
}
