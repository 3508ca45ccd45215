use pmp_auth_session::{
    AuthEvent, EventBus, SessionConfig, SessionProvider, SessionStore, SignInParams, TokenSet,
    User, UserRole,
};
use pmp_auth_session::storage::{KeyValueStorage, MemoryStorage};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn admin_sign_in() -> SignInParams {
    SignInParams {
        user: User {
            id: "1".to_string(),
            email: "admin@example.com".to_string(),
            role: UserRole::Admin,
        },
        tokens: TokenSet {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            access_token_expires_in: "3600".to_string(),
            refresh_token_expires_in: "86400".to_string(),
        },
    }
}

async fn open_store(storage: &Arc<MemoryStorage>, bus: &EventBus) -> SessionStore {
    SessionStore::open(
        storage.clone(),
        storage.clone(),
        bus,
        SessionConfig::default(),
    )
    .await
}

/// Full voluntary lifecycle: restore empty, sign in, sign out with a reason.
#[tokio::test]
async fn test_sign_in_sign_out_lifecycle() {
    let storage = Arc::new(MemoryStorage::new());
    let store = open_store(&storage, &EventBus::default()).await;

    assert!(!store.snapshot().await.is_authenticated);

    store.sign_in(admin_sign_in()).await.unwrap();
    let signed_in = store.snapshot().await;
    assert!(signed_in.is_authenticated);
    assert!(signed_in.is_admin);
    assert!(!signed_in.is_loading);

    store.sign_out(Some("logged out")).await.unwrap();
    let signed_out = store.snapshot().await;
    assert!(!signed_out.is_authenticated);
    assert_eq!(signed_out.logout_message.as_deref(), Some("logged out"));
}

/// An emitter holding only the bus (e.g. an HTTP interceptor) can end the
/// session without any reference to the store.
#[tokio::test]
async fn test_force_logout_delivered_over_the_bus() {
    let storage = Arc::new(MemoryStorage::new());
    let bus = EventBus::default();
    let store = open_store(&storage, &bus).await;
    store.sign_in(admin_sign_in()).await.unwrap();

    let mut updates = store.subscribe();
    bus.emit(AuthEvent::ForceLogout);

    timeout(Duration::from_secs(1), async {
        loop {
            let snapshot = updates.recv().await.unwrap();
            if !snapshot.is_authenticated {
                break;
            }
        }
    })
    .await
    .expect("force logout was never applied");

    let snapshot = store.snapshot().await;
    assert!(snapshot.user.is_none());
    assert!(store.tokens().await.is_none());
    assert_eq!(storage.get("access_token").await.unwrap(), None);
}

/// A session persisted by one store instance is picked up by the next, the
/// way a page reload reconstructs the session from cookies.
#[tokio::test]
async fn test_session_survives_store_restart() {
    let storage = Arc::new(MemoryStorage::new());
    let bus = EventBus::default();
    let params = admin_sign_in();

    {
        let store = open_store(&storage, &bus).await;
        store.sign_in(params.clone()).await.unwrap();
    }

    let reopened = open_store(&storage, &bus).await;
    let snapshot = reopened.snapshot().await;

    assert!(snapshot.is_authenticated);
    assert_eq!(snapshot.user, Some(params.user));
    assert_eq!(reopened.tokens().await, Some(params.tokens));
}

/// Dropping a store releases its bus subscription; a replacement store is
/// the only handler left and still reacts to the signal.
#[tokio::test]
async fn test_replacement_store_owns_the_subscription() {
    let storage = Arc::new(MemoryStorage::new());
    let bus = EventBus::default();

    let first = open_store(&storage, &bus).await;
    drop(first);

    let second = open_store(&storage, &bus).await;
    second.sign_in(admin_sign_in()).await.unwrap();

    let mut updates = second.subscribe();
    bus.emit(AuthEvent::ForceLogout);

    timeout(Duration::from_secs(1), async {
        loop {
            if !updates.recv().await.unwrap().is_authenticated {
                break;
            }
        }
    })
    .await
    .expect("replacement store missed the signal");
}

#[tokio::test]
async fn test_provider_wires_consumers_to_the_store() {
    let storage = Arc::new(MemoryStorage::new());
    let bus = EventBus::default();
    let provider = SessionProvider::new();

    // Before provisioning: loud failure, not an empty session.
    assert!(provider.current().is_err());

    let store = Arc::new(open_store(&storage, &bus).await);
    provider.install(store);

    let session = provider.current().unwrap();
    session.sign_in(admin_sign_in()).await.unwrap();
    assert!(provider.current().unwrap().snapshot().await.is_admin);
}
