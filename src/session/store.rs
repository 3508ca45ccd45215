// Session store for the client-side authentication lifecycle
// Sole owner and writer of the persisted session keys.

use super::types::{SessionConfig, SessionSnapshot, SignInParams, TokenSet};
use crate::error::SessionError;
use crate::events::{AuthEvent, EventBus};
use crate::models::User;
use crate::storage::{KeyValueStorage, OrganizationScope, StorageError};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// In-memory session state. `is_authenticated` is always derived from the
/// presence of both fields, never stored, so it can't drift out of sync.
#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    tokens: Option<TokenSet>,
    is_loading: bool,
    logout_message: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_authenticated: self.user.is_some() && self.tokens.is_some(),
            is_admin: self.user.as_ref().is_some_and(User::is_admin),
            user: self.user.clone(),
            is_loading: self.is_loading,
            logout_message: self.logout_message.clone(),
        }
    }
}

struct SessionInner {
    storage: Arc<dyn KeyValueStorage>,
    organization: Arc<dyn OrganizationScope>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    notifier: broadcast::Sender<SessionSnapshot>,
}

/// Client-side session store.
///
/// Reconstructed from durable storage at startup, mutated only through
/// [`sign_in`](Self::sign_in), [`sign_out`](Self::sign_out) and the
/// force-logout signal. Consumers observe it through [`snapshot`](Self::snapshot)
/// or a [`subscribe`](Self::subscribe) receiver.
pub struct SessionStore {
    inner: Arc<SessionInner>,
    listener: JoinHandle<()>,
}

impl SessionStore {
    /// Reconstruct the session from durable storage and register for the
    /// force-logout signal.
    ///
    /// Absent, partial or malformed persisted data yields an unauthenticated
    /// session; it is never a fatal condition. The bus subscription is taken
    /// exactly once here and released exactly once when the store is dropped.
    pub async fn open(
        storage: Arc<dyn KeyValueStorage>,
        organization: Arc<dyn OrganizationScope>,
        bus: &EventBus,
        config: SessionConfig,
    ) -> Self {
        let user = restore_user(storage.as_ref(), &config).await;
        let tokens = restore_tokens(storage.as_ref(), &config).await;

        match (&user, &tokens) {
            (Some(user), Some(_)) => info!(user_id = %user.id, "session restored from storage"),
            (None, None) => debug!("no persisted session; starting unauthenticated"),
            _ => debug!("partial persisted session discarded; starting unauthenticated"),
        }

        let (notifier, _) = broadcast::channel(config.notify_capacity);
        let inner = Arc::new(SessionInner {
            storage,
            organization,
            config,
            state: RwLock::new(SessionState {
                user,
                tokens,
                is_loading: false,
                logout_message: None,
            }),
            notifier,
        });

        let mut events = bus.subscribe();
        let listener_inner = Arc::clone(&inner);
        let listener = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::ForceLogout) => listener_inner.force_logout().await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "force-logout listener lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { inner, listener }
    }

    /// Current read-only view of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Current token set, for the HTTP layer. `None` while unauthenticated.
    pub async fn tokens(&self) -> Option<TokenSet> {
        self.inner.state.read().await.tokens.clone()
    }

    /// Receiver yielding a fresh snapshot after every state change.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.inner.notifier.subscribe()
    }

    /// Persist and install a freshly authenticated user + token pair.
    ///
    /// `is_loading` reads true for the duration of the call on every path.
    /// On failure the store rolls back to a fully unauthenticated state
    /// (never a half-signed-in session) and the error is returned so a UI
    /// can display it.
    pub async fn sign_in(&self, params: SignInParams) -> Result<(), SessionError> {
        self.inner.sign_in(params).await
    }

    /// End the session voluntarily, recording `message` for UI display.
    pub async fn sign_out(&self, message: Option<&str>) -> Result<(), SessionError> {
        self.inner.sign_out(message).await
    }

    /// Apply the force-logout signal directly. The bus listener calls this
    /// same path; it is idempotent.
    pub async fn handle_force_logout(&self) {
        self.inner.force_logout().await;
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        // Deregister from the force-logout signal exactly once, so a
        // re-created store never ends up with duplicate handlers.
        self.listener.abort();
        debug!("force-logout listener deregistered");
    }
}

impl SessionInner {
    fn notify(&self, state: &SessionState) {
        // send only fails when there are no live subscribers
        let _ = self.notifier.send(state.snapshot());
    }

    async fn set_loading(&self, is_loading: bool) {
        let mut state = self.state.write().await;
        state.is_loading = is_loading;
        self.notify(&state);
    }

    async fn sign_in(&self, params: SignInParams) -> Result<(), SessionError> {
        self.set_loading(true).await;

        let result = self.persist_and_apply(params).await;
        if result.is_err() {
            // A failed sign-in must leave no ghost session behind.
            let mut state = self.state.write().await;
            state.user = None;
            state.tokens = None;
            self.notify(&state);
        }

        self.set_loading(false).await;
        result
    }

    async fn persist_and_apply(&self, params: SignInParams) -> Result<(), SessionError> {
        let SignInParams { user, tokens } = params;

        let serialized = serde_json::to_string(&user)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let keys = &self.config;
        self.storage.set(&keys.user_data_key, &serialized).await?;
        self.storage
            .set(&keys.access_token_key, &tokens.access_token)
            .await?;
        self.storage
            .set(&keys.refresh_token_key, &tokens.refresh_token)
            .await?;
        self.storage
            .set(
                &keys.access_token_expires_in_key,
                &tokens.access_token_expires_in,
            )
            .await?;
        self.storage
            .set(
                &keys.refresh_token_expires_in_key,
                &tokens.refresh_token_expires_in,
            )
            .await?;

        // Both fields flip under one write lock: observers never see a user
        // without tokens or vice versa.
        let mut state = self.state.write().await;
        info!(user_id = %user.id, "signed in");
        state.user = Some(user);
        state.tokens = Some(tokens);
        self.notify(&state);
        Ok(())
    }

    async fn sign_out(&self, message: Option<&str>) -> Result<(), SessionError> {
        self.clear_persisted().await?;

        let mut state = self.state.write().await;
        state.user = None;
        state.tokens = None;
        state.logout_message = message.map(str::to_string);
        info!("signed out");
        self.notify(&state);
        Ok(())
    }

    async fn force_logout(&self) {
        // The session must end even if storage cleanup fails; a restart
        // would then discard whatever partial keys remain.
        if let Err(e) = self.clear_persisted().await {
            warn!("failed to clear persisted session on force logout: {}", e);
        }

        let mut state = self.state.write().await;
        if state.user.is_some() || state.tokens.is_some() {
            info!("session forcefully invalidated");
        }
        state.user = None;
        state.tokens = None;
        self.notify(&state);
    }

    async fn clear_persisted(&self) -> Result<(), StorageError> {
        for key in self.config.session_keys() {
            self.storage.remove(key).await?;
        }
        self.organization.remove_selected_organization().await?;
        Ok(())
    }
}

async fn restore_user(storage: &dyn KeyValueStorage, config: &SessionConfig) -> Option<User> {
    let raw = match storage.get(&config.user_data_key).await {
        Ok(value) => value?,
        Err(e) => {
            warn!("failed to read persisted user record: {}", e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            // Malformed persisted data is treated as absent, never fatal.
            warn!("discarding malformed persisted user record: {}", e);
            None
        }
    }
}

/// All four token keys must be present; anything less reads as no tokens.
async fn restore_tokens(storage: &dyn KeyValueStorage, config: &SessionConfig) -> Option<TokenSet> {
    let access_token = read_key(storage, &config.access_token_key).await?;
    let refresh_token = read_key(storage, &config.refresh_token_key).await?;
    let access_token_expires_in = read_key(storage, &config.access_token_expires_in_key).await?;
    let refresh_token_expires_in = read_key(storage, &config.refresh_token_expires_in_key).await?;

    Some(TokenSet {
        access_token,
        refresh_token,
        access_token_expires_in,
        refresh_token_expires_in,
    })
}

async fn read_key(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    match storage.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!(key, "failed to read persisted session key: {}", e);
            None
        }
    }
}
