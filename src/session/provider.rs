// Required-dependency accessor for the session store.
// Asking for the session before a store was installed is a wiring bug in
// the consuming application; it fails loudly instead of handing back a
// default "always logged out" session.

use super::store::SessionStore;
use crate::error::SessionError;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
pub struct SessionProvider {
    slot: RwLock<Option<Arc<SessionStore>>>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the store for the current provisioning scope.
    pub fn install(&self, store: Arc<SessionStore>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(store);
    }

    /// Tear down at the end of the provisioning scope.
    pub fn uninstall(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// The current session store, or [`SessionError::NotProvisioned`] when
    /// called outside a provisioning scope.
    pub fn current(&self) -> Result<Arc<SessionStore>, SessionError> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.clone().ok_or(SessionError::NotProvisioned)
    }
}
