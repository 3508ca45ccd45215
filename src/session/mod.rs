// Session management module
// Owns the in-memory session state, persists it through the storage
// abstraction, and reacts to the force-logout broadcast.

pub mod provider;
pub mod store;
pub mod types;

pub use provider::SessionProvider;
pub use store::SessionStore;
pub use types::{SessionConfig, SessionSnapshot, SignInParams, TokenSet};
