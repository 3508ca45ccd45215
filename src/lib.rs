// Client-side authentication session management
// Holds the current user's identity and credential tokens in memory,
// persists them through a durable key-value storage abstraction, and reacts
// to the application-wide force-logout broadcast.

pub mod error;
pub mod events;
pub mod models;
pub mod session;
pub mod storage;

// Re-exports for convenient access
pub use error::SessionError;
pub use events::{AuthEvent, EventBus};
pub use models::{User, UserRole};
pub use session::{
    SessionConfig, SessionProvider, SessionSnapshot, SessionStore, SignInParams, TokenSet,
};
pub use storage::{KeyValueStorage, MemoryStorage, OrganizationScope, StorageError};
