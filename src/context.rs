//! Per-user conversational context.
//!
//! Each user owns one open key/value map (for example `last_log`). Updates
//! replace the whole map; there is no merging. Entries live for the lifetime
//! of the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Context values for one user.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Identifier for a conversational participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// The fixed identity used by single-user deployments.
    pub const DEFAULT: &'static str = "default_user";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Thread-safe map from [`UserId`] to that user's [`Context`].
#[derive(Debug, Default)]
pub struct ContextStore {
    entries: RwLock<HashMap<UserId, Context>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored context for `user`.
    pub fn update(&self, user: &UserId, context: Context) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(user.clone(), context);
    }

    /// The stored context for `user`, or an empty map.
    pub fn get(&self, user: &UserId) -> Context {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(user).cloned().unwrap_or_default()
    }
}
