//! Rotating session identity for paid-vendor IP pinning

use std::sync::Arc;

use arc_swap::ArcSwap;
use uuid::Uuid;

/// Length of every session token
pub const SESSION_TOKEN_LEN: usize = 16;

/// Current session token shared by all requests
///
/// Readers never block. `rotate` swaps in a freshly allocated token in a single
/// atomic store, so a reader sees either the old or the new value in full.
#[derive(Debug)]
pub struct SessionIdentity {
    token: ArcSwap<String>,
}

impl SessionIdentity {
    /// Create an identity with a random token
    pub fn new() -> Self {
        Self::with_token(generate_token())
    }

    /// Create an identity with a fixed token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: ArcSwap::from_pointee(token.into()),
        }
    }

    /// Current token
    pub fn read(&self) -> String {
        self.token.load().as_ref().clone()
    }

    /// Replace the token and return the new value
    pub fn rotate(&self) -> String {
        self.replace().1
    }

    /// Replace the token, returning `(previous, current)`
    pub fn replace(&self) -> (String, String) {
        let next = generate_token();
        let previous = self.token.swap(Arc::new(next.clone()));
        (previous.as_ref().clone(), next)
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(SESSION_TOKEN_LEN);
    token
}
