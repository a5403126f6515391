//! Access-token store: a TTL cache keyed by opaque token text, plus a
//! reverse index from user uid to live tokens so "sign out everywhere"
//! never scans the whole store. Both maps live under one lock and are
//! updated together on every mutation.

use crate::error::{AuthError, AuthResult};
use crate::model::User;
use crate::security::random_token;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccessToken {
    pub user_uid: String,
    /// Lifetime in seconds at issuance.
    pub ttl: u64,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    tokens: HashMap<String, AccessToken>,
    by_user: HashMap<String, HashSet<String>>,
}

pub struct AccessTokenStore {
    ttl: u64,
    inner: RwLock<Inner>,
}

impl AccessTokenStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self { ttl: ttl_secs, inner: RwLock::new(Inner::default()) }
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// Issue a fresh token for a user. Retries on the (astronomically
    /// unlikely) collision against the live key set. Issuance also sweeps
    /// expired records out of both maps, so tokens that die unpresented do
    /// not accumulate in a long-lived store.
    pub fn generate(&self, user: &User) -> AuthResult<String> {
        use crate::model::AuthEntity;
        let mut inner = self.inner.write();
        Self::sweep(&mut inner);
        loop {
            let token = random_token(32)?;
            if inner.tokens.contains_key(&token) {
                continue;
            }
            let now = Utc::now();
            let info = AccessToken {
                user_uid: user.uid().to_string(),
                ttl: self.ttl,
                created: now,
                expires: now + Duration::seconds(self.ttl as i64),
            };
            inner.tokens.insert(token.clone(), info);
            inner
                .by_user
                .entry(user.uid().to_string())
                .or_default()
                .insert(token.clone());
            debug!(user = user.uid(), ttl_secs = self.ttl, "access token issued");
            return Ok(token);
        }
    }

    /// Token metadata. Absent and expired tokens are indistinguishable to
    /// the caller; expired entries are pruned on the way out.
    pub fn get_info(&self, token: &str) -> AuthResult<AccessToken> {
        let mut inner = self.inner.write();
        match inner.tokens.get(token) {
            Some(info) if info.expires > Utc::now() => Ok(info.clone()),
            Some(_) => {
                Self::remove(&mut inner, token);
                Err(AuthError::InvalidAccessToken)
            }
            None => Err(AuthError::InvalidAccessToken),
        }
    }

    /// Refresh a token's lifetime: `expires` is recomputed from now.
    pub fn prolong(&self, token: &str) -> AuthResult<AccessToken> {
        let mut inner = self.inner.write();
        match inner.tokens.get_mut(token) {
            Some(info) if info.expires > Utc::now() => {
                info.expires = Utc::now() + Duration::seconds(info.ttl as i64);
                Ok(info.clone())
            }
            Some(_) => {
                Self::remove(&mut inner, token);
                Err(AuthError::InvalidAccessToken)
            }
            None => Err(AuthError::InvalidAccessToken),
        }
    }

    /// Revoke a single token. Unknown, already-revoked and expired tokens
    /// all fail identically; an expired record is pruned on the way out.
    pub fn revoke(&self, token: &str) -> AuthResult<()> {
        let mut inner = self.inner.write();
        match inner.tokens.get(token) {
            Some(info) if info.expires > Utc::now() => {
                Self::remove(&mut inner, token);
                Ok(())
            }
            Some(_) => {
                Self::remove(&mut inner, token);
                Err(AuthError::InvalidAccessToken)
            }
            None => Err(AuthError::InvalidAccessToken),
        }
    }

    /// Drain and revoke every live token of a user. A user with no tokens
    /// is not an error.
    pub fn revoke_all(&self, user_uid: &str) -> usize {
        let mut inner = self.inner.write();
        let tokens = inner.by_user.remove(user_uid).unwrap_or_default();
        let count = tokens.len();
        for t in tokens {
            inner.tokens.remove(&t);
        }
        if count > 0 {
            debug!(user = user_uid, count, "revoked all access tokens");
        }
        count
    }

    /// Live tokens of a user ("list my active sessions").
    pub fn tokens_for(&self, user_uid: &str) -> Vec<String> {
        let now = Utc::now();
        let inner = self.inner.read();
        inner
            .by_user
            .get(user_uid)
            .map(|set| {
                set.iter()
                    .filter(|t| inner.tokens.get(*t).map(|i| i.expires > now).unwrap_or(false))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every expired record from both maps.
    fn sweep(inner: &mut Inner) {
        let now = Utc::now();
        let dead: Vec<String> = inner
            .tokens
            .iter()
            .filter(|(_, info)| info.expires <= now)
            .map(|(t, _)| t.clone())
            .collect();
        for t in dead {
            Self::remove(inner, &t);
        }
    }

    fn remove(inner: &mut Inner, token: &str) {
        if let Some(info) = inner.tokens.remove(token) {
            if let Some(set) = inner.by_user.get_mut(&info.user_uid) {
                set.remove(token);
                if set.is_empty() {
                    inner.by_user.remove(&info.user_uid);
                }
            }
        }
    }
}
