//! Per-session state that lives from sign-in to sign-out and is never
//! persisted: pending magic links, revoked sessions, manager unlocks.

use std::time::Duration;

use moka::future::Cache;
use moka::notification::RemovalCause;
use uuid::Uuid;

use crate::model::manager_user::ManagerUnlock;

/// Sign-outs remembered at once. A revoked token must outlive its own expiry
/// in this cache, so size it above the sign-outs expected per session TTL.
pub const DEFAULT_REVOKED_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub email: String,
    pub redirect_to: Option<String>,
}

#[derive(Clone)]
pub struct SessionStore {
    magic_links: Cache<String, PendingLink>,
    revoked: Cache<String, ()>,
    unlocks: Cache<String, ManagerUnlock>,
}

fn revoked_cache(capacity: u64, session_ttl: Duration) -> Cache<String, ()> {
    Cache::builder()
        .max_capacity(capacity)
        .time_to_live(session_ttl)
        .eviction_listener(|session_id, _, cause| {
            if cause == RemovalCause::Size {
                tracing::warn!(%session_id, "Revoked session evicted before expiry");
            }
        })
        .build()
}

impl SessionStore {
    pub fn new(magic_link_ttl: Duration, session_ttl: Duration) -> Self {
        Self::with_revoked_capacity(magic_link_ttl, session_ttl, DEFAULT_REVOKED_CAPACITY)
    }

    pub fn with_revoked_capacity(
        magic_link_ttl: Duration,
        session_ttl: Duration,
        revoked_capacity: u64,
    ) -> Self {
        Self {
            magic_links: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(magic_link_ttl)
                .build(),
            revoked: revoked_cache(revoked_capacity, session_ttl),
            unlocks: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(session_ttl)
                .build(),
        }
    }

    /// Returns the one-time token to embed in the link.
    pub async fn issue_link(&self, email: &str, redirect_to: Option<String>) -> String {
        let token = Uuid::new_v4().to_simple().to_string();
        self.magic_links
            .insert(
                token.clone(),
                PendingLink {
                    email: email.to_string(),
                    redirect_to,
                },
            )
            .await;
        token
    }

    /// A link works once.
    pub async fn consume_link(&self, token: &str) -> Option<PendingLink> {
        self.magic_links.remove(token).await
    }

    pub async fn revoke(&self, session_id: &str) {
        self.revoked.insert(session_id.to_string(), ()).await;
        self.lock(session_id).await;
    }

    pub fn is_revoked(&self, session_id: &str) -> bool {
        self.revoked.contains_key(session_id)
    }

    pub async fn unlock(&self, session_id: &str, unlock: ManagerUnlock) {
        self.unlocks.insert(session_id.to_string(), unlock).await;
    }

    pub async fn unlocked(&self, session_id: &str) -> Option<ManagerUnlock> {
        self.unlocks.get(session_id).await
    }

    pub async fn lock(&self, session_id: &str) {
        self.unlocks.invalidate(session_id).await;
    }
}
