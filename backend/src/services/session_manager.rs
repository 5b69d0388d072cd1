//! Token lifecycle and single-session enforcement.
//!
//! A user is either without a session (no record in the store) or has exactly
//! one live session whose record holds the most recently issued token. A
//! token is honoured only while it verifies *and* equals that record, so every
//! issuance silently supersedes whatever token the user held before.

use crate::database::models::UserId;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::session_store::SessionStore;
use crate::utils::jwt::{TokenClaims, TokenCodec};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Store key holding the live token for `user`.
pub fn session_key(user: UserId) -> String {
    format!("token:{}", user)
}

pub struct SessionManager {
    codec: TokenCodec,
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(codec: TokenCodec, store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { codec, store, ttl }
    }

    /// Lifetime of both the token and its session record.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `user` and make it the user's only live session.
    pub async fn issue(&self, user: UserId) -> ServiceResult<String> {
        let claims = TokenClaims::new(user, self.ttl)?;
        let token = self.codec.sign(&claims)?;

        self.store.put(&session_key(user), &token, self.ttl).await?;

        info!(user_id = %user, "session issued");
        Ok(token)
    }

    /// Resolve a token to its user if it is the user's current session.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<UserId> {
        let claims = self.codec.parse(token)?;
        let user = claims.subject();

        match self.store.get(&session_key(user)).await? {
            Some(current) if current == token => Ok(user),
            Some(_) => {
                debug!(user_id = %user, "token superseded by a newer session");
                Err(ServiceError::invalid_token())
            }
            None => {
                debug!(user_id = %user, "no live session for token");
                Err(ServiceError::invalid_token())
            }
        }
    }

    /// Replace the session behind a still-valid token with a fresh one.
    ///
    /// Only the codec's rules apply here: the inbound token need not be the
    /// current session, and no lock is held between the parse and the write.
    pub async fn refresh(&self, token: &str) -> ServiceResult<String> {
        let claims = self.codec.parse(token)?;
        self.issue(claims.subject()).await
    }

    /// End the session of the token's subject.
    ///
    /// # Returns
    /// `true` if a record was removed, `false` if there was none
    pub async fn logout(&self, token: &str) -> ServiceResult<bool> {
        let claims = self.codec.parse(token)?;
        let user = claims.subject();

        let removed = self.store.delete(&session_key(user)).await?;
        info!(user_id = %user, removed, "session logged out");
        Ok(removed)
    }

    /// Move the expiry of `user`'s live session to `at`.
    ///
    /// # Returns
    /// `false` if the user had no live session
    pub async fn expire_session_at(&self, user: UserId, at: DateTime<Utc>) -> ServiceResult<bool> {
        let applied = self.store.expire_at(&session_key(user), at).await?;
        info!(user_id = %user, expires_at = %at, applied, "session expiry moved");
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TokenRejection;
    use crate::repositories::session_store::{MemorySessionStore, StoreError};
    use async_trait::async_trait;

    const SECRET: &str = "session-test-secret";

    fn manager_with(store: Arc<dyn SessionStore>) -> SessionManager {
        SessionManager::new(TokenCodec::new(SECRET).unwrap(), store, Duration::from_secs(900))
    }

    fn manager() -> (SessionManager, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        (manager_with(store.clone()), store)
    }

    fn is_invalid_token(err: &ServiceError) -> bool {
        matches!(
            err,
            ServiceError::Unauthenticated {
                reason: TokenRejection::InvalidToken
            }
        )
    }

    /// Store whose every call fails like a dropped connection.
    struct DownStore;

    fn refused() -> StoreError {
        StoreError::Redis(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }

    #[async_trait]
    impl SessionStore for DownStore {
        async fn put(&self, _: &str, _: &str, _: Duration) -> Result<(), StoreError> {
            Err(refused())
        }
        async fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
            Err(refused())
        }
        async fn delete(&self, _: &str) -> Result<bool, StoreError> {
            Err(refused())
        }
        async fn expire_at(&self, _: &str, _: DateTime<Utc>) -> Result<bool, StoreError> {
            Err(refused())
        }
    }

    #[tokio::test]
    async fn test_issue_writes_record() {
        let (sessions, store) = manager();

        let token = sessions.issue(UserId(1)).await.unwrap();

        assert!(!token.is_empty());
        assert_eq!(store.get("token:1").await.unwrap(), Some(token.clone()));
        assert_eq!(sessions.authenticate(&token).await.unwrap(), UserId(1));
    }

    #[tokio::test]
    async fn test_only_latest_issue_authenticates() {
        let (sessions, _) = manager();

        let mut tokens = Vec::new();
        for _ in 0..4 {
            tokens.push(sessions.issue(UserId(5)).await.unwrap());
        }

        let (latest, earlier) = tokens.split_last().unwrap();
        assert_eq!(sessions.authenticate(latest).await.unwrap(), UserId(5));
        for token in earlier {
            let err = sessions.authenticate(token).await.unwrap_err();
            assert!(is_invalid_token(&err));
        }
    }

    #[tokio::test]
    async fn test_sessions_of_different_users_are_independent() {
        let (sessions, _) = manager();

        let alice = sessions.issue(UserId(1)).await.unwrap();
        let bob = sessions.issue(UserId(2)).await.unwrap();
        sessions.issue(UserId(2)).await.unwrap();

        assert_eq!(sessions.authenticate(&alice).await.unwrap(), UserId(1));
        assert!(sessions.authenticate(&bob).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_token_fails_even_with_record() {
        let (sessions, store) = manager();
        let codec = TokenCodec::new(SECRET).unwrap();

        let mut claims = TokenClaims::new(UserId(3), Duration::from_secs(900)).unwrap();
        claims.iat -= 2000;
        claims.exp = Utc::now().timestamp() - 5;
        let stale = codec.sign(&claims).unwrap();
        store
            .put(&session_key(UserId(3)), &stale, Duration::from_secs(900))
            .await
            .unwrap();

        let err = sessions.authenticate(&stale).await.unwrap_err();
        assert!(is_invalid_token(&err));
    }

    #[tokio::test]
    async fn test_refresh_supersedes_original() {
        let (sessions, _) = manager();

        let first = sessions.issue(UserId(9)).await.unwrap();
        let second = sessions.refresh(&first).await.unwrap();

        assert_ne!(first, second);
        assert!(sessions.authenticate(&first).await.is_err());
        assert_eq!(sessions.authenticate(&second).await.unwrap(), UserId(9));
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage() {
        let (sessions, store) = manager();

        let err = sessions.refresh("garbage").await.unwrap_err();

        assert!(is_invalid_token(&err));
        assert!(store.get("token:0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_twice_reports_false() {
        let (sessions, _) = manager();

        let token = sessions.issue(UserId(4)).await.unwrap();

        assert!(sessions.logout(&token).await.unwrap());
        assert!(!sessions.logout(&token).await.unwrap());
        assert!(sessions.authenticate(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_logout_with_superseded_token_ends_current_session() {
        let (sessions, _) = manager();

        let old = sessions.issue(UserId(4)).await.unwrap();
        let current = sessions.issue(UserId(4)).await.unwrap();

        assert!(sessions.logout(&old).await.unwrap());
        assert!(sessions.authenticate(&current).await.is_err());
    }

    #[tokio::test]
    async fn test_expire_session_at() {
        let (sessions, _) = manager();

        let token = sessions.issue(UserId(6)).await.unwrap();
        let applied = sessions
            .expire_session_at(UserId(6), Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();

        assert!(applied);
        assert!(sessions.authenticate(&token).await.is_err());
        assert!(
            !sessions
                .expire_session_at(UserId(6), Utc::now() + chrono::Duration::seconds(60))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_as_error() {
        let sessions = manager_with(Arc::new(DownStore));

        let err = sessions.issue(UserId(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable { .. }));

        let token = TokenCodec::new(SECRET)
            .unwrap()
            .sign(&TokenClaims::new(UserId(1), Duration::from_secs(60)).unwrap())
            .unwrap();
        let err = sessions.authenticate(&token).await.unwrap_err();
        assert!(err.is_server_fault());
        let err = sessions.logout(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_fails_without_session() {
        let store = Arc::new(MemorySessionStore::new());
        let sessions = SessionManager::new(
            TokenCodec::new(SECRET).unwrap(),
            store.clone(),
            Duration::from_secs(100_000_000_000_000_000),
        );

        let err = sessions.issue(UserId(1)).await.unwrap_err();

        assert!(matches!(err, ServiceError::SigningFailure { .. }));
        assert_eq!(store.get(&session_key(UserId(1))).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_logins_leave_one_session() {
        let (sessions, store) = manager();
        let sessions = Arc::new(sessions);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sessions = sessions.clone();
                tokio::spawn(async move { sessions.issue(UserId(11)).await.unwrap() })
            })
            .collect();

        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap());
        }

        let survivor = store.get("token:11").await.unwrap().unwrap();
        let mut accepted = 0;
        for token in &tokens {
            if sessions.authenticate(token).await.is_ok() {
                accepted += 1;
                assert_eq!(token, &survivor);
            }
        }
        assert_eq!(accepted, 1);
    }
}
