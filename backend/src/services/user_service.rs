//! Credential verification and registration.
//!
//! Wraps the credential repository with the password hasher. bcrypt work runs
//! on the blocking pool so it never stalls request tasks.

use crate::database::models::{NewCredential, StoredCredential, UserId};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::CredentialRepository;
use crate::utils::crypto::{HashedCredential, PasswordHasher};
use std::sync::Arc;

/// Result of checking an email/password pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified(UserId),
    Rejected,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn CredentialRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `repo` - Credential repository
    /// * `hasher` - Password hasher, already checked against the cost floor
    pub fn new(repo: Arc<dyn CredentialRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    /// Checks `password` against the credential stored for `email`.
    ///
    /// # Returns
    /// `Verified` only if a record exists, its email matches exactly and the
    /// hash comparison succeeds. Everything else is `Rejected`.
    ///
    /// # Errors
    /// Returns `ServiceError::Database` if the repository lookup fails
    pub async fn verify_credential(&self, email: &str, password: &str) -> ServiceResult<VerifyOutcome> {
        let Some(credential) = self.repo.find_by_email(email).await? else {
            return Ok(VerifyOutcome::Rejected);
        };

        if credential.email != email {
            return Ok(VerifyOutcome::Rejected);
        }

        let hasher = self.hasher;
        let password = password.to_owned();
        let stored_hash = credential.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| ServiceError::hashing_failure(format!("verification task failed: {}", e)))?;

        if matches {
            Ok(VerifyOutcome::Verified(credential.user_id()))
        } else {
            Ok(VerifyOutcome::Rejected)
        }
    }

    /// Retrieves the credential registered under `email`, if any.
    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<StoredCredential>> {
        Ok(self.repo.find_by_email(email).await?)
    }

    /// Hashes a password for storage.
    ///
    /// # Errors
    /// Returns `ServiceError::HashingFailure` if bcrypt fails
    pub async fn hash_password(&self, password: &str) -> ServiceResult<HashedCredential> {
        let hasher = self.hasher;
        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::hashing_failure(format!("hashing task failed: {}", e)))??;
        Ok(hashed)
    }

    /// Registers a new credential.
    ///
    /// # Returns
    /// The identity assigned by the repository
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - an email that is already registered (`Conflict`), checked before
    ///   hashing and again on insert
    /// - hashing failures, in which case nothing is persisted
    /// - repository failures
    pub async fn register(&self, email: &str, password: &str) -> ServiceResult<UserId> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(ServiceError::conflict("User", email));
        }

        let hashed = self.hash_password(password).await?;

        let created = self
            .repo
            .insert(NewCredential {
                email: email.to_string(),
                password_hash: hashed.into_string(),
            })
            .await?;

        created.ok_or_else(|| ServiceError::conflict("User", email))
    }
}
