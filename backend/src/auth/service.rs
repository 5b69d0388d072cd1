//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::UserId;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::session_store::SessionStore;
use crate::repositories::user_repository::CredentialRepository;
use crate::services::session_manager::SessionManager;
use crate::services::user_service::{UserService, VerifyOutcome};
use crate::utils::crypto::PasswordHasher;
use crate::utils::jwt::TokenCodec;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

const TOKEN_TYPE: &str = "Bearer";

/// Authentication service for handling login, registration and session tokens
pub struct AuthService {
    users: UserService,
    sessions: SessionManager,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(users: UserService, sessions: SessionManager) -> Self {
        AuthService { users, sessions }
    }

    /// Wire the service from configuration and the two external collaborators.
    pub fn from_config(
        config: &Config,
        repo: Arc<dyn CredentialRepository>,
        store: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let codec = TokenCodec::new(&config.jwt_secret)?;
        let ttl = Duration::from_secs(config.jwt_expires_in_seconds);

        Ok(Self::new(
            UserService::new(repo, hasher),
            SessionManager::new(codec, store, ttl),
        ))
    }

    fn expires_in(&self) -> u64 {
        self.sessions.ttl().as_secs()
    }

    /// Authenticate user and open a session, replacing any previous one
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        validate_request(&login_request)?;

        match self
            .users
            .verify_credential(&login_request.email, &login_request.password)
            .await?
        {
            VerifyOutcome::Verified(user_id) => self.open_session(user_id).await,
            VerifyOutcome::Rejected => {
                tracing::debug!("login rejected");
                Err(ServiceError::InvalidCredential)
            }
        }
    }

    /// Register a new user. Does not open a session.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<RegisterResponse> {
        validate_request(&request)?;
        check_password_length(&request.password)?;

        let user_id = self.users.register(&request.email, &request.password).await?;
        tracing::info!(user_id = %user_id, "user registered");

        Ok(RegisterResponse {
            user_id,
            email: request.email,
        })
    }

    /// Open a session for a user vouched for by an external identity provider.
    ///
    /// No proof of identity is checked here: the caller must already have
    /// verified `identity` with the provider, otherwise this hands a session to
    /// anyone who knows a registered email. The user must be registered under
    /// the asserted email and the session is issued for that registered
    /// identity.
    pub async fn login_external(&self, identity: ExternalIdentity) -> ServiceResult<LoginResponse> {
        validate_request(&identity)?;

        let Some(credential) = self.users.find_by_email(&identity.email).await? else {
            tracing::debug!(external_id = %identity.external_id, "external login for unknown email");
            return Err(ServiceError::InvalidCredential);
        };

        tracing::info!(
            user_id = %credential.user_id(),
            external_id = %identity.external_id,
            "external identity accepted"
        );
        self.open_session(credential.user_id()).await
    }

    /// Resolve a bearer token to the user of the live session
    pub async fn authenticate(&self, token: &str) -> ServiceResult<UserId> {
        self.sessions.authenticate(token).await
    }

    /// Exchange a still-valid token for a fresh one
    pub async fn refresh(&self, token: &str) -> ServiceResult<RefreshTokenResponse> {
        let access_token = self.sessions.refresh(token).await?;

        Ok(RefreshTokenResponse {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: self.expires_in(),
        })
    }

    /// End the session behind `token`
    pub async fn logout(&self, token: &str) -> ServiceResult<LogoutResponse> {
        let removed = self.sessions.logout(token).await?;
        Ok(LogoutResponse { removed })
    }

    async fn open_session(&self, user_id: UserId) -> ServiceResult<LoginResponse> {
        let access_token = self.sessions.issue(user_id).await?;

        Ok(LoginResponse {
            user_id,
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: self.expires_in(),
        })
    }
}

fn validate_request<T: Validate>(request: &T) -> ServiceResult<()> {
    if let Err(validation_errors) = request.validate() {
        let mut error_messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        error_messages.sort();
        return Err(ServiceError::invalid_input(error_messages.join(", ")));
    }
    Ok(())
}

fn check_password_length(password: &str) -> ServiceResult<()> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ServiceError::invalid_input(format!(
            "password: Must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}
