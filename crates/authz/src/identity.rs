use std::sync::Arc;

use bookstore_db::{StoreError, UserRecord, UserStore};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::IdentityError;
use crate::password::{self, PasswordPolicy};
use crate::token::TokenService;

/// Data required to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Registers users and signs them in
#[derive(Clone)]
pub struct IdentityProvider {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    policy: PasswordPolicy,
}

/// Emails are unique regardless of case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_uppercase()
}

impl IdentityProvider {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, policy: PasswordPolicy) -> Self {
        Self {
            users,
            tokens,
            policy,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, IdentityError> {
        self.policy.check(&new_user.password)?;

        let normalized_email = normalize_email(&new_user.email);
        if self
            .users
            .find_user_by_email(&normalized_email)
            .await?
            .is_some()
        {
            return Err(IdentityError::DuplicateEmail(new_user.email));
        }

        let password = new_user.password;
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|_| IdentityError::HashingFailed)??;

        let record = UserRecord {
            id: Uuid::now_v7(),
            email: new_user.email.trim().to_string(),
            normalized_email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };

        // A concurrent signup may win the race between lookup and insert.
        let created = self.users.insert_user(record).await.map_err(|err| match err {
            StoreError::Conflict(_) => IdentityError::DuplicateEmail(new_user.email.clone()),
            other => IdentityError::Store(other),
        })?;

        tracing::info!(user_id = %created.id, "user registered");
        Ok(created)
    }

    /// `Ok(None)` for an unknown email or a wrong password. Both paths run one
    /// Argon2 verification, so callers cannot tell them apart.
    pub async fn password_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, IdentityError> {
        let user = self.users.find_user_by_email(&normalize_email(email)).await?;

        let candidate = password.to_string();
        let hash = user.as_ref().map_or_else(
            || password::DUMMY_PASSWORD_HASH.to_string(),
            |user| user.password_hash.clone(),
        );
        let verified =
            tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
                .await
                .map_err(|_| IdentityError::HashingFailed)?;

        let Some(user) = user else {
            tracing::debug!("sign-in rejected: unknown email");
            return Ok(None);
        };
        if !verified {
            tracing::debug!(user_id = %user.id, "sign-in rejected: bad password");
            return Ok(None);
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user signed in");
        Ok(Some(token))
    }
}
