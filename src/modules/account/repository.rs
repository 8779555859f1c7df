use bookstore_authz::{IdentityError, IdentityProvider};
use bookstore_http::error::AppError;
use serde_json::json;
use thiserror::Error;

use super::models::{SignIn, SignUp};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let AccountError::Identity(err) = err;
        match err {
            IdentityError::DuplicateEmail(email) => AppError::conflict(
                vec![json!({ "field": "email", "error": "already registered" })],
                format!("an account for {email} already exists"),
            ),
            IdentityError::WeakPassword(reasons) => AppError::validation(
                reasons
                    .into_iter()
                    .map(|reason| json!({ "field": "password", "error": reason }))
                    .collect(),
                "password does not satisfy the policy",
            ),
            IdentityError::Store(store) => AppError::from(store),
            other => AppError::Internal(other.into()),
        }
    }
}

/// Signup and login on top of the identity provider
#[derive(Clone)]
pub struct AccountRepository {
    identity: IdentityProvider,
}

impl AccountRepository {
    pub fn new(identity: IdentityProvider) -> Self {
        Self { identity }
    }

    /// Expects a form that already passed [`SignUp::validate`]
    pub async fn sign_up(&self, form: SignUp) -> Result<(), AccountError> {
        self.identity.create_user(form.into()).await?;
        Ok(())
    }

    /// `None` when the credentials do not match an account
    pub async fn login(&self, credentials: SignIn) -> Result<Option<String>, AccountError> {
        Ok(self
            .identity
            .password_sign_in(&credentials.email, &credentials.password)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use bookstore_authz::{PasswordPolicy, TokenService};
    use bookstore_db::memory::InMemoryStore;
    use bookstore_kernel::settings::AuthSettings;

    fn repository() -> (AccountRepository, TokenService) {
        let tokens = TokenService::new(&AuthSettings::default());
        let identity = IdentityProvider::new(
            Arc::new(InMemoryStore::new()),
            tokens.clone(),
            PasswordPolicy::default(),
        );
        (AccountRepository::new(identity), tokens)
    }

    fn form(email: &str, password: &str) -> SignUp {
        SignUp {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
        }
    }

    fn credentials(email: &str, password: &str) -> SignIn {
        SignIn {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn signed_up_user_can_log_in() {
        let (repo, tokens) = repository();
        repo.sign_up(form("grace@navy.mil", "C0bol!")).await.unwrap();

        let token = repo
            .login(credentials("GRACE@navy.mil", "C0bol!"))
            .await
            .unwrap()
            .expect("token");
        assert!(!token.is_empty());
        assert_eq!(tokens.validate(&token).unwrap().email, "grace@navy.mil");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_both_yield_none() {
        let (repo, _) = repository();
        repo.sign_up(form("grace@navy.mil", "C0bol!")).await.unwrap();

        assert!(repo
            .login(credentials("grace@navy.mil", "c0bol!"))
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .login(credentials("nobody@navy.mil", "C0bol!"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_conflict() {
        let (repo, _) = repository();
        repo.sign_up(form("grace@navy.mil", "C0bol!")).await.unwrap();

        let err = repo
            .sign_up(form("Grace@Navy.mil", "C0bol!"))
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn weak_password_maps_to_validation_error() {
        let (repo, _) = repository();
        let err = repo.sign_up(form("grace@navy.mil", "abc")).await.unwrap_err();
        assert!(matches!(
            err,
            AccountError::Identity(IdentityError::WeakPassword(_))
        ));
        assert_eq!(
            AppError::from(err).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
