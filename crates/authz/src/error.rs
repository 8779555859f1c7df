use bookstore_db::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("password does not meet requirements: {}", .0.join("; "))]
    WeakPassword(Vec<String>),

    #[error("password hashing failed")]
    HashingFailed,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token")]
    Malformed,

    #[error("token could not be signed")]
    Signing,
}
