//! In-process identity provider.
//!
//! Stores credentials through [`bookstore_db::UserStore`], hashes passwords
//! with Argon2id and issues HS256 JWT bearer tokens. The HTTP layer only
//! sees [`IdentityProvider`] and [`TokenService`].

pub mod error;
pub mod identity;
pub mod module;
pub mod password;
pub mod token;

pub use error::{IdentityError, TokenError};
pub use identity::{IdentityProvider, NewUser};
pub use module::IdentityModule;
pub use password::PasswordPolicy;
pub use token::{Claims, TokenService};
