//! Bookstore application: feature modules (books, account) on top of the
//! bookstore kernel, plus the bootstrap that assembles them.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::Application;
