//! Core building blocks shared by every bookstore crate: the [`Module`]
//! contract, the [`ModuleRegistry`] that drives module lifecycles, and the
//! layered [`settings`].

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
