#![doc = include_str!("../README.md")]

pub mod authorization_url;
pub mod provider;
pub mod providers;

// Re-exports
pub use authorization_url::build_url;
pub use provider::{Provider, ProviderBase, RedirectResponse};
pub use providers::{ProfileScope, WeWorkProvider};
