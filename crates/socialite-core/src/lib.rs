#![doc = include_str!("../README.md")]

pub mod config;
pub mod env;
pub mod error;
pub mod http;
pub mod user;
pub mod utils;

// Re-exports for convenience
pub use config::ProviderConfig;
pub use error::{ErrorCode, Result, SocialiteError};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use user::User;
