// Social providers.

pub mod wework;

pub use wework::{ProfileScope, WeWorkProvider};
