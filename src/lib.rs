pub mod api;
pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod events;
pub mod model;
pub mod security;
pub mod token;
pub mod validation;

pub use api::Authority;
pub use config::Config;
pub use error::{AuthError, AuthResult};
