//! Entity model: users, roles and the generic field-access seam shared by
//! storage drivers and the query matcher.

mod entity;
mod role;
mod user;

pub use entity::AuthEntity;
pub use role::Role;
pub use user::{User, UserStatus, ANONYMOUS_USER_LOGIN, SYSTEM_USER_LOGIN};
