//! Built-in role bootstrap.
//!
//! Runs as the first listener on storage-driver registration: creates the
//! mandatory roles when missing and repairs a drifted description, without
//! ever touching custom roles or any other field of an existing built-in.

use crate::api::Authority;
use crate::error::AuthError;
use crate::events::AuthEvent;
use tracing::info;

pub const BUILTIN_ROLES: [(&str, &str); 4] = [
    ("anonymous", "Anonymous users"),
    ("user", "Registered users"),
    ("admin", "Administrators"),
    ("dev", "Developers"),
];

pub fn on_register_storage_driver(
    authority: &Authority,
    event: &AuthEvent,
) -> anyhow::Result<()> {
    if !matches!(event, AuthEvent::RegisterStorageDriver { .. }) {
        return Ok(());
    }

    for (name, description) in BUILTIN_ROLES {
        match authority.get_role(name) {
            Ok(mut role) => {
                if role.description() != description {
                    authority.switch_user_to_system()?;
                    role.set_description(description);
                    let saved = authority.save_role(&mut role);
                    authority.restore_user()?;
                    saved?;
                    info!(role = name, "built-in role description repaired");
                }
            }
            Err(AuthError::RoleNotFound { .. }) => {
                authority.switch_user_to_system()?;
                let created = authority.create_role(name, description);
                authority.restore_user()?;
                created?;
                info!(role = name, "built-in role created");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
