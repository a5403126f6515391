//! Role entity: a named container of permission identifiers.

use crate::error::{AuthError, AuthResult};
use crate::model::AuthEntity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    uid: String,
    name: String,
    description: String,
    #[serde(default)]
    permissions: BTreeSet<String>,
    #[serde(skip, default)]
    is_new: bool,
    #[serde(skip, default)]
    modified: bool,
}

impl Role {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            description: description.into(),
            permissions: BTreeSet::new(),
            is_new: true,
            modified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.modified = true;
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Permission identifiers are opaque here; the permission registry is an
    /// external collaborator.
    pub fn add_permission(&mut self, perm: impl Into<String>) {
        if self.permissions.insert(perm.into()) {
            self.modified = true;
        }
    }

    pub fn remove_permission(&mut self, perm: &str) {
        if self.permissions.remove(perm) {
            self.modified = true;
        }
    }

    pub fn has_permission(&self, perm: &str) -> bool {
        self.permissions.contains(perm)
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub(crate) fn mark_saved(&mut self) {
        self.is_new = false;
        self.modified = false;
    }
}

impl AuthEntity for Role {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn entity_type(&self) -> &'static str {
        "role"
    }

    fn is_modified(&self) -> bool {
        self.modified
    }

    fn has_field(&self, name: &str) -> bool {
        matches!(name, "uid" | "name" | "description" | "permissions")
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "uid" => Some(Value::String(self.uid.clone())),
            "name" => Some(Value::String(self.name.clone())),
            "description" => Some(Value::String(self.description.clone())),
            "permissions" => Some(Value::Array(
                self.permissions.iter().cloned().map(Value::String).collect(),
            )),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> AuthResult<()> {
        match (name, value) {
            ("description", Value::String(s)) => {
                self.set_description(s);
                Ok(())
            }
            ("permissions", Value::Array(items)) => {
                let mut perms = BTreeSet::new();
                for item in items {
                    match item {
                        Value::String(s) => {
                            perms.insert(s);
                        }
                        other => {
                            return Err(AuthError::storage(format!(
                                "role permissions must be strings, got {}",
                                other
                            )))
                        }
                    }
                }
                self.permissions = perms;
                self.modified = true;
                Ok(())
            }
            ("uid" | "name", _) => Err(AuthError::storage(format!(
                "role field '{}' is read-only",
                name
            ))),
            (other, _) => Err(AuthError::storage(format!(
                "role has no writable field '{}'",
                other
            ))),
        }
    }

    fn add_to_field(&mut self, name: &str, value: Value) -> AuthResult<()> {
        match (name, value) {
            ("permissions", Value::String(s)) => {
                self.add_permission(s);
                Ok(())
            }
            (other, _) => Err(AuthError::storage(format!(
                "role has no set-valued field '{}'",
                other
            ))),
        }
    }

    fn remove_from_field(&mut self, name: &str, value: &Value) -> AuthResult<()> {
        match (name, value) {
            ("permissions", Value::String(s)) => {
                self.remove_permission(s);
                Ok(())
            }
            (other, _) => Err(AuthError::storage(format!(
                "role has no set-valued field '{}'",
                other
            ))),
        }
    }
}
