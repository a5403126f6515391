//! Lifecycle event bus: a closed set of event kinds with strongly-typed
//! payloads, dispatched synchronously in priority order. A listener that
//! fails aborts the remaining listeners and the failure surfaces to the
//! operation that fired the event.

use crate::api::Authority;
use crate::error::{AuthError, AuthResult};
use crate::model::{Role, User, UserStatus};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum AuthEvent {
    RegisterStorageDriver { driver_name: String },
    UserCreate { user: User },
    UserPreSave { user: User },
    UserSave { user: User },
    UserPreDelete { user: User },
    UserDelete { user: User },
    /// Fired before the incoming status value is applied.
    UserStatusChange { user: User, status: UserStatus },
    UserAsJsonable { user: User },
    SignIn { user: User },
    SignOut { user: User },
    SignUp { user: User },
    /// Diagnostic: a driver rejected credentials. Fired before the error
    /// surfaces so audit/rate-limiting listeners observe failed attempts.
    SignInError { message: String },
    /// Diagnostic: a driver rejected a registration.
    SignUpError { message: String },
    RolePreSave { role: Role },
    RoleSave { role: Role },
    RolePreDelete { role: Role },
    RoleDelete { role: Role },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RegisterStorageDriver,
    UserCreate,
    UserPreSave,
    UserSave,
    UserPreDelete,
    UserDelete,
    UserStatusChange,
    UserAsJsonable,
    SignIn,
    SignOut,
    SignUp,
    SignInError,
    SignUpError,
    RolePreSave,
    RoleSave,
    RolePreDelete,
    RoleDelete,
}

impl AuthEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AuthEvent::RegisterStorageDriver { .. } => EventKind::RegisterStorageDriver,
            AuthEvent::UserCreate { .. } => EventKind::UserCreate,
            AuthEvent::UserPreSave { .. } => EventKind::UserPreSave,
            AuthEvent::UserSave { .. } => EventKind::UserSave,
            AuthEvent::UserPreDelete { .. } => EventKind::UserPreDelete,
            AuthEvent::UserDelete { .. } => EventKind::UserDelete,
            AuthEvent::UserStatusChange { .. } => EventKind::UserStatusChange,
            AuthEvent::UserAsJsonable { .. } => EventKind::UserAsJsonable,
            AuthEvent::SignIn { .. } => EventKind::SignIn,
            AuthEvent::SignOut { .. } => EventKind::SignOut,
            AuthEvent::SignUp { .. } => EventKind::SignUp,
            AuthEvent::SignInError { .. } => EventKind::SignInError,
            AuthEvent::SignUpError { .. } => EventKind::SignUpError,
            AuthEvent::RolePreSave { .. } => EventKind::RolePreSave,
            AuthEvent::RoleSave { .. } => EventKind::RoleSave,
            AuthEvent::RolePreDelete { .. } => EventKind::RolePreDelete,
            AuthEvent::RoleDelete { .. } => EventKind::RoleDelete,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            EventKind::RegisterStorageDriver => "register_storage_driver",
            EventKind::UserCreate => "user_create",
            EventKind::UserPreSave => "user_pre_save",
            EventKind::UserSave => "user_save",
            EventKind::UserPreDelete => "user_pre_delete",
            EventKind::UserDelete => "user_delete",
            EventKind::UserStatusChange => "user_status_change",
            EventKind::UserAsJsonable => "user_as_jsonable",
            EventKind::SignIn => "sign_in",
            EventKind::SignOut => "sign_out",
            EventKind::SignUp => "sign_up",
            EventKind::SignInError => "sign_in_error",
            EventKind::SignUpError => "sign_up_error",
            EventKind::RolePreSave => "role_pre_save",
            EventKind::RoleSave => "role_save",
            EventKind::RolePreDelete => "role_pre_delete",
            EventKind::RoleDelete => "role_delete",
        }
    }
}

pub type Listener = Arc<dyn Fn(&Authority, &AuthEvent) -> anyhow::Result<()> + Send + Sync>;

struct Entry {
    kind: EventKind,
    priority: i32,
    seq: usize,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    entries: RwLock<Vec<Entry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Lower priority runs first; registration order
    /// breaks ties.
    pub fn subscribe<F>(&self, kind: EventKind, priority: i32, listener: F)
    where
        F: Fn(&Authority, &AuthEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut entries = self.entries.write();
        let seq = entries.len();
        entries.push(Entry { kind, priority, seq, listener: Arc::new(listener) });
        entries.sort_by_key(|e| (e.priority, e.seq));
    }

    /// Dispatch synchronously. Matching listeners are cloned out of the
    /// lock first so they may re-enter the authority (and the bus).
    pub fn fire(&self, authority: &Authority, event: &AuthEvent) -> AuthResult<()> {
        let matching: Vec<Listener> = {
            let entries = self.entries.read();
            entries
                .iter()
                .filter(|e| e.kind == event.kind())
                .map(|e| e.listener.clone())
                .collect()
        };
        for listener in matching {
            listener(authority, event).map_err(|e| AuthError::listener(event.name(), &e))?;
        }
        Ok(())
    }
}
