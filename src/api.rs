//! The identity authority: orchestrates drivers, the token store, the
//! context stack and the event bus, and enforces login/role invariants
//! uniformly on top of whatever backends are registered.
//!
//! Initialization order: storage driver first, then authentication
//! drivers. Registering the storage driver fires the bootstrap handler
//! that materializes the built-in roles before any other listener runs.

use crate::config::Config;
use crate::context::ContextStack;
use crate::driver::{Authentication, Query, RoleLookup, SortOrder, Storage, UserLookup};
use crate::error::{AuthError, AuthResult};
use crate::events::{AuthEvent, EventBus, EventKind};
use crate::model::{AuthEntity, Role, User, UserStatus, ANONYMOUS_USER_LOGIN, SYSTEM_USER_LOGIN};
use crate::security::{hash_password, random_token};
use crate::token::{AccessToken, AccessTokenStore};
use crate::validation::{validate_login, validate_nickname};
use chrono::Utc;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread::ThreadId;
use tracing::{info, warn};

pub struct Authority {
    config: Config,
    storage: OnceCell<Arc<dyn Storage>>,
    auth_drivers: RwLock<Vec<(String, Arc<dyn Authentication>)>>,
    tokens: AccessTokenStore,
    context: ContextStack,
    events: EventBus,
    anonymous: OnceCell<User>,
    system: OnceCell<User>,
}

impl Authority {
    pub fn new(config: Config) -> Self {
        let authority = Self {
            tokens: AccessTokenStore::new(config.access_token_ttl),
            config,
            storage: OnceCell::new(),
            auth_drivers: RwLock::new(Vec::new()),
            context: ContextStack::new(),
            events: EventBus::new(),
            anonymous: OnceCell::new(),
            system: OnceCell::new(),
        };
        // built-in roles must exist before any other listener observes the
        // storage driver
        authority.events.subscribe(
            EventKind::RegisterStorageDriver,
            -100,
            crate::bootstrap::on_register_storage_driver,
        );
        authority
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_sign_up_enabled(&self) -> bool {
        self.config.signup_enabled
    }

    pub fn is_sign_up_confirmation_required(&self) -> bool {
        self.config.signup_confirmation_required
    }

    pub fn is_sign_up_admins_notification_enabled(&self) -> bool {
        self.config.signup_admins_notification_enabled
    }

    pub fn is_user_status_change_notification_enabled(&self) -> bool {
        self.config.user_status_change_notification_enabled
    }

    pub fn subscribe<F>(&self, kind: EventKind, priority: i32, listener: F)
    where
        F: Fn(&Authority, &AuthEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe(kind, priority, listener);
    }

    fn fire(&self, event: AuthEvent) -> AuthResult<()> {
        self.events.fire(self, &event)
    }

    // --- driver registry -------------------------------------------------

    /// Register the storage driver. Exactly one per process lifetime.
    pub fn register_storage_driver(&self, driver: Arc<dyn Storage>) -> AuthResult<()> {
        let name = driver.name().to_string();
        self.storage
            .set(driver)
            .map_err(|_| AuthError::driver_registered("storage driver is already registered"))?;
        info!(driver = %name, "storage driver registered");
        self.fire(AuthEvent::RegisterStorageDriver { driver_name: name })
    }

    pub fn storage(&self) -> AuthResult<&Arc<dyn Storage>> {
        self.storage
            .get()
            .ok_or_else(|| AuthError::no_driver("no storage driver registered"))
    }

    /// Register an authentication driver under its name. Names are unique.
    pub fn register_auth_driver(&self, driver: Arc<dyn Authentication>) -> AuthResult<()> {
        let name = driver.name().to_string();
        let mut drivers = self.auth_drivers.write();
        if drivers.iter().any(|(n, _)| n == &name) {
            return Err(AuthError::driver_registered(format!(
                "authentication driver '{}' is already registered",
                name
            )));
        }
        drivers.push((name.clone(), driver));
        info!(driver = %name, "authentication driver registered");
        Ok(())
    }

    /// Resolve an authentication driver. With no name, the configured
    /// default is used when present and registered, otherwise the most
    /// recently registered driver.
    pub fn auth_driver(&self, name: Option<&str>) -> AuthResult<Arc<dyn Authentication>> {
        let drivers = self.auth_drivers.read();
        if drivers.is_empty() {
            return Err(AuthError::no_driver("no authentication driver registered"));
        }
        let resolved: String = match name {
            Some(n) => n.to_string(),
            None => {
                let configured = self
                    .config
                    .auth_driver
                    .as_deref()
                    .filter(|n| drivers.iter().any(|(dn, _)| dn == n));
                match configured {
                    Some(n) => n.to_string(),
                    None => drivers.last().map(|(n, _)| n.clone()).unwrap_or_default(),
                }
            }
        };
        drivers
            .iter()
            .find(|(n, _)| n == &resolved)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| {
                AuthError::driver_not_registered(format!(
                    "authentication driver '{}' is not registered",
                    resolved
                ))
            })
    }

    pub fn auth_driver_names(&self) -> Vec<String> {
        self.auth_drivers.read().iter().map(|(n, _)| n.clone()).collect()
    }

    // --- sentinel identities ---------------------------------------------

    pub fn anonymous_user(&self) -> AuthResult<User> {
        self.anonymous
            .get_or_try_init(|| self.create_user(ANONYMOUS_USER_LOGIN, None))
            .cloned()
    }

    pub fn system_user(&self) -> AuthResult<User> {
        self.system
            .get_or_try_init(|| self.create_user(SYSTEM_USER_LOGIN, None))
            .cloned()
    }

    // --- users -----------------------------------------------------------

    /// Create a user. Non-sentinel logins are checked for uniqueness and
    /// format, receive the configured default status and roles, and are
    /// persisted. Sentinel logins bypass every check, receive active
    /// status and exactly the anonymous role, and are never persisted.
    pub fn create_user(&self, login: &str, password: Option<&str>) -> AuthResult<User> {
        if login.is_empty() {
            return Err(AuthError::user_create("login must not be empty"));
        }

        let sentinel = login == ANONYMOUS_USER_LOGIN || login == SYSTEM_USER_LOGIN;
        if !sentinel {
            if self.storage()?.get_user(UserLookup::Login(login))?.is_some() {
                return Err(AuthError::user_exists(login));
            }
            validate_login(login)?;
        }

        let password_hash = match password {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };
        let mut user = self
            .storage()?
            .create_user(login, password_hash.as_deref())?;

        if sentinel {
            user.set_status_raw(UserStatus::Active);
            user.set_roles(std::iter::once("anonymous".to_string()).collect());
            return Ok(user);
        }

        user.set_status_raw(self.config.new_user_status);
        if self.config.signup_confirmation_required {
            user.set_confirmation_hash(Some(random_token(48)?));
        } else {
            user.set_confirmed(true);
        }
        for role_name in &self.config.new_user_roles {
            self.get_role(role_name)?;
            user.add_role(role_name.clone());
        }
        self.save_user(&mut user)?;
        info!(login, "user created");
        self.fire(AuthEvent::UserCreate { user: user.clone() })?;

        Ok(user)
    }

    pub fn get_user(&self, login: &str) -> AuthResult<User> {
        let user = self
            .storage()?
            .get_user(UserLookup::Login(login))?
            .ok_or(AuthError::UserNotFound)?;
        self.after_get_user(user)
    }

    pub fn get_user_by_nickname(&self, nickname: &str) -> AuthResult<User> {
        let user = self
            .storage()?
            .get_user(UserLookup::Nickname(nickname))?
            .ok_or(AuthError::UserNotFound)?;
        self.after_get_user(user)
    }

    pub fn get_user_by_uid(&self, uid: &str) -> AuthResult<User> {
        let user = self
            .storage()?
            .get_user(UserLookup::Uid(uid))?
            .ok_or(AuthError::UserNotFound)?;
        self.after_get_user(user)
    }

    /// Resolve an access token to its owning user.
    pub fn get_user_by_access_token(&self, token: &str) -> AuthResult<User> {
        let info = self.tokens.get_info(token)?;
        self.get_user_by_uid(&info.user_uid)
    }

    /// A signed-in user whose status has drifted away from active is
    /// implicitly signed out as a side effect of the read.
    fn after_get_user(&self, user: User) -> AuthResult<User> {
        if user.status() != UserStatus::Active {
            if let Some(current) = self.context.current() {
                if current == user {
                    self.sign_out(&user)?;
                }
            }
        }
        Ok(user)
    }

    pub fn save_user(&self, user: &mut User) -> AuthResult<()> {
        if user.is_sentinel() {
            return Err(AuthError::user_modify_forbidden(
                "sentinel users cannot be saved",
            ));
        }
        self.fire(AuthEvent::UserPreSave { user: user.clone() })?;
        self.storage()?.save_user(user)?;
        user.mark_saved();
        self.fire(AuthEvent::UserSave { user: user.clone() })
    }

    /// Delete a user, first tearing down every relationship that references
    /// it and revoking its access tokens.
    pub fn delete_user(&self, user: &mut User) -> AuthResult<()> {
        if user.is_sentinel() {
            return Err(AuthError::user_delete_forbidden(
                "sentinel users cannot be deleted",
            ));
        }

        let uid = user.uid().to_string();
        for followed_uid in user.follows().clone() {
            if let Some(mut other) = self.storage()?.get_user(UserLookup::Uid(&followed_uid))? {
                other.followers_mut().remove(&uid);
                self.save_user(&mut other)?;
            }
        }
        user.follows_mut().clear();
        for follower_uid in user.followers().clone() {
            if let Some(mut other) = self.storage()?.get_user(UserLookup::Uid(&follower_uid))? {
                other.follows_mut().remove(&uid);
                self.save_user(&mut other)?;
            }
        }
        user.followers_mut().clear();
        user.blocked_mut().clear();
        let blockers = self.find_users(
            &Query::Contains("blocked_users".into(), json!(uid)),
            &[],
            0,
            0,
        )?;
        for mut blocker in blockers {
            blocker.blocked_mut().remove(&uid);
            self.save_user(&mut blocker)?;
        }

        self.tokens.revoke_all(&uid);

        self.fire(AuthEvent::UserPreDelete { user: user.clone() })?;
        self.storage()?.delete_user(user)?;
        info!(login = user.login(), "user deleted");
        self.fire(AuthEvent::UserDelete { user: user.clone() })
    }

    /// Apply a status change. On an already-persisted user the status-change
    /// event fires before the value is applied, so collaborators observe the
    /// incoming value against the old entity state.
    pub fn set_user_status(&self, user: &mut User, status: UserStatus) -> AuthResult<()> {
        if user.status() == status {
            return Ok(());
        }
        if !user.is_new() {
            self.fire(AuthEvent::UserStatusChange { user: user.clone(), status })?;
        }
        user.set_status_raw(status);
        Ok(())
    }

    pub fn set_password(&self, user: &mut User, password: &str) -> AuthResult<()> {
        user.set_password_hash(hash_password(password)?);
        Ok(())
    }

    /// Set a nickname after checking its format and uniqueness.
    pub fn set_user_nickname(&self, user: &mut User, nickname: &str) -> AuthResult<()> {
        validate_nickname(nickname)?;
        match self.storage()?.get_user(UserLookup::Nickname(nickname))? {
            Some(other) if other != *user => Err(AuthError::user_create(format!(
                "nickname '{}' is already taken",
                nickname
            ))),
            _ => {
                user.set_nickname(nickname);
                Ok(())
            }
        }
    }

    /// Attach a role by name; the role must exist.
    pub fn add_user_role(&self, user: &mut User, role_name: &str) -> AuthResult<()> {
        self.get_role(role_name)?;
        user.add_role(role_name.to_string());
        Ok(())
    }

    pub fn remove_user_role(&self, user: &mut User, role_name: &str) {
        user.remove_role(role_name);
    }

    // --- relationships ---------------------------------------------------

    pub fn add_follows(&self, user: &mut User, target: &mut User) -> AuthResult<()> {
        user.check_relation(target)?;
        user.follows_mut().insert(target.uid().to_string());
        target.followers_mut().insert(user.uid().to_string());
        self.save_user(user)?;
        self.save_user(target)
    }

    pub fn remove_follows(&self, user: &mut User, target: &mut User) -> AuthResult<()> {
        user.follows_mut().remove(target.uid());
        target.followers_mut().remove(user.uid());
        self.save_user(user)?;
        self.save_user(target)
    }

    pub fn block_user(&self, user: &mut User, target: &User) -> AuthResult<()> {
        user.check_relation(target)?;
        user.blocked_mut().insert(target.uid().to_string());
        self.save_user(user)
    }

    pub fn unblock_user(&self, user: &mut User, target: &User) -> AuthResult<()> {
        user.blocked_mut().remove(target.uid());
        self.save_user(user)
    }

    // --- roles -----------------------------------------------------------

    /// Create and persist a role. Names are unique.
    pub fn create_role(&self, name: &str, description: &str) -> AuthResult<Role> {
        match self.get_role(name) {
            Ok(_) => Err(AuthError::role_exists(name)),
            Err(AuthError::RoleNotFound { .. }) => {
                let mut role = self.storage()?.create_role(name, description)?;
                self.save_role(&mut role)?;
                Ok(role)
            }
            Err(e) => Err(e),
        }
    }

    pub fn get_role(&self, name: &str) -> AuthResult<Role> {
        self.storage()?
            .get_role(RoleLookup::Name(name))?
            .ok_or_else(|| AuthError::role_not_found(name))
    }

    pub fn get_role_by_uid(&self, uid: &str) -> AuthResult<Role> {
        self.storage()?
            .get_role(RoleLookup::Uid(uid))?
            .ok_or_else(|| AuthError::role_not_found(uid))
    }

    pub fn save_role(&self, role: &mut Role) -> AuthResult<()> {
        self.fire(AuthEvent::RolePreSave { role: role.clone() })?;
        self.storage()?.save_role(role)?;
        role.mark_saved();
        self.fire(AuthEvent::RoleSave { role: role.clone() })
    }

    /// Delete a role. Guarded: fails while any user still references it.
    pub fn delete_role(&self, role: &Role) -> AuthResult<()> {
        let in_use = self.count_users(&Query::Contains("roles".into(), json!(role.name())))?;
        if in_use > 0 {
            return Err(AuthError::role_delete_forbidden(format!(
                "role '{}' is referenced by {} user(s)",
                role.name(),
                in_use
            )));
        }
        self.fire(AuthEvent::RolePreDelete { role: role.clone() })?;
        self.storage()?.delete_role(role)?;
        self.fire(AuthEvent::RoleDelete { role: role.clone() })
    }

    // --- queries ----------------------------------------------------------

    pub fn find_users(
        &self,
        query: &Query,
        sort: &[(String, SortOrder)],
        limit: usize,
        skip: usize,
    ) -> AuthResult<Vec<User>> {
        self.storage()?.find_users(query, sort, limit, skip)
    }

    pub fn find_user(&self, query: &Query) -> AuthResult<Option<User>> {
        Ok(self.find_users(query, &[], 1, 0)?.into_iter().next())
    }

    pub fn count_users(&self, query: &Query) -> AuthResult<usize> {
        self.storage()?.count_users(query)
    }

    pub fn find_roles(
        &self,
        query: &Query,
        sort: &[(String, SortOrder)],
        limit: usize,
        skip: usize,
    ) -> AuthResult<Vec<Role>> {
        self.storage()?.find_roles(query, sort, limit, skip)
    }

    pub fn find_role(&self, query: &Query) -> AuthResult<Option<Role>> {
        Ok(self.find_roles(query, &[], 1, 0)?.into_iter().next())
    }

    pub fn count_roles(&self, query: &Query) -> AuthResult<usize> {
        self.storage()?.count_roles(query)
    }

    pub fn get_admin_users(&self, active_only: bool) -> AuthResult<Vec<User>> {
        let mut parts = vec![Query::Contains("roles".into(), json!("admin"))];
        if active_only {
            parts.push(Query::Eq("status".into(), json!("active")));
        }
        self.find_users(
            &Query::And(parts),
            &[("created".to_string(), SortOrder::Asc)],
            0,
            0,
        )
    }

    pub fn get_admin_user(&self, active_only: bool) -> AuthResult<User> {
        self.get_admin_users(active_only)?
            .into_iter()
            .next()
            .ok_or(AuthError::UserNotFound)
    }

    // --- permissions and projections --------------------------------------

    /// True if the user holds any of the given permissions through its
    /// roles. The system sentinel and admins satisfy every check.
    pub fn user_has_permission(&self, user: &User, permissions: &[&str]) -> AuthResult<bool> {
        if user.is_system() || user.has_role(&["admin", "dev"]) {
            return Ok(true);
        }
        for role_name in user.role_names() {
            let role = match self.get_role(&role_name) {
                Ok(r) => r,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };
            if permissions.iter().any(|p| role.has_permission(p)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Privilege-filtered JSON projection of a user, as seen by the current
    /// identity. Public fields require a public profile, the subject, or an
    /// admin viewer; private fields require the subject or an admin.
    pub fn user_as_jsonable(&self, user: &User) -> AuthResult<Value> {
        let viewer = self.current_user()?;
        let viewer_is_admin = viewer.is_admin();
        let viewer_is_subject = viewer == *user;

        let mut out = json!({ "uid": user.uid() });
        let obj = out.as_object_mut().expect("object literal");

        if user.profile_is_public() || viewer_is_subject || viewer_is_admin {
            obj.insert("nickname".into(), json!(user.nickname()));
            obj.insert("first_name".into(), json!(user.first_name()));
            obj.insert("last_name".into(), json!(user.last_name()));
            obj.insert("full_name".into(), json!(user.full_name()));
            obj.insert("timezone".into(), json!(user.timezone()));
            obj.insert("birth_date".into(), json!(user.birth_date()));
            obj.insert("gender".into(), json!(user.gender()));
            obj.insert("phone".into(), json!(user.phone()));
            obj.insert("urls".into(), json!(user.urls()));
            obj.insert("follows_count".into(), json!(user.follows().len()));
            obj.insert("followers_count".into(), json!(user.followers().len()));
            obj.insert("is_follows".into(), json!(user.is_follows(viewer.uid())));
            obj.insert("is_followed".into(), json!(user.is_followed_by(viewer.uid())));
        }

        if viewer_is_subject || viewer_is_admin {
            obj.insert("created".into(), json!(user.created()));
            obj.insert("login".into(), json!(user.login()));
            obj.insert("email".into(), json!(user.email()));
            obj.insert("last_sign_in".into(), json!(user.last_sign_in()));
            obj.insert("last_activity".into(), json!(user.last_activity()));
            obj.insert("sign_in_count".into(), json!(user.sign_in_count()));
            obj.insert("status".into(), json!(user.status().as_str()));
            obj.insert("profile_is_public".into(), json!(user.profile_is_public()));
        }

        self.fire(AuthEvent::UserAsJsonable { user: user.clone() })?;
        Ok(out)
    }

    // --- sessions ----------------------------------------------------------

    /// Authenticate through a driver and open a session: pushes the user
    /// onto the context stack, updates sign-in statistics and persists them.
    pub fn sign_in(&self, driver_name: Option<&str>, data: &Value) -> AuthResult<User> {
        let driver = self.auth_driver(driver_name)?;
        let mut user = match driver.sign_in(self, data) {
            Ok(user) => user,
            Err(e) => {
                if matches!(e, AuthError::Authentication { .. }) {
                    self.fire(AuthEvent::SignInError { message: e.to_string() })?;
                }
                return Err(e);
            }
        };

        if self.config.signup_confirmation_required && !user.is_confirmed() {
            return Err(AuthError::UserNotConfirmed);
        }
        if user.status() != UserStatus::Active {
            return Err(AuthError::UserNotActive);
        }

        self.switch_user(user.clone())?;
        user.bump_sign_in(Utc::now());
        user.touch_activity();
        self.save_user(&mut user)?;
        info!(login = user.login(), "sign-in");
        self.fire(AuthEvent::SignIn { user: user.clone() })?;

        Ok(user)
    }

    /// Close a user's session. A no-op for the anonymous sentinel. The
    /// operation runs under the system identity, asks every registered
    /// driver to clean up (best-effort), and always leaves the anonymous
    /// identity current, even when a driver or listener fails.
    pub fn sign_out(&self, user: &User) -> AuthResult<()> {
        if user.is_anonymous() {
            return Ok(());
        }

        self.switch_user_to_system()?;
        let result = (|| {
            let drivers: Vec<Arc<dyn Authentication>> = self
                .auth_drivers
                .read()
                .iter()
                .map(|(_, d)| d.clone())
                .collect();
            for driver in drivers {
                if let Err(e) = driver.sign_out(self, user) {
                    warn!(driver = driver.name(), error = %e, "sign-out driver cleanup failed");
                }
            }
            info!(login = user.login(), "sign-out");
            self.fire(AuthEvent::SignOut { user: user.clone() })
        })();
        let cleanup = self.switch_user_to_anonymous().map(|_| ());
        result.and(cleanup)
    }

    /// Register a new user through a driver. Gated by configuration.
    pub fn sign_up(&self, driver_name: Option<&str>, data: &Value) -> AuthResult<User> {
        if !self.config.signup_enabled {
            return Err(AuthError::SignupDisabled);
        }
        let driver = self.auth_driver(driver_name)?;
        let user = match driver.sign_up(self, data) {
            Ok(user) => user,
            Err(e) => {
                if matches!(e, AuthError::SignUp { .. }) {
                    self.fire(AuthEvent::SignUpError { message: e.to_string() })?;
                }
                return Err(e);
            }
        };
        self.fire(AuthEvent::SignUp { user: user.clone() })?;
        Ok(user)
    }

    /// Complete the sign-up confirmation workflow: marks the user
    /// confirmed, clears the confirmation token and promotes a waiting
    /// account to active.
    pub fn confirm_user(&self, confirmation_hash: &str) -> AuthResult<User> {
        let mut user = self
            .find_user(&Query::Eq("confirmation_hash".into(), json!(confirmation_hash)))?
            .ok_or(AuthError::UserNotFound)?;
        user.set_confirmed(true);
        user.set_confirmation_hash(None);
        if user.status() == UserStatus::Waiting {
            self.set_user_status(&mut user, UserStatus::Active)?;
        }
        self.save_user(&mut user)?;
        Ok(user)
    }

    // --- access tokens -----------------------------------------------------

    pub fn generate_access_token(&self, user: &User) -> AuthResult<String> {
        self.tokens.generate(user)
    }

    pub fn get_access_token_info(&self, token: &str) -> AuthResult<AccessToken> {
        self.tokens.get_info(token)
    }

    pub fn prolong_access_token(&self, token: &str) -> AuthResult<()> {
        self.tokens.prolong(token).map(|_| ())
    }

    pub fn revoke_access_token(&self, token: &str) -> AuthResult<()> {
        self.tokens.revoke(token)
    }

    /// Revoke every live token of a user; returns how many were revoked.
    pub fn revoke_all_access_tokens(&self, user: &User) -> usize {
        self.tokens.revoke_all(user.uid())
    }

    /// Live tokens of a user, newest state of the reverse index.
    pub fn user_access_tokens(&self, user: &User) -> Vec<String> {
        self.tokens.tokens_for(user.uid())
    }

    // --- execution context ---------------------------------------------------

    /// Identity acting on the calling thread, lazily seeded to anonymous.
    pub fn current_user(&self) -> AuthResult<User> {
        match self.context.current() {
            Some(user) => Ok(user),
            None => self.switch_user_to_anonymous(),
        }
    }

    pub fn switch_user(&self, user: User) -> AuthResult<User> {
        let anon = self.anonymous_user()?;
        Ok(self.context.switch(user, &anon))
    }

    pub fn restore_user(&self) -> AuthResult<User> {
        let anon = self.anonymous_user()?;
        Ok(self.context.restore(&anon))
    }

    pub fn switch_user_to_system(&self) -> AuthResult<User> {
        let system = self.system_user()?;
        self.switch_user(system)
    }

    pub fn switch_user_to_anonymous(&self) -> AuthResult<User> {
        let anon = self.anonymous_user()?;
        self.switch_user(anon)
    }

    /// Link the calling thread's context to a parent thread, inheriting its
    /// current identity until this thread switches on its own.
    pub fn adopt_context(&self, parent: ThreadId) {
        self.context.adopt(parent);
    }

    /// Drop the calling thread's context slot and parent link.
    pub fn release_context(&self) {
        self.context.release();
    }
}
