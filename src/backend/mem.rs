//! In-memory storage driver. Entities live in two uid-keyed maps behind a
//! single lock; lookups and queries scan, which is fine at the scale this
//! driver is meant for (tests, demos, single-node embedding).

use crate::driver::{compare_field_values, Query, RoleLookup, SortOrder, Storage, UserLookup};
use crate::error::{AuthError, AuthResult};
use crate::model::{AuthEntity, Role, User};
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    roles: HashMap<String, Role>,
}

#[derive(Default)]
pub struct MemStorage {
    inner: RwLock<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_entities<T: AuthEntity>(items: &mut [T], sort: &[(String, SortOrder)]) {
    if sort.is_empty() {
        return;
    }
    items.sort_by(|a, b| {
        for (field, order) in sort {
            let av = a.get_field(field).unwrap_or(Value::Null);
            let bv = b.get_field(field).unwrap_or(Value::Null);
            let ord = match order {
                SortOrder::Asc => compare_field_values(&av, &bv),
                SortOrder::Desc => compare_field_values(&bv, &av),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// `limit == 0` means no limit.
fn paginate<T>(items: Vec<T>, limit: usize, skip: usize) -> Vec<T> {
    let iter = items.into_iter().skip(skip);
    if limit == 0 {
        iter.collect()
    } else {
        iter.take(limit).collect()
    }
}

impl Storage for MemStorage {
    fn name(&self) -> &str {
        "mem"
    }

    fn create_user(&self, login: &str, password_hash: Option<&str>) -> AuthResult<User> {
        let uid = format!("user:{}", Uuid::new_v4());
        Ok(User::new(uid, login, password_hash.map(str::to_string)))
    }

    fn get_user(&self, lookup: UserLookup<'_>) -> AuthResult<Option<User>> {
        let inner = self.inner.read();
        let found = match lookup {
            UserLookup::Uid(uid) => inner.users.get(uid),
            UserLookup::Login(login) => inner.users.values().find(|u| u.login() == login),
            UserLookup::Nickname(nick) => {
                inner.users.values().find(|u| !nick.is_empty() && u.nickname() == nick)
            }
        };
        Ok(found.cloned())
    }

    fn save_user(&self, user: &User) -> AuthResult<()> {
        let mut inner = self.inner.write();
        let clash = inner
            .users
            .values()
            .any(|u| u.login() == user.login() && u.uid() != user.uid());
        if clash {
            return Err(AuthError::user_exists(user.login()));
        }
        let mut stored = user.clone();
        stored.mark_saved();
        inner.users.insert(stored.uid().to_string(), stored);
        Ok(())
    }

    fn delete_user(&self, user: &User) -> AuthResult<()> {
        self.inner.write().users.remove(user.uid());
        Ok(())
    }

    fn find_users(
        &self,
        query: &Query,
        sort: &[(String, SortOrder)],
        limit: usize,
        skip: usize,
    ) -> AuthResult<Vec<User>> {
        let mut matched: Vec<User> = {
            let inner = self.inner.read();
            inner
                .users
                .values()
                .filter(|u| query.matches(*u))
                .cloned()
                .collect()
        };
        sort_entities(&mut matched, sort);
        Ok(paginate(matched, limit, skip))
    }

    fn count_users(&self, query: &Query) -> AuthResult<usize> {
        let inner = self.inner.read();
        Ok(inner
            .users
            .values()
            .filter(|u| query.matches(*u))
            .count())
    }

    fn create_role(&self, name: &str, description: &str) -> AuthResult<Role> {
        let uid = format!("role:{}", Uuid::new_v4());
        Ok(Role::new(uid, name, description))
    }

    fn get_role(&self, lookup: RoleLookup<'_>) -> AuthResult<Option<Role>> {
        let inner = self.inner.read();
        let found = match lookup {
            RoleLookup::Uid(uid) => inner.roles.get(uid),
            RoleLookup::Name(name) => inner.roles.values().find(|r| r.name() == name),
        };
        Ok(found.cloned())
    }

    fn save_role(&self, role: &Role) -> AuthResult<()> {
        let mut inner = self.inner.write();
        let clash = inner
            .roles
            .values()
            .any(|r| r.name() == role.name() && r.uid() != role.uid());
        if clash {
            return Err(AuthError::role_exists(role.name()));
        }
        let mut stored = role.clone();
        stored.mark_saved();
        inner.roles.insert(stored.uid().to_string(), stored);
        Ok(())
    }

    fn delete_role(&self, role: &Role) -> AuthResult<()> {
        self.inner.write().roles.remove(role.uid());
        Ok(())
    }

    fn find_roles(
        &self,
        query: &Query,
        sort: &[(String, SortOrder)],
        limit: usize,
        skip: usize,
    ) -> AuthResult<Vec<Role>> {
        let mut matched: Vec<Role> = {
            let inner = self.inner.read();
            inner
                .roles
                .values()
                .filter(|r| query.matches(*r))
                .cloned()
                .collect()
        };
        sort_entities(&mut matched, sort);
        Ok(paginate(matched, limit, skip))
    }

    fn count_roles(&self, query: &Query) -> AuthResult<usize> {
        let inner = self.inner.read();
        Ok(inner
            .roles
            .values()
            .filter(|r| query.matches(*r))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> MemStorage {
        let store = MemStorage::new();
        for (login, nick) in [("a@example.org", "a"), ("b@example.org", "b"), ("c@example.org", "c")] {
            let mut user = store.create_user(login, None).unwrap();
            user.set_nickname(nick);
            store.save_user(&user).unwrap();
        }
        store
    }

    #[test]
    fn lookup_by_login_nickname_and_uid() {
        let store = seeded();
        let by_login = store.get_user(UserLookup::Login("b@example.org")).unwrap().unwrap();
        assert_eq!(by_login.nickname(), "b");
        let by_nick = store.get_user(UserLookup::Nickname("b")).unwrap().unwrap();
        assert_eq!(by_nick, by_login);
        let by_uid = store.get_user(UserLookup::Uid(by_login.uid())).unwrap().unwrap();
        assert_eq!(by_uid, by_login);
        assert!(store.get_user(UserLookup::Login("nope")).unwrap().is_none());
        assert!(store.get_user(UserLookup::Nickname("")).unwrap().is_none());
    }

    #[test]
    fn save_rejects_duplicate_login_under_a_different_uid() {
        let store = seeded();
        let dup = store.create_user("a@example.org", None).unwrap();
        let err = store.save_user(&dup).unwrap_err();
        assert!(matches!(err, AuthError::UserExists { .. }));
    }

    #[test]
    fn resave_same_user_is_not_a_clash() {
        let store = seeded();
        let mut user = store.get_user(UserLookup::Login("a@example.org")).unwrap().unwrap();
        user.set_email("a@mail.test");
        store.save_user(&user).unwrap();
        let reloaded = store.get_user(UserLookup::Login("a@example.org")).unwrap().unwrap();
        assert_eq!(reloaded.email(), "a@mail.test");
    }

    #[test]
    fn find_sorts_and_paginates() {
        let store = seeded();
        let sort = vec![("login".to_string(), SortOrder::Desc)];
        let page = store.find_users(&Query::All, &sort, 2, 1).unwrap();
        let logins: Vec<&str> = page.iter().map(|u| u.login()).collect();
        assert_eq!(logins, vec!["b@example.org", "a@example.org"]);
        // limit 0 means unlimited
        assert_eq!(store.find_users(&Query::All, &[], 0, 0).unwrap().len(), 3);
        assert_eq!(store.count_users(&Query::All).unwrap(), 3);
    }

    #[test]
    fn find_filters_through_the_query() {
        let store = seeded();
        let mut user = store.get_user(UserLookup::Login("c@example.org")).unwrap().unwrap();
        user.add_role("admin");
        store.save_user(&user).unwrap();
        let q = Query::Contains("roles".into(), json!("admin"));
        let admins = store.find_users(&q, &[], 0, 0).unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].login(), "c@example.org");
    }

    #[test]
    fn role_crud_and_name_clash() {
        let store = MemStorage::new();
        let role = store.create_role("editor", "Editors").unwrap();
        assert!(role.is_new());
        store.save_role(&role).unwrap();
        let fetched = store.get_role(RoleLookup::Name("editor")).unwrap().unwrap();
        assert_eq!(fetched.description(), "Editors");
        let clash = store.create_role("editor", "Other").unwrap();
        assert!(matches!(store.save_role(&clash), Err(AuthError::RoleAlreadyExists { .. })));
        store.delete_role(&fetched).unwrap();
        assert!(store.get_role(RoleLookup::Name("editor")).unwrap().is_none());
    }
}
