//! Per-thread identity context: a current/previous slot pair used for
//! privilege impersonation.
//!
//! This is deliberately a depth-one stack, not a call stack: `switch`
//! overwrites `previous` with only the immediately-prior identity, so
//! `switch(A); switch(B); restore()` lands on A, and a second `restore`
//! lands on A again. Callers pair every `switch` with exactly one
//! `restore` before any sibling `switch`.
//!
//! Threads are isolated from each other, with one exception: a thread may
//! `adopt` a parent, and while its own slot is empty its lookups fall back
//! to the parent chain. This lets spawned workers inherit the identity of
//! the thread that spawned them until they switch on their own.

use crate::model::User;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::thread::{self, ThreadId};

#[derive(Default)]
struct Slot {
    current: Option<User>,
    previous: Option<User>,
}

#[derive(Default)]
pub struct ContextStack {
    slots: RwLock<HashMap<ThreadId, Slot>>,
    parents: RwLock<HashMap<ThreadId, ThreadId>>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current identity of the calling thread, if any, with parent-chain
    /// fallback. Does not seed the slot; the authority layers the lazy
    /// anonymous seeding on top.
    pub fn current(&self) -> Option<User> {
        self.lookup(thread::current().id(), |slot| slot.current.clone())
    }

    /// Push: remember the prior current identity (or the fallback when the
    /// slot is empty) as previous, then make `user` current.
    pub fn switch(&self, user: User, fallback: &User) -> User {
        let tid = thread::current().id();
        let prior = self
            .lookup(tid, |slot| slot.current.clone())
            .unwrap_or_else(|| fallback.clone());
        let mut slots = self.slots.write();
        let slot = slots.entry(tid).or_default();
        slot.previous = Some(prior);
        slot.current = Some(user.clone());
        user
    }

    /// Pop: make the previous identity current again, defaulting to the
    /// fallback when no previous is recorded anywhere up the parent chain.
    pub fn restore(&self, fallback: &User) -> User {
        let tid = thread::current().id();
        let prev = self
            .lookup(tid, |slot| slot.previous.clone())
            .unwrap_or_else(|| fallback.clone());
        let mut slots = self.slots.write();
        slots.entry(tid).or_default().current = Some(prev.clone());
        prev
    }

    /// Link the calling thread to a parent whose context it inherits while
    /// its own slot is empty.
    pub fn adopt(&self, parent: ThreadId) {
        let tid = thread::current().id();
        if tid != parent {
            self.parents.write().insert(tid, parent);
        }
    }

    /// Drop the calling thread's slot and parent link.
    pub fn release(&self) {
        let tid = thread::current().id();
        self.slots.write().remove(&tid);
        self.parents.write().remove(&tid);
    }

    fn lookup<T>(&self, tid: ThreadId, pick: impl Fn(&Slot) -> Option<T>) -> Option<T> {
        let slots = self.slots.read();
        let parents = self.parents.read();
        let mut cursor = tid;
        let mut hops = 0usize;
        loop {
            if let Some(found) = slots.get(&cursor).and_then(&pick) {
                return Some(found);
            }
            match parents.get(&cursor) {
                Some(parent) => cursor = *parent,
                None => return None,
            }
            // parent links form a tree; the hop cap guards against a
            // malformed cyclic adoption
            hops += 1;
            if hops > 64 {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: &str) -> User {
        User::new(uid, format!("{}@example.org", uid), None)
    }

    #[test]
    fn switch_restore_roundtrip() {
        let stack = ContextStack::new();
        let anon = user("user:anon");
        assert!(stack.current().is_none());
        stack.switch(user("user:a"), &anon);
        assert_eq!(stack.current().unwrap(), user("user:a"));
        let restored = stack.restore(&anon);
        assert_eq!(restored, anon);
    }

    #[test]
    fn depth_one_semantics() {
        let stack = ContextStack::new();
        let anon = user("user:anon");
        stack.switch(user("user:a"), &anon);
        stack.switch(user("user:b"), &anon);
        assert_eq!(stack.restore(&anon), user("user:a"));
        // previous still holds A: a second restore lands on A again
        assert_eq!(stack.restore(&anon), user("user:a"));
    }

    #[test]
    fn threads_are_isolated() {
        let stack = std::sync::Arc::new(ContextStack::new());
        let anon = user("user:anon");
        stack.switch(user("user:a"), &anon);
        let stack2 = stack.clone();
        let handle = std::thread::spawn(move || stack2.current());
        assert!(handle.join().unwrap().is_none());
        assert_eq!(stack.current().unwrap(), user("user:a"));
    }

    #[test]
    fn child_inherits_parent_until_it_switches() {
        let stack = std::sync::Arc::new(ContextStack::new());
        let anon = user("user:anon");
        stack.switch(user("user:a"), &anon);
        let parent = std::thread::current().id();
        let stack2 = stack.clone();
        let anon2 = anon.clone();
        let handle = std::thread::spawn(move || {
            stack2.adopt(parent);
            let inherited = stack2.current();
            stack2.switch(user("user:b"), &anon2);
            let own = stack2.current();
            stack2.release();
            (inherited, own)
        });
        let (inherited, own) = handle.join().unwrap();
        assert_eq!(inherited.unwrap(), user("user:a"));
        assert_eq!(own.unwrap(), user("user:b"));
        // parent untouched by the child's switch
        assert_eq!(stack.current().unwrap(), user("user:a"));
    }
}
