//! The snapshot the store publishes to its observers.

use std::collections::HashSet;

use todo_core::{Todo, TodoId, User};

use crate::error::ErrorKind;
use crate::pending::{Generations, PendingIds};

/// Everything a view needs to render, as one immutable value.
///
/// The `completed` and `active` views are computed from `todos` on every
/// call and are never stored. Equality compares the public fields only.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// The logged-in user, if any.
    pub session: Option<User>,
    /// Todos in server order. Ids are unique.
    pub todos: Vec<Todo>,
    /// Set while a mutation request is outstanding.
    pub loading: bool,
    /// Ids with an unsettled mutation.
    pub pending: PendingIds,
    /// Banner currently shown.
    pub error: ErrorKind,
    /// Bumped whenever the primary input should take focus.
    pub focus_requests: u64,
    pub(crate) generations: Generations,
    pub(crate) error_epoch: u64,
}

impl StoreState {
    pub fn completed(&self) -> Vec<&Todo> {
        self.todos.iter().filter(|todo| todo.completed).collect()
    }

    pub fn active(&self) -> Vec<&Todo> {
        self.todos.iter().filter(|todo| !todo.completed).collect()
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_pending(&self, id: TodoId) -> bool {
        self.pending.contains(id)
    }

    pub fn user_id(&self) -> Option<todo_core::UserId> {
        self.session.as_ref().map(|user| user.id)
    }
}

impl PartialEq for StoreState {
    fn eq(&self, other: &Self) -> bool {
        self.session == other.session
            && self.todos == other.todos
            && self.loading == other.loading
            && self.pending == other.pending
            && self.error == other.error
            && self.focus_requests == other.focus_requests
    }
}

impl Eq for StoreState {}

/// Keep the first todo for each id. Returns how many were dropped.
pub(crate) fn dedupe_by_id(todos: &mut Vec<Todo>) -> usize {
    let before = todos.len();
    let mut seen = HashSet::with_capacity(before);
    todos.retain(|todo| seen.insert(todo.id));
    before - todos.len()
}
