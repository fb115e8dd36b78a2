//! Error types for the todo store.
//!
//! Two different things live here. [`ErrorKind`] is the user-facing banner
//! classification the store raises when a network call fails; it is state,
//! not a Rust error. [`StoreError`] is returned when a caller breaks an
//! operation's precondition, before any request is issued.

use thiserror::Error;
use todo_core::TodoId;

/// Classification of the error banner currently shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No banner.
    #[default]
    None,
    /// The initial todo fetch failed.
    Loading,
    /// A delete request failed.
    Delete,
    /// An update request failed.
    Update,
    /// A create request failed.
    Add,
    /// The user tried to add a todo with a blank title.
    EmptyTitle,
}

impl ErrorKind {
    /// Text shown in the banner. Empty for [`ErrorKind::None`].
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::None => "",
            ErrorKind::Loading => "Unable to load todos",
            ErrorKind::Delete => "Unable to delete a todo",
            ErrorKind::Update => "Unable to update a todo",
            ErrorKind::Add => "Unable to add a todo",
            ErrorKind::EmptyTitle => "Title should not be empty",
        }
    }

    pub fn is_none(self) -> bool {
        self == ErrorKind::None
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Precondition violations reported by [`crate::TodoStore`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The todo is not part of the current collection.
    #[error("todo {0} is not in the collection")]
    UnknownTodo(TodoId),

    /// The operation needs a logged-in user.
    #[error("no user is logged in")]
    NotLoggedIn,
}
