//! Client-side state for the todo app.
//!
//! # Overview
//! [`TodoStore`] owns the logged-in user, the todo list and the transient UI
//! flags (loading, pending ids, error banner). Views subscribe to
//! [`StoreState`] snapshots and route every change through the store's
//! operations, which talk to the server through [`TodoApi`].
//!
//! # Design
//! - One `watch` channel holds the whole state; each transition is atomic.
//! - Mutations are pessimistic and tagged with per-id generations so a late
//!   response cannot overwrite a newer one.
//! - Network failures never escape: they become an [`ErrorKind`] banner that
//!   clears itself after [`Config::error_display`].
//! - [`HttpTodoApi`] executes `todo-core` requests with reqwest.

pub mod api;
pub mod config;
pub mod error;
pub mod pending;
pub mod state;
pub mod store;

pub use api::{HttpTodoApi, TodoApi};
pub use config::{Config, ConfigError};
pub use error::{ErrorKind, StoreError};
pub use pending::PendingIds;
pub use state::StoreState;
pub use store::{Settled, TodoStore};
pub use todo_core::{ApiError, NewTodo, Todo, TodoId, User, UserId};
