//! Wire layer for the todo API: DTOs, request builders, response parsers.
//!
//! Nothing in this crate opens a socket. [`TodoClient`] turns an operation
//! into an [`HttpRequest`] and turns the matching [`HttpResponse`] back into
//! typed data; whoever owns the transport (reqwest in `todo-store`, ureq in
//! the integration tests) moves the bytes in between.
//!
//! # Wire format
//! - `GET /todos?userId={id}` lists one user's todos in server order.
//! - `POST /todos` creates from a [`NewTodo`] and answers `201`.
//! - `PUT /todos/{id}` replaces the whole [`Todo`]; there is no patching.
//! - `DELETE /todos/{id}` answers `204`.
//! - `404` is always [`ApiError::NotFound`].

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{NewTodo, Todo, TodoId, User, UserId};
