//! [`TodoStore`]: session, todo list and UI flags behind one observable value.
//!
//! # Design
//! All state sits in a single `tokio::sync::watch` channel. Every transition
//! is one `send_modify` closure, so observers never see half an update, and
//! network calls are always awaited outside those closures.
//!
//! Mutations are pessimistic: the collection only changes once the server
//! has answered. Each mutation is tagged with a per-id generation number and
//! only the newest generation for an id may apply its response. Older
//! responses settle as [`Settled::Superseded`] and merely release their
//! pending entry.
//!
//! The error banner clears itself after a delay. At most one clear timer is
//! outstanding; showing a new error aborts the previous one, and an epoch
//! check covers a timer that already woke up.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use todo_core::{ApiError, NewTodo, Todo, TodoId, User, UserId};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{HttpTodoApi, TodoApi};
use crate::config::{Config, DEFAULT_ERROR_DISPLAY_MS};
use crate::error::{ErrorKind, StoreError};
use crate::pending::PendingIds;
use crate::state::{dedupe_by_id, StoreState};

/// How a store operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The server accepted the request and the result is in the state.
    Applied,
    /// The request failed (or was rejected locally) and an error is shown.
    Failed,
    /// A newer request for the same target won; this result was dropped.
    Superseded,
}

/// Client-side state container for the todo app.
///
/// Cheap to clone; all clones share the same state. Hand a clone to every
/// consumer instead of reaching for a global.
#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn TodoApi>,
    state: watch::Sender<StoreState>,
    error_display: Duration,
    auto_clear: AutoClear,
}

impl TodoStore {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self::with_error_display(api, Duration::from_millis(DEFAULT_ERROR_DISPLAY_MS))
    }

    pub fn with_error_display(api: Arc<dyn TodoApi>, error_display: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                error_display,
                auto_clear: AutoClear::default(),
            }),
        }
    }

    /// Store talking to the HTTP API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let api = HttpTodoApi::new(config)?;
        Ok(Self::with_error_display(Arc::new(api), config.error_display))
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    /// Set the session and fetch that user's todos.
    ///
    /// A failed fetch shows [`ErrorKind::Loading`] and leaves the collection
    /// alone. If another user logged in while the fetch was in flight, its
    /// result is discarded.
    pub async fn login(&self, user: User) -> Settled {
        let user_id = user.id;
        info!(user_id, name = %user.name, "user logged in");
        self.inner.state.send_modify(|state| state.session = Some(user));

        match self.inner.api.list(user_id).await {
            Ok(mut todos) => {
                let mut settled = Settled::Superseded;
                self.inner.state.send_if_modified(|state| {
                    if state.user_id() != Some(user_id) {
                        return false;
                    }
                    let dropped = dedupe_by_id(&mut todos);
                    if dropped > 0 {
                        warn!(user_id, dropped, "server returned duplicate todo ids");
                    }
                    debug!(user_id, count = todos.len(), "todos loaded");
                    state.todos = todos;
                    settled = Settled::Applied;
                    true
                });
                settled
            }
            Err(e) if self.is_current_user(user_id) => {
                warn!(user_id, error = %e, "failed to load todos");
                self.show_error(ErrorKind::Loading);
                Settled::Failed
            }
            Err(e) => {
                debug!(user_id, error = %e, "dropping failed fetch for a replaced session");
                Settled::Superseded
            }
        }
    }

    /// Delete a todo once the server confirms.
    ///
    /// Always requests focus for the primary input when the request settles.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownTodo`] if `id` is not in the collection; no
    /// request is issued in that case.
    pub async fn delete_todo(&self, id: TodoId) -> Result<Settled, StoreError> {
        let generation = self.begin_mutation(id)?;
        debug!(id, generation, "deleting todo");

        let result = self.inner.api.delete(id).await;
        let settled = self.settle_mutation(id, generation, |state| match &result {
            Ok(()) => {
                state.todos.retain(|todo| todo.id != id);
                Settled::Applied
            }
            Err(_) => Settled::Failed,
        });

        if let Err(e) = &result {
            warn!(id, generation, error = %e, "delete failed");
        }
        if settled == Settled::Failed {
            self.show_error(ErrorKind::Delete);
        }
        self.request_focus();
        Ok(settled)
    }

    /// Replace a todo with `todo` once the server confirms.
    ///
    /// The server's copy takes the original position in the collection.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownTodo`] if `todo.id` is not in the collection.
    pub async fn update_todo(&self, todo: Todo) -> Result<Settled, StoreError> {
        let id = todo.id;
        let generation = self.begin_mutation(id)?;
        debug!(id, generation, completed = todo.completed, "updating todo");

        let result = self.inner.api.update(&todo).await;
        let settled = self.settle_mutation(id, generation, |state| match &result {
            Ok(confirmed) => match state.todos.iter_mut().find(|t| t.id == id) {
                Some(slot) => {
                    *slot = confirmed.clone();
                    Settled::Applied
                }
                // Removed locally while the request was in flight.
                None => Settled::Superseded,
            },
            Err(_) => Settled::Failed,
        });

        if let Err(e) = &result {
            warn!(id, generation, error = %e, "update failed");
        }
        if settled == Settled::Failed {
            self.show_error(ErrorKind::Update);
        }
        Ok(settled)
    }

    /// Create a todo for the logged-in user and append it.
    ///
    /// A blank title shows [`ErrorKind::EmptyTitle`] without a request.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotLoggedIn`] if there is no session.
    pub async fn add_todo(&self, title: &str) -> Result<Settled, StoreError> {
        let user_id = self.inner.state.borrow().user_id().ok_or(StoreError::NotLoggedIn)?;
        let title = title.trim();
        if title.is_empty() {
            self.show_error(ErrorKind::EmptyTitle);
            return Ok(Settled::Failed);
        }

        self.set_loading(true);
        let new_todo = NewTodo {
            title: title.to_string(),
            user_id,
            completed: false,
        };
        let result = self.inner.api.create(&new_todo).await;

        let settled = match result {
            Ok(created) => {
                debug!(id = created.id, "todo created");
                self.inner.state.send_modify(|state| {
                    if !state.contains(created.id) {
                        state.todos.push(created);
                    }
                    state.loading = false;
                    state.focus_requests += 1;
                });
                Settled::Applied
            }
            Err(e) => {
                warn!(user_id, error = %e, "create failed");
                self.inner.state.send_modify(|state| {
                    state.loading = false;
                    state.focus_requests += 1;
                });
                self.show_error(ErrorKind::Add);
                Settled::Failed
            }
        };
        Ok(settled)
    }

    /// Show `kind` now and clear it after the configured delay.
    ///
    /// Any clear scheduled by an earlier call is cancelled. Passing
    /// [`ErrorKind::None`] hides the banner without scheduling anything.
    /// Outside a Tokio runtime the banner is shown but never auto-cleared.
    pub fn show_error(&self, kind: ErrorKind) {
        // The slot stays locked until the new timer is stored, so concurrent
        // callers swap timers in the same order they bumped the epoch.
        let mut slot = self.inner.auto_clear.lock();
        let mut epoch = 0;
        self.inner.state.send_modify(|state| {
            state.error = kind;
            state.error_epoch += 1;
            epoch = state.error_epoch;
        });

        let timer = if kind.is_none() {
            None
        } else {
            self.schedule_clear(epoch)
        };
        if let Some(previous) = std::mem::replace(&mut *slot, timer) {
            previous.abort();
        }
    }

    pub fn clear_error(&self) {
        self.show_error(ErrorKind::None);
    }

    /// Edit the collection directly. Duplicate ids are dropped afterwards.
    pub fn set_todos(&self, edit: impl FnOnce(&mut Vec<Todo>)) {
        self.inner.state.send_modify(|state| {
            edit(&mut state.todos);
            let dropped = dedupe_by_id(&mut state.todos);
            if dropped > 0 {
                warn!(dropped, "set_todos produced duplicate ids");
            }
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    /// Edit the pending set directly.
    pub fn set_pending_ids(&self, edit: impl FnOnce(&mut PendingIds)) {
        self.inner.state.send_modify(|state| edit(&mut state.pending));
    }

    /// Ask the view to focus its primary input.
    pub fn request_focus(&self) {
        self.inner.state.send_modify(|state| state.focus_requests += 1);
    }

    fn is_current_user(&self, user_id: UserId) -> bool {
        self.inner.state.borrow().user_id() == Some(user_id)
    }

    /// Mark `id` pending and hand out its request generation.
    fn begin_mutation(&self, id: TodoId) -> Result<u64, StoreError> {
        let mut begun = Err(StoreError::UnknownTodo(id));
        self.inner.state.send_if_modified(|state| {
            if !state.contains(id) {
                return false;
            }
            state.pending.insert(id);
            state.loading = true;
            begun = Ok(state.generations.next(id));
            true
        });
        begun
    }

    /// Release one pending entry for `id`; run `apply` only if `generation`
    /// is still the newest request for `id`.
    fn settle_mutation<F>(&self, id: TodoId, generation: u64, apply: F) -> Settled
    where
        F: FnOnce(&mut StoreState) -> Settled,
    {
        let mut settled = Settled::Superseded;
        self.inner.state.send_modify(|state| {
            let latest = state.generations.is_latest(id, generation);
            if latest {
                settled = apply(state);
            }
            state.loading = false;
            state.pending.release(id);
            if latest && !state.pending.contains(id) {
                state.generations.forget(id);
            }
        });
        if settled == Settled::Superseded {
            debug!(id, generation, "response superseded by a newer request");
        }
        settled
    }

    fn schedule_clear(&self, epoch: u64) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            warn!("no Tokio runtime; error banner will not clear itself");
            return None;
        };
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.error_display;
        Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                inner.state.send_if_modified(|state| {
                    if state.error_epoch != epoch {
                        return false;
                    }
                    state.error = ErrorKind::None;
                    true
                });
            }
        }))
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("state", &*self.inner.state.borrow())
            .field("error_display", &self.inner.error_display)
            .finish_non_exhaustive()
    }
}

/// Slot for the single outstanding banner-clear task.
#[derive(Default)]
struct AutoClear {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AutoClear {
    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AutoClear {
    fn drop(&mut self) {
        let slot = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}
