use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub user_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub user_id: i64,
    #[serde(default)]
    pub completed: bool,
}

/// Body of a full replacement. An `id` in the body is ignored; the path wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTodo {
    pub title: String,
    pub completed: bool,
    pub user_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub user_id: Option<i64>,
}

/// Todos keyed by id. Ids are handed out in ascending order, so iteration
/// order is creation order.
#[derive(Debug, Default)]
pub struct Todos {
    items: BTreeMap<i64, Todo>,
    next_id: i64,
}

impl Todos {
    fn seeded(seed: Vec<Todo>) -> Self {
        let next_id = seed.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            items: seed.into_iter().map(|t| (t.id, t)).collect(),
            next_id,
        }
    }
}

pub type Db = Arc<RwLock<Todos>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-populated with `seed`.
pub fn app_with(seed: Vec<Todo>) -> Router {
    let db: Db = Arc::new(RwLock::new(Todos::seeded(seed)));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(replace_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, seed: Vec<Todo>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(seed)).await
}

async fn list_todos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    let listed: Vec<Todo> = todos
        .items
        .values()
        .filter(|t| params.user_id.is_none_or(|user_id| t.user_id == user_id))
        .cloned()
        .collect();
    debug!(user_id = ?params.user_id, count = listed.len(), "list todos");
    Json(listed)
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<NewTodo>,
) -> (StatusCode, Json<Todo>) {
    let mut todos = db.write().await;
    let todo = Todo {
        id: todos.next_id,
        title: input.title,
        completed: input.completed,
        user_id: input.user_id,
    };
    todos.next_id += 1;
    todos.items.insert(todo.id, todo.clone());
    debug!(id = todo.id, "created todo");
    (StatusCode::CREATED, Json(todo))
}

async fn replace_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ReplaceTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut todos = db.write().await;
    let todo = todos.items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    *todo = Todo {
        id,
        title: input.title,
        completed: input.completed,
        user_id: input.user_id,
    };
    debug!(id, "replaced todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = db.write().await;
    todos
        .items
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
