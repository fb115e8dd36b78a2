//! The remote todo API as seen by the store.
//!
//! [`TodoApi`] is the seam between the store and the network. The store only
//! ever talks to `Arc<dyn TodoApi>`, so tests substitute an in-memory
//! implementation and production code uses [`HttpTodoApi`].

use async_trait::async_trait;
use reqwest::{Client, Method};
use todo_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, NewTodo, Todo, TodoClient, TodoId, UserId,
};
use tracing::trace;

use crate::config::Config;

/// CRUD operations against the remote todo service.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// All todos owned by `user_id`, in server order.
    async fn list(&self, user_id: UserId) -> Result<Vec<Todo>, ApiError>;

    /// Create a todo and return it with its server-assigned id.
    async fn create(&self, new_todo: &NewTodo) -> Result<Todo, ApiError>;

    /// Replace the todo identified by `todo.id`; returns the stored value.
    async fn update(&self, todo: &Todo) -> Result<Todo, ApiError>;

    async fn delete(&self, id: TodoId) -> Result<(), ApiError>;
}

/// [`TodoApi`] over HTTP: `todo-core` builds and parses, reqwest moves bytes.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: TodoClient,
    http: Client,
}

impl HttpTodoApi {
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client: TodoClient::new(&config.api_url),
            http,
        })
    }

    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        trace!(method = req.method.as_str(), path = %req.path, "sending request");

        let mut builder = self.http.request(to_reqwest_method(req.method), req.path.as_str());
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(transport_error)?;

        trace!(status, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self, user_id: UserId) -> Result<Vec<Todo>, ApiError> {
        let response = self.execute(self.client.build_list_todos(user_id)).await?;
        self.client.parse_list_todos(response)
    }

    async fn create(&self, new_todo: &NewTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(new_todo)?;
        let response = self.execute(request).await?;
        self.client.parse_create_todo(response)
    }

    async fn update(&self, todo: &Todo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(todo)?;
        let response = self.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}
