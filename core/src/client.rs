//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only the service URL and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateTodo, Deleted, ErrorEnvelope, SetCompleted, SetText, Todo, TodoEnvelope, UpdateTodo,
    UpdatedEnvelope,
};

pub const DEFAULT_COLLECTION_PATH: &str = "/todos";

/// Synchronous, stateless client for the todo API.
///
/// Ids are percent-encoded into a single path segment; validating them is the
/// server's job.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    collection_path: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_collection_path(base_url, DEFAULT_COLLECTION_PATH)
    }

    /// Client for a server that mounts the collection somewhere other than `/todos`.
    pub fn with_collection_path(base_url: &str, collection_path: &str) -> Self {
        let path = collection_path.trim_matches('/');
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection_path: if path.is_empty() {
                String::new()
            } else {
                format!("/{path}")
            },
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, self.collection_path)
    }

    fn item_url(&self, id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.collection_path,
            urlencoding::encode(id)
        )
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        // A root-mounted collection still needs a path segment
        let mut path = self.collection_url();
        if self.collection_path.is_empty() {
            path.push('/');
        }
        bodyless(HttpMethod::Get, path)
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        bodyless(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let mut path = self.collection_url();
        if self.collection_path.is_empty() {
            path.push('/');
        }
        with_json(HttpMethod::Post, path, input)
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Put, self.item_url(id), input)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        bodyless(HttpMethod::Delete, self.item_url(id))
    }

    pub fn build_set_completed(&self, id: &str, is_completed: bool) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/check", self.item_url(id));
        with_json(HttpMethod::Patch, path, &SetCompleted { is_completed })
    }

    pub fn build_set_text(&self, id: &str, text: &str) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/text", self.item_url(id));
        let input = SetText {
            text: text.to_string(),
        };
        with_json(HttpMethod::Patch, path, &input)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode::<TodoEnvelope>(&response.body).map(|e| e.todo)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode::<UpdatedEnvelope>(&response.body).map(|e| e.updated)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Deleted, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_set_completed(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode::<TodoEnvelope>(&response.body).map(|e| e.todo)
    }

    pub fn parse_set_text(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode::<TodoEnvelope>(&response.body).map(|e| e.todo)
    }
}

fn bodyless(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn with_json<T: Serialize>(method: HttpMethod, path: String, input: &T) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let err = match serde_json::from_str::<ErrorEnvelope>(&response.body) {
        Ok(ErrorEnvelope { error }) => match error.kind.as_str() {
            "not_found" => ApiError::NotFound,
            "invalid_identifier" => ApiError::InvalidIdentifier(error.message),
            "validation_error" => ApiError::Validation(error.message),
            _ => ApiError::Server {
                status: response.status,
                kind: error.kind,
                message: error.message,
            },
        },
        Err(_) if response.status == 404 => ApiError::NotFound,
        Err(_) => ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        },
    };
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "65a1b2c3d4e5f60718293a4b";
    const TODO_JSON: &str = r#"{"id":"65a1b2c3d4e5f60718293a4b","text":"Test","isCompleted":false,"createdAt":"2024-01-12T10:00:00Z","updatedAt":"2024-01-12T10:00:00Z"}"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_todo_produces_correct_request() {
        let req = client().build_get_todo(ID);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, format!("http://localhost:3000/todos/{ID}"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            text: "Buy milk".to_string(),
            is_completed: false,
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"], "Buy milk");
        assert_eq!(body["isCompleted"], false);
    }

    #[test]
    fn build_update_todo_skips_absent_fields() {
        let input = UpdateTodo {
            text: Some("Updated".to_string()),
            is_completed: None,
        };
        let req = client().build_update_todo(ID, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"], "Updated");
        assert!(body.get("isCompleted").is_none());
    }

    #[test]
    fn build_single_field_patches() {
        let req = client().build_set_completed(ID, true).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, format!("http://localhost:3000/todos/{ID}/check"));
        assert_eq!(req.body.as_deref(), Some(r#"{"isCompleted":true}"#));

        let req = client().build_set_text(ID, "buy milk").unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, format!("http://localhost:3000/todos/{ID}/text"));
        assert_eq!(req.body.as_deref(), Some(r#"{"text":"buy milk"}"#));
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(ID);
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_success() {
        let todos = client()
            .parse_list_todos(response(200, &format!("[{TODO_JSON}]")))
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "Test");
    }

    #[test]
    fn parse_get_todo_unwraps_envelope() {
        let body = format!(r#"{{"message":"todo fetched","todo":{TODO_JSON}}}"#);
        let todo = client().parse_get_todo(response(200, &body)).unwrap();
        assert_eq!(todo.id, ID);
    }

    #[test]
    fn parse_update_todo_unwraps_envelope() {
        let body = format!(r#"{{"message":"todo updated","updated":{TODO_JSON}}}"#);
        let todo = client().parse_update_todo(response(200, &body)).unwrap();
        assert_eq!(todo.text, "Test");
    }

    #[test]
    fn parse_delete_todo_returns_remaining() {
        let body = format!(r#"{{"message":"todo deleted","deleted":"{ID}","todos":[]}}"#);
        let deleted = client().parse_delete_todo(response(200, &body)).unwrap();
        assert_eq!(deleted.deleted, ID);
        assert!(deleted.todos.is_empty());
    }

    #[test]
    fn structured_errors_map_to_variants() {
        let not_found = r#"{"error":{"kind":"not_found","message":"todo not found"}}"#;
        let err = client().parse_get_todo(response(404, not_found)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let bad_id = r#"{"error":{"kind":"invalid_identifier","message":"invalid identifier: 'x'"}}"#;
        let err = client().parse_get_todo(response(400, bad_id)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidIdentifier(_)));

        let invalid = r#"{"error":{"kind":"validation_error","message":"text: must not be empty"}}"#;
        let err = client().parse_set_text(response(400, invalid)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("text")));

        let storage = r#"{"error":{"kind":"persistence_error","message":"storage"}}"#;
        let err = client().parse_create_todo(response(500, storage)).unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }

    #[test]
    fn unstructured_errors_keep_raw_body() {
        let err = client().parse_create_todo(response(502, "bad gateway")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 502, .. }));

        let err = client().parse_delete_todo(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/todos");
    }

    #[test]
    fn custom_and_root_collection_paths() {
        let client = TodoClient::with_collection_path("http://h", "api/todos/");
        assert_eq!(client.build_get_todo(ID).path, format!("http://h/api/todos/{ID}"));

        let root = TodoClient::with_collection_path("http://h", "/");
        assert_eq!(root.build_list_todos().path, "http://h/");
        assert_eq!(root.build_delete_todo(ID).path, format!("http://h/{ID}"));
    }

    #[test]
    fn ids_stay_in_one_path_segment() {
        let c = client();
        assert_eq!(
            c.build_get_todo("a/b?c#d").path,
            "http://localhost:3000/todos/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            c.build_set_completed("x/check", true).unwrap().path,
            "http://localhost:3000/todos/x%2Fcheck/check"
        );
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn missing_text_reads_as_empty() {
        let body = r#"[
            {"id":"65a1b2c3d4e5f60718293a4b","isCompleted":true,"createdAt":"2024-01-12T10:00:00Z"},
            {"id":"65a1b2c3d4e5f60718293a4c","text":null,"createdAt":"2024-01-12T09:00:00Z"}
        ]"#;
        let todos = client().parse_list_todos(response(200, body)).unwrap();
        assert_eq!(todos[0].text, "");
        assert!(todos[0].updated_at.is_none());
        assert_eq!(todos[1].text, "");
        assert!(!todos[1].is_completed);
    }
}
