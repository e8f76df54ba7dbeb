//! # HTTP Store
//!
//! reqwest implementation of the storage traits against the Ledger REST API.
//!
//! Every request carries `Authorization: Bearer <token>` when a token is
//! configured. Error responses are translated into [`LedgerError`] by status:
//!
//! | Status | Error |
//! |---|---|
//! | 401, 403 | `Unauthorized` |
//! | 404 | `NotFound` |
//! | 409 | `Conflict`, with the conflicting slots when the body lists them |
//! | 400, 422 | `Validation` |
//! | other | `Remote` |

pub mod budgets;
pub mod ledger;
pub mod objectives;

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{ConflictDetail, ErrorBody};
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::storage::traits::Connection;

pub use budgets::HttpBudgetRepository;
pub use ledger::{HttpCategoryRepository, HttpRecurringRepository, HttpTransactionRepository};
pub use objectives::HttpObjectiveRepository;

/// Thin wrapper over a shared `reqwest::Client` bound to one API base URL
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RestClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> LedgerResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LedgerError::validation(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LedgerError::validation(format!("Invalid API base URL '{}'", base_url)));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: token.filter(|token| !token.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a successful JSON body
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> LedgerResult<T> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::Network(format!("Request timeout: {}", e))
            } else {
                LedgerError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let error = error_from_response(status.as_u16(), &body);
            warn!("Store answered {}: {}", status, error);
            return Err(error);
        }

        decode_body(status.as_u16(), &body)
    }
}

/// Decode a successful body. A 204 or blank body decodes as `null`, or as
/// `{}` for types that need an object.
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> LedgerResult<T> {
    if status == 204 || body.trim().is_empty() {
        return serde_json::from_str("null")
            .or_else(|_| serde_json::from_str("{}"))
            .map_err(|e| LedgerError::Decode(format!("empty response body (HTTP {}): {}", status, e)));
    }
    serde_json::from_str(body).map_err(|e| LedgerError::Decode(e.to_string()))
}

fn detail_message(detail: Option<&Value>, body: &str, status: u16) -> String {
    match detail {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP {}", status),
    }
}

/// Translate a non-2xx response into a [`LedgerError`]
pub fn error_from_response(status: u16, body: &str) -> LedgerError {
    let detail = serde_json::from_str::<ErrorBody>(body).ok().map(|body| body.detail);

    match status {
        401 | 403 => LedgerError::Unauthorized,
        404 => LedgerError::NotFound(detail_message(detail.as_ref(), body, status)),
        409 => match detail {
            Some(Value::Object(object)) => {
                match serde_json::from_value::<ConflictDetail>(Value::Object(object.clone())) {
                    Ok(conflict) => LedgerError::Conflict {
                        message: conflict.message,
                        conflicts: conflict.conflicts,
                    },
                    Err(_) => LedgerError::Conflict {
                        message: Value::Object(object).to_string(),
                        conflicts: Vec::new(),
                    },
                }
            }
            other => LedgerError::Conflict {
                message: detail_message(other.as_ref(), body, status),
                conflicts: Vec::new(),
            },
        },
        400 | 422 => LedgerError::Validation(detail_message(detail.as_ref(), body, status)),
        _ => LedgerError::Remote {
            status,
            message: detail_message(detail.as_ref(), body, status),
        },
    }
}

/// Connection to the Ledger REST API
#[derive(Clone, Debug)]
pub struct HttpConnection {
    client: RestClient,
}

impl HttpConnection {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn connect(base_url: &str, token: Option<String>, timeout: Duration) -> LedgerResult<Self> {
        Ok(Self::new(RestClient::new(base_url, token, timeout)?))
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

impl Connection for HttpConnection {
    type BudgetRepository = HttpBudgetRepository;
    type ObjectiveRepository = HttpObjectiveRepository;
    type CategoryRepository = HttpCategoryRepository;
    type TransactionRepository = HttpTransactionRepository;
    type RecurringRepository = HttpRecurringRepository;

    fn create_budget_repository(&self) -> Self::BudgetRepository {
        HttpBudgetRepository::new(self.client.clone())
    }

    fn create_objective_repository(&self) -> Self::ObjectiveRepository {
        HttpObjectiveRepository::new(self.client.clone())
    }

    fn create_category_repository(&self) -> Self::CategoryRepository {
        HttpCategoryRepository::new(self.client.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        HttpTransactionRepository::new(self.client.clone())
    }

    fn create_recurring_repository(&self) -> Self::RecurringRepository {
        HttpRecurringRepository::new(self.client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_body_with_slots() {
        let body = r#"{"detail":{"message":"Budget conflicts","conflicts":[{"month":"2026-01","categoryId":"cat-1","objectiveId":null}]}}"#;

        match error_from_response(409, body) {
            LedgerError::Conflict { message, conflicts } => {
                assert_eq!(message, "Budget conflicts");
                assert_eq!(conflicts[0].category_id, "cat-1");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_detail_and_status_mapping() {
        assert_eq!(
            error_from_response(409, r#"{"detail":"Objective already exists"}"#),
            LedgerError::Conflict { message: "Objective already exists".to_string(), conflicts: vec![] }
        );
        assert_eq!(error_from_response(403, ""), LedgerError::Unauthorized);
        assert_eq!(
            error_from_response(422, r#"{"detail":"limit must be non-negative"}"#),
            LedgerError::Validation("limit must be non-negative".to_string())
        );
        assert_eq!(
            error_from_response(500, "boom"),
            LedgerError::Remote { status: 500, message: "boom".to_string() }
        );
        assert_eq!(error_from_response(404, ""), LedgerError::NotFound("HTTP 404".to_string()));
    }

    #[test]
    fn test_empty_success_body_decodes() {
        let deleted: shared::DeletedResponse = decode_body(204, "").unwrap();
        assert!(deleted.deleted);
        assert_eq!(deleted.count, None);

        let deleted: shared::DeletedResponse = decode_body(200, "  ").unwrap();
        assert!(deleted.deleted);

        let nothing: Option<shared::ApiCategory> = decode_body(204, "").unwrap();
        assert_eq!(nothing, None);

        let listed: Vec<shared::ApiCategory> = decode_body(200, "[]").unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn test_empty_body_for_required_entity_is_decode_error() {
        let result = decode_body::<shared::ApiCategory>(204, "");
        assert!(matches!(result, Err(LedgerError::Decode(_))));
        let result = decode_body::<shared::DeletedResponse>(200, "not json");
        assert!(matches!(result, Err(LedgerError::Decode(_))));
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let client = RestClient::new("http://localhost:8000/api/v1/", None, Duration::from_secs(1)).unwrap();
        let url = client.url(&["budgets", "2026-03", "cat 1"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/budgets/2026-03/cat%201");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = RestClient::new("http://localhost:8000/api/v1", Some("secret".into()), Duration::from_secs(1)).unwrap();
        assert!(!format!("{:?}", client).contains("secret"));
    }
}
