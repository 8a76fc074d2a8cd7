use std::time::Duration;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{AnalyticsClient, DispatchOptions};
use crate::protocol::{ClientError, Command, MutationState, QueryProfile, ScanConsistency};

/// Options for an analytics query.
///
/// `consistent_with` bounds the query to the supplied mutation state and is
/// mutually exclusive with `scan_consistency`.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsQueryOptions {
    /// Overrides the client-wide query timeout.
    pub timeout: Option<Duration>,
    pub scan_consistency: Option<ScanConsistency>,
    pub consistent_with: Option<MutationState>,
    pub profile: Option<QueryProfile>,
    /// Returned with the response for correlation; a fresh UUID when unset.
    pub client_context_id: Option<String>,
    pub positional_parameters: Vec<Value>,
    pub named_parameters: Map<String, Value>,
    pub readonly: bool,
    pub priority: bool,
    /// Scopes unqualified dataset names in the statement.
    pub query_context: Option<String>,
    /// Passed to the query engine as-is, after everything else.
    pub raw: Map<String, Value>,
}

impl AnalyticsQueryOptions {
    /// Marshals the options into the native query request body.
    fn into_body(self, statement: &str) -> Result<Map<String, Value>, ClientError> {
        if self.scan_consistency.is_some() && self.consistent_with.is_some() {
            return Err(ClientError::validation(
                "scan_consistency cannot be combined with consistent_with",
            ));
        }

        let mut body = Map::new();
        body.insert("statement".to_string(), Value::from(statement));
        body.insert(
            "client_context_id".to_string(),
            Value::from(
                self.client_context_id
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
            ),
        );

        if let Some(state) = self.consistent_with {
            if state.is_empty() {
                return Err(ClientError::validation(
                    "consistent_with requires at least one mutation token",
                ));
            }
            body.insert("scan_consistency".to_string(), Value::from("at_plus"));
            body.insert(
                "scan_vectors".to_string(),
                Value::Object(state.to_scan_vectors()),
            );
        } else if let Some(consistency) = self.scan_consistency {
            body.insert(
                "scan_consistency".to_string(),
                Value::from(consistency.as_token()),
            );
        }

        if let Some(profile) = self.profile {
            body.insert("profile".to_string(), Value::from(profile.as_token()));
        }
        if !self.positional_parameters.is_empty() {
            body.insert(
                "args".to_string(),
                Value::Array(self.positional_parameters),
            );
        }
        for (key, value) in self.named_parameters {
            let key = key.trim_start_matches('$');
            body.insert(format!("${}", key), value);
        }
        if self.readonly {
            body.insert("readonly".to_string(), Value::from(true));
        }
        if self.priority {
            body.insert("priority".to_string(), Value::from(true));
        }
        if let Some(query_context) = self.query_context {
            body.insert("query_context".to_string(), Value::from(query_context));
        }
        for (key, value) in self.raw {
            body.insert(key, value);
        }

        Ok(body)
    }
}

impl AnalyticsClient {
    /// Submits an analytics query through the dispatcher. Execution stays in
    /// the native core; this marshals the option set into the request body.
    pub async fn analytics_query(
        &self,
        statement: &str,
        options: AnalyticsQueryOptions,
    ) -> Result<Value, ClientError> {
        let timeout = options.timeout;
        let body = options.into_body(statement)?;
        self.submit(
            Command::AnalyticsQuery { body },
            DispatchOptions { timeout },
        )?
        .await
    }
}
