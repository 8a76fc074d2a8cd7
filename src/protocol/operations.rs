use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ClientError;

/// Closed catalog of management operations.
///
/// `Unknown` is the default sentinel and is never dispatchable; it has no
/// token and `parse_token` never produces it. Kinds are compared by equality
/// only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementOperation {
    #[default]
    Unknown,
    CreateDataverse,
    CreateDataset,
    CreateIndex,
    GetAllDatasets,
    GetAllIndexes,
    DropDataverse,
    DropDataset,
    DropIndex,
    GetPendingMutations,
    LinkCreate,
    LinkConnect,
    GetAllLinks,
    LinkDisconnect,
    LinkReplace,
    DropLink,
}

impl ManagementOperation {
    /// Every dispatchable kind, in declaration order.
    pub const ALL: [ManagementOperation; 15] = [
        ManagementOperation::CreateDataverse,
        ManagementOperation::CreateDataset,
        ManagementOperation::CreateIndex,
        ManagementOperation::GetAllDatasets,
        ManagementOperation::GetAllIndexes,
        ManagementOperation::DropDataverse,
        ManagementOperation::DropDataset,
        ManagementOperation::DropIndex,
        ManagementOperation::GetPendingMutations,
        ManagementOperation::LinkCreate,
        ManagementOperation::LinkConnect,
        ManagementOperation::GetAllLinks,
        ManagementOperation::LinkDisconnect,
        ManagementOperation::LinkReplace,
        ManagementOperation::DropLink,
    ];

    pub fn as_token(&self) -> &'static str {
        match self {
            ManagementOperation::Unknown => "unknown",
            ManagementOperation::CreateDataverse => "create_dataverse",
            ManagementOperation::CreateDataset => "create_dataset",
            ManagementOperation::CreateIndex => "create_index",
            ManagementOperation::GetAllDatasets => "get_all_datasets",
            ManagementOperation::GetAllIndexes => "get_all_indexes",
            ManagementOperation::DropDataverse => "drop_dataverse",
            ManagementOperation::DropDataset => "drop_dataset",
            ManagementOperation::DropIndex => "drop_index",
            ManagementOperation::GetPendingMutations => "get_pending_mutations",
            ManagementOperation::LinkCreate => "link_create",
            ManagementOperation::LinkConnect => "link_connect",
            ManagementOperation::GetAllLinks => "get_all_links",
            ManagementOperation::LinkDisconnect => "link_disconnect",
            ManagementOperation::LinkReplace => "link_replace",
            ManagementOperation::DropLink => "drop_link",
        }
    }

    pub fn parse_token(token: &str) -> Result<Self, ClientError> {
        Self::ALL
            .iter()
            .find(|op| op.as_token() == token)
            .copied()
            .ok_or_else(|| {
                ClientError::validation(format!(
                    "unrecognized management operation '{}', expected one of: {}",
                    token,
                    token_list()
                ))
            })
    }
}

impl fmt::Display for ManagementOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

fn token_list() -> String {
    ManagementOperation::ALL
        .iter()
        .map(|op| op.as_token())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name/value pairs for embedding layers that publish the catalog into a host
/// runtime's enumeration namespace.
pub fn operation_catalog() -> impl Iterator<Item = (&'static str, ManagementOperation)> {
    ManagementOperation::ALL.into_iter().map(|op| (op.as_token(), op))
}

/// Loosely-typed argument bag accepted at the generic dispatch entry point.
///
/// Typed getters report missing or mistyped fields as validation errors so
/// shape problems never reach the native core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationArgs(Map<String, Value>);

impl OperationArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ClientError::validation(format!(
                "operation arguments must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub(crate) fn require_str(
        &self,
        operation: ManagementOperation,
        key: &str,
    ) -> Result<String, ClientError> {
        match self.optional_str(operation, key)? {
            Some(value) => Ok(value),
            None => Err(ClientError::validation(format!(
                "{} requires field '{}'",
                operation, key
            ))),
        }
    }

    pub(crate) fn optional_str(
        &self,
        operation: ManagementOperation,
        key: &str,
    ) -> Result<Option<String>, ClientError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(ClientError::validation(format!(
                "field '{}' for {} must be a string, got {}",
                key,
                operation,
                json_type_name(other)
            ))),
        }
    }

    /// Boolean flags default to false when absent.
    pub(crate) fn flag(
        &self,
        operation: ManagementOperation,
        key: &str,
    ) -> Result<bool, ClientError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(other) => Err(ClientError::validation(format!(
                "field '{}' for {} must be a boolean, got {}",
                key,
                operation,
                json_type_name(other)
            ))),
        }
    }

    pub(crate) fn optional_string_map(
        &self,
        operation: ManagementOperation,
        key: &str,
    ) -> Result<Option<BTreeMap<String, String>>, ClientError> {
        let map = match self.0.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ClientError::validation(format!(
                    "field '{}' for {} must be an object, got {}",
                    key,
                    operation,
                    json_type_name(other)
                )))
            }
        };

        let mut out = BTreeMap::new();
        for (field, value) in map {
            match value {
                Value::String(value) => {
                    out.insert(field.clone(), value.clone());
                }
                other => {
                    return Err(ClientError::validation(format!(
                        "entry '{}' in '{}' for {} must be a string, got {}",
                        field,
                        key,
                        operation,
                        json_type_name(other)
                    )))
                }
            }
        }
        Ok(Some(out))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
