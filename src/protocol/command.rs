use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ClientError;
use super::operations::{ManagementOperation, OperationArgs};

/// Typed request submitted to the native core, one variant per management
/// operation plus the analytics query request.
///
/// Variants carry exactly the fields the native request constructors need;
/// building one from a loosely-typed argument bag goes through
/// [`Command::from_args`], which rejects missing or mistyped fields before
/// anything reaches the native core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateDataverse {
        dataverse_name: String,
        ignore_if_exists: bool,
    },
    DropDataverse {
        dataverse_name: String,
        ignore_if_not_exists: bool,
    },
    CreateDataset {
        dataset_name: String,
        bucket_name: String,
        dataverse_name: Option<String>,
        condition: Option<String>,
        ignore_if_exists: bool,
    },
    DropDataset {
        dataset_name: String,
        dataverse_name: Option<String>,
        ignore_if_not_exists: bool,
    },
    CreateIndex {
        index_name: String,
        dataset_name: String,
        fields: BTreeMap<String, String>,
        dataverse_name: Option<String>,
        ignore_if_exists: bool,
    },
    DropIndex {
        index_name: String,
        dataset_name: String,
        dataverse_name: Option<String>,
        ignore_if_not_exists: bool,
    },
    GetAllDatasets,
    GetAllIndexes,
    GetPendingMutations,
    LinkCreate {
        link: LinkDefinition,
    },
    LinkReplace {
        link: LinkDefinition,
    },
    LinkConnect {
        link_name: String,
        dataverse_name: String,
        force: bool,
    },
    LinkDisconnect {
        link_name: String,
        dataverse_name: String,
    },
    DropLink {
        link_name: String,
        dataverse_name: String,
    },
    GetAllLinks {
        dataverse_name: Option<String>,
        link_type: Option<LinkType>,
        name: Option<String>,
    },
    AnalyticsQuery {
        body: Map<String, Value>,
    },
}

/// Link name used when the caller does not pick one.
pub const DEFAULT_LINK_NAME: &str = "Local";
/// Dataverse used when the caller does not pick one.
pub const DEFAULT_DATAVERSE_NAME: &str = "Default";

impl Command {
    /// Short label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateDataverse { .. } => "create_dataverse",
            Command::DropDataverse { .. } => "drop_dataverse",
            Command::CreateDataset { .. } => "create_dataset",
            Command::DropDataset { .. } => "drop_dataset",
            Command::CreateIndex { .. } => "create_index",
            Command::DropIndex { .. } => "drop_index",
            Command::GetAllDatasets => "get_all_datasets",
            Command::GetAllIndexes => "get_all_indexes",
            Command::GetPendingMutations => "get_pending_mutations",
            Command::LinkCreate { .. } => "link_create",
            Command::LinkReplace { .. } => "link_replace",
            Command::LinkConnect { .. } => "link_connect",
            Command::LinkDisconnect { .. } => "link_disconnect",
            Command::DropLink { .. } => "drop_link",
            Command::GetAllLinks { .. } => "get_all_links",
            Command::AnalyticsQuery { .. } => "analytics_query",
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Command::AnalyticsQuery { .. })
    }

    /// Builds the typed command for `operation` from a loosely-typed argument
    /// bag. The `Unknown` sentinel and missing required fields are rejected
    /// here, synchronously.
    pub fn from_args(
        operation: ManagementOperation,
        args: &OperationArgs,
    ) -> Result<Self, ClientError> {
        let command = match operation {
            ManagementOperation::Unknown => {
                return Err(ClientError::validation(
                    "refusing to dispatch the unknown operation sentinel",
                ))
            }
            ManagementOperation::CreateDataverse => Command::CreateDataverse {
                dataverse_name: args.require_str(operation, "dataverse_name")?,
                ignore_if_exists: args.flag(operation, "ignore_if_exists")?,
            },
            ManagementOperation::DropDataverse => Command::DropDataverse {
                dataverse_name: args.require_str(operation, "dataverse_name")?,
                ignore_if_not_exists: args.flag(operation, "ignore_if_not_exists")?,
            },
            ManagementOperation::CreateDataset => Command::CreateDataset {
                dataset_name: args.require_str(operation, "dataset_name")?,
                bucket_name: args.require_str(operation, "bucket_name")?,
                dataverse_name: args.optional_str(operation, "dataverse_name")?,
                condition: args.optional_str(operation, "condition")?,
                ignore_if_exists: args.flag(operation, "ignore_if_exists")?,
            },
            ManagementOperation::DropDataset => Command::DropDataset {
                dataset_name: args.require_str(operation, "dataset_name")?,
                dataverse_name: args.optional_str(operation, "dataverse_name")?,
                ignore_if_not_exists: args.flag(operation, "ignore_if_not_exists")?,
            },
            ManagementOperation::CreateIndex => Command::CreateIndex {
                index_name: args.require_str(operation, "index_name")?,
                dataset_name: args.require_str(operation, "dataset_name")?,
                fields: args
                    .optional_string_map(operation, "fields")?
                    .ok_or_else(|| {
                        ClientError::validation(format!("{} requires field 'fields'", operation))
                    })?,
                dataverse_name: args.optional_str(operation, "dataverse_name")?,
                ignore_if_exists: args.flag(operation, "ignore_if_exists")?,
            },
            ManagementOperation::DropIndex => Command::DropIndex {
                index_name: args.require_str(operation, "index_name")?,
                dataset_name: args.require_str(operation, "dataset_name")?,
                dataverse_name: args.optional_str(operation, "dataverse_name")?,
                ignore_if_not_exists: args.flag(operation, "ignore_if_not_exists")?,
            },
            ManagementOperation::GetAllDatasets => Command::GetAllDatasets,
            ManagementOperation::GetAllIndexes => Command::GetAllIndexes,
            ManagementOperation::GetPendingMutations => Command::GetPendingMutations,
            ManagementOperation::LinkCreate => Command::LinkCreate {
                link: LinkDefinition::from_args(operation, args)?,
            },
            ManagementOperation::LinkReplace => Command::LinkReplace {
                link: LinkDefinition::from_args(operation, args)?,
            },
            ManagementOperation::LinkConnect => Command::LinkConnect {
                link_name: args
                    .optional_str(operation, "link_name")?
                    .unwrap_or_else(|| DEFAULT_LINK_NAME.to_string()),
                dataverse_name: args
                    .optional_str(operation, "dataverse_name")?
                    .unwrap_or_else(|| DEFAULT_DATAVERSE_NAME.to_string()),
                force: args.flag(operation, "force")?,
            },
            ManagementOperation::LinkDisconnect => Command::LinkDisconnect {
                link_name: args
                    .optional_str(operation, "link_name")?
                    .unwrap_or_else(|| DEFAULT_LINK_NAME.to_string()),
                dataverse_name: args
                    .optional_str(operation, "dataverse_name")?
                    .unwrap_or_else(|| DEFAULT_DATAVERSE_NAME.to_string()),
            },
            ManagementOperation::DropLink => Command::DropLink {
                link_name: args.require_str(operation, "link_name")?,
                dataverse_name: args.require_str(operation, "dataverse_name")?,
            },
            ManagementOperation::GetAllLinks => Command::GetAllLinks {
                dataverse_name: args.optional_str(operation, "dataverse_name")?,
                link_type: args
                    .optional_str(operation, "link_type")?
                    .map(|token| LinkType::parse_token(&token))
                    .transpose()?,
                name: args.optional_str(operation, "name")?,
            },
        };
        Ok(command)
    }

    /// Shape checks that do not depend on where the command came from. Runs
    /// before submission, so a bad command never reaches the native core.
    pub fn validate(&self) -> Result<(), ClientError> {
        match self {
            Command::CreateDataverse { dataverse_name, .. }
            | Command::DropDataverse { dataverse_name, .. } => {
                require_non_empty(self.name(), "dataverse_name", dataverse_name)
            }
            Command::CreateDataset {
                dataset_name,
                bucket_name,
                ..
            } => {
                require_non_empty(self.name(), "dataset_name", dataset_name)?;
                require_non_empty(self.name(), "bucket_name", bucket_name)
            }
            Command::DropDataset { dataset_name, .. } => {
                require_non_empty(self.name(), "dataset_name", dataset_name)
            }
            Command::CreateIndex {
                index_name,
                dataset_name,
                fields,
                ..
            } => {
                require_non_empty(self.name(), "index_name", index_name)?;
                require_non_empty(self.name(), "dataset_name", dataset_name)?;
                if fields.is_empty() {
                    return Err(ClientError::validation(
                        "create_index requires at least one indexed field",
                    ));
                }
                Ok(())
            }
            Command::DropIndex {
                index_name,
                dataset_name,
                ..
            } => {
                require_non_empty(self.name(), "index_name", index_name)?;
                require_non_empty(self.name(), "dataset_name", dataset_name)
            }
            Command::GetAllDatasets
            | Command::GetAllIndexes
            | Command::GetPendingMutations => Ok(()),
            Command::LinkCreate { link } | Command::LinkReplace { link } => link.validate(),
            Command::LinkConnect {
                link_name,
                dataverse_name,
                ..
            }
            | Command::LinkDisconnect {
                link_name,
                dataverse_name,
            }
            | Command::DropLink {
                link_name,
                dataverse_name,
            } => {
                require_non_empty(self.name(), "link_name", link_name)?;
                require_non_empty(self.name(), "dataverse_name", dataverse_name)
            }
            Command::GetAllLinks {
                dataverse_name,
                name,
                ..
            } => {
                if name.is_some() && dataverse_name.is_none() {
                    return Err(ClientError::validation(
                        "get_all_links: a link name filter requires a dataverse filter",
                    ));
                }
                Ok(())
            }
            Command::AnalyticsQuery { body } => match body.get("statement") {
                Some(Value::String(statement)) if !statement.trim().is_empty() => Ok(()),
                _ => Err(ClientError::validation(
                    "analytics_query requires a non-empty statement",
                )),
            },
        }
    }
}

fn require_non_empty(
    command: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::validation(format!(
            "{} requires a non-empty '{}'",
            command, field
        )));
    }
    Ok(())
}

/// Kinds of links the analytics service can attach to a dataverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Remote,
    S3,
    #[serde(rename = "azureblob")]
    AzureBlob,
}

impl LinkType {
    pub fn as_token(&self) -> &'static str {
        match self {
            LinkType::Remote => "remote",
            LinkType::S3 => "s3",
            LinkType::AzureBlob => "azureblob",
        }
    }

    pub fn parse_token(token: &str) -> Result<Self, ClientError> {
        match token {
            "remote" => Ok(LinkType::Remote),
            "s3" => Ok(LinkType::S3),
            "azureblob" => Ok(LinkType::AzureBlob),
            other => Err(ClientError::validation(format!(
                "invalid link type '{}', expected 'remote', 's3' or 'azureblob'",
                other
            ))),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Wire-level encryption for remote links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkEncryption {
    #[default]
    None,
    Half,
    Full,
}

impl LinkEncryption {
    pub fn as_token(&self) -> &'static str {
        match self {
            LinkEncryption::None => "none",
            LinkEncryption::Half => "half",
            LinkEncryption::Full => "full",
        }
    }

    pub fn parse_token(token: &str) -> Result<Self, ClientError> {
        match token {
            "none" => Ok(LinkEncryption::None),
            "half" => Ok(LinkEncryption::Half),
            "full" => Ok(LinkEncryption::Full),
            other => Err(ClientError::validation(format!(
                "invalid link encryption '{}', expected 'none', 'half' or 'full'",
                other
            ))),
        }
    }
}

/// A link attaching a dataverse to an external data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDefinition {
    pub dataverse_name: String,
    pub link_name: String,
    #[serde(flatten)]
    pub settings: LinkSettings,
}

/// Provider-specific link settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "link_type", rename_all = "snake_case")]
pub enum LinkSettings {
    /// Link to another cluster of the same service.
    Remote {
        hostname: String,
        username: Option<String>,
        password: Option<String>,
        encryption: LinkEncryption,
        certificate: Option<String>,
        client_certificate: Option<String>,
        client_key: Option<String>,
    },
    S3 {
        access_key_id: String,
        secret_access_key: String,
        region: String,
        session_token: Option<String>,
        service_endpoint: Option<String>,
    },
    #[serde(rename = "azureblob")]
    AzureBlob {
        connection_string: Option<String>,
        account_name: Option<String>,
        account_key: Option<String>,
        shared_access_signature: Option<String>,
        blob_endpoint: Option<String>,
        endpoint_suffix: Option<String>,
    },
}

impl LinkSettings {
    pub fn link_type(&self) -> LinkType {
        match self {
            LinkSettings::Remote { .. } => LinkType::Remote,
            LinkSettings::S3 { .. } => LinkType::S3,
            LinkSettings::AzureBlob { .. } => LinkType::AzureBlob,
        }
    }
}

impl LinkDefinition {
    fn from_args(
        operation: ManagementOperation,
        args: &OperationArgs,
    ) -> Result<Self, ClientError> {
        let link_type_token = args.require_str(operation, "link_type")?;
        let link_type = LinkType::parse_token(&link_type_token)?;

        let settings = match link_type {
            LinkType::Remote => LinkSettings::Remote {
                hostname: args.require_str(operation, "hostname")?,
                username: args.optional_str(operation, "username")?,
                password: args.optional_str(operation, "password")?,
                encryption: match args.optional_str(operation, "encryption")? {
                    Some(token) => LinkEncryption::parse_token(&token)?,
                    None => LinkEncryption::default(),
                },
                certificate: args.optional_str(operation, "certificate")?,
                client_certificate: args.optional_str(operation, "client_certificate")?,
                client_key: args.optional_str(operation, "client_key")?,
            },
            LinkType::S3 => LinkSettings::S3 {
                access_key_id: args.require_str(operation, "access_key_id")?,
                secret_access_key: args.require_str(operation, "secret_access_key")?,
                region: args.require_str(operation, "region")?,
                session_token: args.optional_str(operation, "session_token")?,
                service_endpoint: args.optional_str(operation, "service_endpoint")?,
            },
            LinkType::AzureBlob => LinkSettings::AzureBlob {
                connection_string: args.optional_str(operation, "connection_string")?,
                account_name: args.optional_str(operation, "account_name")?,
                account_key: args.optional_str(operation, "account_key")?,
                shared_access_signature: args.optional_str(operation, "shared_access_signature")?,
                blob_endpoint: args.optional_str(operation, "blob_endpoint")?,
                endpoint_suffix: args.optional_str(operation, "endpoint_suffix")?,
            },
        };

        Ok(Self {
            dataverse_name: args.require_str(operation, "dataverse_name")?,
            link_name: args.require_str(operation, "link_name")?,
            settings,
        })
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        require_non_empty("link", "dataverse_name", &self.dataverse_name)?;
        require_non_empty("link", "link_name", &self.link_name)?;

        match &self.settings {
            LinkSettings::Remote {
                hostname,
                username,
                password,
                encryption,
                certificate,
                client_certificate,
                client_key,
            } => {
                require_non_empty("remote link", "hostname", hostname)?;
                match encryption {
                    LinkEncryption::Full => {
                        if certificate.is_none() {
                            return Err(ClientError::validation(
                                "remote link with full encryption requires a certificate",
                            ));
                        }
                        let has_credentials = username.is_some() && password.is_some();
                        let has_client_cert =
                            client_certificate.is_some() && client_key.is_some();
                        if !has_credentials && !has_client_cert {
                            return Err(ClientError::validation(
                                "remote link with full encryption requires credentials or a client certificate and key",
                            ));
                        }
                    }
                    LinkEncryption::None | LinkEncryption::Half => {
                        if username.is_none() || password.is_none() {
                            return Err(ClientError::validation(
                                "remote link requires a username and password",
                            ));
                        }
                    }
                }
                Ok(())
            }
            LinkSettings::S3 {
                access_key_id,
                secret_access_key,
                region,
                ..
            } => {
                require_non_empty("s3 link", "access_key_id", access_key_id)?;
                require_non_empty("s3 link", "secret_access_key", secret_access_key)?;
                require_non_empty("s3 link", "region", region)
            }
            LinkSettings::AzureBlob {
                connection_string,
                account_name,
                account_key,
                shared_access_signature,
                ..
            } => {
                let has_connection_string = connection_string.is_some();
                let has_account_credentials = account_name.is_some()
                    && (account_key.is_some() || shared_access_signature.is_some());
                if !has_connection_string && !has_account_credentials {
                    return Err(ClientError::validation(
                        "azureblob link requires a connection string or account credentials",
                    ));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_link() -> LinkDefinition {
        LinkDefinition {
            dataverse_name: "Default".to_string(),
            link_name: "east".to_string(),
            settings: LinkSettings::Remote {
                hostname: "analytics.east.example.com".to_string(),
                username: Some("admin".to_string()),
                password: Some("hunter2".to_string()),
                encryption: LinkEncryption::None,
                certificate: None,
                client_certificate: None,
                client_key: None,
            },
        }
    }

    #[test]
    fn create_dataset_from_args() {
        let args = OperationArgs::new()
            .with("dataset_name", "reviews")
            .with("bucket_name", "beer-sample")
            .with("ignore_if_exists", true);
        let command =
            Command::from_args(ManagementOperation::CreateDataset, &args).unwrap();
        assert_eq!(
            command,
            Command::CreateDataset {
                dataset_name: "reviews".to_string(),
                bucket_name: "beer-sample".to_string(),
                dataverse_name: None,
                condition: None,
                ignore_if_exists: true,
            }
        );
    }

    #[test]
    fn create_dataset_missing_name_is_a_validation_error() {
        let args = OperationArgs::new().with("bucket_name", "beer-sample");
        let err = Command::from_args(ManagementOperation::CreateDataset, &args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: create_dataset requires field 'dataset_name'"
        );
    }

    #[test]
    fn unknown_sentinel_is_rejected() {
        let err =
            Command::from_args(ManagementOperation::Unknown, &OperationArgs::new()).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn link_connect_defaults() {
        let command =
            Command::from_args(ManagementOperation::LinkConnect, &OperationArgs::new()).unwrap();
        assert_eq!(
            command,
            Command::LinkConnect {
                link_name: "Local".to_string(),
                dataverse_name: "Default".to_string(),
                force: false,
            }
        );
    }

    #[test]
    fn drop_index_requires_dataset_and_index() {
        let args = OperationArgs::new().with("index_name", "by_abv");
        let err = Command::from_args(ManagementOperation::DropIndex, &args).unwrap_err();
        assert!(err.to_string().contains("dataset_name"));
    }

    #[test]
    fn create_index_requires_fields() {
        let command = Command::CreateIndex {
            index_name: "by_abv".to_string(),
            dataset_name: "beers".to_string(),
            fields: BTreeMap::new(),
            dataverse_name: None,
            ignore_if_exists: false,
        };
        let err = command.validate().unwrap_err();
        assert!(err.to_string().contains("at least one indexed field"));
    }

    #[test]
    fn get_all_links_name_filter_needs_dataverse() {
        let command = Command::GetAllLinks {
            dataverse_name: None,
            link_type: None,
            name: Some("east".to_string()),
        };
        assert!(command.validate().is_err());

        let command = Command::GetAllLinks {
            dataverse_name: Some("Default".to_string()),
            link_type: None,
            name: Some("east".to_string()),
        };
        assert!(command.validate().is_ok());
    }

    #[test]
    fn remote_link_from_args_and_validation() {
        let args = OperationArgs::new()
            .with("dataverse_name", "Default")
            .with("link_name", "east")
            .with("link_type", "remote")
            .with("hostname", "analytics.east.example.com")
            .with("username", "admin")
            .with("password", "hunter2");
        let command = Command::from_args(ManagementOperation::LinkCreate, &args).unwrap();
        assert!(command.validate().is_ok());

        match command {
            Command::LinkCreate { link } => {
                assert_eq!(link.settings.link_type(), LinkType::Remote)
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn full_encryption_requires_certificate() {
        let mut link = remote_link();
        if let LinkSettings::Remote { encryption, .. } = &mut link.settings {
            *encryption = LinkEncryption::Full;
        }
        let err = link.validate().unwrap_err();
        assert!(err.to_string().contains("certificate"));
    }

    #[test]
    fn s3_link_requires_region() {
        let args = OperationArgs::new()
            .with("dataverse_name", "Default")
            .with("link_name", "archive")
            .with("link_type", "s3")
            .with("access_key_id", "AKID")
            .with("secret_access_key", "secret");
        let err = Command::from_args(ManagementOperation::LinkCreate, &args).unwrap_err();
        assert!(err.to_string().contains("region"));
    }

    #[test]
    fn azureblob_link_requires_some_credential() {
        let link = LinkDefinition {
            dataverse_name: "Default".to_string(),
            link_name: "blobs".to_string(),
            settings: LinkSettings::AzureBlob {
                connection_string: None,
                account_name: None,
                account_key: None,
                shared_access_signature: None,
                blob_endpoint: None,
                endpoint_suffix: None,
            },
        };
        assert!(link.validate().is_err());
    }

    #[test]
    fn unknown_link_type_token_is_rejected() {
        let args = OperationArgs::new()
            .with("dataverse_name", "Default")
            .with("link_name", "east")
            .with("link_type", "ftp");
        let err = Command::from_args(ManagementOperation::LinkCreate, &args).unwrap_err();
        assert!(err.to_string().contains("invalid link type"));
    }
}
