mod command;
mod error;
mod operations;
mod response;
mod types;

pub use command::{
    Command, LinkDefinition, LinkEncryption, LinkSettings, LinkType, DEFAULT_DATAVERSE_NAME,
    DEFAULT_LINK_NAME,
};
pub use error::{ClientError, NativeError};
pub use operations::{operation_catalog, ManagementOperation, OperationArgs};
pub use response::{AnalyticsDataset, AnalyticsIndex, PendingMutations};
pub use types::{MutationState, MutationToken, QueryProfile, ScanConsistency};

pub(crate) use response::decode_payload;

/// Process-wide operation timeout defaults.
pub mod timeout_defaults {
    use std::time::Duration;

    /// Default bound for management operations.
    pub const MANAGEMENT: Duration = Duration::from_secs(75);
    /// Default bound for analytics queries.
    pub const QUERY: Duration = Duration::from_secs(75);
}
