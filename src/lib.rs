//! Analytics Service Rust Client
//!
//! Driver-side dispatch layer for the analytics service management and query
//! surface. Argument validation, typed command construction, timeout
//! enforcement and structured error reporting live here; transport,
//! authentication, retries and cluster topology belong to the native client
//! core behind the [`NativeTransport`] boundary.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use analytics_client::{AnalyticsClientBuilder, ClientError};
//! # use analytics_client::{Command, NativeError, NativeTransport};
//! # struct StubCore;
//! # #[async_trait::async_trait]
//! # impl NativeTransport for StubCore {
//! #     async fn execute(&self, _command: Command) -> Result<serde_json::Value, NativeError> {
//! #         Ok(serde_json::json!([]))
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ClientError> {
//!     let client = AnalyticsClientBuilder::new(Arc::new(StubCore)).build();
//!
//!     client.create_dataverse("sales", true).await?;
//!     let datasets = client.get_all_datasets().await?;
//!     println!("Datasets: {:?}", datasets);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod protocol;

pub use client::{
    AnalyticsClient, AnalyticsClientBuilder, AnalyticsQueryOptions, Connection, DispatchOptions,
    NativeTransport, OperationHandle,
};
pub use protocol::{
    operation_catalog, timeout_defaults, AnalyticsDataset, AnalyticsIndex, ClientError, Command,
    LinkDefinition, LinkEncryption, LinkSettings, LinkType, ManagementOperation, MutationState,
    MutationToken, NativeError, OperationArgs, PendingMutations, QueryProfile, ScanConsistency,
};
