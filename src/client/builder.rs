use std::sync::Arc;
use std::time::Duration;

use crate::protocol::timeout_defaults;

use super::{AnalyticsClient, Connection, NativeTransport};

/// Builder for [`AnalyticsClient`].
pub struct AnalyticsClientBuilder {
    transport: Arc<dyn NativeTransport>,
    management_timeout: Duration,
    query_timeout: Duration,
}

impl AnalyticsClientBuilder {
    pub fn new(transport: Arc<dyn NativeTransport>) -> Self {
        Self {
            transport,
            management_timeout: timeout_defaults::MANAGEMENT,
            query_timeout: timeout_defaults::QUERY,
        }
    }

    /// Default bound for management operations dispatched without an explicit
    /// timeout.
    pub fn management_timeout(mut self, timeout: Duration) -> Self {
        self.management_timeout = timeout;
        self
    }

    /// Default bound for analytics queries dispatched without an explicit
    /// timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn build(self) -> AnalyticsClient {
        AnalyticsClient::from_parts(
            Connection::new(self.transport),
            self.management_timeout,
            self.query_timeout,
        )
    }
}
