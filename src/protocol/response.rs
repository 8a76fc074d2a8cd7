use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ClientError;

/// Dataset entry as listed by `get_all_datasets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsDataset {
    pub dataset_name: String,
    pub dataverse_name: String,
    pub link_name: String,
    pub bucket_name: String,
}

/// Index entry as listed by `get_all_indexes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsIndex {
    pub index_name: String,
    pub dataset_name: String,
    pub dataverse_name: String,
    pub is_primary: bool,
}

/// Outstanding mutation counts keyed by `dataverse.dataset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMutations(pub BTreeMap<String, u64>);

impl PendingMutations {
    pub fn remaining(&self, dataverse_name: &str, dataset_name: &str) -> Option<u64> {
        self.0
            .get(&format!("{}.{}", dataverse_name, dataset_name))
            .copied()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

/// Decodes a native payload into a typed response.
pub(crate) fn decode_payload<T>(data: Value, what: &str) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(data)
        .map_err(|e| ClientError::Protocol(format!("invalid {} payload: {}", what, e)))
}
