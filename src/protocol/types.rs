use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::ClientError;

/// How strongly a query result must reflect prior writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanConsistency {
    #[default]
    NotBounded,
    RequestPlus,
}

impl ScanConsistency {
    pub fn as_token(&self) -> &'static str {
        match self {
            ScanConsistency::NotBounded => "not_bounded",
            ScanConsistency::RequestPlus => "request_plus",
        }
    }

    pub fn parse_token(token: &str) -> Result<Self, ClientError> {
        match token {
            "not_bounded" => Ok(ScanConsistency::NotBounded),
            "request_plus" => Ok(ScanConsistency::RequestPlus),
            other => Err(ClientError::validation(format!(
                "invalid scan consistency '{}', expected 'not_bounded' or 'request_plus'",
                other
            ))),
        }
    }
}

impl fmt::Display for ScanConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Query profiling verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryProfile {
    #[default]
    Off,
    Phases,
    Timings,
}

impl QueryProfile {
    pub fn as_token(&self) -> &'static str {
        match self {
            QueryProfile::Off => "off",
            QueryProfile::Phases => "phases",
            QueryProfile::Timings => "timings",
        }
    }

    pub fn parse_token(token: &str) -> Result<Self, ClientError> {
        match token {
            "off" => Ok(QueryProfile::Off),
            "phases" => Ok(QueryProfile::Phases),
            "timings" => Ok(QueryProfile::Timings),
            other => Err(ClientError::validation(format!(
                "invalid profile mode '{}', expected 'off', 'phases' or 'timings'",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Marker for a single write's position in a partition's change sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationToken {
    pub bucket_name: String,
    pub partition_id: u16,
    pub partition_uuid: u64,
    pub sequence_number: u64,
}

/// Ordered collection of mutation tokens used to bound query consistency to
/// prior writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationState(Vec<MutationToken>);

impl MutationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: MutationToken) {
        self.0.push(token);
    }

    pub fn tokens(&self) -> &[MutationToken] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes a JSON array of mutation tokens, preserving order.
    pub fn decode(value: Value) -> Result<Self, ClientError> {
        let tokens: Vec<MutationToken> = serde_json::from_value(value).map_err(|e| {
            ClientError::validation(format!("invalid mutation state: {}", e))
        })?;
        Ok(Self(tokens))
    }

    /// Encodes the state into the scan-vector form the native query body
    /// expects: one entry per bucket, keyed by partition id, holding
    /// `[sequence_number, partition_uuid]`. When two tokens address the same
    /// partition, the higher sequence number wins.
    pub fn to_scan_vectors(&self) -> Map<String, Value> {
        let mut buckets: BTreeMap<&str, BTreeMap<u16, (u64, u64)>> = BTreeMap::new();
        for token in &self.0 {
            let partitions = buckets.entry(token.bucket_name.as_str()).or_default();
            let entry = partitions
                .entry(token.partition_id)
                .or_insert((token.sequence_number, token.partition_uuid));
            if token.sequence_number > entry.0 {
                *entry = (token.sequence_number, token.partition_uuid);
            }
        }

        let mut out = Map::new();
        for (bucket, partitions) in buckets {
            let mut vector = Map::new();
            for (partition, (seqno, uuid)) in partitions {
                vector.insert(
                    partition.to_string(),
                    json!([seqno, uuid.to_string()]),
                );
            }
            out.insert(bucket.to_string(), Value::Object(vector));
        }
        out
    }
}

impl FromIterator<MutationToken> for MutationState {
    fn from_iter<I: IntoIterator<Item = MutationToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(bucket: &str, partition: u16, uuid: u64, seqno: u64) -> MutationToken {
        MutationToken {
            bucket_name: bucket.to_string(),
            partition_id: partition,
            partition_uuid: uuid,
            sequence_number: seqno,
        }
    }

    #[test]
    fn scan_consistency_round_trips() {
        for consistency in [ScanConsistency::NotBounded, ScanConsistency::RequestPlus] {
            assert_eq!(
                ScanConsistency::parse_token(consistency.as_token()).unwrap(),
                consistency
            );
        }
    }

    #[test]
    fn bogus_consistency_is_an_error_not_a_default() {
        let err = ScanConsistency::parse_token("bogus").unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn profile_modes_round_trip() {
        for profile in [QueryProfile::Off, QueryProfile::Phases, QueryProfile::Timings] {
            assert_eq!(QueryProfile::parse_token(profile.as_token()).unwrap(), profile);
        }
        assert!(QueryProfile::parse_token("verbose").is_err());
    }

    #[test]
    fn decode_preserves_token_order() {
        let value = serde_json::json!([
            {"bucket_name": "beers", "partition_id": 7, "partition_uuid": 11, "sequence_number": 3},
            {"bucket_name": "beers", "partition_id": 1, "partition_uuid": 12, "sequence_number": 9},
        ]);
        let state = MutationState::decode(value).unwrap();
        assert_eq!(state.tokens().len(), 2);
        assert_eq!(state.tokens()[0].partition_id, 7);
        assert_eq!(state.tokens()[1].partition_id, 1);
    }

    #[test]
    fn decode_rejects_malformed_tokens() {
        let err = MutationState::decode(serde_json::json!([{"bucket_name": "beers"}])).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn scan_vectors_group_by_bucket_and_keep_highest_seqno() {
        let state: MutationState = [
            token("beers", 8, 100, 4),
            token("beers", 8, 100, 9),
            token("beers", 3, 200, 1),
            token("wines", 8, 300, 2),
        ]
        .into_iter()
        .collect();

        let vectors = state.to_scan_vectors();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors["beers"]["8"], serde_json::json!([9, "100"]));
        assert_eq!(vectors["beers"]["3"], serde_json::json!([1, "200"]));
        assert_eq!(vectors["wines"]["8"], serde_json::json!([2, "300"]));
    }
}
