use std::collections::BTreeMap;

use super::AnalyticsClient;
use crate::protocol::{decode_payload, AnalyticsIndex, ClientError, Command};

impl AnalyticsClient {
    /// `fields` maps field names to their analytics types, e.g.
    /// `"abv" -> "double"`.
    pub async fn create_index(
        &self,
        index_name: &str,
        dataset_name: &str,
        fields: BTreeMap<String, String>,
        dataverse_name: Option<&str>,
        ignore_if_exists: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::CreateIndex {
            index_name: index_name.to_string(),
            dataset_name: dataset_name.to_string(),
            fields,
            dataverse_name: dataverse_name.map(str::to_string),
            ignore_if_exists,
        })
        .await?;
        Ok(())
    }

    pub async fn drop_index(
        &self,
        index_name: &str,
        dataset_name: &str,
        dataverse_name: Option<&str>,
        ignore_if_not_exists: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::DropIndex {
            index_name: index_name.to_string(),
            dataset_name: dataset_name.to_string(),
            dataverse_name: dataverse_name.map(str::to_string),
            ignore_if_not_exists,
        })
        .await?;
        Ok(())
    }

    pub async fn get_all_indexes(&self) -> Result<Vec<AnalyticsIndex>, ClientError> {
        let payload = self.execute(Command::GetAllIndexes).await?;
        decode_payload(payload, "index list")
    }
}
