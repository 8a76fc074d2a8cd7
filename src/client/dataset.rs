use super::AnalyticsClient;
use crate::protocol::{decode_payload, AnalyticsDataset, ClientError, Command};

impl AnalyticsClient {
    pub async fn create_dataset(
        &self,
        dataset_name: &str,
        bucket_name: &str,
        dataverse_name: Option<&str>,
        condition: Option<&str>,
        ignore_if_exists: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::CreateDataset {
            dataset_name: dataset_name.to_string(),
            bucket_name: bucket_name.to_string(),
            dataverse_name: dataverse_name.map(str::to_string),
            condition: condition.map(str::to_string),
            ignore_if_exists,
        })
        .await?;
        Ok(())
    }

    pub async fn drop_dataset(
        &self,
        dataset_name: &str,
        dataverse_name: Option<&str>,
        ignore_if_not_exists: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::DropDataset {
            dataset_name: dataset_name.to_string(),
            dataverse_name: dataverse_name.map(str::to_string),
            ignore_if_not_exists,
        })
        .await?;
        Ok(())
    }

    pub async fn get_all_datasets(&self) -> Result<Vec<AnalyticsDataset>, ClientError> {
        let payload = self.execute(Command::GetAllDatasets).await?;
        decode_payload(payload, "dataset list")
    }
}
