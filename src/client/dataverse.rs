use super::AnalyticsClient;
use crate::protocol::{decode_payload, ClientError, Command, PendingMutations};

impl AnalyticsClient {
    pub async fn create_dataverse(
        &self,
        dataverse_name: &str,
        ignore_if_exists: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::CreateDataverse {
            dataverse_name: dataverse_name.to_string(),
            ignore_if_exists,
        })
        .await?;
        Ok(())
    }

    pub async fn drop_dataverse(
        &self,
        dataverse_name: &str,
        ignore_if_not_exists: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::DropDataverse {
            dataverse_name: dataverse_name.to_string(),
            ignore_if_not_exists,
        })
        .await?;
        Ok(())
    }

    /// Outstanding mutation counts per dataset, keyed `dataverse.dataset`.
    pub async fn get_pending_mutations(&self) -> Result<PendingMutations, ClientError> {
        let payload = self.execute(Command::GetPendingMutations).await?;
        decode_payload(payload, "pending mutations")
    }
}
