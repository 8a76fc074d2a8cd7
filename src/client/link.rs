use super::AnalyticsClient;
use crate::protocol::{
    decode_payload, ClientError, Command, LinkDefinition, LinkType, DEFAULT_DATAVERSE_NAME,
    DEFAULT_LINK_NAME,
};

impl AnalyticsClient {
    pub async fn create_link(&self, link: LinkDefinition) -> Result<(), ClientError> {
        self.execute(Command::LinkCreate { link }).await?;
        Ok(())
    }

    pub async fn replace_link(&self, link: LinkDefinition) -> Result<(), ClientError> {
        self.execute(Command::LinkReplace { link }).await?;
        Ok(())
    }

    pub async fn drop_link(
        &self,
        link_name: &str,
        dataverse_name: &str,
    ) -> Result<(), ClientError> {
        self.execute(Command::DropLink {
            link_name: link_name.to_string(),
            dataverse_name: dataverse_name.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Connects a link; `None` selects the `Local` link in the `Default`
    /// dataverse.
    pub async fn connect_link(
        &self,
        link_name: Option<&str>,
        dataverse_name: Option<&str>,
        force: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::LinkConnect {
            link_name: link_name.unwrap_or(DEFAULT_LINK_NAME).to_string(),
            dataverse_name: dataverse_name.unwrap_or(DEFAULT_DATAVERSE_NAME).to_string(),
            force,
        })
        .await?;
        Ok(())
    }

    pub async fn disconnect_link(
        &self,
        link_name: Option<&str>,
        dataverse_name: Option<&str>,
    ) -> Result<(), ClientError> {
        self.execute(Command::LinkDisconnect {
            link_name: link_name.unwrap_or(DEFAULT_LINK_NAME).to_string(),
            dataverse_name: dataverse_name.unwrap_or(DEFAULT_DATAVERSE_NAME).to_string(),
        })
        .await?;
        Ok(())
    }

    /// Lists links, optionally filtered. A `name` filter requires a
    /// `dataverse_name` filter.
    pub async fn get_all_links(
        &self,
        dataverse_name: Option<&str>,
        link_type: Option<LinkType>,
        name: Option<&str>,
    ) -> Result<Vec<LinkDefinition>, ClientError> {
        let payload = self
            .execute(Command::GetAllLinks {
                dataverse_name: dataverse_name.map(str::to_string),
                link_type,
                name: name.map(str::to_string),
            })
            .await?;
        decode_payload(payload, "link list")
    }
}
