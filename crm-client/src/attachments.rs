//! Presigned-URL attachment brokering.
//!
//! The backend brokers short-lived storage URLs; bytes never pass
//! through this client. URLs are handed straight to the caller and never
//! cached, since each one expires on its own schedule.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::transport::TransportError;

pub struct AttachmentBroker {
    api: ApiClient,
}

impl AttachmentBroker {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// GET `/attachments/{model}/{id}/presigned-put-url?filename=`: a URL
    /// the caller PUTs the file bytes to directly.
    pub async fn upload_url(
        &self,
        model: &str,
        id: &str,
        filename: &str,
    ) -> Result<String, ClientError> {
        let path = format!("/attachments/{model}/{id}/presigned-put-url");
        let url = self.api.get_text(&path, &[("filename", filename)]).await?;
        Ok(url)
    }

    /// GET `/attachments/{model}/{id}/presigned-get-url?filename=`.
    pub async fn download_url(
        &self,
        model: &str,
        id: &str,
        filename: &str,
    ) -> Result<String, ClientError> {
        let path = format!("/attachments/{model}/{id}/presigned-get-url");
        let url = self.api.get_text(&path, &[("filename", filename)]).await?;
        Ok(url)
    }

    /// GET `/attachments/{model}/{id}`: filenames currently stored for
    /// the instance.
    pub async fn list(&self, model: &str, id: &str) -> Result<Vec<String>, ClientError> {
        let value = self.api.get(&format!("/attachments/{model}/{id}")).await?;
        let names: Vec<String> = serde_json::from_value(value)
            .map_err(TransportError::from)
            .map_err(ClientError::from)?;
        Ok(names)
    }

    /// DELETE `/attachments/{model}/{id}?filename=`: removes the stored
    /// object and the instance's attachment reference.
    pub async fn delete(
        &self,
        model: &str,
        id: &str,
        filename: &str,
    ) -> Result<(), ClientError> {
        let path = format!("/attachments/{model}/{id}");
        self.api
            .delete_with_query(&path, &[("filename", filename)])
            .await?;
        Ok(())
    }
}
