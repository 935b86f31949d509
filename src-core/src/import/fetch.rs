//! Sheet download over HTTP

use super::sheet_link::derive_csv_url;
use super::ImportError;

pub struct SheetFetcher {
    client: reqwest::Client,
    export_template: String,
}

impl SheetFetcher {
    pub fn new(export_template: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            export_template: export_template.to_string(),
        }
    }

    pub fn csv_url(&self, link: &str) -> String {
        derive_csv_url(link, &self.export_template)
    }

    /// Download the CSV body behind a spreadsheet link
    pub async fn fetch_csv(&self, link: &str) -> Result<String, ImportError> {
        let url = self.csv_url(link);
        log::info!("Fetching sheet from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ImportError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ImportError::Fetch(e.to_string()))?;
        log::debug!("Sheet download returned {} bytes", body.len());
        Ok(body)
    }
}
