//! Chart rendering via the QuickChart web service.
//!
//! POSTs the model-authored Chart.js configuration to the renderer and
//! returns the PNG it sends back. The request timeout lives here; the
//! pipeline treats the whole call as one blocking collaborator operation.

use std::time::Duration;

use serde_json::json;

use crate::types::{Artifact, FileKind};

use super::EncodeError;

const QUICKCHART_URL: &str = "https://quickchart.io/chart";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const CHART_WIDTH: u32 = 800;
const CHART_HEIGHT: u32 = 450;

pub struct ChartClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl ChartClient {
    pub fn new() -> Self {
        Self::with_endpoint(QUICKCHART_URL)
    }

    /// Point at a different renderer (self-hosted QuickChart, test server).
    pub fn with_endpoint(endpoint: &str) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("static client configuration");
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }

    /// Render the chart configuration to a PNG artifact.
    pub fn render_png(
        &self,
        config: &serde_json::Value,
        name: &str,
    ) -> Result<Artifact, EncodeError> {
        let body = json!({
            "chart": config,
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
            "format": "png",
            "backgroundColor": "white",
        });

        let response = self.http.post(&self.endpoint).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(EncodeError::ChartService(status.as_u16()));
        }

        let bytes = response.bytes()?.to_vec();
        log::debug!("chart: rendered '{}' ({} bytes)", name, bytes.len());
        Ok(Artifact::generated(FileKind::Chart, name, bytes))
    }
}

impl Default for ChartClient {
    fn default() -> Self {
        Self::new()
    }
}
