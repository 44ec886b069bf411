use crate::error::{ClientError, Result};
use crate::response::{PredictResponse, RetrainResponse};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// The remote side of the analysis tool. Implemented by [`ClassifierClient`]
/// over HTTP; controllers are generic over it so they can be driven by
/// a scripted classifier in tests.
pub trait Classifier {
    fn predict(&self, url: &str) -> impl Future<Output = Result<PredictResponse>> + Send;
    fn retrain(&self) -> impl Future<Output = Result<RetrainResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct ClassifierClient {
    client: Client,
    base_url: Url,
}

impl ClassifierClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, 30)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("PhishLens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", path, e)))
    }

    /// Reads the body as text and lets `decode` interpret it. A body that
    /// cannot be interpreted is reported as a status error when the server
    /// also answered with a non-success code.
    async fn read_body<T>(
        response: reqwest::Response,
        decode: impl FnOnce(&str) -> std::result::Result<T, String>,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        match decode(&body) {
            Ok(value) => Ok(value),
            Err(e) if !status.is_success() => {
                warn!("Server answered {} with an unreadable body: {}", status, e);
                Err(ClientError::Status(status.as_u16()))
            }
            Err(e) => Err(ClientError::Decode(e)),
        }
    }
}

impl Classifier for ClassifierClient {
    async fn predict(&self, url: &str) -> Result<PredictResponse> {
        let endpoint = self.endpoint("predict")?;
        info!("Submitting {} for analysis", url);

        let response = self
            .client
            .post(endpoint)
            .form(&[("url", url)])
            .send()
            .await?;

        let parsed = Self::read_body(response, PredictResponse::from_json).await?;
        debug!("Predict response: {:?}", parsed);
        Ok(parsed)
    }

    async fn retrain(&self) -> Result<RetrainResponse> {
        let endpoint = self.endpoint("retrain")?;
        info!("Requesting model retrain");

        let response = self.client.post(endpoint).send().await?;
        Self::read_body(response, |body| {
            serde_json::from_str::<RetrainResponse>(body)
                .map_err(|e| format!("invalid retrain body: {}", e))
        })
        .await
    }
}

/// Parses the server base and makes sure endpoint paths are joined below
/// it rather than replacing its last segment.
fn normalize_base(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
