pub mod statement;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use statement::Statement;
use std::time::Duration;

/// Result of the `about` handshake with the statement store.
#[derive(Debug, Clone)]
pub struct About {
    pub versions: Vec<String>,
}

/// Narrow seam over the remote statement store: one connectivity check and
/// one batched submission call.
pub trait StatementStore {
    fn about(&self) -> Result<About>;
    fn save_statements(&self, statements: &[Statement]) -> Result<()>;
}

/// Blocking HTTP client for an xAPI LRS endpoint with basic auth.
pub struct RemoteLrs {
    endpoint: String,
    version: String,
    username: String,
    password: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct AboutBody {
    version: Vec<String>,
}

impl RemoteLrs {
    pub fn new(endpoint: &str, version: &str, username: &str, password: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("build http client")?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            version: version.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            client,
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{resource}", self.endpoint)
    }
}

impl StatementStore for RemoteLrs {
    fn about(&self) -> Result<About> {
        let response = self
            .client
            .get(self.url("about"))
            .basic_auth(&self.username, Some(&self.password))
            .header("X-Experience-API-Version", &self.version)
            .send()
            .with_context(|| format!("request {}", self.url("about")))?;
        let status = response.status();
        if !status.is_success() {
            bail!("about returned {status}");
        }
        let body: AboutBody = response.json().context("parse about response")?;
        Ok(About {
            versions: body.version,
        })
    }

    fn save_statements(&self, statements: &[Statement]) -> Result<()> {
        let response = self
            .client
            .post(self.url("statements"))
            .basic_auth(&self.username, Some(&self.password))
            .header("X-Experience-API-Version", &self.version)
            .json(statements)
            .send()
            .with_context(|| format!("request {}", self.url("statements")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("statements returned {status}: {body}");
        }
        Ok(())
    }
}
