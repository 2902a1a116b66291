use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("S85.Berlin/", env!("CARGO_PKG_VERSION"));

/// Plain `reqwest` client with a per-request timeout and our user agent.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
