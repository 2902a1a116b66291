//! [`HttpClient`] answering every request with one canned response.

use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use std::sync::Mutex;

use super::HttpClient;

pub struct FakeClient {
    status: StatusCode,
    body: String,
    pub urls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.urls.lock().unwrap().push(req.url().to_string());
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(Response::from(resp))
    }
}
