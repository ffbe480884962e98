// Scripted HTTP transport.
//
// Responses are queued per URL and served in FIFO order. The last queued
// response for a URL is repeated once the queue drains, so a single scripted
// reply covers any number of calls. Unscripted URLs get a 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use socialite_core::http::Query;
use socialite_core::{HttpClient, HttpResponse, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// A request observed by `MockHttpClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: RequestMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RecordedRequest {
    /// Value of a query parameter, if sent.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response for `url`.
    pub fn respond(self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a 200 JSON response for `url`.
    pub fn respond_json(self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.respond(url, HttpResponse::json(&body))
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for one URL.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url == url)
            .collect()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.requests_to(url).len()
    }

    fn record(&self, request: RecordedRequest) -> HttpResponse {
        let response = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(&request.url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        self.requests.lock().unwrap().push(request);
        response.unwrap_or_else(|| HttpResponse::new(404, "not scripted"))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, query: &Query) -> Result<HttpResponse> {
        Ok(self.record(RecordedRequest {
            method: RequestMethod::Get,
            url: url.to_string(),
            query: query.to_vec(),
            body: None,
        }))
    }

    async fn post_json(
        &self,
        url: &str,
        query: &Query,
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        Ok(self.record(RecordedRequest {
            method: RequestMethod::Post,
            url: url.to_string(),
            query: query.to_vec(),
            body: Some(body.clone()),
        }))
    }
}
