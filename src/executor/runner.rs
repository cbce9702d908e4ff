use std::collections::BTreeMap;

use futures_util::stream::{self, StreamExt};
use hyper::ext::ReasonPhrase;
use reqwest::{
    header::{HeaderMap, AUTHORIZATION},
    Client, Method, Response,
};
use serde_json::Value;
use thiserror::Error;

use crate::batch::RequestDescriptor;

use super::models::{ExecutionResult, ResponseRecord, ResponseStatus, RunnerOptions};

/// Reasons a request produced no HTTP response at all.
#[derive(Debug, Error)]
enum RequestError {
    #[error("invalid HTTP method {0}")]
    InvalidMethod(String),
    #[error("missing request URL")]
    MissingUrl,
    #[error("request URL must be a string, got {0}")]
    InvalidUrl(Value),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub struct BatchRunner {
    client: Client,
    options: RunnerOptions,
}

impl BatchRunner {
    pub fn new(options: RunnerOptions) -> Self {
        Self::with_client(Client::new(), options)
    }

    pub fn with_client(client: Client, options: RunnerOptions) -> Self {
        Self { client, options }
    }

    /// Sends every descriptor at once and waits for all of them to settle.
    ///
    /// `on_progress` is called with `(completed, total)` once per request as
    /// it settles. The returned results follow the order of `descriptors`,
    /// not the order in which responses arrived. A failed request never
    /// stops the batch; it is recorded in its result instead.
    pub async fn run<F>(
        &self,
        descriptors: Vec<RequestDescriptor>,
        mut on_progress: F,
    ) -> Vec<ExecutionResult>
    where
        F: FnMut(usize, usize),
    {
        let total = descriptors.len();
        let mut slots: Vec<Option<ExecutionResult>> = (0..total).map(|_| None).collect();

        // Every request is in flight at once; the limit only matches the batch size.
        let mut settled = stream::iter(descriptors.into_iter().enumerate())
            .map(|(slot, descriptor)| async move { (slot, self.execute(descriptor).await) })
            .buffer_unordered(total.max(1));

        let mut completed = 0;
        while let Some((slot, result)) = settled.next().await {
            slots[slot] = Some(result);
            completed += 1;
            on_progress(completed, total);
        }

        slots.into_iter().flatten().collect()
    }

    async fn execute(&self, descriptor: RequestDescriptor) -> ExecutionResult {
        let response = match self.send(&descriptor).await {
            Ok(response) => response,
            Err(err) => no_response(&error_chain(err)),
        };

        ExecutionResult {
            request: descriptor,
            response,
        }
    }

    async fn send(&self, descriptor: &RequestDescriptor) -> Result<ResponseRecord, RequestError> {
        let method = match &descriptor.method {
            None | Some(Value::Null) => Method::GET,
            Some(Value::String(name)) => {
                let name = name.to_ascii_uppercase();
                Method::from_bytes(name.as_bytes())
                    .map_err(|_| RequestError::InvalidMethod(name))?
            }
            Some(other) => return Err(RequestError::InvalidMethod(other.to_string())),
        };
        let url = match &descriptor.url {
            None | Some(Value::Null) => return Err(RequestError::MissingUrl),
            Some(Value::String(url)) => url.as_str(),
            Some(other) => return Err(RequestError::InvalidUrl(other.clone())),
        };

        let mut request_builder = self.client.request(method, url);

        if let Some(token) = descriptor.bearer_token() {
            request_builder = request_builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        match &descriptor.body {
            Some(Value::String(text)) => {
                request_builder = request_builder.body(text.clone());
            }
            Some(Value::Null) | None => {}
            Some(body) => {
                request_builder = request_builder.json(body);
            }
        }

        if let Some(timeout) = self.options.timeout {
            request_builder = request_builder.timeout(timeout);
        }

        let response = request_builder.send().await?;

        let status = response.status();
        // Non-2xx responses are kept as responses; the error text only fills
        // fields the server left empty.
        let server_error = response
            .error_for_status_ref()
            .err()
            .map(error_chain);
        let reason = reason_phrase(&response);
        let headers = collect_headers(response.headers());
        let bytes = response.bytes().await?;

        let status_text = reason
            .or_else(|| status.canonical_reason().map(str::to_string))
            .or_else(|| server_error.clone())
            .unwrap_or_default();

        let data = if bytes.is_empty() {
            Value::String(server_error.unwrap_or_default())
        } else {
            decode_body(&bytes)
        };

        Ok(ResponseRecord {
            status: ResponseStatus::Code(status.as_u16()),
            status_text,
            data,
            headers,
        })
    }
}

fn no_response(message: &str) -> ResponseRecord {
    ResponseRecord {
        status: ResponseStatus::NotApplicable,
        status_text: message.to_string(),
        data: Value::String(message.to_string()),
        headers: BTreeMap::new(),
    }
}

fn decode_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

/// Reason phrase from the status line, when the server sent one that differs
/// from the standard phrase for its code.
fn reason_phrase(response: &Response) -> Option<String> {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .filter(|reason| !reason.is_empty())
}

fn error_chain<E>(err: E) -> String
where
    E: std::error::Error + Send + Sync + 'static,
{
    format!("{:#}", anyhow::Error::new(err))
}
