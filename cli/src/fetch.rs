#![deny(missing_docs)]

//! # Remote Documents
//!
//! Downloads documents given as `http(s)://` URLs. The HTTP client is only compiled in
//! with the `client` feature.

use crate::error::{CliError, CliResult};
use serde_json::Value;

/// Request options for remote documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// HTTP method, upper-cased.
    pub method: String,
    /// Extra request headers, in the order given.
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    /// Builds options from the raw flag values.
    ///
    /// `headers_object` is a JSON object; `headers` are `key: value` strings. `auth` becomes
    /// the `Authorization` header.
    pub fn from_flags(
        method: &str,
        auth: Option<&str>,
        headers_object: Option<&str>,
        headers: &[String],
    ) -> CliResult<Self> {
        let mut collected = Vec::new();
        if let Some(object) = headers_object {
            let parsed: Value = serde_json::from_str(object)
                .map_err(|e| CliError::General(format!("Invalid --headers-object: {}", e)))?;
            let Value::Object(map) = parsed else {
                return Err(CliError::General(
                    "--headers-object must be a JSON object".to_string(),
                ));
            };
            for (key, value) in map {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                collected.push((key, value));
            }
        }
        for header in headers {
            collected.push(parse_header(header)?);
        }
        if let Some(token) = auth {
            collected.push(("Authorization".to_string(), token.to_string()));
        }
        Ok(Self {
            method: method.to_ascii_uppercase(),
            headers: collected,
        })
    }
}

/// Parses `key: value`.
fn parse_header(raw: &str) -> CliResult<(String, String)> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::General(format!("Invalid header '{}': expected 'key: value'", raw)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::General(format!("Invalid header '{}': empty name", raw)));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Downloads `url` as text.
#[cfg(feature = "client")]
pub fn fetch(url: &str, options: &FetchOptions) -> CliResult<String> {
    fn with_headers<B>(
        mut request: ureq::RequestBuilder<B>,
        options: &FetchOptions,
    ) -> ureq::RequestBuilder<B> {
        for (key, value) in &options.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        request
    }

    tracing::info!(url, method = %options.method, "fetching document");
    let agent = ureq::Agent::new_with_defaults();
    let response = match options.method.as_str() {
        "" | "GET" => with_headers(agent.get(url), options).call(),
        "HEAD" => with_headers(agent.head(url), options).call(),
        "DELETE" => with_headers(agent.delete(url), options).call(),
        "OPTIONS" => with_headers(agent.options(url), options).call(),
        "TRACE" => with_headers(agent.trace(url), options).call(),
        "POST" => with_headers(agent.post(url), options).send_empty(),
        "PUT" => with_headers(agent.put(url), options).send_empty(),
        "PATCH" => with_headers(agent.patch(url), options).send_empty(),
        other => {
            return Err(CliError::Fetch(format!(
                "Unsupported HTTP method '{}'",
                other
            )))
        }
    };
    let mut response = response.map_err(|e| CliError::Fetch(format!("{}: {}", url, e)))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| CliError::Fetch(format!("{}: {}", url, e)))
}

/// Downloads `url` as text.
#[cfg(not(feature = "client"))]
pub fn fetch(url: &str, _options: &FetchOptions) -> CliResult<String> {
    Err(CliError::Fetch(format!(
        "{}: built without the `client` feature",
        url
    )))
}
