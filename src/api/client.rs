use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue},
};

use crate::prelude::*;

/// Build the shared gateway client.
///
/// The gateway sits behind a CDN that serves cached telemetry unless asked
/// not to, hence the `no-cache` pair.
pub fn try_new() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert("Content-Type", HeaderValue::from_static("application/json"));
    headers.insert("Accept", HeaderValue::from_static("application/json"));
    headers.insert("Pragma", HeaderValue::from_static("no-cache"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    Ok(Client::builder()
        .user_agent("sunpoll")
        .default_headers(headers)
        .timeout(Duration::from_secs(10))
        .build()?)
}
