use std::time::Duration;

use serde::Deserialize;

fn default_host() -> String {
    String::from("127.0.0.1")
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> String {
    String::from("public")
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_pages() -> usize {
    50
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Root of the Prismic REST API, e.g. https://spacetraveling.cdn.prismic.io/api/v2
    pub prismic_api_endpoint: String,
    pub prismic_access_token: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_in_sec: u64,
    /// Upper bound for `/?pages=N`, every page is one request to the content API.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Config {
    /// Time left to the content API within one request. Stays below the
    /// server timeout so a slow page still leaves room to render.
    pub fn content_api_budget(&self) -> Duration {
        Duration::from_millis(self.request_timeout_in_sec * 800)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_endpoint(endpoint: &str) -> Self {
        Config {
            prismic_api_endpoint: endpoint.to_string(),
            prismic_access_token: None,
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
            request_timeout_in_sec: default_request_timeout(),
            max_pages: default_max_pages(),
        }
    }
}
