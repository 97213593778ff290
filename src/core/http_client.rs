use std::time::Duration;

use crate::error::FetchError;

/// Connection-pool settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpPoolConfig {
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub default_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
    pub http2_enabled: bool,
}

impl Default for HttpPoolConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            default_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(60)),
            http2_enabled: true,
        }
    }
}

/// Owns the pooled `reqwest` client used for dynamic-value fetches.
#[derive(Debug)]
pub struct HttpClientProvider {
    client: reqwest::Client,
    config: HttpPoolConfig,
}

impl HttpClientProvider {
    pub fn new(config: HttpPoolConfig) -> Result<Self, FetchError> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_client(config: &HttpPoolConfig) -> Result<reqwest::Client, FetchError> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .timeout(config.default_timeout);

        if !config.http2_enabled {
            builder = builder.http1_only();
        }

        builder
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))
    }

    pub fn client(&self) -> reqwest::Client {
        self.client.clone()
    }

    pub fn config(&self) -> &HttpPoolConfig {
        &self.config
    }
}
