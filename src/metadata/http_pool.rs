use std::time::Duration;
use reqwest::{Client, ClientBuilder, Proxy};
use crate::config::AppConfig;
use crate::errors::Result;

const USER_AGENT: &str = concat!("playlist-downloader/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client settings for catalog requests
pub struct HttpPool {
    client: Client,
}

impl HttpPool {
    pub fn new(timeout: Duration, proxy_url: Option<&str>) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .gzip(true)
            .brotli(true)
            .tcp_keepalive(Duration::from_secs(60));

        if let Some(proxy_url) = proxy_url {
            log::info!("Using proxy for catalog requests: {}", proxy_url);
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.request_timeout(), config.proxy.as_deref())
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_proxy_is_rejected() {
        assert!(HttpPool::new(Duration::from_secs(5), Some("not a proxy url")).is_err());
    }

    #[test]
    fn test_builds_from_default_config() {
        assert!(HttpPool::from_config(&AppConfig::default()).is_ok());
    }
}
