use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub vision_model: String,
    pub analysis_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    pub worker: WorkerConfig,
    pub search_result_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_or(std::env::var("APP_PORT").ok(), 8080);
        let openai = OpenAiConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            vision_model: std::env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
            analysis_model: std::env::var("OPENAI_ANALYSIS_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".into()),
        };
        let worker = WorkerConfig {
            concurrency: parse_or(std::env::var("WORKER_CONCURRENCY").ok(), 3),
            poll_interval_ms: parse_or(std::env::var("WORKER_POLL_INTERVAL_MS").ok(), 2000),
        };
        let search_result_limit = parse_or(std::env::var("SEARCH_RESULT_LIMIT").ok(), 50);
        Ok(Self {
            database_url,
            host,
            port,
            openai,
            worker,
            search_result_limit,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid APP_HOST/APP_PORT: {}:{}", self.host, self.port))
    }
}

/// Positive numeric setting, falling back on absent, unparsable or zero values.
fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + PartialEq + Default,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v != T::default())
        .unwrap_or(default)
}
