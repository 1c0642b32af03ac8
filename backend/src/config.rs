use crate::error::ServiceError;
use crate::services::topic_classifier::TopicKeywordTable;
use crate::services::youtube_client::{YouTubeDataApi, DEFAULT_YOUTUBE_API_BASE_URL};
use crate::AppState;
use anyhow::Result;
use env_logger::{Builder, Env};
use lazy_static::lazy_static;
use log::{info, warn};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::sync::Arc;

pub const YOUTUBE_API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Request headers browsers may send cross-origin.
pub const CORS_ALLOWED_HEADERS: [&str; 4] =
    ["authorization", "x-client-info", "apikey", "content-type"];

lazy_static! {
    pub static ref YOUTUBE_API_BASE_URL: String = env::var("YOUTUBE_API_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_YOUTUBE_API_BASE_URL.to_string());
}

/// Name of the environment variable holding the provider key.
///
/// The variable is read on every request so a missing key fails that request
/// instead of the whole process.
#[derive(Debug, Clone)]
pub struct ApiKeySource {
    var_name: String,
}

impl Default for ApiKeySource {
    fn default() -> Self {
        Self::new(YOUTUBE_API_KEY_VAR)
    }
}

impl ApiKeySource {
    pub fn new(var_name: &str) -> Self {
        Self {
            var_name: var_name.to_string(),
        }
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    pub fn resolve(&self) -> Result<String, ServiceError> {
        match env::var(&self.var_name) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ServiceError::MissingCredential(self.var_name.clone())),
        }
    }
}

pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting WaveLearn video backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_app_state() -> Result<AppState> {
    let base_url = &*YOUTUBE_API_BASE_URL;
    info!("Using YouTube Data API at: {base_url}");

    let provider = YouTubeDataApi::new(base_url)?;
    let api_key = ApiKeySource::default();
    if api_key.resolve().is_err() {
        // not fatal: each request reports it
        warn!("{} is not set; video searches will fail", api_key.var_name());
    }

    let topics = TopicKeywordTable::default();
    info!(
        "Loaded {} topics: {}",
        topics.topic_names().count(),
        topics.topic_names().collect::<Vec<_>>().join(", ")
    );

    Ok(AppState {
        provider: Arc::new(provider),
        topics,
        api_key,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&CORS_ALLOWED_HEADERS))
        .allow_credentials(false)
        .send_wildcard(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
