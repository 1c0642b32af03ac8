#[macro_use]
extern crate rocket;

mod api;
mod config;
mod error;
mod models;
mod services;
mod utils;

use crate::config::{create_app_state, create_cors, init_logger, load_environment, ApiKeySource};
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::topic_classifier::TopicKeywordTable;
use crate::services::youtube_client::VideoProvider;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket};
use std::sync::Arc;

pub struct AppState {
    pub provider: Arc<dyn VideoProvider>,
    pub topics: TopicKeywordTable,
    pub api_key: ApiKeySource,
}

#[get("/")]
fn index() -> &'static str {
    "WaveLearn video backend"
}

#[get("/health")]
fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[catch(default)]
fn default_catcher(status: Status, request: &Request<'_>) -> ErrorResponse {
    ErrorResponse::new(
        status,
        format!("{} {}: {}", request.method(), request.uri(), status),
    )
}

pub fn build_rocket(state: AppState) -> anyhow::Result<Rocket<Build>> {
    let cors = create_cors()?;

    Ok(rocket::build()
        .manage(state)
        .mount("/", routes![index, health])
        .mount(
            "/fetch-youtube-videos",
            routes![
                api::fetch_youtube_videos,
                api::fetch_youtube_videos_preflight
            ],
        )
        .register("/", catchers![default_catcher])
        .attach(cors))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let state = create_app_state()?;
    let _rocket = build_rocket(state)?
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {e}"))?;

    Ok(())
}
