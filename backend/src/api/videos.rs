use crate::config::CORS_ALLOWED_HEADERS;
use crate::error::ServiceError;
use crate::models::{ErrorResponse, VideoSearchRequest, VideosResponse};
use crate::services::search_service::search_videos;
use crate::AppState;
use log::error;
use rocket::http::Header;
use rocket::serde::json::{self, Json};
use rocket::{options, post, Responder, State};

#[post("/", data = "<request>")]
pub async fn fetch_youtube_videos(
    request: Result<Json<VideoSearchRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Json<VideosResponse>, ErrorResponse> {
    let request = request
        .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?
        .into_inner();

    match search_videos(
        state.provider.as_ref(),
        &state.topics,
        &state.api_key,
        &request,
    )
    .await
    {
        Ok(videos) => Ok(Json(VideosResponse { videos })),
        Err(e) => {
            error!("Error in fetch-youtube-videos: {e}");
            Err(e.into())
        }
    }
}

/// Empty 204 that always carries the permissive CORS headers, even when the
/// request has no `Origin` and the CORS fairing leaves it alone.
#[derive(Responder)]
#[response(status = 204)]
pub struct Preflight {
    inner: (),
    allow_origin: Header<'static>,
    allow_headers: Header<'static>,
}

impl Default for Preflight {
    fn default() -> Self {
        Self {
            inner: (),
            allow_origin: Header::new("Access-Control-Allow-Origin", "*"),
            allow_headers: Header::new(
                "Access-Control-Allow-Headers",
                CORS_ALLOWED_HEADERS.join(", "),
            ),
        }
    }
}

#[options("/")]
pub fn fetch_youtube_videos_preflight() -> Preflight {
    Preflight::default()
}
