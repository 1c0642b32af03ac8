use crate::config::ApiKeySource;
use crate::error::ServiceError;
use crate::models::{VideoRecord, VideoSearchRequest};
use crate::services::ranking::{calculate_score, estimate_difficulty};
use crate::services::topic_classifier::TopicKeywordTable;
use crate::services::youtube_client::{SearchItem, VideoDetails, VideoProvider};
use crate::utils::{compare_desc, format_duration, upload_date};
use log::info;
use std::collections::HashMap;

pub const DEFAULT_QUERY: &str = "wireless communication tutorial";
pub const DEFAULT_MAX_RESULTS: u32 = 20;
/// Largest page the search endpoint accepts.
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// Topic value meaning "no topic filter".
const ALL_TOPICS: &str = "All";

/// Search text sent to the provider: the query (or a default phrase) with the
/// topic hint appended.
pub fn build_search_query(query: Option<&str>, topic: Option<&str>) -> String {
    let mut search_query = match query {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => DEFAULT_QUERY.to_string(),
    };

    if let Some(topic) = topic {
        if !topic.is_empty() && topic != ALL_TOPICS {
            search_query.push(' ');
            search_query.push_str(topic);
        }
    }

    search_query
}

pub fn effective_max_results(max_results: Option<u32>) -> u32 {
    max_results
        .unwrap_or(DEFAULT_MAX_RESULTS)
        .clamp(1, MAX_RESULTS_LIMIT)
}

/// Search, enrich with statistics, classify and rank.
///
/// At most two provider calls are made, in order. Zero search hits returns an
/// empty list without touching the statistics endpoint.
pub async fn search_videos(
    provider: &dyn VideoProvider,
    topics: &TopicKeywordTable,
    api_key: &ApiKeySource,
    request: &VideoSearchRequest,
) -> Result<Vec<VideoRecord>, ServiceError> {
    let api_key = api_key.resolve()?;

    let search_query = build_search_query(request.query.as_deref(), request.topic.as_deref());
    let max_results = effective_max_results(request.max_results);
    info!("Searching YouTube for: {search_query}");

    let items: Vec<SearchItem> = provider
        .search(&api_key, &search_query, max_results)
        .await?
        .into_iter()
        .filter(|item| item.id.video_id.as_deref().is_some_and(|id| !id.is_empty()))
        .collect();

    if items.is_empty() {
        info!("No videos found for: {search_query}");
        return Ok(Vec::new());
    }

    let video_ids: Vec<String> = items
        .iter()
        .filter_map(|item| item.id.video_id.clone())
        .collect();

    let details = provider.statistics(&api_key, &video_ids).await?;
    let details_by_id: HashMap<&str, &VideoDetails> =
        details.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut videos: Vec<VideoRecord> = items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id.clone()?;
            let details = details_by_id.get(id.as_str()).copied();
            Some(build_record(topics, id, item, details))
        })
        .collect();

    // stable sort keeps provider order for equal scores
    videos.sort_by(|a, b| compare_desc(a.score, b.score));

    info!("Found {} videos", videos.len());
    Ok(videos)
}

fn build_record(
    topics: &TopicKeywordTable,
    id: String,
    item: SearchItem,
    details: Option<&VideoDetails>,
) -> VideoRecord {
    let views = details.map_or(0, VideoDetails::views);
    let likes = details.map_or(0, VideoDetails::likes);
    let comments = details.map_or(0, VideoDetails::comments);
    let duration = format_duration(details.map_or("PT0M0S", VideoDetails::duration));

    let snippet = item.snippet;
    let topic = topics.classify(&snippet.title, &snippet.description);

    VideoRecord {
        id,
        thumbnail_url: snippet.thumbnails.best_url(),
        duration,
        views,
        likes,
        comments,
        topic: topic.topic,
        confidence: topic.confidence,
        difficulty: estimate_difficulty(&snippet.title, views),
        upload_date: upload_date(&snippet.published_at),
        score: calculate_score(views, likes, comments),
        title: snippet.title,
        channel: snippet.channel_title,
    }
}
