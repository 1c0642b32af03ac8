pub mod ranking;
pub mod search_service;
pub mod topic_classifier;
pub mod youtube_client;
