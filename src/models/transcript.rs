use serde::{Deserialize, Serialize};

/// Query parameters of `GET /yt`
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptQuery {
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub language: String,
}

/// Query parameters of `GET /yt-list`
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptListQuery {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// One caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// A caption track available for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptInfo {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub is_translatable: bool,
}
