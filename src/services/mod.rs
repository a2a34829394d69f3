//! Outbound work performed on behalf of API handlers

pub mod browser;
pub mod extract;
pub mod transcript;

pub use browser::{ChromiumRenderer, PageRenderer, RenderError, RenderRequest, RenderedPage};
pub use extract::{extract_main_content, extract_metadata};
pub use transcript::{TranscriptError, TranscriptFetcher, YouTubeTranscripts};
