//! YouTube caption retrieval
//!
//! Caption tracks are discovered through the innertube player endpoint using the
//! API key scraped from the watch page, then fetched as timedtext XML. All
//! requests of one call go through a client built for that call's proxy.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{ProxyConfig, TranscriptInfo, TranscriptSnippet};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const API_KEY_MARKER: &str = "\"INNERTUBE_API_KEY\":\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const BOT_CHECK_REASON: &str = "Sign in to confirm you";

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("{0}")]
    NotFound(String),

    #[error("request blocked by YouTube: {0}")]
    Blocked(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for TranscriptError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            TranscriptError::Connection(e.to_string())
        } else {
            TranscriptError::Unexpected(e.to_string())
        }
    }
}

#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the first available track among `languages`, in preference order
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptSnippet>, TranscriptError>;

    /// List every caption track of a video
    async fn list(
        &self,
        video_id: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptInfo>, TranscriptError>;
}

/// A caption track as advertised by the player response
#[derive(Debug, Clone, PartialEq)]
struct CaptionTrack {
    base_url: String,
    language: String,
    language_code: String,
    is_generated: bool,
    is_translatable: bool,
}

pub struct YouTubeTranscripts {
    timeout: Duration,
}

impl YouTubeTranscripts {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self, proxy: Option<&ProxyConfig>) -> Result<reqwest::Client, TranscriptError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        builder = match proxy {
            Some(proxy) => builder
                .proxy(reqwest::Proxy::http(&proxy.http_url)?)
                .proxy(reqwest::Proxy::https(&proxy.https_url)?),
            None => builder.no_proxy(),
        };

        Ok(builder.build()?)
    }

    async fn caption_tracks(
        &self,
        client: &reqwest::Client,
        video_id: &str,
    ) -> Result<Vec<CaptionTrack>, TranscriptError> {
        let response = client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptError::Blocked("watch page rate limited".to_string()));
        }
        let html = response.text().await?;

        let api_key = match extract_api_key(&html) {
            Some(key) => key,
            None if html.contains(RECAPTCHA_MARKER) => {
                return Err(TranscriptError::Blocked("captcha challenge".to_string()))
            }
            None => {
                return Err(TranscriptError::Unexpected(format!(
                    "Could not read player data for video {}",
                    video_id
                )))
            }
        };

        let player: Value = client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key.as_str())])
            .json(&json!({
                "context": {
                    "client": {
                        "clientName": INNERTUBE_CLIENT_NAME,
                        "clientVersion": INNERTUBE_CLIENT_VERSION,
                    }
                },
                "videoId": video_id,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_playability(&player, video_id)?;
        parse_caption_tracks(&player).ok_or_else(|| {
            TranscriptError::NotFound(format!(
                "Transcripts are disabled for video {}",
                video_id
            ))
        })
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeTranscripts {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptSnippet>, TranscriptError> {
        let client = self.client(proxy)?;
        let tracks = self.caption_tracks(&client, video_id).await?;

        let track = select_track(&tracks, languages).ok_or_else(|| {
            TranscriptError::NotFound(format!(
                "No transcripts were found for any of the requested language codes: {:?}",
                languages
            ))
        })?;

        debug!(video_id, language = %track.language_code, generated = track.is_generated, "Fetching transcript");

        let response = client
            .get(track.base_url.replace("&fmt=srv3", ""))
            .header("Accept-Language", "en-US")
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptError::Blocked("timedtext rate limited".to_string()));
        }
        let xml = response.error_for_status()?.text().await?;

        Ok(parse_timedtext(&xml))
    }

    async fn list(
        &self,
        video_id: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptInfo>, TranscriptError> {
        let client = self.client(proxy)?;
        let mut tracks = self.caption_tracks(&client, video_id).await?;

        // manual tracks first
        tracks.sort_by_key(|track| track.is_generated);

        Ok(tracks
            .into_iter()
            .map(|track| TranscriptInfo {
                language: track.language,
                language_code: track.language_code,
                is_generated: track.is_generated,
                is_translatable: track.is_translatable,
            })
            .collect())
    }
}

fn extract_api_key(html: &str) -> Option<String> {
    let start = html.find(API_KEY_MARKER)? + API_KEY_MARKER.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    let key = &rest[..end];
    (!key.is_empty()).then(|| key.to_string())
}

fn check_playability(player: &Value, video_id: &str) -> Result<(), TranscriptError> {
    let status = &player["playabilityStatus"];
    let reason = status["reason"].as_str().unwrap_or_default();

    match status["status"].as_str() {
        None | Some("OK") => Ok(()),
        Some("LOGIN_REQUIRED") if reason.starts_with(BOT_CHECK_REASON) => {
            Err(TranscriptError::Blocked(reason.to_string()))
        }
        Some("ERROR") => Err(TranscriptError::NotFound(format!(
            "Video {} is unavailable",
            video_id
        ))),
        Some(_) => Err(TranscriptError::NotFound(format!(
            "Video {} is unplayable: {}",
            video_id, reason
        ))),
    }
}

fn parse_caption_tracks(player: &Value) -> Option<Vec<CaptionTrack>> {
    let tracks = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"].as_array()?;

    Some(
        tracks
            .iter()
            .filter_map(|track| {
                let base_url = track["baseUrl"].as_str()?;
                let language_code = track["languageCode"].as_str()?;
                let language = track["name"]["runs"][0]["text"]
                    .as_str()
                    .or_else(|| track["name"]["simpleText"].as_str())
                    .unwrap_or(language_code);

                Some(CaptionTrack {
                    base_url: base_url.to_string(),
                    language: language.to_string(),
                    language_code: language_code.to_string(),
                    is_generated: track["kind"].as_str() == Some("asr"),
                    is_translatable: track["isTranslatable"].as_bool().unwrap_or(false),
                })
            })
            .collect(),
    )
}

/// Manual tracks win over generated ones for the same language
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|code| {
        tracks
            .iter()
            .filter(|track| &track.language_code == code)
            .min_by_key(|track| track.is_generated)
    })
}

/// Parse `<text start="" dur="">` elements of a timedtext document
fn parse_timedtext(xml: &str) -> Vec<TranscriptSnippet> {
    let document = Html::parse_fragment(xml);
    let Ok(selector) = Selector::parse("text") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let raw: String = element.text().collect();
            let text = strip_markup(&raw);
            if text.is_empty() {
                return None;
            }

            let attr = |name: &str| {
                element
                    .value()
                    .attr(name)
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };

            Some(TranscriptSnippet {
                text,
                start: attr("start"),
                duration: attr("dur"),
            })
        })
        .collect()
}

/// Caption bodies are entity-escaped twice and may carry formatting tags
fn strip_markup(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    fragment.root_element().text().collect::<String>().trim().to_string()
}
