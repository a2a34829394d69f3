//! In-process collaborators for router tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;

use super::routes;
use super::server::{ApiServer, AppState};
use crate::config::{
    ApiServerConfig, AppConfig, ClickHouseConfig, Config, IpCheckConfig, LogConfig,
    ProvidersConfig, ScrapeConfig, TorConfig, VendorConfig,
};
use crate::database::ColumnStore;
use crate::error::{Result, ScrapeGateError};
use crate::models::{ColumnBatch, ProxyConfig, TranscriptInfo, TranscriptSnippet};
use crate::proxy::{
    IdentityRotationController, IpChecker, ProviderRegistry, ProxyConfigResolver,
    SessionIdentity, TorControlClient,
};
use crate::services::{
    PageRenderer, RenderError, RenderRequest, RenderedPage, TranscriptError, TranscriptFetcher,
};

pub const TEST_TOKEN: &str = "abcd1234abcd1234";

/// A local port with nothing listening on it
pub async fn dead_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn vendor(host: &str, port: u16) -> VendorConfig {
    VendorConfig {
        host: host.to_string(),
        port,
        username: String::new(),
        password: String::new(),
    }
}

/// Tor and the brightdata vendor point at local dead ports; other vendors lack credentials
pub async fn test_config() -> Config {
    Config {
        app: AppConfig {
            name: "my-stats".to_string(),
            version: "1.0.0".to_string(),
            environment: "test".to_string(),
        },
        api: ApiServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        clickhouse: ClickHouseConfig {
            host: "127.0.0.1".to_string(),
            port: 8123,
            username: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            secure: false,
        },
        tor: TorConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: dead_port().await,
            control_port: dead_port().await,
            control_password: "secret".to_string(),
            control_timeout: Duration::from_millis(500),
            settle_delay: Duration::ZERO,
        },
        providers: ProvidersConfig {
            selected: "brightdata".to_string(),
            brightdata: VendorConfig {
                username: "alice".to_string(),
                password: "p@ss".to_string(),
                ..vendor("127.0.0.1", dead_port().await)
            },
            oxylabs: vendor("pr.oxylabs.io", 7777),
            smartproxy: vendor("gate.smartproxy.com", 7000),
            iproyal: vendor("geo.iproyal.com", 12321),
            floppydata: vendor("geo.floppydata.com", 10080),
            floppydata_country: "US".to_string(),
            floppydata_city: String::new(),
            floppydata_rotation: "0".to_string(),
        },
        ip_check: IpCheckConfig {
            url: format!("http://127.0.0.1:{}/ip", dead_port().await),
            timeout: Duration::from_secs(1),
        },
        scrape: ScrapeConfig {
            user_agent: "test-agent".to_string(),
            chrome_executable: None,
        },
        log: LogConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    }
}

pub enum RenderBehavior {
    Page(RenderedPage),
    Timeout,
    Fail(String),
}

pub struct MockRenderer {
    behavior: RenderBehavior,
    pub requests: Mutex<Vec<RenderRequest>>,
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, request: RenderRequest) -> std::result::Result<RenderedPage, RenderError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.behavior {
            RenderBehavior::Page(page) => Ok(page.clone()),
            RenderBehavior::Timeout => Err(RenderError::Timeout(request.timeout)),
            RenderBehavior::Fail(message) => Err(RenderError::Engine(message.clone())),
        }
    }
}

pub enum TranscriptBehavior {
    Found,
    NotFound,
    Blocked,
    Connection,
}

pub struct MockTranscripts {
    behavior: TranscriptBehavior,
    /// Proxy URL passed on each call
    pub proxies: Mutex<Vec<Option<String>>>,
}

impl MockTranscripts {
    fn outcome<T>(&self, value: T) -> std::result::Result<T, TranscriptError> {
        match self.behavior {
            TranscriptBehavior::Found => Ok(value),
            TranscriptBehavior::NotFound => Err(TranscriptError::NotFound(
                "No transcripts were found".to_string(),
            )),
            TranscriptBehavior::Blocked => Err(TranscriptError::Blocked("captcha".to_string())),
            TranscriptBehavior::Connection => {
                Err(TranscriptError::Connection("connection refused".to_string()))
            }
        }
    }
}

#[async_trait]
impl TranscriptFetcher for MockTranscripts {
    async fn fetch(
        &self,
        _video_id: &str,
        _languages: &[String],
        proxy: Option<&ProxyConfig>,
    ) -> std::result::Result<Vec<TranscriptSnippet>, TranscriptError> {
        self.proxies
            .lock()
            .unwrap()
            .push(proxy.map(|p| p.http_url.clone()));
        self.outcome(vec![TranscriptSnippet {
            text: "hello".to_string(),
            start: 0.0,
            duration: 1.5,
        }])
    }

    async fn list(
        &self,
        _video_id: &str,
        proxy: Option<&ProxyConfig>,
    ) -> std::result::Result<Vec<TranscriptInfo>, TranscriptError> {
        self.proxies
            .lock()
            .unwrap()
            .push(proxy.map(|p| p.http_url.clone()));
        self.outcome(vec![TranscriptInfo {
            language: "English".to_string(),
            language_code: "en".to_string(),
            is_generated: false,
            is_translatable: true,
        }])
    }
}

#[derive(Default)]
pub struct MockColumnStore {
    pub fail: bool,
    pub inserts: Mutex<Vec<(String, ColumnBatch)>>,
}

#[async_trait]
impl ColumnStore for MockColumnStore {
    async fn insert(&self, table: &str, batch: &ColumnBatch) -> Result<()> {
        if self.fail {
            return Err(ScrapeGateError::ColumnStore("connection refused".to_string()));
        }
        self.inserts
            .lock()
            .unwrap()
            .push((table.to_string(), batch.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub state: AppState,
    pub renderer: Arc<MockRenderer>,
    pub transcripts: Arc<MockTranscripts>,
    pub store: Arc<MockColumnStore>,
}

impl Harness {
    pub fn new(config: Config, render: RenderBehavior, transcripts: TranscriptBehavior) -> Self {
        Self::with_store(config, render, transcripts, MockColumnStore::default())
    }

    pub fn with_store(
        config: Config,
        render: RenderBehavior,
        transcripts: TranscriptBehavior,
        store: MockColumnStore,
    ) -> Self {
        let registry = Arc::new(ProviderRegistry::from_config(&config.tor, &config.providers));
        let session = Arc::new(SessionIdentity::with_token(TEST_TOKEN));
        let resolver = ProxyConfigResolver::new(registry, session);
        let ip_checker = IpChecker::new(&config.ip_check);
        let rotation = IdentityRotationController::new(
            resolver.clone(),
            TorControlClient::from_config(&config.tor),
            ip_checker.clone(),
            config.tor.settle_delay,
        );

        let renderer = Arc::new(MockRenderer {
            behavior: render,
            requests: Mutex::new(Vec::new()),
        });
        let transcripts = Arc::new(MockTranscripts {
            behavior: transcripts,
            proxies: Mutex::new(Vec::new()),
        });
        let store = Arc::new(store);

        let state = AppState {
            config,
            resolver,
            rotation: Arc::new(rotation),
            ip_checker,
            renderer: renderer.clone(),
            transcripts: transcripts.clone(),
            column_store: store.clone(),
        };

        Self {
            state,
            renderer,
            transcripts,
            store,
        }
    }

    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// Send one request and decode the JSON body
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        decode(self.router().oneshot(request).await.unwrap()).await
    }

    /// Like `call`, but through the served stack including path normalization
    pub async fn call_app(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = ApiServer::new(self.state.clone()).app();
        decode(app.oneshot(request).await.unwrap()).await
    }
}

async fn decode(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn sample_page() -> RenderedPage {
    RenderedPage {
        final_url: "https://example.com/final".to_string(),
        title: "Example".to_string(),
        html: r#"<html><head><meta name="description" content="desc"></head><body><article><p>Body text</p></article></body></html>"#.to_string(),
        text_content: "Body text".to_string(),
        screenshot: Some(vec![0x89, 0x50, 0x4e, 0x47]),
    }
}
