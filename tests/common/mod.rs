//! Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_test::TestServer;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use identidock::{
    cache::{ImageCache, MemoryCache},
    config::Config,
    events::{EventSink, MemoryEventSink},
    services::{HttpIdenticonClient, IdenticonService},
    web::{AppState, create_router},
};

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\nstub-identicon";

/// How the stub generator answers every request
#[derive(Clone, Copy)]
pub enum Behaviour {
    Image,
    Status(u16),
    Slow(Duration),
}

/// Local stand-in for the identicon generator, recording every request
pub struct StubGenerator {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
struct StubState {
    behaviour: Behaviour,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn monster(
    State(stub): State<StubState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    stub.requests
        .lock()
        .unwrap()
        .push(format!("{}?{}", name, query.unwrap_or_default()));

    match stub.behaviour {
        Behaviour::Image => ([(header::CONTENT_TYPE, "image/png")], PNG).into_response(),
        Behaviour::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        Behaviour::Slow(delay) => {
            tokio::time::sleep(delay).await;
            ([(header::CONTENT_TYPE, "image/png")], PNG).into_response()
        }
    }
}

impl StubGenerator {
    pub async fn start(behaviour: Behaviour) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/monster/{name}", get(monster))
            .with_state(StubState {
                behaviour,
                requests: requests.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Decoded identifier and raw query of each request, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Defaults pointed at `generator_url`, with a short generator timeout
pub fn test_config(generator_url: &str) -> Config {
    let mut config = Config::default();
    config.identicon.base_url = generator_url.to_string();
    config.identicon.timeout = Duration::from_millis(500);
    config
}

pub struct TestApp {
    pub server: TestServer,
    pub events: Arc<MemoryEventSink>,
    pub cache: Arc<MemoryCache>,
    pub generator: StubGenerator,
}

impl TestApp {
    pub async fn start(behaviour: Behaviour) -> Self {
        let generator = StubGenerator::start(behaviour).await;
        let cache = Arc::new(MemoryCache::new());
        let events = Arc::new(MemoryEventSink::new());
        let server = server_with(
            test_config(&generator.base_url),
            cache.clone(),
            events.clone(),
        );

        Self {
            server,
            events,
            cache,
            generator,
        }
    }
}

/// Wire the real router around the given collaborators
pub fn server_with(
    config: Config,
    cache: Arc<dyn ImageCache>,
    events: Arc<dyn EventSink>,
) -> TestServer {
    let generator = Arc::new(HttpIdenticonClient::new(&config.identicon).unwrap());
    let identicons = IdenticonService::new(cache, generator, events.clone(), config.identicon.size);
    let state = AppState::new(config, identicons, events);
    TestServer::new(create_router(state)).unwrap()
}
