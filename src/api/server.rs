//! API Server
//!
//! HTTP server setup around a shared session registry.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::ApiConfig;
use crate::games::registry::SessionRegistry;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// HTTP API server
pub struct ApiServer {
    config: ApiConfig,
    registry: Arc<SessionRegistry>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, registry: Arc<SessionRegistry>) -> Self {
        Self { config, registry }
    }

    /// Start the API server and block until shutdown
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_app(self.registry.clone(), &self.config);
        let addr = self.get_socket_addr()?;

        info!("Starting yolo-game API server");
        info!("   Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped gracefully");
        Ok(())
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.host.parse::<std::net::IpAddr>()?,
            self.config.port,
        )))
    }

    fn log_server_info(&self) {
        let game = self.registry.config();
        info!("Server configuration:");
        info!("   CORS: {:?}", self.config.allowed_origins);
        info!("   Request timeout: {}s", self.config.request_timeout_secs);
        info!("   Session timeout: {}s", game.session_timeout_secs);
        info!("   Number source: {}", game.number_source);

        info!("Available endpoints:");
        info!("   GET  /health                - Health check");
        info!("   POST /api/games             - Start a game");
        info!("   GET  /api/games/:id         - Game details");
        info!("   POST /api/games/:id/bets    - Place a bet");
        info!("   POST /api/games/:id/end     - End and settle a game");
        info!("   GET  /api/games/:id/verify  - Verify fairness proof");
        info!("   GET  /api/stats             - Registry statistics");
    }
}

/// Build the application with its middleware stack
pub fn create_app(registry: Arc<SessionRegistry>, config: &ApiConfig) -> axum::Router {
    let state = Arc::new(AppState {
        registry,
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(create_cors_layer(config.allowed_origins.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{errors::ErrorResponse, middleware::REQUEST_ID_HEADER, models::*};
    use crate::config::GameConfig;
    use crate::games::{FixedNumberSource, ManualClock, NumberSource, VRFGameEngine};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    struct TestApp {
        router: axum::Router,
        clock: Arc<ManualClock>,
    }

    fn test_app(numbers: Arc<dyn NumberSource>) -> TestApp {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        ));
        let registry = Arc::new(SessionRegistry::new(
            GameConfig::default(),
            clock.clone(),
            numbers,
        ));
        TestApp {
            router: create_app(registry, &ApiConfig::default()),
            clock,
        }
    }

    async fn send(app: &TestApp, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.router.clone().oneshot(request).await.unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Arc::new(FixedNumberSource(0)));
        let response = send(&app, "GET", "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let health: HealthResponse = json(response).await;
        assert_eq!(health.status, "Running");
    }

    #[tokio::test]
    async fn test_full_game_flow() {
        let app = test_app(Arc::new(FixedNumberSource(4)));

        let response = send(&app, "POST", "/api/games", Some(serde_json::json!({ "game_id": "g1" }))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: GameResponse = json(response).await;
        assert!(created.active);
        assert!(created.players.is_empty());

        for (nickname, number) in [("ann", 4), ("ben", 5), ("cat", 6)] {
            let body = serde_json::json!({ "nickname": nickname, "number": number, "stake": 10.0 });
            let response = send(&app, "POST", "/api/games/g1/bets", Some(body)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = send(&app, "POST", "/api/games/g1/end", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let ended: GameResponse = json(response).await;

        assert!(!ended.active);
        assert_eq!(ended.correct_number, Some(4));
        assert_eq!(ended.players[0].nickname, "ann");
        assert_eq!(ended.players[0].end_of_game_balance, Some(99.0));
        assert_eq!(ended.players[1].end_of_game_balance, Some(0.0));

        let stats: StatsResponse = json(send(&app, "GET", "/api/stats", None).await).await;
        assert_eq!(stats.registered_games, 1);
        assert_eq!(stats.bets_placed, 3);
        assert_eq!(stats.total_paid_out, 99.0);
    }

    #[tokio::test]
    async fn test_create_without_body_generates_id() {
        let app = test_app(Arc::new(FixedNumberSource(0)));
        let response = send(&app, "POST", "/api/games", None).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let created: GameResponse = json(response).await;
        assert!(uuid::Uuid::parse_str(&created.game_id).is_ok());
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let app = test_app(Arc::new(FixedNumberSource(0)));
        let bet = serde_json::json!({ "nickname": "emmanuel", "number": 5, "stake": 10.0 });

        let response = send(&app, "POST", "/api/games/missing/bets", Some(bet.clone())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.error.code, "NOT_FOUND");

        send(&app, "POST", "/api/games", Some(serde_json::json!({ "game_id": "dup" }))).await;
        let response = send(&app, "POST", "/api/games", Some(serde_json::json!({ "game_id": "dup" }))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let invalid = serde_json::json!({ "nickname": "emmanuel", "number": 12, "stake": 10.0 });
        let response = send(&app, "POST", "/api/games/dup/bets", Some(invalid)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        app.clock.advance(ChronoDuration::seconds(120));
        let response = send(&app, "POST", "/api/games/dup/bets", Some(bet)).await;
        assert_eq!(response.status(), StatusCode::GONE);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.error.code, "GAME_CLOSED");

        let response = send(&app, "POST", "/api/games/dup/end", None).await;
        assert_eq!(response.status(), StatusCode::GONE);

        let response = send(&app, "GET", "/api/games/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_with_malformed_body_is_rejected() {
        let app = test_app(Arc::new(FixedNumberSource(0)));

        let response = send(&app, "POST", "/api/games", Some(serde_json::json!({ "game_id": 5 }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.error.code, "BAD_REQUEST");

        let request = Request::builder()
            .method("POST")
            .uri("/api/games")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let stats: StatsResponse = json(send(&app, "GET", "/api/stats", None).await).await;
        assert_eq!(stats.registered_games, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_guess_is_bad_request() {
        let app = test_app(Arc::new(FixedNumberSource(0)));
        send(&app, "POST", "/api/games", Some(serde_json::json!({ "game_id": "g" }))).await;

        for number in [-1, 300] {
            let body = serde_json::json!({ "nickname": "emmanuel", "number": number, "stake": 10.0 });
            let response = send(&app, "POST", "/api/games/g/bets", Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        // a missing game is still reported first
        let body = serde_json::json!({ "nickname": "emmanuel", "number": 300, "stake": 10.0 });
        let response = send(&app, "POST", "/api/games/missing/bets", Some(body)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = serde_json::json!({ "nickname": "emmanuel", "number": "five", "stake": 10.0 });
        let response = send(&app, "POST", "/api/games/g/bets", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let game: GameResponse = json(send(&app, "GET", "/api/games/g", None).await).await;
        assert!(game.players.is_empty());
    }

    #[tokio::test]
    async fn test_verify_endpoint() {
        let app = test_app(Arc::new(VRFGameEngine::new_random()));
        send(&app, "POST", "/api/games", Some(serde_json::json!({ "game_id": "fair" }))).await;

        // not settled yet, so no proof
        let response = send(&app, "GET", "/api/games/fair/verify", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        send(&app, "POST", "/api/games/fair/end", None).await;
        let response = send(&app, "GET", "/api/games/fair/verify", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let verified: VerifyGameResponse = json(response).await;
        assert!(verified.is_valid);
        assert!(verified.correct_number.is_some());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = test_app(Arc::new(FixedNumberSource(0)));
        let request = Request::builder()
            .uri("/api/games/unknown")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.request_id, "req-42");
    }
}
