use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use focuseye_core::{DecisionEngine, SceneCatalog};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod classifier;
mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod speech;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FocusEye API",
        version = "0.1.0",
        description = "Judges camera snapshots for focus, posture and presence, and decides when to encourage or remind the user to rest."
    ),
    paths(
        routes::health::health_check,
        routes::analyze::analyze,
        routes::tts::synthesize,
        routes::scenes::list_scenes,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::health::PublicConfig,
        routes::analyze::AnalyzeRequest,
        routes::analyze::AnalyzeResponse,
        routes::tts::TtsRequest,
        routes::scenes::SceneSummary,
        focuseye_core::error::ApiError,
        focuseye_core::CounterInput,
        focuseye_core::Status,
        focuseye_core::Notification,
    ))
)]
struct ApiDoc;

fn app(state: state::AppState) -> Router {
    let body_limit = state.settings.body_limit_bytes();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::scenes::router())
        .merge(routes::analyze::router().layer(middleware::rate_limit::analyze_layer()))
        .merge(routes::tts::router().layer(middleware::rate_limit::tts_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "focuseye_api=debug,focuseye_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let settings = config::Settings::from_env().expect("Invalid configuration");

    let catalog = match &settings.scenes_path {
        Some(path) => SceneCatalog::load(path),
        None => SceneCatalog::builtin(),
    }
    .expect("Failed to load scene catalog");
    tracing::info!(scenes = catalog.scenes().len(), "Scene catalog loaded");

    let classifier = classifier::OpenAiClassifier::new(&settings.classifier)
        .expect("Failed to build classifier client");
    let speech =
        speech::SpeechClient::new(settings.speech.clone()).expect("Failed to build speech client");

    let port = settings.port;
    let app_state = state::AppState {
        engine: DecisionEngine::new(Arc::new(classifier), Arc::new(catalog)),
        speech: Arc::new(speech),
        settings: Arc::new(settings),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(model = app_state.engine.model(), "FocusEye API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
