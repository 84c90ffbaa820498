//! Tierboard server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use fred::interfaces::ClientLike;
use tierboard_api::{
    AppState, Broadcaster, RateLimiter, router as api_router, streaming_handler,
};
use tierboard_common::Config;
use tierboard_core::{
    BallotService, ChallengeVerifier, EventPublisher, LeaderboardService, SnapshotService,
    TurnstileVerifier,
};
use tierboard_db::repositories::{
    CandidateRepository, DailyRankRepository, DailyScoreRepository, PollRepository,
};
use tierboard_queue::{
    PubSubBridge, RedisPubSub, SchedulerConfig, SnapshotJob, run_scheduler,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tierboard=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting tierboard server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = tierboard_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    tierboard_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize fred client for distributed rate limiting
    let fred_config = fred::types::config::Config::from_url(&config.redis.url)?;
    let fred_client = fred::clients::Client::new(fred_config, None, None, None);
    fred_client.connect();
    fred_client.wait_for_connect().await?;
    let fred_client = Arc::new(fred_client);
    info!("Connected to Redis for distributed rate limiting");

    // Initialize Redis Pub/Sub for cross-instance events
    let pubsub = Arc::new(RedisPubSub::new(&config.redis.url).await?);
    pubsub.start().await?;
    let publisher: Arc<dyn EventPublisher> = pubsub.clone();

    // Initialize repositories
    let db = Arc::new(db);
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let candidate_repo = CandidateRepository::new(Arc::clone(&db));
    let score_repo = DailyScoreRepository::new(Arc::clone(&db));
    let rank_repo = DailyRankRepository::new(Arc::clone(&db));

    // Initialize services
    let verifier: Arc<dyn ChallengeVerifier> =
        Arc::new(TurnstileVerifier::new(config.voting.challenge_secret.clone()));

    let ballot_service = BallotService::new(
        poll_repo.clone(),
        candidate_repo.clone(),
        score_repo.clone(),
        verifier,
        Arc::clone(&publisher),
        config.voting.clone(),
    );
    let leaderboard_service = LeaderboardService::new(
        poll_repo.clone(),
        candidate_repo.clone(),
        score_repo.clone(),
        rank_repo.clone(),
        config.voting.storage_timeout_secs,
    );
    let snapshot_service = SnapshotService::new(
        poll_repo,
        candidate_repo,
        score_repo,
        rank_repo,
        publisher,
    );

    let rate_limiter = RateLimiter::new(
        fred_client,
        config.redis.prefix.clone(),
        config.voting.rate_limit.fail_open,
    );

    // Initialize websocket fan-out and bridge Redis events into it
    let broadcaster = Broadcaster::new();
    let bridge = PubSubBridge::new(Arc::clone(&pubsub));
    let bridge_broadcaster = broadcaster.clone();
    bridge.start(move |event| {
        let broadcaster = bridge_broadcaster.clone();
        tokio::spawn(async move {
            match serde_json::to_string(&event) {
                Ok(payload) => {
                    broadcaster.publish(&event.channel(), &payload).await;
                }
                Err(e) => warn!(error = %e, "failed to serialize leaderboard event"),
            }
        });
    });

    // Start the snapshot scheduler
    let scheduler_config = SchedulerConfig {
        snapshot_interval: Duration::from_secs(config.voting.snapshot_interval_secs),
    };
    run_scheduler(
        scheduler_config,
        Arc::new(SnapshotJob::new(snapshot_service.clone())),
    )
    .await;
    info!("Snapshot scheduler started");

    let state = AppState {
        ballot_service,
        leaderboard_service,
        snapshot_service,
        rate_limiter,
        broadcaster,
        voting: config.voting.clone(),
    };

    // Build router
    let app = Router::new()
        .route("/streaming", get(streaming_handler))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the Pub/Sub connections before exiting
    if let Err(e) = pubsub.shutdown().await {
        warn!(error = %e, "failed to shut down Redis Pub/Sub cleanly");
    }

    info!("Server shutdown complete");
    Ok(())
}
