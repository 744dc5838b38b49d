//! Video generation daemon binary.
//!
//! Runs the generation cycle against the simulated providers until Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use autoclip_core::impls::{
    CannedPrompts, FirstSecondCover, LoggingPublisher, SimulatedImageGenerator,
    SimulatedVideoGenerator,
};
use autoclip_core::ports::Capability;
use autoclip_core::{AppBuilder, AppConfig};

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting autoclip");

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Config: {:?}", config);

    let schedule = config.poll_schedule;
    let rate = config.simulated_failure_rate;
    let video = |name: &str, capability: Capability| {
        Arc::new(SimulatedVideoGenerator::new(name, capability, schedule).with_failure_rate(rate))
    };

    let app = match AppBuilder::new(config.clone())
        .prompts(Arc::new(CannedPrompts::default()))
        .video_generator(video("Veo 3 AI", Capability::Universal))
        .video_generator(video("Luma AI", Capability::Universal))
        .video_generator(video("Runway AI", Capability::Universal))
        .video_generator(video("Midjourney AI", Capability::ImageOnly))
        .image_generator(Arc::new(SimulatedImageGenerator::new(config.aspect_ratio)))
        .cover_extractor(Arc::new(FirstSecondCover))
        .publisher(Arc::new(LoggingPublisher::default()))
        .build()
    {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to build app: {}", e);
            std::process::exit(1);
        }
    };
    let queue = app.queue().clone();

    // Setup signal handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    app.run(shutdown_rx).await;

    match serde_json::to_string(&queue.counts()) {
        Ok(counts) => info!(counts = %counts, "autoclip stopped"),
        Err(e) => error!("Failed to serialize queue counts: {}", e),
    }
}
