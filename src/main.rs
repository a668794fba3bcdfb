use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presubmit_delta::pipeline::PipelineConfig;
use presubmit_delta::server::{AppState, build_router};

/// Reads an environment variable, falling back to a default.
fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presubmit_delta=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig {
        global_config_path: PathBuf::from(env_or("PRESUBMIT_DELTA_GLOBAL_CONFIG", "config.yaml")),
        job_config_pattern: env_or("PRESUBMIT_DELTA_JOB_PATTERN", "jobs/*.yaml"),
        scratch_dir: PathBuf::from(env_or(
            "PRESUBMIT_DELTA_SCRATCH_DIR",
            "/tmp/presubmit-delta/scratch",
        )),
        output_dir: PathBuf::from(env_or(
            "PRESUBMIT_DELTA_OUTPUT_DIR",
            "/tmp/presubmit-delta/jobs",
        )),
        default_branch: env_or("PRESUBMIT_DELTA_DEFAULT_BRANCH", "master"),
        clone_base: env_or("PRESUBMIT_DELTA_CLONE_BASE", "https://github.com"),
    };
    tracing::debug!(?config, "pipeline configuration");

    let app: Router = build_router(AppState::new(config));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
