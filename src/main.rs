mod analysis;
mod app;
mod camera;
mod clock;
mod config;
mod logs;
mod nutrition;
mod profile;
mod session;
mod state;
mod suggest;

use crate::config::AppConfig;
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutrimap=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Local offset lookup fails once worker threads exist.
    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.gemini.model,
        offset = %config.local_offset,
        camera = config.camera_snapshot_path.is_some(),
        "configuration loaded"
    );

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let app_state = AppState::init(config)?;
            app::serve(app::build_app(app_state)).await
        })
}
