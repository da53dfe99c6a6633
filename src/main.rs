use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use articles::assets::Assets;
use articles::config::Config;
use articles::{AppState, ArticleStore, Server, api, article, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    logging::init(&config.log_level, config.json_logs);

    let state = Arc::new(AppState::new(ArticleStore::new(article::seed()), config.mode()));
    info!(articles = state.store.len().await, mode = ?state.mode, "store seeded");

    let assets = Arc::new(Assets::new(&config.assets));
    if !assets.root().is_dir() {
        warn!(dir = %assets.root().display(), "asset directory missing, /swaggerui/ will answer 404");
    }

    let mut app = assets.mount(api::router(&state));
    if !config.no_cors {
        app = app.cors(api::cors_policy());
    }

    match Server::bind(config.addr()).serve(app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
