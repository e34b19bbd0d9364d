use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use app_state::ScrollTarget;
use member_app::{build_shell, logging, AppConfig};

/// Scroll target that just logs the carousel position
struct LogScroll;

impl ScrollTarget for LogScroll {
    fn scroll_to_index(&self, index: usize) {
        tracing::debug!(index, "news carousel advanced");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("member_app.json"));

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    logging::init(&config.logging.filter);
    config.validate()?;
    config.log_summary();

    let mut shell = build_shell(&config)?;
    let route = shell.launch().await;
    tracing::info!("Opening on {}", route.name());

    if route == app_ui::Route::Landing {
        let landing = shell.mount_landing(Arc::new(LogScroll)).await;
        tracing::info!("{}", landing.uid_text());
        if let Some(alert) = landing.take_alert() {
            tracing::warn!("{}: {}", alert.title, alert.message);
        }
        tokio::signal::ctrl_c().await?;
        shell.unmount_landing();
    }

    Ok(())
}
