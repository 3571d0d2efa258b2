//! Wiring from configuration to the core library.

use nibble_core::{probe_server, Cache, HttpTransport, SyncCoordinator, SystemClock};
use std::sync::Arc;

use crate::config::Config;
use crate::db::{init_db, SqliteStore};

/// Opens the on-disk cache described by `config`.
pub async fn open_cache(config: &Config) -> Result<Cache, sqlx::Error> {
    let pool = init_db(&config.database_path.value).await?;
    tracing::debug!(path = %config.database_path.value.display(), "opened cache database");
    Ok(Cache::new(
        Arc::new(SqliteStore::new(pool)),
        Arc::new(SystemClock),
    ))
}

pub fn transport(config: &Config) -> HttpTransport {
    let transport = HttpTransport::new(config.api_url.value.clone());
    match config.token() {
        Some(token) => transport.with_token(token),
        None => transport,
    }
}

/// Builds a coordinator over `cache`, sampling connectivity with a health
/// probe. `forced_offline` overrides routing but the raw signal is still
/// sampled so status output reflects the real network.
pub async fn connect(config: &Config, cache: Cache, forced_offline: bool) -> SyncCoordinator {
    let options = config.sync.options();
    let network = probe_server(&config.api_url.value, options.request_timeout).await;
    tracing::info!(
        reachable = network.reachable,
        internet_reachable = network.internet_reachable,
        "sampled connectivity"
    );

    let sync = SyncCoordinator::new(Arc::new(transport(config)), cache, options, network).await;
    if forced_offline {
        sync.set_forced_offline(true).await;
    }
    sync
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use std::path::Path;
    use tempfile::tempdir;

    async fn spawn_health_server() -> String {
        let app = Router::new().route("/api/health", get(|| async { "ok" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn test_config(dir: &Path, api_url: String) -> Config {
        let mut config = Config::load(Some(dir.join("missing.yaml"))).unwrap();
        config.api_url.value = api_url;
        config.database_path.value = dir.join("cache.db");
        config
    }

    #[tokio::test]
    async fn test_forced_offline_keeps_raw_signal() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path(), spawn_health_server().await);
        let cache = open_cache(&config).await.unwrap();

        let sync = connect(&config, cache, true).await;

        let status = sync.status();
        assert!(status.online);
        assert!(status.forced_offline);
        assert!(!status.effective_online);
    }

    #[tokio::test]
    async fn test_connect_online() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path(), spawn_health_server().await);
        let cache = open_cache(&config).await.unwrap();

        let sync = connect(&config, cache, false).await;

        assert!(sync.is_online());
        assert!(!sync.status().forced_offline);
    }
}
