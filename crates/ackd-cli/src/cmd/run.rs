use ackd_core::config::Config;
use ackd_core::registry::Registry;
use anyhow::Result;
use pagerduty_api::{PdClient, Poller};
use std::path::Path;

/// Start the daemon: poll incidents, keep acknowledge controls reconciled,
/// and serve the control API until interrupted.
pub fn run(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = Config::load(config_path)?;
    let port = port.unwrap_or(config.listen_port);
    let controls_dir = ackd_core::paths::user_controls_dir(&config.scope)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let client = PdClient::new(
            config.api_server.base_url(),
            config.api_key.clone(),
            config.from_email(),
        );
        let poller = Poller::spawn(client.clone(), config.poll_interval());
        let registry = Registry::new(controls_dir, config.scope.clone());
        let state = ackd_server::AppState::new(client, poller.clone(), registry, config.scope);

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let url = format!("http://localhost:{}", listener.local_addr()?.port());
        println!("ackd control API → {url}");

        let result = tokio::select! {
            res = ackd_server::serve_on(state, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        };

        poller.shutdown();
        result
    })
}
