use ackd_core::config::Config;
use ackd_core::registry::Registry;
use anyhow::Result;
use pagerduty_api::PdClient;
use std::path::Path;

use crate::output::print_json;

/// One-shot startup sweep: fetch a fresh snapshot and purge persisted
/// control records whose incidents are no longer triggered.
pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let controls_dir = ackd_core::paths::user_controls_dir(&config.scope)?;
    let registry = Registry::new(controls_dir, config.scope.clone());

    let client = PdClient::new(
        config.api_server.base_url(),
        config.api_key.clone(),
        config.from_email(),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let snapshot = rt.block_on(client.list_incidents())?;
    let removed = registry.sweep(&snapshot)?;

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else if removed.is_empty() {
        println!("No orphaned control records.");
    } else {
        for control_id in &removed {
            println!("removed {control_id}");
        }
        println!("{} record(s) removed.", removed.len());
    }
    Ok(())
}
