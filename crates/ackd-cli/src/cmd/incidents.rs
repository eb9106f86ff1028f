use ackd_core::config::Config;
use anyhow::Result;
use pagerduty_api::{IncidentStatus, PdClient};
use std::path::Path;

use crate::output::{print_json, print_table};

/// List currently triggered incidents.
pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let client = PdClient::new(
        config.api_server.base_url(),
        config.api_key.clone(),
        config.from_email(),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let snapshot = rt.block_on(client.list_incidents())?;

    let triggered: Vec<_> = snapshot
        .iter()
        .filter(|i| i.status == IncidentStatus::Triggered)
        .collect();

    if json {
        let list: Vec<serde_json::Value> = triggered
            .iter()
            .map(|i| {
                serde_json::json!({
                    "id": i.id,
                    "incident_number": i.incident_number,
                    "title": i.display_title(),
                    "service": i.service_name(),
                })
            })
            .collect();
        print_json(&list)?;
    } else if triggered.is_empty() {
        println!("No triggered incidents.");
    } else {
        let rows: Vec<Vec<String>> = triggered
            .iter()
            .map(|i| {
                vec![
                    format!("#{}", i.incident_number),
                    i.id.clone(),
                    i.service_name().to_string(),
                    i.display_title().to_string(),
                ]
            })
            .collect();
        print_table(&["NUM", "ID", "SERVICE", "TITLE"], rows);
    }
    Ok(())
}
