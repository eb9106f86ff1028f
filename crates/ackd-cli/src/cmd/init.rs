use anyhow::{anyhow, Result};
use std::path::Path;

const CONFIG_TEMPLATE: &str = "\
# ackd configuration
api_key: \"\"            # PagerDuty REST API key (required)
api_server: us         # us | eu
# default_from_email: ops@example.com
poll_interval_secs: 30
scope: default
listen_port: 0         # 0 = OS-assigned
";

/// Write a starter config at `config_path`. Refuses to overwrite.
pub fn run(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Err(anyhow!(
            "config already exists at {}",
            config_path.display()
        ));
    }
    ackd_core::io::atomic_write(config_path, CONFIG_TEMPLATE.as_bytes())?;
    println!("Wrote {}", config_path.display());
    println!("Fill in api_key before running `ackd run`.");
    Ok(())
}
