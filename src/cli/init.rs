use std::path::Path;

use insure::Config;
use tracing::instrument;

use crate::cli::terminal::Colorize;

/// Writes `config` to `path`, refusing to overwrite an existing file.
#[instrument(skip(config))]
pub fn run(path: &Path, config: &Config) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!(
            "Configuration already exists at {} (edit it or remove it first)",
            path.display()
        );
    }

    config
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;

    println!(
        "{}",
        format!("✅ Wrote configuration to {}", path.display()).success()
    );
    println!("  api_url = {}", config.api_url());
    println!("  cascade_owner_delete = {}", config.cascade_owner_delete);
    println!();
    println!("Next steps:");
    println!("  ins status");
    println!("  ins create owner --full-name \"Your Name\" --address \"...\" --phone-number \"...\"");

    Ok(())
}
