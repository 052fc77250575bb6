//! Init command - write a starter rubble.toml

use anyhow::{Context, Result};
use clap::Args;
use rubble_core::config::Preset;
use std::path::{Path, PathBuf};

use crate::scenario::{SCENARIO_FILE, Scenario};

/// Arguments for the init command
#[derive(Args)]
pub struct InitArgs {
    /// Surface preset to start from (classic, fast, destroy-fixed)
    #[arg(short, long, default_value = "destroy-fixed")]
    pub preset: Preset,

    /// Where to write the scenario
    #[arg(short, long, default_value = SCENARIO_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Execute the init command
pub fn execute(args: InitArgs) -> Result<()> {
    write_scenario(args.preset, &args.output, args.force)?;
    println!("Created {} ({} preset)", args.output.display(), args.preset);
    Ok(())
}

fn write_scenario(preset: Preset, output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let text = Scenario::with_preset(preset).to_toml()?;
    std::fs::write(output, text)
        .with_context(|| format!("Failed to write scenario: {}", output.display()))?;
    tracing::debug!(path = %output.display(), %preset, "scenario written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCENARIO_FILE);

        write_scenario(Preset::Fast, &path, false).unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.surface, Preset::Fast.config());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCENARIO_FILE);
        std::fs::write(&path, "# keep me\n").unwrap();

        assert!(write_scenario(Preset::Classic, &path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# keep me\n");

        write_scenario(Preset::Classic, &path, true).unwrap();
        assert_eq!(Scenario::load(&path).unwrap().surface, Preset::Classic.config());
    }
}
