//! `cad settings` — show, set, or reset the settings map.

use cadence_core::{Repository, SettingKey};
use clap::Subcommand;

use crate::output::{OutputMode, render, render_success};

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show every setting and its current value.
    Show,

    /// Set one setting. Keys: ampm, yearfirst, dayfirst, eta (alias η).
    Set { key: String, value: String },

    /// Restore every setting to its default value.
    Reset,
}

pub fn run_settings(
    command: &SettingsCommand,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => {
            let value = serde_json::to_value(repo.settings())?;
            render(output, &value, |_, w| {
                for key in SettingKey::ALL {
                    writeln!(w, "{key:<10} {}", repo.settings().get(key))?;
                }
                Ok(())
            })?;
        }
        SettingsCommand::Set { key, value } => {
            repo.set_setting(key, value)?;
            render_success(output, &format!("{key} = {}", repo.setting(key)?))?;
        }
        SettingsCommand::Reset => {
            repo.restore_defaults()?;
            render_success(output, "settings restored to defaults")?;
        }
    }
    Ok(())
}
