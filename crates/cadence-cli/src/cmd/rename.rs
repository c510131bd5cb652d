//! `cad rename` — change a tracker's name.

use cadence_core::{Repository, TrackerId};
use clap::Args;

use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Id of the tracker to rename.
    pub id: TrackerId,

    /// New name.
    pub name: String,
}

pub fn run_rename(
    args: &RenameArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    repo.rename_tracker(args.id, &args.name)?;
    render_success(output, &format!("renamed tracker {} to {}", args.id, args.name))?;
    Ok(())
}
