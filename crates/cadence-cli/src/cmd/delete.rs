//! `cad delete` — remove a tracker.

use cadence_core::{Repository, TrackerId};
use clap::Args;

use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Id of the tracker to delete.
    pub id: TrackerId,
}

pub fn run_delete(
    args: &DeleteArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    // Deleting an absent id is deliberately not an error.
    repo.delete_tracker(args.id)?;
    render_success(output, &format!("deleted tracker {}", args.id))?;
    Ok(())
}
