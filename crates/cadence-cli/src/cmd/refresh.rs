//! `cad refresh` — force-recompute every tracker's statistics.

use cadence_core::Repository;
use clap::Args;

use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub fn run_refresh(
    _args: &RefreshArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    repo.refresh_all();
    render_success(output, &format!("refreshed {} trackers", repo.len()))?;
    Ok(())
}
