//! `cad sort` — change the listing order.

use cadence_core::{Repository, SortOrder};
use clap::Args;

use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Sort strategy: forecast, latest, name, or id. Unknown names fall
    /// back to forecast.
    pub strategy: String,
}

pub fn run_sort(args: &SortArgs, repo: &mut Repository, output: OutputMode) -> anyhow::Result<()> {
    let order = SortOrder::from_str_lossy(&args.strategy);
    repo.set_sort(order)?;
    render_success(output, &format!("sorting by {order}"))?;
    Ok(())
}
