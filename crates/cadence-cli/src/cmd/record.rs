//! `cad record` — record one completion against a tracker.

use cadence_core::{Repository, TrackerId};
use clap::Args;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Id of the tracker to record against.
    pub id: TrackerId,

    /// The completion, as `"<datetime>[, <duration>]"`. The duration is a
    /// signed adjustment applied to the interval this completion closes.
    #[arg(default_value = "now")]
    pub entry: String,
}

pub fn run_record(
    args: &RecordArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    repo.record_completion_text(args.id, &args.entry)?;
    let tracker = repo
        .get(args.id)
        .ok_or_else(|| anyhow::anyhow!("tracker {} vanished after record", args.id))?;
    let value = serde_json::json!({
        "id": args.id.0,
        "completions": tracker.history().len(),
        "history": tracker.format_history(),
    });
    render(output, &value, |_, w| {
        writeln!(
            w,
            "✓ recorded against {} ({} completions)",
            args.id,
            tracker.history().len()
        )
    })?;
    Ok(())
}
