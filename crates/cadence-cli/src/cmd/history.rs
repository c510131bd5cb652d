//! `cad set-history`, `cad history-rm`, `cad history-set` — bulk and
//! per-entry history edits.

use cadence_core::{Repository, TrackerId};
use clap::Args;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct SetHistoryArgs {
    /// Id of the tracker to edit.
    pub id: TrackerId,

    /// The full replacement history: completions separated by `;`, each as
    /// `"<datetime>[, <duration>]"`. An empty string clears the history.
    pub entries: String,
}

#[derive(Args, Debug)]
pub struct HistoryRmArgs {
    /// Id of the tracker to edit.
    pub id: TrackerId,

    /// 0-based index of the completion to remove, oldest first.
    pub index: usize,
}

#[derive(Args, Debug)]
pub struct HistorySetArgs {
    /// Id of the tracker to edit.
    pub id: TrackerId,

    /// 0-based index of the completion to replace, oldest first.
    pub index: usize,

    /// The replacement, as `"<datetime>[, <duration>]"`.
    pub entry: String,
}

fn render_history(
    repo: &Repository,
    id: TrackerId,
    output: OutputMode,
) -> anyhow::Result<()> {
    let tracker = repo
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("tracker {id} vanished after edit"))?;
    let value = serde_json::json!({
        "id": id.0,
        "completions": tracker.history().len(),
        "history": tracker.format_history(),
    });
    render(output, &value, |_, w| {
        writeln!(w, "{}: {}", id, tracker.format_history())
    })?;
    Ok(())
}

pub fn run_set_history(
    args: &SetHistoryArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    repo.record_completions_text(args.id, &args.entries)?;
    render_history(repo, args.id, output)
}

pub fn run_history_rm(
    args: &HistoryRmArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    repo.remove_completion(args.id, args.index)?;
    render_history(repo, args.id, output)
}

pub fn run_history_set(
    args: &HistorySetArgs,
    repo: &mut Repository,
    output: OutputMode,
) -> anyhow::Result<()> {
    let prefs = repo.settings().date_prefs();
    let completion =
        cadence_core::parse::parse_completion(&args.entry, prefs, chrono::Local::now().naive_local())?;
    repo.replace_completion(args.id, args.index, completion)?;
    render_history(repo, args.id, output)
}
