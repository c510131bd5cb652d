//! `cad show` — full details for one tracker, by id or by page label.

use cadence_core::{Repository, Tracker, TrackerId};
use clap::Args;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Id of the tracker to show.
    #[arg(required_unless_present = "label", conflicts_with = "label")]
    pub id: Option<TrackerId>,

    /// Show by page label instead of id, resolved against the active page
    /// as currently sorted.
    #[arg(short, long)]
    pub label: Option<char>,
}

pub fn run_show(args: &ShowArgs, repo: &mut Repository, output: OutputMode) -> anyhow::Result<()> {
    let id = match (args.id, args.label) {
        (Some(id), _) => id,
        (None, Some(label)) => {
            // Labels are positional, so resolve against a fresh render of
            // the active page rather than whatever was drawn last.
            let page = repo.render_active_page().page;
            repo.tracker_by_label(page, label)
                .map(Tracker::id)
                .ok_or_else(|| {
                    anyhow::anyhow!("no tracker labeled '{label}' on page {page}")
                })?
        }
        (None, None) => anyhow::bail!("pass an id or --label"),
    };

    let tracker = repo
        .get(id)
        .ok_or(cadence_core::CoreError::UnknownTracker { id })?;
    let ampm = repo.settings().ampm;
    let stats = tracker.stats();
    let value = serde_json::json!({
        "id": id.0,
        "name": tracker.name(),
        "created": tracker.created().to_string(),
        "modified": tracker.modified().to_string(),
        "history": tracker.format_history(),
        "completions": tracker.history().len(),
        "average": stats.average.map(|d| d.num_seconds()),
        "spread": stats.spread.num_seconds(),
        "forecast": stats.next_expected.map(|dt| dt.to_string()),
        "early": stats.early.map(|dt| dt.to_string()),
        "late": stats.late.map(|dt| dt.to_string()),
        "trend": stats.trend.map(|t| t.to_string()),
    });
    render(output, &value, |_, w| {
        writeln!(w, "{}", tracker.format_summary(ampm))
    })?;
    Ok(())
}
