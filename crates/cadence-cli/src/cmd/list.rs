//! `cad list` — render one page of the tracker collection.

use cadence_core::Repository;
use clap::Args;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page to list (0-based). Defaults to the active page; out-of-range
    /// pages leave the active page unchanged.
    #[arg(short, long)]
    pub page: Option<usize>,
}

pub fn run_list(args: &ListArgs, repo: &mut Repository, output: OutputMode) -> anyhow::Result<()> {
    let page = match args.page {
        Some(page) => repo.list_page(page)?,
        None => repo.render_active_page(),
    };

    let entries: Vec<serde_json::Value> = page
        .entries
        .iter()
        .map(|entry| {
            serde_json::json!({
                "label": entry.label.to_string(),
                "row": entry.row,
                "id": entry.id.0,
                "name": entry.name,
                "forecast": entry.forecast.map(|dt| dt.to_string()),
                "latest": entry.latest.map(|dt| dt.to_string()),
            })
        })
        .collect();
    let value = serde_json::json!({
        "page": page.page,
        "pages": page.pages,
        "sort": repo.sort().to_string(),
        "entries": entries,
    });

    render(output, &value, |_, w| {
        if page.pages > 1 {
            writeln!(w, "{}", page.banner())?;
        }
        writeln!(w, "{}", page.to_text())
    })?;
    Ok(())
}
