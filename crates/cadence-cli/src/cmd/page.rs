//! `cad page` — move the active page.

use cadence_core::Repository;
use clap::{Args, ValueEnum};

use crate::output::{OutputMode, render};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PageMove {
    Next,
    Prev,
    First,
}

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Where to move. Moves past either end are ignored.
    #[arg(value_enum)]
    pub direction: PageMove,
}

pub fn run_page(args: &PageArgs, repo: &mut Repository, output: OutputMode) -> anyhow::Result<()> {
    match args.direction {
        PageMove::Next => repo.next_page()?,
        PageMove::Prev => repo.previous_page()?,
        PageMove::First => repo.first_page()?,
    }
    let value = serde_json::json!({
        "page": repo.active_page(),
        "pages": repo.page_count(),
    });
    render(output, &value, |_, w| {
        writeln!(w, "page {} of {}", repo.active_page() + 1, repo.page_count())
    })?;
    Ok(())
}
