//! `cad add` — create a new tracker.

use cadence_core::Repository;
use clap::Args;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Name of the new tracker.
    pub name: String,
}

pub fn run_add(args: &AddArgs, repo: &mut Repository, output: OutputMode) -> anyhow::Result<()> {
    let id = repo.add_tracker(&args.name)?;
    let value = serde_json::json!({ "id": id.0, "name": args.name });
    render(output, &value, |_, w| {
        writeln!(w, "✓ added tracker {id} ({})", args.name)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::AddArgs;

    #[test]
    fn add_args_take_a_positional_name() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: AddArgs,
        }
        let w = Wrapper::parse_from(["test", "water plants"]);
        assert_eq!(w.args.name, "water plants");
    }
}
