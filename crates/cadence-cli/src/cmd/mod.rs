//! One module per `cad` subcommand.

pub mod add;
pub mod delete;
pub mod history;
pub mod list;
pub mod page;
pub mod record;
pub mod refresh;
pub mod rename;
pub mod settings;
pub mod show;
pub mod sort;
