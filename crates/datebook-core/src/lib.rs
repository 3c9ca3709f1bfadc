pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod date;
pub mod datetime;
pub mod drawer;
pub mod error;
pub mod render;
pub mod store;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use date::CalendarDate;
pub use drawer::Drawer;
pub use error::StoreError;
pub use store::{
  ImportReport,
  TaskStore
};
pub use task::{
  ExchangeTask,
  NewTask,
  Task,
  TaskId,
  TaskUpdate
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting datebook CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let data =
    datastore::DataStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let today = datetime::today();
  let command = cli.command.unwrap_or(
    cli::Command::List { date: None }
  );
  debug!(?command, %today, "dispatching");

  commands::dispatch(
    &data,
    &cfg,
    &mut renderer,
    command,
    today
  )?;

  info!("done");
  Ok(())
}
