use std::fs;
use std::io::{
  self,
  Read,
  Write
};
use std::path::Path;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  info,
  instrument
};

use crate::calendar::{
  MonthGrid,
  parse_week_start
};
use crate::cli::Command;
use crate::config::Config;
use crate::datastore::DataStore;
use crate::date::CalendarDate;
use crate::datetime::{
  parse_date_expr,
  parse_month_expr
};
use crate::render::Renderer;
use crate::store::{
  ImportReport,
  TaskStore
};
use crate::task::{
  ExchangeTask,
  NewTask,
  TaskId,
  TaskUpdate
};

#[instrument(skip(
  data, cfg, renderer, today
))]
pub fn dispatch(
  data: &DataStore,
  cfg: &Config,
  renderer: &mut Renderer,
  command: Command,
  today: CalendarDate
) -> anyhow::Result<()> {
  let mut store = data.load()?;

  match command {
    | Command::Add {
      title,
      description,
      date
    } => {
      let date = resolve_date(
        date.as_deref(),
        today
      )?;
      let task = store.add(NewTask::new(
        title.join(" "),
        description,
        date
      ))?;
      data.save(&store)?;
      println!(
        "Created task {} on {}.",
        task.id, task.date
      );
    }
    | Command::List { date } => {
      let date = resolve_date(
        date.as_deref(),
        today
      )?;
      let tasks =
        store.tasks_on_date(date);
      renderer
        .print_task_table(date, &tasks)?;
    }
    | Command::Info { id } => {
      let task = store
        .get(TaskId(id))
        .ok_or_else(|| {
          anyhow!("no task with id {id}")
        })?;
      renderer.print_task_info(task)?;
    }
    | Command::Done { id } => {
      match store
        .toggle_complete(TaskId(id))
      {
        | Some(done) => {
          data.save(&store)?;
          println!(
            "Task {id} marked {}.",
            if done {
              "done"
            } else {
              "open"
            }
          );
        }
        | None => {
          println!("No task with id {id}.")
        }
      }
    }
    | Command::Remove { id } => {
      if store.remove(TaskId(id)).is_some()
      {
        data.save(&store)?;
        println!("Removed task {id}.");
      } else {
        println!("No task with id {id}.");
      }
    }
    | Command::Edit {
      id,
      title,
      description
    } => {
      cmd_edit(
        data,
        &mut store,
        TaskId(id),
        title,
        description
      )?;
    }
    | Command::Calendar { month } => {
      let focus = match month.as_deref() {
        | Some(raw) => {
          parse_month_expr(raw)?
        }
        | None => today
      };
      let week_start = parse_week_start(
        &cfg
          .get("calendar.week_start")
          .unwrap_or_default()
      );
      let grid = MonthGrid::build(
        &store, focus, week_start
      );
      renderer
        .print_month_grid(&grid, today)?;
    }
    | Command::Export { output } => {
      cmd_export(
        &store,
        output.as_deref()
      )?;
    }
    | Command::Import { source } => {
      let records =
        read_import_source(&source)?;
      let report =
        store.import_tasks(records);
      if report.imported > 0 {
        data.save(&store)?;
      }
      print_import_report(report);
    }
  }

  Ok(())
}

fn resolve_date(
  raw: Option<&str>,
  today: CalendarDate
) -> anyhow::Result<CalendarDate> {
  match raw {
    | Some(raw) => {
      parse_date_expr(raw, today)
    }
    | None => Ok(today)
  }
}

#[instrument(skip(
  data,
  store,
  title,
  description
))]
fn cmd_edit(
  data: &DataStore,
  store: &mut TaskStore,
  id: TaskId,
  title: Option<String>,
  description: Option<String>
) -> anyhow::Result<()> {
  let Some(current) = store.get(id)
  else {
    println!("No task with id {id}.");
    return Ok(());
  };
  if title.is_none()
    && description.is_none()
  {
    return Err(anyhow!(
      "edit: nothing to change; pass \
       --title or --description"
    ));
  }

  let update = TaskUpdate {
    id,
    title: title.unwrap_or_else(|| {
      current.title.clone()
    }),
    description: description
      .unwrap_or_else(|| {
        current.description.clone()
      })
  };
  store.update(update)?;
  data.save(store)?;
  println!("Updated task {id}.");
  Ok(())
}

#[instrument(skip(store))]
fn cmd_export(
  store: &TaskStore,
  output: Option<&Path>
) -> anyhow::Result<()> {
  info!("command export");
  let out = serde_json::to_string_pretty(
    &store.export_tasks()
  )?;

  match output {
    | Some(path) => {
      fs::write(path, format!("{out}\n"))
        .with_context(|| {
          format!(
            "failed writing {}",
            path.display()
          )
        })?;
    }
    | None => {
      let mut stdout =
        io::stdout().lock();
      writeln!(stdout, "{out}")?;
    }
  }
  Ok(())
}

fn read_import_source(
  source: &str
) -> anyhow::Result<Vec<ExchangeTask>> {
  let raw = if source == "-" {
    let mut stdin = String::new();
    io::stdin()
      .read_to_string(&mut stdin)
      .context("failed reading stdin")?;
    stdin
  } else {
    fs::read_to_string(source)
      .with_context(|| {
        format!("failed reading {source}")
      })?
  };

  parse_import_items(raw.trim())
}

/// A JSON array, or one record per line.
pub fn parse_import_items(
  trimmed: &str
) -> anyhow::Result<Vec<ExchangeTask>> {
  if trimmed.is_empty() {
    return Err(anyhow!(
      "import: empty input"
    ));
  }

  if trimmed.starts_with('[') {
    return serde_json::from_str(trimmed)
      .context(
        "failed parsing import array"
      );
  }

  trimmed
    .lines()
    .enumerate()
    .filter(|(_, line)| {
      !line.trim().is_empty()
    })
    .map(|(idx, line)| {
      serde_json::from_str(line.trim())
        .with_context(|| {
          format!(
            "failed parsing import \
             line {}",
            idx + 1
          )
        })
    })
    .collect()
}

fn print_import_report(
  report: ImportReport
) {
  println!(
    "Imported {} task(s), skipped {}.",
    report.imported, report.skipped
  );
  if report.reassigned > 0 {
    println!(
      "{} task(s) received a new id.",
      report.reassigned
    );
  }
}
