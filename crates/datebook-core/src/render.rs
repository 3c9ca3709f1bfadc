use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::calendar::MonthGrid;
use crate::config::Config;
use crate::date::CalendarDate;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&mut self, date: CalendarDate, tasks: &[&Task]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if tasks.is_empty() {
            writeln!(out, "No tasks on {date}.")?;
            return Ok(());
        }

        let rows = tasks.iter().map(|task| self.task_row(task)).collect();
        write_table(&mut out, task_headers(), rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn print_task_info(&mut self, task: &Task) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "title       {}", task.title)?;
        writeln!(out, "date        {}", task.date)?;
        writeln!(out, "completed   {}", if task.is_completed { "yes" } else { "no" })?;
        if !task.description.is_empty() {
            writeln!(out, "description {}", task.description)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, grid), fields(focus = %grid.focus))]
    pub fn print_month_grid(&mut self, grid: &MonthGrid, today: CalendarDate) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", grid.focus.naive().format("%B %Y"))?;
        writeln!(out, "{}", grid.weekday_labels().join("  "))?;

        for row in &grid.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| {
                    let marker = if cell.open() > 0 {
                        '*'
                    } else if cell.total > 0 {
                        '+'
                    } else {
                        ' '
                    };
                    let text = if cell.in_month {
                        format!("{:>2}{marker}", cell.date.day())
                    } else {
                        "   ".to_string()
                    };
                    if cell.date == today {
                        self.paint(&text, "7")
                    } else if cell.open() > 0 {
                        self.paint(&text, "33")
                    } else {
                        text
                    }
                })
                .collect();
            writeln!(out, "{}", cells.join(" "))?;
        }
        writeln!(out, "* open tasks   + all done")?;

        Ok(())
    }

    fn task_row(&self, task: &Task) -> Vec<String> {
        let id = self.paint(&task.id.to_string(), "33");
        let done = if task.is_completed {
            self.paint("x", "32")
        } else {
            " ".to_string()
        };
        vec![id, done, task.title.clone(), task.description.clone()]
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn task_headers() -> Vec<String> {
    vec![
        "ID".to_string(),
        "Done".to_string(),
        "Title".to_string(),
        "Description".to_string(),
    ]
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
