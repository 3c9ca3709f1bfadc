use chrono::Weekday;

use crate::date::CalendarDate;
use crate::store::TaskStore;

pub const GRID_ROWS: usize = 6;
pub const GRID_COLUMNS: usize = 7;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DayCell {
  pub date:      CalendarDate,
  pub in_month:  bool,
  pub total:     usize,
  pub completed: usize
}

impl DayCell {
  pub fn open(&self) -> usize {
    self.total - self.completed
  }
}

/// Six week rows covering the focus
/// month, with per-day task counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  pub focus:      CalendarDate,
  pub week_start: Weekday,
  pub rows:       Vec<[DayCell; GRID_COLUMNS]>
}

impl MonthGrid {
  #[tracing::instrument(skip(store))]
  pub fn build(
    store: &TaskStore,
    focus: CalendarDate,
    week_start: Weekday
  ) -> Self {
    let first = focus.first_of_month();
    let grid_start =
      first.start_of_week(week_start);
    let grid_end = grid_start.add_days(
      (GRID_ROWS * GRID_COLUMNS) as i64
        - 1
    );
    let in_range = store
      .tasks_between(grid_start, grid_end);

    let mut rows =
      Vec::with_capacity(GRID_ROWS);
    for row in 0..GRID_ROWS {
      let cells: [DayCell; GRID_COLUMNS] =
        std::array::from_fn(|col| {
          let date = grid_start.add_days(
            (row * GRID_COLUMNS + col)
              as i64
          );
          let on_day = in_range
            .iter()
            .filter(|t| t.date == date);
          let (total, completed) = on_day
            .fold((0, 0), |(n, done), t| {
              (
                n + 1,
                done
                  + usize::from(
                    t.is_completed
                  )
              )
            });
          DayCell {
            date,
            in_month: date.month()
              == focus.month()
              && date.year()
                == focus.year(),
            total,
            completed
          }
        });
      rows.push(cells);
    }

    tracing::debug!(
      focus = %focus,
      tasks = in_range.len(),
      "built month grid"
    );

    Self {
      focus,
      week_start,
      rows
    }
  }

  pub fn cells(
    &self
  ) -> impl Iterator<Item = &DayCell> {
    self.rows.iter().flatten()
  }

  pub fn weekday_labels(
    &self
  ) -> Vec<&'static str> {
    let mut day = self.week_start;
    (0..GRID_COLUMNS)
      .map(|_| {
        let label = weekday_label(day);
        day = day.succ();
        label
      })
      .collect()
  }
}

pub fn parse_week_start(
  raw: &str
) -> Weekday {
  if raw
    .trim()
    .eq_ignore_ascii_case("sunday")
  {
    Weekday::Sun
  } else {
    Weekday::Mon
  }
}

fn weekday_label(
  day: Weekday
) -> &'static str {
  match day {
    | Weekday::Mon => "Mo",
    | Weekday::Tue => "Tu",
    | Weekday::Wed => "We",
    | Weekday::Thu => "Th",
    | Weekday::Fri => "Fr",
    | Weekday::Sat => "Sa",
    | Weekday::Sun => "Su"
  }
}

#[cfg(test)]
mod tests {
  use chrono::Weekday;

  use super::{
    MonthGrid,
    parse_week_start
  };
  use crate::date::CalendarDate;
  use crate::store::TaskStore;
  use crate::task::NewTask;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> CalendarDate {
    CalendarDate::from_ymd(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn grid_counts_tasks_per_day() {
    let mut store = TaskStore::new();
    let day = date(2025, 1, 15);
    let done = store
      .add(NewTask::new("a", "", day))
      .expect("add");
    store
      .add(NewTask::new("b", "", day))
      .expect("add");
    store
      .add(NewTask::new(
        "far away",
        "",
        date(2025, 6, 1)
      ))
      .expect("add");
    store.toggle_complete(done.id);

    let grid = MonthGrid::build(
      &store,
      date(2025, 1, 3),
      Weekday::Mon
    );
    assert_eq!(grid.rows.len(), 6);
    assert_eq!(
      grid.rows[0][0].date,
      date(2024, 12, 30)
    );
    assert!(!grid.rows[0][0].in_month);

    let cell = grid
      .cells()
      .find(|c| c.date == day)
      .expect("cell for the 15th");
    assert_eq!(cell.total, 2);
    assert_eq!(cell.completed, 1);
    assert_eq!(cell.open(), 1);

    let busy: usize = grid
      .cells()
      .map(|c| c.total)
      .sum();
    assert_eq!(busy, 2);
  }

  #[test]
  fn sunday_week_start_shifts_labels() {
    let grid = MonthGrid::build(
      &TaskStore::new(),
      date(2025, 1, 1),
      parse_week_start("Sunday")
    );
    assert_eq!(
      grid.weekday_labels()[0],
      "Su"
    );
    assert_eq!(
      grid.rows[0][0].date,
      date(2024, 12, 29)
    );
    assert_eq!(
      parse_week_start("whatever"),
      Weekday::Mon
    );
  }
}
