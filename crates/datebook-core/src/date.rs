use std::fmt;
use std::str::FromStr;

use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Weekday
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

use crate::error::DateParseError;

pub const EXCHANGE_DATE_FORMAT: &str =
  "%Y-%m-%d";

/// A year/month/day value with no time
/// of day and no timezone.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
  #[must_use]
  pub fn new(date: NaiveDate) -> Self {
    Self(date)
  }

  pub fn from_ymd(
    year: i32,
    month: u32,
    day: u32
  ) -> Option<Self> {
    NaiveDate::from_ymd_opt(
      year, month, day
    )
    .map(Self)
  }

  /// Strict `YYYY-MM-DD`. Surrounding
  /// whitespace is ignored.
  pub fn parse(
    input: &str
  ) -> Result<Self, DateParseError> {
    let token = input.trim();
    let bytes = token.as_bytes();
    let shaped = bytes.len() == 10
      && bytes.iter().enumerate().all(
        |(idx, b)| {
          if idx == 4 || idx == 7 {
            *b == b'-'
          } else {
            b.is_ascii_digit()
          }
        }
      );
    if !shaped {
      return Err(DateParseError {
        input: input.to_string()
      });
    }

    NaiveDate::parse_from_str(
      token,
      EXCHANGE_DATE_FORMAT
    )
    .map(Self)
    .map_err(|_| {
      DateParseError {
        input: input.to_string()
      }
    })
  }

  #[must_use]
  pub fn naive(self) -> NaiveDate {
    self.0
  }

  pub fn year(self) -> i32 {
    self.0.year()
  }

  pub fn month(self) -> u32 {
    self.0.month()
  }

  pub fn day(self) -> u32 {
    self.0.day()
  }

  pub fn weekday(self) -> Weekday {
    self.0.weekday()
  }

  #[must_use]
  pub fn first_of_month(self) -> Self {
    Self(self.0.with_day(1).unwrap_or(
      self.0
    ))
  }

  #[must_use]
  pub fn last_of_month(self) -> Self {
    let first = self.first_of_month();
    first.shift_months(1).add_days(-1)
  }

  pub fn days_in_month(self) -> u32 {
    self.last_of_month().day()
  }

  /// `None` when the result falls
  /// outside chrono's date range.
  pub fn checked_add_days(
    self,
    days: i64
  ) -> Option<Self> {
    Duration::try_days(days)
      .and_then(|delta| {
        self.0.checked_add_signed(delta)
      })
      .map(Self)
  }

  /// Returns `self` unchanged when the
  /// result is out of range.
  #[must_use]
  pub fn add_days(
    self,
    days: i64
  ) -> Self {
    self
      .checked_add_days(days)
      .unwrap_or(self)
  }

  /// Moves by whole months, clamping the
  /// day to the target month's length.
  #[must_use]
  pub fn shift_months(
    self,
    months: i32
  ) -> Self {
    let total = self.0.year() * 12
      + self.0.month0() as i32
      + months;
    let year = total.div_euclid(12);
    let month =
      total.rem_euclid(12) as u32 + 1;

    let mut day = self.0.day();
    while day > 28 {
      if let Some(date) =
        NaiveDate::from_ymd_opt(
          year, month, day
        )
      {
        return Self(date);
      }
      day -= 1;
    }
    NaiveDate::from_ymd_opt(
      year, month, day
    )
    .map(Self)
    .unwrap_or(self)
  }

  /// The first `week_start` on or before
  /// this date.
  #[must_use]
  pub fn start_of_week(
    self,
    week_start: Weekday
  ) -> Self {
    let day_idx = self
      .0
      .weekday()
      .num_days_from_monday()
      as i64;
    let start_idx = week_start
      .num_days_from_monday()
      as i64;
    let diff =
      (7 + day_idx - start_idx) % 7;
    self.add_days(-diff)
  }
}

impl From<NaiveDate> for CalendarDate {
  fn from(date: NaiveDate) -> Self {
    Self(date)
  }
}

impl fmt::Display for CalendarDate {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}",
      self
        .0
        .format(EXCHANGE_DATE_FORMAT)
    )
  }
}

impl FromStr for CalendarDate {
  type Err = DateParseError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl Serialize for CalendarDate {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer
      .serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de>
  for CalendarDate
{
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    Self::parse(&raw)
      .map_err(serde::de::Error::custom)
  }
}
