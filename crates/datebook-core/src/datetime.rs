use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

use crate::date::CalendarDate;

const TIMEZONE_CONFIG_FILE: &str =
  "datebook-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "DATEBOOK_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "DATEBOOK_TIME_CONFIG";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

/// Timezone used to decide which
/// calendar day "today" is.
pub fn local_timezone() -> &'static Tz {
  static LOCAL_TZ: OnceLock<Tz> =
    OnceLock::new();
  LOCAL_TZ
    .get_or_init(resolve_local_timezone)
}

#[must_use]
pub fn to_calendar_date(
  dt: DateTime<Utc>
) -> CalendarDate {
  CalendarDate::new(
    dt.with_timezone(local_timezone())
      .date_naive()
  )
}

#[must_use]
pub fn today() -> CalendarDate {
  to_calendar_date(Utc::now())
}

fn resolve_local_timezone() -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return tz;
  }

  tracing::debug!(
    "no timezone configured; using UTC"
  );
  chrono_tz::UTC
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

fn load_timezone_from_file(
  path: &PathBuf
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let timezone = match timezone_from_toml(
    &raw
  ) {
    | Ok(timezone) => timezone,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

/// Accepts a top-level `timezone` key or
/// a `[time]` table with one.
fn timezone_from_toml(
  raw: &str
) -> Result<Option<String>, toml::de::Error>
{
  let parsed =
    toml::from_str::<TimezoneConfig>(raw)?;
  Ok(parsed.timezone.or_else(|| {
    parsed
      .time
      .and_then(|section| section.timezone)
  }))
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured local timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Resolves a user-typed date relative to
/// `today`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_date_expr(
  input: &str,
  today: CalendarDate
) -> anyhow::Result<CalendarDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return offset_days(today, 1);
    }
    | "yesterday" => {
      return offset_days(today, -1);
    }
    | _ => {}
  }

  if let Some(target) =
    parse_weekday_name(&lower)
  {
    return Ok(next_weekday_date(
      today, target
    ));
  }

  let rel_re = Regex::new(
    r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dw])$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile failure: \
       {e}"
    )
  })?;

  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let days = match caps
      .name("unit")
      .map(|m| m.as_str())
    {
      | Some("d") => num,
      | Some("w") => num.saturating_mul(7),
      | other => {
        return Err(anyhow!(
          "unknown relative unit: \
           {other:?}"
        ));
      }
    };

    return offset_days(
      today,
      if sign == "-" {
        -days
      } else {
        days
      }
    );
  }

  CalendarDate::parse(token)
    .map_err(anyhow::Error::from)
    .with_context(|| {
      "supported formats: \
       today/tomorrow/yesterday, \
       weekday names (e.g. monday), \
       +Nd/-Nd, +Nw/-Nw, YYYY-MM-DD"
    })
}

fn offset_days(
  today: CalendarDate,
  days: i64
) -> anyhow::Result<CalendarDate> {
  today
    .checked_add_days(days)
    .ok_or_else(|| {
      anyhow!(
        "relative date out of range: \
         {days} day(s) from {today}"
      )
    })
}

/// Accepts `YYYY-MM` and returns the
/// first day of that month.
pub fn parse_month_expr(
  input: &str
) -> anyhow::Result<CalendarDate> {
  let token = input.trim();
  CalendarDate::parse(&format!(
    "{token}-01"
  ))
  .map_err(|_| {
    anyhow!(
      "invalid month {input:?}: \
       expected YYYY-MM"
    )
  })
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

/// Strictly after `from`: asking for
/// the current weekday yields next week.
fn next_weekday_date(
  from: CalendarDate,
  target: Weekday
) -> CalendarDate {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  from.add_days(delta)
}
