use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

const RC_ENV_VAR: &str = "DATEBOOKRC";
const RC_FILE_NAME: &str = ".datebookrc";
const DEFAULT_DATA_DIR: &str =
  "~/.datebook";

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "data.location".to_string(),
      DEFAULT_DATA_DIR.to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "calendar.week_start".to_string(),
      "monday".to_string()
    );
    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading datebookrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no datebookrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  /// Parses rc text as if it had been
  /// read from a file in `base_dir`.
  pub fn from_str_in(
    text: &str,
    base_dir: &Path
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();
    cfg.load_text(
      text,
      Path::new("<inline>"),
      base_dir
    )?;
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// `None` when unset; unknown spellings
  /// are an error rather than `false`.
  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .map
      .get(key)
      .map(|v| {
        parse_bool(v).ok_or_else(|| {
          anyhow!(
            "invalid {key} setting: {v}"
          )
        })
      })
      .transpose()
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    self.load_text(
      &text, &path, &base_dir
    )
  }

  fn load_text(
    &mut self,
    text: &str,
    path: &Path,
    base_dir: &Path
  ) -> anyhow::Result<()> {
    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    expand_tilde(Path::new(
      DEFAULT_DATA_DIR
    ))
  };

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping datebookrc"
    );
    return Ok(None);
  };
  let candidate = home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::path::Path;

  use super::{
    Config,
    resolve_data_dir
  };

  #[test]
  fn parses_keys_comments_and_overrides()
  {
    let text = "# datebook settings\n\
                color = off  # no ansi\n\
                calendar.week_start=sunday\n";
    let mut cfg = Config::from_str_in(
      text,
      Path::new(".")
    )
    .expect("parse config");
    assert_eq!(
      cfg
        .get_bool("color")
        .expect("color is a bool"),
      Some(false)
    );
    assert_eq!(
      cfg.get("calendar.week_start")
        .as_deref(),
      Some("sunday")
    );

    cfg.apply_overrides([(
      "rc.color".to_string(),
      "yes".to_string()
    )]);
    assert_eq!(
      cfg
        .get_bool("color")
        .expect("color is a bool"),
      Some(true)
    );
    assert_eq!(
      cfg
        .get_bool("missing.key")
        .expect("unset key"),
      None
    );

    cfg.apply_overrides([(
      "color".to_string(),
      "sometimes".to_string()
    )]);
    assert!(
      cfg.get_bool("color").is_err()
    );
  }

  #[test]
  fn rejects_lines_without_equals() {
    let err = Config::from_str_in(
      "just words",
      Path::new(".")
    )
    .expect_err("invalid line");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }

  #[test]
  fn follows_includes_relative_to_base()
  {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    fs::write(
      temp.path().join("extra.rc"),
      "data.location = /tmp/elsewhere\n"
    )
    .expect("write include");

    let cfg = Config::from_str_in(
      "include extra.rc\n\
       include missing.rc\n",
      temp.path()
    )
    .expect("parse config");
    assert_eq!(
      cfg.get("data.location").as_deref(),
      Some("/tmp/elsewhere")
    );
    assert_eq!(cfg.loaded_files.len(), 1);
  }

  #[test]
  fn data_dir_flag_wins() {
    let cfg = Config::default();
    let dir = resolve_data_dir(
      &cfg,
      Some(Path::new("/srv/datebook"))
    )
    .expect("resolve");
    assert_eq!(
      dir,
      Path::new("/srv/datebook")
    );
  }
}
