//! Switches remembered between runs.
//!
//! The file is `key = value` lines with `#` comments. Keys come from
//! [`PrefKey`]; unknown keys are skipped so older binaries can read newer
//! files.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "snowfall";
const FILE_NAME: &str = "prefs.txt";
const HEADER: &str = "# snowfall prefs v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppPrefs {
    pub snow_enabled: bool,
    pub show_hud: bool,
}

impl Default for AppPrefs {
    fn default() -> Self {
        Self {
            snow_enabled: true,
            show_hud: true,
        }
    }
}

/// Every persisted switch, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefKey {
    SnowEnabled,
    ShowHud,
}

impl PrefKey {
    pub const ALL: [Self; 2] = [Self::SnowEnabled, Self::ShowHud];

    pub fn name(self) -> &'static str {
        match self {
            Self::SnowEnabled => "snow_enabled",
            Self::ShowHud => "show_hud",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn get(self, prefs: &AppPrefs) -> bool {
        match self {
            Self::SnowEnabled => prefs.snow_enabled,
            Self::ShowHud => prefs.show_hud,
        }
    }

    pub fn set(self, prefs: &mut AppPrefs, on: bool) {
        match self {
            Self::SnowEnabled => prefs.snow_enabled = on,
            Self::ShowHud => prefs.show_hud = on,
        }
    }
}

#[derive(Debug)]
pub enum PrefsError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    /// Line without an `=`.
    Syntax { line: usize },
    /// Known key with a value that is not a switch.
    Value {
        line: usize,
        key: PrefKey,
        value: String,
    },
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "read {}: {source}", path.display()),
            Self::Write { path, source } => write!(f, "write {}: {source}", path.display()),
            Self::Syntax { line } => write!(f, "line {line}: expected key = value"),
            Self::Value { line, key, value } => {
                write!(f, "line {line}: {} wants on/off, got {value:?}", key.name())
            }
        }
    }
}

impl std::error::Error for PrefsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl AppPrefs {
    pub fn parse(text: &str) -> Result<Self, PrefsError> {
        let mut prefs = Self::default();
        let entries = text
            .lines()
            .enumerate()
            .map(|(i, raw)| (i + 1, raw.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        for (line, entry) in entries {
            let (key, value) = entry.split_once('=').ok_or(PrefsError::Syntax { line })?;
            let Some(key) = PrefKey::from_name(key.trim()) else {
                log::debug!("prefs line {line}: skipping unknown key {:?}", key.trim());
                continue;
            };
            let on = parse_switch(value).ok_or_else(|| PrefsError::Value {
                line,
                key,
                value: value.trim().to_string(),
            })?;
            key.set(&mut prefs, on);
        }
        Ok(prefs)
    }
}

impl fmt::Display for AppPrefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        for key in PrefKey::ALL {
            writeln!(f, "{}={}", key.name(), key.get(self))?;
        }
        Ok(())
    }
}

/// Where prefs are read from and written to. A store without a path keeps
/// nothing and always loads defaults.
#[derive(Debug, Clone, Default)]
pub struct PrefsStore {
    path: Option<PathBuf>,
}

impl PrefsStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// `explicit` if given, else the per-user config location.
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        Self::new(explicit.or_else(|| config_path(|k| std::env::var_os(k))))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<AppPrefs, PrefsError> {
        let Some(path) = self.path() else {
            return Ok(AppPrefs::default());
        };
        match fs::read_to_string(path) {
            Ok(text) => AppPrefs::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppPrefs::default()),
            Err(source) => Err(PrefsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, prefs: &AppPrefs) -> Result<(), PrefsError> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        replace_file(path, &prefs.to_string()).map_err(|source| PrefsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Write through a sibling temp file so a crash never leaves half a file.
fn replace_file(path: &Path, body: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)
}

/// `$XDG_CONFIG_HOME/snowfall/prefs.txt`, falling back to `$HOME/.config`.
fn config_path(var: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let set = |name: &str| var(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    let base = set("XDG_CONFIG_HOME").or_else(|| set("HOME").map(|home| home.join(".config")))?;
    Some(base.join(APP_DIR).join(FILE_NAME))
}

fn parse_switch(raw: &str) -> Option<bool> {
    let v = raw.trim().to_ascii_lowercase();
    if matches!(v.as_str(), "on" | "true" | "yes" | "1") {
        Some(true)
    } else if matches!(v.as_str(), "off" | "false" | "no" | "0") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<OsString> + 'a {
        move |k: &str| vars.iter().find(|(n, _)| *n == k).map(|(_, v)| OsString::from(v))
    }

    #[test]
    fn xdg_wins_over_home() {
        let p = config_path(env(&[("XDG_CONFIG_HOME", "/x"), ("HOME", "/h")]));
        assert_eq!(p, Some(PathBuf::from("/x/snowfall/prefs.txt")));
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        let p = config_path(env(&[("XDG_CONFIG_HOME", ""), ("HOME", "/h")]));
        assert_eq!(p, Some(PathBuf::from("/h/.config/snowfall/prefs.txt")));
        assert_eq!(config_path(env(&[])), None);
    }

    #[test]
    fn key_table_round_trips_names() {
        for key in PrefKey::ALL {
            assert_eq!(PrefKey::from_name(key.name()), Some(key));
        }
        assert_eq!(PrefKey::from_name("stage_mode"), None);
    }
}
