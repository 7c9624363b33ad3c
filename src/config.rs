//! Engine configuration: a flat `key = value` text file (the classic
//! source-port `.cfg` convention) plus the `ddfcvar` console command for
//! changing a setting at runtime without touching the file, and the `clap`
//! command line that overrides both.

use std::path::Path;
use std::str::FromStr;

use clap::Parser;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected `key = value`, got {text:?}")]
    Malformed { line: usize, text: String },
    #[error("unknown cvar {0:?}")]
    UnknownCvar(String),
    #[error("cvar {name:?} expects a {expected} value, got {value:?}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        value: String,
    },
}

/// Runtime-tunable settings; every field here is also a `ddfcvar` name
/// (the snake_case field name itself).
#[derive(Debug, Clone)]
pub struct Config {
    pub screen_width: u32,
    pub screen_height: u32,
    pub fullscreen: bool,
    pub sfx_volume: u8,
    pub music_volume: u8,
    pub mouse_sensitivity: f32,
    pub turn_speed: f32,
    pub skill: u8,
    pub iwad: Option<String>,
    pub warp_map: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 800,
            fullscreen: false,
            sfx_volume: 15,
            music_volume: 15,
            mouse_sensitivity: 5.0,
            turn_speed: 1.0,
            skill: 3,
            iwad: None,
            warp_map: None,
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults for any cvar the file doesn't
    /// mention. A missing file is not an error — first run simply has none
    /// yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut cfg = Self::default();
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(cfg),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Malformed {
                    line: i + 1,
                    text: raw.to_string(),
                });
            };
            cfg.set_cvar(key.trim(), value.trim())?;
        }
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = format!(
            "screen_width = {}\n\
             screen_height = {}\n\
             fullscreen = {}\n\
             sfx_volume = {}\n\
             music_volume = {}\n\
             mouse_sensitivity = {}\n\
             turn_speed = {}\n\
             skill = {}\n",
            self.screen_width,
            self.screen_height,
            self.fullscreen,
            self.sfx_volume,
            self.music_volume,
            self.mouse_sensitivity,
            self.turn_speed,
            self.skill,
        );
        std::fs::write(path, text).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// `ddfcvar <name> <value>`: the single console command this core
    /// exposes for changing a setting without restarting. Shared by the
    /// config-file parser and whatever front end wires up an in-game
    /// console.
    pub fn set_cvar(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        match name {
            "screen_width" => self.screen_width = parse(name, value)?,
            "screen_height" => self.screen_height = parse(name, value)?,
            "fullscreen" => self.fullscreen = parse_bool(name, value)?,
            "sfx_volume" => self.sfx_volume = parse(name, value)?,
            "music_volume" => self.music_volume = parse(name, value)?,
            "mouse_sensitivity" => self.mouse_sensitivity = parse(name, value)?,
            "turn_speed" => self.turn_speed = parse(name, value)?,
            "skill" => self.skill = parse(name, value)?,
            "iwad" => self.iwad = Some(value.to_string()),
            "warp" => self.warp_map = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownCvar(name.to_string())),
        }
        Ok(())
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::TypeMismatch {
        name: name.to_string(),
        expected: std::any::type_name::<T>(),
        value: value.to_string(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::TypeMismatch {
            name: name.to_string(),
            expected: "bool",
            value: value.to_string(),
        }),
    }
}

/*====================================================================*/
/*                          Command line                              */
/*====================================================================*/

/// Command-line flags, folded onto a loaded [`Config`] with CLI values
/// always winning over the file.
#[derive(Parser, Debug)]
#[command(name = "yadoom", about = "Classic Doom-family source port core")]
pub struct Cli {
    /// Path to the IWAD/PWAD to load.
    #[arg(short, long)]
    pub iwad: Option<String>,

    /// Map to warp directly to, e.g. `E1M1` or `MAP01`.
    #[arg(long)]
    pub warp: Option<String>,

    #[arg(long)]
    pub skill: Option<u8>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub fullscreen: bool,

    /// Run the tick scheduler in singletics mode (deterministic, no
    /// wall-clock pacing) — for scripted playback, not interactive play.
    #[arg(long)]
    pub singletics: bool,

    /// Path to the config file.
    #[arg(long, default_value = "yadoom.cfg")]
    pub config: String,
}

impl Cli {
    /// Fold CLI overrides onto a loaded config, CLI taking priority.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(w) = self.width {
            cfg.screen_width = w;
        }
        if let Some(h) = self.height {
            cfg.screen_height = h;
        }
        if self.fullscreen {
            cfg.fullscreen = true;
        }
        if let Some(s) = self.skill {
            cfg.skill = s;
        }
        if self.iwad.is_some() {
            cfg.iwad = self.iwad.clone();
        }
        if self.warp.is_some() {
            cfg.warp_map = self.warp.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = Config::load("/nonexistent/path/yadoom.cfg").unwrap();
        assert_eq!(cfg.screen_width, 1280);
    }

    #[test]
    fn load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yadoom.cfg");

        let mut cfg = Config::default();
        cfg.set_cvar("screen_width", "800").unwrap();
        cfg.set_cvar("fullscreen", "true").unwrap();
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.screen_width, 800);
        assert!(loaded.fullscreen);
    }

    #[test]
    fn unknown_cvar_errors() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set_cvar("no_such_cvar", "1"),
            Err(ConfigError::UnknownCvar(_))
        ));
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let mut cfg = Config::default();
        cfg.screen_width = 640;
        let cli = Cli {
            iwad: None,
            warp: None,
            skill: None,
            width: Some(1920),
            height: None,
            fullscreen: false,
            singletics: false,
            config: "yadoom.cfg".into(),
        };
        cli.apply(&mut cfg);
        assert_eq!(cfg.screen_width, 1920);
    }
}
