//! Application-level configuration loading: game defaults, setup bounds and playlist presets.

use std::{env, fs, io::ErrorKind, ops::RangeInclusive, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TIMELINE_QUIZ_CONFIG_PATH";

const DEFAULT_TARGET_SCORE: u32 = 10;
const TARGET_SCORE_RANGE: RangeInclusive<u32> = 3..=30;
const DEFAULT_ROUND_SECONDS: u32 = 60;
const ROUND_SECONDS_RANGE: RangeInclusive<u32> = 15..=120;
const ROUND_SECONDS_STEP: u32 = 5;
const DEFAULT_GUESS_YEAR: i32 = 2000;
const DEFAULT_TURN_DELAY_MS: u64 = 100;

/// Playlist offered on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPreset {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub default_target_score: u32,
    pub target_score_range: RangeInclusive<u32>,
    pub default_round_seconds: u32,
    pub round_seconds_range: RangeInclusive<u32>,
    pub round_seconds_step: u32,
    /// Year submitted when the guessing countdown elapses.
    pub default_guess_year: i32,
    /// Pause between the end of a turn and the next round.
    pub turn_delay: Duration,
    pub playlists: Vec<PlaylistPreset>,
    pub spotify_api_base_url: Option<String>,
    /// Spotify Connect device to drive; `None` runs with the logging player.
    pub playback_device: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        playlists = app_config.playlists.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Whether `seconds` is an accepted round duration.
    pub fn accepts_round_seconds(&self, seconds: u32) -> bool {
        self.round_seconds_range.contains(&seconds)
            && (self.round_seconds_step == 0 || seconds % self.round_seconds_step == 0)
    }

    /// Whether `target` is an accepted target score.
    pub fn accepts_target_score(&self, target: u32) -> bool {
        self.target_score_range.contains(&target)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_target_score: DEFAULT_TARGET_SCORE,
            target_score_range: TARGET_SCORE_RANGE,
            default_round_seconds: DEFAULT_ROUND_SECONDS,
            round_seconds_range: ROUND_SECONDS_RANGE,
            round_seconds_step: ROUND_SECONDS_STEP,
            default_guess_year: DEFAULT_GUESS_YEAR,
            turn_delay: Duration::from_millis(DEFAULT_TURN_DELAY_MS),
            playlists: default_playlists(),
            spotify_api_base_url: None,
            playback_device: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    target_score: Option<RawBounds>,
    round_seconds: Option<RawRoundSeconds>,
    default_guess_year: Option<i32>,
    turn_delay_ms: Option<u64>,
    playlists: Option<Vec<PlaylistPreset>>,
    spotify: Option<RawSpotify>,
}

#[derive(Debug, Deserialize)]
struct RawBounds {
    default: u32,
    min: u32,
    max: u32,
}

#[derive(Debug, Deserialize)]
struct RawRoundSeconds {
    #[serde(flatten)]
    bounds: RawBounds,
    #[serde(default = "default_round_step")]
    step: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSpotify {
    api_base_url: Option<String>,
    device_name: Option<String>,
}

fn default_round_step() -> u32 {
    ROUND_SECONDS_STEP
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let mut config = AppConfig::default();

        if let Some(bounds) = value.target_score {
            config.default_target_score = bounds.default;
            config.target_score_range = bounds.min..=bounds.max;
        }
        if let Some(RawRoundSeconds { bounds, step }) = value.round_seconds {
            config.default_round_seconds = bounds.default;
            config.round_seconds_range = bounds.min..=bounds.max;
            config.round_seconds_step = step;
        }
        if let Some(year) = value.default_guess_year {
            config.default_guess_year = year;
        }
        if let Some(delay) = value.turn_delay_ms {
            config.turn_delay = Duration::from_millis(delay);
        }
        if let Some(playlists) = value.playlists {
            config.playlists = playlists;
        }
        if let Some(spotify) = value.spotify {
            config.spotify_api_base_url = spotify.api_base_url;
            config.playback_device = spotify.device_name.filter(|name| !name.is_empty());
        }

        config
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn preset(id: &str, name: &str, description: &str) -> PlaylistPreset {
    PlaylistPreset {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

/// Built-in playlist presets shipped with the binary.
fn default_playlists() -> Vec<PlaylistPreset> {
    vec![
        preset(
            "37i9dQZF1DXcBWIGoYBM5M",
            "Today's Top Hits",
            "The biggest songs right now",
        ),
        preset(
            "37i9dQZF1DX4JAvHpjipBk",
            "New Music Friday",
            "Fresh new tracks every week",
        ),
        preset(
            "37i9dQZF1DWTJ7xPn4vNaz",
            "All Out 70s",
            "The biggest songs of the 1970s",
        ),
        preset(
            "37i9dQZF1DX4o1oenSJRJd",
            "All Out 80s",
            "The biggest songs of the 1980s",
        ),
        preset(
            "37i9dQZF1DXbTxRx8R3SNd",
            "All Out 90s",
            "The biggest songs of the 1990s",
        ),
        preset(
            "37i9dQZF1DX4sWSpwq3LiO",
            "All Out 2000s",
            "The biggest songs of the 2000s",
        ),
        preset(
            "37i9dQZF1DX5Ejj0EkURtP",
            "All Out 2010s",
            "The biggest songs of the 2010s",
        ),
        preset(
            "37i9dQZF1DWVRSukIED0e9",
            "Rock Classics",
            "Rock legends & iconic bands",
        ),
        preset(
            "37i9dQZF1DWXRqgorJj26U",
            "Rock en Espanol",
            "Rock clasico en espanol",
        ),
        preset(
            "37i9dQZF1DX10zKzsJ2jva",
            "Reggaeton Clasico",
            "Los clasicos del reggaeton",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_setup_screen() {
        let config = AppConfig::default();
        assert_eq!(config.default_target_score, 10);
        assert_eq!(config.default_round_seconds, 60);
        assert_eq!(config.default_guess_year, 2000);
        assert_eq!(config.turn_delay, Duration::from_millis(100));
        assert_eq!(config.playlists.len(), 10);
    }

    #[test]
    fn round_seconds_must_be_in_range_and_on_step() {
        let config = AppConfig::default();
        assert!(config.accepts_round_seconds(15));
        assert!(config.accepts_round_seconds(120));
        assert!(!config.accepts_round_seconds(10));
        assert!(!config.accepts_round_seconds(62));
        assert!(!config.accepts_round_seconds(125));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "round_seconds": { "default": 30, "min": 10, "max": 60 },
                "turn_delay_ms": 250,
                "spotify": { "device_name": "Living Room" }
            }"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.default_round_seconds, 30);
        assert_eq!(config.round_seconds_step, 5);
        assert!(config.accepts_round_seconds(10));
        assert_eq!(config.turn_delay, Duration::from_millis(250));
        assert_eq!(config.default_target_score, 10);
        assert_eq!(config.playback_device.as_deref(), Some("Living Room"));
        assert_eq!(config.playlists.len(), 10);
    }
}
