use crate::error::Result;
use lazy_static::lazy_static;
use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

lazy_static! {
    static ref OPTIONS: RwLock<PlayerOptions> = RwLock::new(PlayerOptions::load());
}

/// Config files probed in order; later files override earlier ones.
const CONFIG_PATHS: [&str; 2] = ["./livecast.toml", "./livecast_config.toml"];

const TEMPLATE: &str = include_str!("../livecast.template.toml");

/// Fixed display and behavior options handed to the player engine next to
/// the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerOptions {
    /// Location of the engine skin resources
    pub skin_url: String,
    /// Idle time before the engine hides its UI chrome
    pub hide_ui_timeout_ms: u64,
    /// Enabled engine plugins
    pub plugins: Vec<String>,
    /// Playback speed choices offered to the viewer
    pub playback_rates: Vec<f64>,
    /// Prefix of every caption display label
    pub caption_label: String,
    /// Slack added to live transition delays to absorb clock and stream start skew
    pub live_grace_ms: u64,
}

/// Keys of a config file. Absent keys leave the current value alone.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    skin_url: Option<String>,
    hide_ui_timeout_ms: Option<u64>,
    plugins: Option<Vec<String>>,
    playback_rates: Option<Vec<f64>>,
    caption_label: Option<String>,
    live_grace_ms: Option<u64>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            skin_url: String::from("/~assets/paella"),
            hide_ui_timeout_ms: 5000,
            plugins: [
                "es.upv.paella.playPauseButton",
                "es.upv.paella.currentTimeLabel",
                "es.upv.paella.volumeButtonPlugin",
                "es.upv.paella.fullscreenButton",
                "es.upv.paella.qualitySelector",
                "es.upv.paella.playbackRateButton",
                "es.upv.paella.captionsSelectorPlugin",
                "es.upv.paella.hlsVideoFormat",
                "es.upv.paella.mp4VideoFormat",
                "es.upv.paella.vttManifestCaptionsPlugin",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            playback_rates: vec![0.75, 1.0, 1.25, 1.5, 2.0],
            caption_label: String::from("Captions"),
            live_grace_ms: 500,
        }
    }
}

impl PlayerOptions {
    fn load() -> Self {
        Self::load_from(|key| env::var(key).ok(), &CONFIG_PATHS)
    }

    /// Defaults, then variables from `env`, then each existing file in `paths`.
    fn load_from<P: AsRef<Path>>(env: impl Fn(&str) -> Option<String>, paths: &[P]) -> Self {
        let mut options = PlayerOptions::default();

        // Environment variables first
        if let Some(url) = env("LIVECAST_SKIN_URL") {
            options.skin_url = url;
        }
        if let Some(timeout) = env("LIVECAST_HIDE_UI_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(ms) => options.hide_ui_timeout_ms = ms,
                Err(e) => warn!("Ignoring LIVECAST_HIDE_UI_TIMEOUT_MS={}: {}", timeout, e),
            }
        }
        if let Some(label) = env("LIVECAST_CAPTION_LABEL") {
            options.caption_label = label;
        }

        // Then config files
        for path in paths {
            let path = path.as_ref();
            let Ok(content) = std::fs::read_to_string(path) else {
                continue;
            };
            match options.apply_config(&content) {
                Ok(()) => debug!("Loaded player options from {}", path.display()),
                Err(e) => warn!("Ignoring invalid config file {}: {}", path.display(), e),
            }
        }

        options
    }

    /// Reads options from a TOML config file on top of the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut options = PlayerOptions::default();
        options.apply_config(&content)?;
        Ok(options)
    }

    /// Applies the keys of a TOML config file. Unknown keys are ignored; an
    /// invalid file changes nothing.
    pub fn apply_config(&mut self, content: &str) -> Result<()> {
        let file: ConfigFile = toml::from_str(content)?;

        if let Some(skin_url) = file.skin_url {
            self.skin_url = skin_url;
        }
        if let Some(timeout) = file.hide_ui_timeout_ms {
            self.hide_ui_timeout_ms = timeout;
        }
        if let Some(plugins) = file.plugins {
            self.plugins = plugins;
        }
        if let Some(rates) = file.playback_rates {
            self.playback_rates = rates;
        }
        if let Some(label) = file.caption_label {
            self.caption_label = label;
        }
        if let Some(grace) = file.live_grace_ms {
            self.live_grace_ms = grace;
        }
        Ok(())
    }
}

/// Re-reads environment variables and config files.
pub fn reload() {
    let options = PlayerOptions::load();
    *OPTIONS.write() = options;
}

/// Returns the process-wide player options
pub fn options() -> PlayerOptions {
    OPTIONS.read().clone()
}

/// Creates a default config template file if it doesn't exist
pub fn create_default_config_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if !path.as_ref().exists() {
        std::fs::write(path, TEMPLATE)?;
    }
    Ok(())
}
