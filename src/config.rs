use log::{LevelFilter, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATH: &str = "deadsync-display.ini";

// --- Minimal INI reader ---
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content);
        Ok(())
    }

    pub fn parse(&mut self, content: &str) {
        self.sections.clear();
        let mut current_section = String::new();

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                current_section = line[1..line.len() - 1].trim().to_string();
                self.sections.entry(current_section.clone()).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                self.sections
                    .entry(current_section.clone())
                    .or_default()
                    .insert(key.to_string(), value.trim().to_string());
            }
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenType {
    Exclusive,
    Borderless,
}

impl FullscreenType {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Exclusive => "Exclusive",
            Self::Borderless => "Borderless",
        }
    }
}

impl FromStr for FullscreenType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Ok(Self::Exclusive),
            "borderless" => Ok(Self::Borderless),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    #[allow(dead_code)]
    Windowed,
    Fullscreen(FullscreenType),
}

/// Device the player mainly plays with. Touch players get the on-screen
/// escape/replay buttons without having to tap first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputDevice {
    #[default]
    Keyboard,
    Touch,
}

impl InputDevice {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Keyboard => "Keyboard",
            Self::Touch => "Touch",
        }
    }
}

impl FromStr for InputDevice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyboard" | "gamepad" => Ok(Self::Keyboard),
            "touch" => Ok(Self::Touch),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InfoPanelPosition {
    #[default]
    Top,
    Bottom,
    Hidden,
}

impl InfoPanelPosition {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Hidden => "hidden",
        }
    }
}

impl FromStr for InfoPanelPosition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "hidden" | "off" => Ok(Self::Hidden),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(&self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: LogLevel,
    pub main_input_device: InputDevice,
    /// Policy switch: never offer the fullscreen button.
    pub disable_fullscreen: bool,
    pub fullscreen_type: FullscreenType,
    pub info_panel_position: InfoPanelPosition,
    pub display_width: u32,
    pub display_height: u32,
    /// Host tick rate in frames per second (1..=1000).
    pub frame_rate: u32,
    /// JSON-lines snapshot trace. `None` logs snapshots instead.
    pub trace_path: Option<PathBuf>,
    pub background_path: Option<PathBuf>,
    /// Game time at which the background video starts. `None` = no video.
    pub video_offset_seconds: Option<f32>,
    pub players: u8,
    /// Times the host presses replay when the song ends (0..=10).
    pub replays: u32,
    pub song_seconds: f32,
    pub tutorial: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            main_input_device: InputDevice::Keyboard,
            disable_fullscreen: false,
            fullscreen_type: FullscreenType::Borderless,
            info_panel_position: InfoPanelPosition::Top,
            display_width: 1600,
            display_height: 900,
            frame_rate: 60,
            trace_path: None,
            background_path: None,
            video_offset_seconds: None,
            players: 1,
            replays: 1,
            song_seconds: 30.0,
            tutorial: false,
        }
    }
}

// Global, mutable configuration instance.
static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

#[inline(always)]
fn parse_flag(v: &str) -> Option<bool> {
    let v = v.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false")
        || v.eq_ignore_ascii_case("no")
        || v.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        v.parse::<u8>().ok().map(|n| n != 0)
    }
}

#[inline(always)]
fn parse_path(v: &str) -> Option<PathBuf> {
    let v = v.trim();
    (!v.is_empty()).then(|| PathBuf::from(v))
}

fn flag_str(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

impl Config {
    /// Builds a config from `[Options]`, using defaults for missing or malformed keys.
    pub fn from_ini(conf: &SimpleIni) -> Self {
        let default = Self::default();
        let opt = |key: &str| conf.get("Options", key);

        Self {
            log_level: opt("LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level),
            main_input_device: opt("MainInputDevice")
                .and_then(|v| InputDevice::from_str(&v).ok())
                .unwrap_or(default.main_input_device),
            disable_fullscreen: opt("DisableFullscreen")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(default.disable_fullscreen),
            fullscreen_type: opt("FullscreenType")
                .and_then(|v| FullscreenType::from_str(&v).ok())
                .unwrap_or(default.fullscreen_type),
            info_panel_position: opt("InfoPanelPosition")
                .and_then(|v| InfoPanelPosition::from_str(&v).ok())
                .unwrap_or(default.info_panel_position),
            display_width: opt("DisplayWidth")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.display_width),
            display_height: opt("DisplayHeight")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.display_height),
            frame_rate: opt("FrameRate")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .map_or(default.frame_rate, |v| v.clamp(1, 1000)),
            trace_path: opt("TracePath").and_then(|v| parse_path(&v)),
            background_path: opt("BackgroundPath").and_then(|v| parse_path(&v)),
            video_offset_seconds: match opt("VideoOffsetSeconds") {
                Some(v) if v.trim().eq_ignore_ascii_case("off") || v.trim().is_empty() => None,
                Some(v) => v.trim().parse::<f32>().ok().or(default.video_offset_seconds),
                None => default.video_offset_seconds,
            },
            players: opt("Players")
                .and_then(|v| v.trim().parse::<u8>().ok())
                .map_or(default.players, |v| v.clamp(1, 2)),
            replays: opt("Replays")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .map_or(default.replays, |v| v.min(10)),
            song_seconds: opt("SongSeconds")
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite())
                .map_or(default.song_seconds, |v| v.max(1.0)),
            tutorial: opt("Tutorial")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(default.tutorial),
        }
    }

    fn to_ini_string(&self) -> String {
        let path_str = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        // [Options] section - keys in alphabetical order
        let mut content = String::from("[Options]\n");
        content.push_str(&format!("BackgroundPath={}\n", path_str(&self.background_path)));
        content.push_str(&format!("DisableFullscreen={}\n", flag_str(self.disable_fullscreen)));
        content.push_str(&format!("DisplayHeight={}\n", self.display_height));
        content.push_str(&format!("DisplayWidth={}\n", self.display_width));
        content.push_str(&format!("FrameRate={}\n", self.frame_rate));
        content.push_str(&format!("FullscreenType={}\n", self.fullscreen_type.as_str()));
        content.push_str(&format!(
            "InfoPanelPosition={}\n",
            self.info_panel_position.as_str()
        ));
        content.push_str(&format!("LogLevel={}\n", self.log_level.as_str()));
        content.push_str(&format!(
            "MainInputDevice={}\n",
            self.main_input_device.as_str()
        ));
        content.push_str(&format!("Players={}\n", self.players));
        content.push_str(&format!("Replays={}\n", self.replays));
        content.push_str(&format!("SongSeconds={}\n", self.song_seconds));
        content.push_str(&format!("TracePath={}\n", path_str(&self.trace_path)));
        content.push_str(&format!("Tutorial={}\n", flag_str(self.tutorial)));
        match self.video_offset_seconds {
            Some(offset) => content.push_str(&format!("VideoOffsetSeconds={offset}\n")),
            None => content.push_str("VideoOffsetSeconds=Off\n"),
        }
        content
    }
}

// --- File I/O ---

fn create_default_config_file() -> Result<(), std::io::Error> {
    info!("'{CONFIG_PATH}' not found, creating with default values.");
    std::fs::write(CONFIG_PATH, Config::default().to_ini_string())
}

pub fn load() {
    if !Path::new(CONFIG_PATH).exists()
        && let Err(e) = create_default_config_file()
    {
        warn!("Failed to create default config file: {e}");
    }

    let mut conf = SimpleIni::new();
    match conf.load(CONFIG_PATH) {
        Ok(()) => {
            let loaded = Config::from_ini(&conf);
            match CONFIG.lock() {
                Ok(mut cfg) => *cfg = loaded,
                Err(poisoned) => *poisoned.into_inner() = loaded,
            }
            info!("Configuration loaded from '{CONFIG_PATH}'.");
        }
        Err(e) => {
            warn!("Failed to load '{CONFIG_PATH}': {e}. Using default values.");
        }
    }
}

pub fn get() -> Config {
    match CONFIG.lock() {
        Ok(cfg) => cfg.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
