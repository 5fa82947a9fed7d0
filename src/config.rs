use serde::Deserialize;

use crate::logging::LogLevel;
use crate::page::Page;
use crate::selectors::CONFIG_BLOCK;

const DEFAULT_FADE_THRESHOLD: f64 = 0.15;
const DEFAULT_DESKTOP_MIN_WIDTH: f64 = 768.0;
const DEFAULT_MAGNETIC_MAX_OFFSET: f64 = 10.0;
const DEFAULT_MAGNETIC_LIFT: f64 = 4.0;
const DEFAULT_RESIZE_QUIET_MS: u32 = 250;
const DEFAULT_SCROLL_IDLE_MS: u32 = 150;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const FADE_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const DESKTOP_MIN_WIDTH_BOUNDS: (f64, f64) = (320.0, 4_096.0);
const MAGNETIC_MAX_OFFSET_BOUNDS: (f64, f64) = (0.0, 64.0);
const MAGNETIC_LIFT_BOUNDS: (f64, f64) = (0.0, 32.0);
const QUIET_PERIOD_MS_BOUNDS: (u32, u32) = (16, 5_000);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEffectsConfig {
    fade_threshold: Option<f64>,
    desktop_min_width: Option<f64>,
    magnetic_max_offset: Option<f64>,
    magnetic_lift: Option<f64>,
    resize_quiet_ms: Option<u32>,
    scroll_idle_ms: Option<u32>,
    log_level: Option<String>,
    startup_banner: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectsConfig {
    pub fade_threshold: f64,
    pub desktop_min_width: f64,
    pub magnetic_max_offset: f64,
    pub magnetic_lift: f64,
    pub resize_quiet_ms: u32,
    pub scroll_idle_ms: u32,
    pub log_level: LogLevel,
    pub startup_banner: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            fade_threshold: DEFAULT_FADE_THRESHOLD,
            desktop_min_width: DEFAULT_DESKTOP_MIN_WIDTH,
            magnetic_max_offset: DEFAULT_MAGNETIC_MAX_OFFSET,
            magnetic_lift: DEFAULT_MAGNETIC_LIFT,
            resize_quiet_ms: DEFAULT_RESIZE_QUIET_MS,
            scroll_idle_ms: DEFAULT_SCROLL_IDLE_MS,
            log_level: DEFAULT_LOG_LEVEL,
            startup_banner: true,
        }
    }
}

impl EffectsConfig {
    /// Reads the optional `script#effects-config` JSON block. No block means defaults.
    pub fn from_page<P: Page + ?Sized>(page: &P) -> Result<Self, serde_json::Error> {
        let Some(block) = page.query(CONFIG_BLOCK) else {
            return Ok(Self::default());
        };

        let text = page.text(&block);
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawEffectsConfig = serde_json::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawEffectsConfig) -> Self {
        Self {
            fade_threshold: f64_with_bounds(
                raw.fade_threshold,
                DEFAULT_FADE_THRESHOLD,
                FADE_THRESHOLD_BOUNDS,
            ),
            desktop_min_width: f64_with_bounds(
                raw.desktop_min_width,
                DEFAULT_DESKTOP_MIN_WIDTH,
                DESKTOP_MIN_WIDTH_BOUNDS,
            ),
            magnetic_max_offset: f64_with_bounds(
                raw.magnetic_max_offset,
                DEFAULT_MAGNETIC_MAX_OFFSET,
                MAGNETIC_MAX_OFFSET_BOUNDS,
            ),
            magnetic_lift: f64_with_bounds(
                raw.magnetic_lift,
                DEFAULT_MAGNETIC_LIFT,
                MAGNETIC_LIFT_BOUNDS,
            ),
            resize_quiet_ms: u32_with_bounds(
                raw.resize_quiet_ms,
                DEFAULT_RESIZE_QUIET_MS,
                QUIET_PERIOD_MS_BOUNDS,
            ),
            scroll_idle_ms: u32_with_bounds(
                raw.scroll_idle_ms,
                DEFAULT_SCROLL_IDLE_MS,
                QUIET_PERIOD_MS_BOUNDS,
            ),
            log_level: raw
                .log_level
                .as_deref()
                .and_then(LogLevel::parse)
                .unwrap_or(DEFAULT_LOG_LEVEL),
            startup_banner: raw.startup_banner.unwrap_or(true),
        }
    }
}

fn f64_with_bounds(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn u32_with_bounds(value: Option<u32>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}
