use std::cmp::Ordering;

use crate::config::EffectsConfig;
use crate::page::Page;

const STARTUP_BANNER: [(&str, &str); 3] = [
    (
        "%c👋 Hey there!",
        "font-size: 20px; font-weight: bold; color: #0066FF;",
    ),
    (
        "%cInterested in how this was built?",
        "font-size: 14px; color: #F5F5F5;",
    ),
    (
        "%cReach out at pr.alkis@vuel.app",
        "font-size: 14px; color: #0066FF;",
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
                LogLevel::Warn => 2,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

/// Writes one JSON line to the page console unless `level` is below the configured one.
pub fn log_event<P: Page + ?Sized>(
    page: &P,
    config: &EffectsConfig,
    level: LogLevel,
    event: &str,
    fields: serde_json::Value,
) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(page.now_ms().max(0.0) as u64)),
    );
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    page.console(&serde_json::Value::Object(payload).to_string(), None);
}

pub fn print_startup_banner<P: Page + ?Sized>(page: &P) {
    for (message, style) in STARTUP_BANNER {
        page.console(message, Some(style));
    }
}
