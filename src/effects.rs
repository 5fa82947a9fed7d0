use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::logging::{log_event, print_startup_banner, LogLevel};
use crate::page::Page;
use crate::{fade_in, lightbox, magnetic, progress, scroll_idle, touch};

/// Which behaviors found their markup and attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Installed {
    pub scroll_progress: bool,
    pub fade_in: bool,
    pub magnetic: bool,
    pub touch_feedback: bool,
    pub scroll_idle: bool,
    pub lightbox: bool,
}

fn resolve_config<P: Page + ?Sized>(page: &P) -> EffectsConfig {
    match EffectsConfig::from_page(page) {
        Ok(config) => config,
        Err(error) => {
            let config = EffectsConfig::default();
            log_event(
                page,
                &config,
                LogLevel::Warn,
                "config_parse_failed",
                json!({ "error": error.to_string() }),
            );
            config
        }
    }
}

/// Attaches every behavior to `page`. Each one is independent: missing markup
/// only disables the behavior that needs it.
pub fn install<P: Page + 'static>(page: &Rc<P>) -> Installed {
    let config = resolve_config(&**page);

    if config.startup_banner {
        print_startup_banner(&**page);
    }

    let installed = Installed {
        scroll_progress: progress::install(page, &config),
        fade_in: fade_in::install(page, &config),
        magnetic: magnetic::install(page, &config),
        touch_feedback: touch::install(page, &config),
        scroll_idle: scroll_idle::install(page, &config),
        lightbox: lightbox::install(page, &config),
    };

    log_event(
        &**page,
        &config,
        LogLevel::Info,
        "effects_installed",
        json!({
            "scrollProgress": installed.scroll_progress,
            "fadeIn": installed.fade_in,
            "magnetic": installed.magnetic,
            "touchFeedback": installed.touch_feedback,
            "scrollIdle": installed.scroll_idle,
            "lightbox": installed.lightbox,
            "viewportWidth": page.viewport_width(),
        }),
    );

    installed
}
