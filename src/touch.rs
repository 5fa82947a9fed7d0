use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::logging::{log_event, LogLevel};
use crate::page::{handler, EventKind, Flow, Page, Target};
use crate::selectors::EMAIL_LINK;

const PRESSED_TRANSFORM: &str = "scale(0.98)";

/// Press feedback on the email link for touch devices.
pub fn install<P: Page + 'static>(page: &Rc<P>, config: &EffectsConfig) -> bool {
    let Some(link) = page.query(EMAIL_LINK) else {
        log_event(
            &**page,
            config,
            LogLevel::Debug,
            "effect_skipped",
            json!({ "effect": "touch_feedback", "reason": "missing email link" }),
        );
        return false;
    };

    if !page.supports_touch() {
        return false;
    }

    let pressed = Rc::clone(page);
    let target = link.clone();
    page.listen(
        Target::Element(&link),
        EventKind::TouchStart,
        handler(move |_| {
            pressed.set_style(&target, "transform", PRESSED_TRANSFORM);
            Flow::Continue
        }),
    );

    for kind in [EventKind::TouchEnd, EventKind::TouchCancel] {
        let released = Rc::clone(page);
        let target = link.clone();
        page.listen(
            Target::Element(&link),
            kind,
            handler(move |_| {
                released.set_style(&target, "transform", "");
                Flow::Continue
            }),
        );
    }

    true
}
