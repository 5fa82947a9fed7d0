use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::debounce::Debouncer;
use crate::logging::{log_event, LogLevel};
use crate::page::{handler, EventKind, Flow, Page, Target};
use crate::selectors::PROGRESS_BAR;

/// Scroll position as a percentage of the scrollable span, always within `[0, 100]`.
///
/// A page without overflow (document no taller than the viewport) reports 0.
pub fn scroll_percentage(offset: f64, document_height: f64, viewport_height: f64) -> f64 {
    let span = document_height - viewport_height;
    if !offset.is_finite() || !span.is_finite() || span <= 0.0 {
        return 0.0;
    }

    (offset / span * 100.0).clamp(0.0, 100.0)
}

pub struct ScrollProgress<P: Page> {
    page: Rc<P>,
    bar: P::Element,
    frame_pending: Cell<bool>,
}

impl<P: Page + 'static> ScrollProgress<P> {
    pub fn new(page: Rc<P>) -> Option<Rc<Self>> {
        let bar = page.query(PROGRESS_BAR)?;
        Some(Rc::new(Self {
            page,
            bar,
            frame_pending: Cell::new(false),
        }))
    }

    pub fn update(&self) -> f64 {
        let percentage = scroll_percentage(
            self.page.scroll_offset(),
            self.page.document_height(),
            self.page.viewport_height(),
        );
        self.page
            .set_style(&self.bar, "height", &format!("{percentage:.2}%"));
        percentage
    }

    /// Arms one animation frame; calls made while it is pending are dropped.
    pub fn schedule(self: &Rc<Self>) {
        if self.frame_pending.replace(true) {
            return;
        }

        let progress = Rc::clone(self);
        let armed = self.page.request_animation_frame(Box::new(move || {
            progress.update();
            progress.frame_pending.set(false);
        }));
        if !armed {
            self.frame_pending.set(false);
        }
    }
}

pub fn install<P: Page + 'static>(page: &Rc<P>, config: &EffectsConfig) -> bool {
    let Some(progress) = ScrollProgress::new(Rc::clone(page)) else {
        log_event(
            &**page,
            config,
            LogLevel::Debug,
            "effect_skipped",
            json!({ "effect": "scroll_progress", "reason": "missing progress bar" }),
        );
        return false;
    };

    progress.update();

    let on_scroll = Rc::clone(&progress);
    page.listen(
        Target::Window,
        EventKind::Scroll,
        handler(move |_| {
            on_scroll.schedule();
            Flow::Continue
        }),
    );

    let recompute = Debouncer::new(Rc::clone(page), config.resize_quiet_ms);
    page.listen(
        Target::Window,
        EventKind::Resize,
        handler(move |_| {
            let progress = Rc::clone(&progress);
            recompute.call(move || {
                progress.update();
            });
            Flow::Continue
        }),
    );

    true
}
