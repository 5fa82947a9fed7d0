use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::logging::{log_event, LogLevel};
use crate::page::{handler, EventKind, Flow, Page, PageEvent, Rect, Target};
use crate::selectors::CONTACT_CTA;

/// Pointer offset from the center of `rect`, normalized per axis to `[-1, 1]`
/// and scaled to `max_offset`.
pub fn magnetic_offset(rect: Rect, client_x: f64, client_y: f64, max_offset: f64) -> (f64, f64) {
    (
        normalized_axis(client_x - rect.left, rect.width) * max_offset,
        normalized_axis(client_y - rect.top, rect.height) * max_offset,
    )
}

fn normalized_axis(position: f64, extent: f64) -> f64 {
    let center = extent / 2.0;
    if !center.is_finite() || center <= 0.0 || !position.is_finite() {
        return 0.0;
    }

    ((position - center) / center).clamp(-1.0, 1.0)
}

pub fn magnetic_transform(offset_x: f64, offset_y: f64, lift: f64) -> String {
    format!("translate({offset_x:.2}px, {offset_y:.2}px) translateY(-{lift:.2}px)")
}

/// Hover displacement of the call-to-action card, desktop widths only.
pub struct MagneticEffect<P: Page> {
    page: Rc<P>,
    card: P::Element,
    min_width: f64,
    max_offset: f64,
    lift: f64,
    active: Cell<bool>,
    wired: Cell<bool>,
}

impl<P: Page + 'static> MagneticEffect<P> {
    pub fn new(page: Rc<P>, config: &EffectsConfig) -> Option<Rc<Self>> {
        let card = page.query(CONTACT_CTA)?;
        Some(Rc::new(Self {
            page,
            card,
            min_width: config.desktop_min_width,
            max_offset: config.magnetic_max_offset,
            lift: config.magnetic_lift,
            active: Cell::new(false),
            wired: Cell::new(false),
        }))
    }

    /// Activates at desktop widths and deactivates below them.
    ///
    /// Pointer handlers are registered on the first activation only; while
    /// inactive they ignore movement.
    pub fn sync_with_viewport(self: &Rc<Self>) {
        if self.page.viewport_width() >= self.min_width {
            if !self.wired.replace(true) {
                self.wire();
            }
            self.active.set(true);
        } else if self.active.replace(false) {
            self.page.set_style(&self.card, "transform", "");
        }
    }

    fn wire(self: &Rc<Self>) {
        let effect = Rc::clone(self);
        self.page.listen(
            Target::Element(&self.card),
            EventKind::MouseMove,
            handler(move |event| {
                if let PageEvent::Pointer { client_x, client_y } = event {
                    effect.follow(*client_x, *client_y);
                }
                Flow::Continue
            }),
        );

        let effect = Rc::clone(self);
        self.page.listen(
            Target::Element(&self.card),
            EventKind::MouseLeave,
            handler(move |_| {
                effect.page.set_style(&effect.card, "transform", "");
                Flow::Continue
            }),
        );
    }

    fn follow(&self, client_x: f64, client_y: f64) {
        if !self.active.get() {
            return;
        }

        let rect = self.page.bounding_rect(&self.card);
        let (offset_x, offset_y) = magnetic_offset(rect, client_x, client_y, self.max_offset);
        self.page.set_style(
            &self.card,
            "transform",
            &magnetic_transform(offset_x, offset_y, self.lift),
        );
    }
}

pub fn install<P: Page + 'static>(page: &Rc<P>, config: &EffectsConfig) -> bool {
    let Some(effect) = MagneticEffect::new(Rc::clone(page), config) else {
        log_event(
            &**page,
            config,
            LogLevel::Debug,
            "effect_skipped",
            json!({ "effect": "magnetic", "reason": "missing call-to-action card" }),
        );
        return false;
    };

    effect.sync_with_viewport();

    let on_resize = Rc::clone(&effect);
    page.listen(
        Target::Window,
        EventKind::Resize,
        handler(move |_| {
            on_resize.sync_with_viewport();
            Flow::Continue
        }),
    );

    true
}
