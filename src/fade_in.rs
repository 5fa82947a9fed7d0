use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::logging::{log_event, LogLevel};
use crate::page::{Intersection, Page, SubscriptionId};
use crate::selectors::{FADE_SECTION, VISIBLE_CLASS};

/// Ratios reported exactly at the crossing can land a hair under the threshold.
const THRESHOLD_TOLERANCE: f64 = 1e-3;

pub fn crosses_threshold(report: Intersection, threshold: f64) -> bool {
    report.is_intersecting && report.ratio + THRESHOLD_TOLERANCE >= threshold
}

/// One-shot reveal of `.section-fade` elements.
///
/// Every watched element owns one subscription token. The first qualifying
/// report marks the element visible and drops its token, so an element is
/// revealed at most once and never hidden again.
pub struct FadeIn<P: Page> {
    page: Rc<P>,
    threshold: f64,
    watched: RefCell<HashMap<SubscriptionId, P::Element>>,
}

impl<P: Page + 'static> FadeIn<P> {
    pub fn new(page: Rc<P>, threshold: f64) -> Rc<Self> {
        Rc::new(Self {
            page,
            threshold,
            watched: RefCell::new(HashMap::new()),
        })
    }

    pub fn watch(self: &Rc<Self>, element: &P::Element) -> bool {
        let fade = Rc::clone(self);
        let token = self.page.observe_intersection(
            element,
            self.threshold,
            Rc::new(move |target: &P::Element, report: Intersection| {
                fade.on_report(target, report)
            }),
        );

        let Some(token) = token else {
            return false;
        };
        self.watched.borrow_mut().insert(token, element.clone());
        true
    }

    #[cfg(test)]
    pub fn watching(&self) -> usize {
        self.watched.borrow().len()
    }

    fn on_report(&self, element: &P::Element, report: Intersection) {
        if !crosses_threshold(report, self.threshold) {
            return;
        }

        let token = self
            .watched
            .borrow()
            .iter()
            .find(|(_, watched)| *watched == element)
            .map(|(token, _)| *token);
        let Some(token) = token else {
            return;
        };

        self.watched.borrow_mut().remove(&token);
        self.page.add_class(element, VISIBLE_CLASS);
        self.page.unobserve(token);
    }
}

pub fn install<P: Page + 'static>(page: &Rc<P>, config: &EffectsConfig) -> bool {
    let elements = page.query_all(FADE_SECTION);
    if elements.is_empty() {
        log_event(
            &**page,
            config,
            LogLevel::Debug,
            "effect_skipped",
            json!({ "effect": "fade_in", "reason": "no fade sections" }),
        );
        return false;
    }

    let fade = FadeIn::new(Rc::clone(page), config.fade_threshold);
    let watched = elements.iter().filter(|element| fade.watch(element)).count();
    watched > 0
}
