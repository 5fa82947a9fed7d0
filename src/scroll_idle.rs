use std::rc::Rc;

use crate::config::EffectsConfig;
use crate::debounce::Debouncer;
use crate::page::{handler, EventKind, Flow, Page, Target};
use crate::selectors::SCROLLING_CLASS;

/// Keeps `is-scrolling` on the body while scroll events keep arriving and
/// drops it once the page has been still for the idle period.
pub fn install<P: Page + 'static>(page: &Rc<P>, config: &EffectsConfig) -> bool {
    let Some(body) = page.body() else {
        return false;
    };

    let idle = Debouncer::new(Rc::clone(page), config.scroll_idle_ms);
    let marker = Rc::clone(page);
    page.listen(
        Target::Window,
        EventKind::Scroll,
        handler(move |_| {
            marker.add_class(&body, SCROLLING_CLASS);

            let settled = Rc::clone(&marker);
            let body = body.clone();
            idle.call(move || settled.remove_class(&body, SCROLLING_CLASS));
            Flow::Continue
        }),
    );

    true
}
