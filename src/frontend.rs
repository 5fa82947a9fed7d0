use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Array, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MouseEvent, Node, Window,
};

use crate::effects;
use crate::page::{
    EventKind, Flow, Handler, Intersection, IntersectionCallback, Page, PageEvent, Rect,
    SubscriptionId, Target, TimerId,
};
use crate::timers::TimerSlots;

type ObserverClosure = Closure<dyn FnMut(Array, IntersectionObserver)>;
type TimerClosure = Closure<dyn FnMut()>;

pub struct WebPage {
    window: Window,
    document: Document,
    observers: RefCell<HashMap<SubscriptionId, (IntersectionObserver, ObserverClosure)>>,
    next_subscription: Cell<SubscriptionId>,
    timers: TimerSlots<TimerClosure>,
}

impl WebPage {
    fn new() -> Option<Self> {
        let window = window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            observers: RefCell::new(HashMap::new()),
            next_subscription: Cell::new(1),
            timers: TimerSlots::new(),
        })
    }
}

fn page_event(kind: EventKind, event: &Event) -> PageEvent<Element> {
    match kind {
        EventKind::Click => PageEvent::Click {
            target: event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok()),
        },
        EventKind::KeyDown => event
            .dyn_ref::<KeyboardEvent>()
            .map(|event| PageEvent::Key { key: event.key() })
            .unwrap_or(PageEvent::Other),
        EventKind::MouseMove | EventKind::MouseLeave => event
            .dyn_ref::<MouseEvent>()
            .map(|event| PageEvent::Pointer {
                client_x: f64::from(event.client_x()),
                client_y: f64::from(event.client_y()),
            })
            .unwrap_or(PageEvent::Other),
        _ => PageEvent::Other,
    }
}

impl Page for WebPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };

        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn contains(&self, ancestor: &Element, element: &Element) -> bool {
        let node: &Node = element;
        ancestor.contains(Some(node))
    }

    fn text(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        let _ = element.set_attribute(name, value);
    }

    fn remove_attribute(&self, element: &Element, name: &str) {
        let _ = element.remove_attribute(name);
    }

    fn add_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().add_1(class);
    }

    fn remove_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(element) = element.dyn_ref::<HtmlElement>() else {
            return;
        };

        let style = element.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn document_height(&self) -> f64 {
        self.document
            .document_element()
            .map(|root| f64::from(root.scroll_height()))
            .unwrap_or(0.0)
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or_else(|_| {
            self.document
                .document_element()
                .map(|root| f64::from(root.scroll_top()))
                .unwrap_or(0.0)
        })
    }

    fn active_element(&self) -> Option<Element> {
        self.document.active_element()
    }

    fn focus(&self, element: &Element) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            let _ = element.focus();
        }
    }

    fn can_focus(&self, element: &Element) -> bool {
        element.is_connected() && element.dyn_ref::<HtmlElement>().is_some()
    }

    fn supports_touch(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
    }

    fn listen(&self, target: Target<'_, Element>, kind: EventKind, handler: Handler<Element>) {
        let target: EventTarget = match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
            Target::Element(element) => element.clone().into(),
        };

        let callback = Closure::wrap(Box::new(move |event: Event| {
            if handler(&page_event(kind, &event)) == Flow::PreventDefault {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);
        let _ = target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref());
        callback.forget();
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> bool {
        let callback = Closure::once_into_js(move || callback());
        self.window
            .request_animation_frame(callback.unchecked_ref())
            .is_ok()
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Option<TimerId> {
        let fired = TimerSlots::<TimerClosure>::fired_flag();
        let done = Rc::clone(&fired);
        let closure: TimerClosure = Closure::once(move || {
            callback();
            done.set(true);
        });
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )
            .ok()?;
        self.timers.arm(id, closure, fired);
        Some(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.window.clear_timeout_with_handle(id);
        drop(self.timers.release(id));
    }

    fn observe_intersection(
        &self,
        element: &Element,
        threshold: f64,
        callback: IntersectionCallback<Element>,
    ) -> Option<SubscriptionId> {
        let closure: ObserverClosure = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                callback(
                    &entry.target(),
                    Intersection {
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    },
                );
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &options).ok()?;
        observer.observe(element);

        let id = self.next_subscription.get();
        self.next_subscription.set(id + 1);
        self.observers.borrow_mut().insert(id, (observer, closure));
        Some(id)
    }

    fn unobserve(&self, id: SubscriptionId) {
        let Some((observer, closure)) = self.observers.borrow_mut().remove(&id) else {
            return;
        };

        observer.disconnect();
        // Unsubscribing happens from inside this closure's own invocation.
        closure.forget();
    }

    fn console(&self, message: &str, style: Option<&str>) {
        let message = JsValue::from_str(message);
        match style {
            Some(style) => web_sys::console::log_2(&message, &JsValue::from_str(style)),
            None => web_sys::console::log_1(&message),
        }
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

pub fn run() {
    let Some(page) = WebPage::new() else {
        return;
    };
    let page = Rc::new(page);

    if page.document.ready_state() != "loading" {
        effects::install(&page);
        return;
    }

    let deferred = Rc::clone(&page);
    let callback = Closure::once_into_js(move || {
        effects::install(&deferred);
    });
    let _ = page
        .document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref());
}
