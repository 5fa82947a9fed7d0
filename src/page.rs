//! The document handle every behavior is written against.
//!
//! In the browser this is backed by `web-sys` (see `frontend.rs`); in tests by
//! `testing::FakePage`. Behaviors never reach for `window()` themselves.

use std::rc::Rc;

pub type TimerId = i32;
pub type SubscriptionId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Scroll,
    Resize,
    Click,
    KeyDown,
    MouseMove,
    MouseLeave,
    TouchStart,
    TouchEnd,
    TouchCancel,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::MouseMove => "mousemove",
            Self::MouseLeave => "mouseleave",
            Self::TouchStart => "touchstart",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
        }
    }
}

/// Where a listener is attached.
pub enum Target<'a, E> {
    Window,
    Document,
    Element(&'a E),
}

/// The part of a browser event the behaviors look at.
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent<E> {
    Pointer { client_x: f64, client_y: f64 },
    Click { target: Option<E> },
    Key { key: String },
    Other,
}

/// What a handler wants done with the native event after it ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    PreventDefault,
}

pub type Handler<E> = Rc<dyn Fn(&PageEvent<E>) -> Flow>;

pub fn handler<E>(callback: impl Fn(&PageEvent<E>) -> Flow + 'static) -> Handler<E> {
    Rc::new(callback)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub ratio: f64,
    pub is_intersecting: bool,
}

pub type IntersectionCallback<E> = Rc<dyn Fn(&E, Intersection)>;

pub trait Page {
    type Element: Clone + PartialEq + 'static;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn query_within(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element>;
    fn body(&self) -> Option<Self::Element>;
    /// True when `element` is `ancestor` or sits inside it.
    fn contains(&self, ancestor: &Self::Element, element: &Self::Element) -> bool;

    fn text(&self, element: &Self::Element) -> String;
    fn set_text(&self, element: &Self::Element, text: &str);
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&self, element: &Self::Element, name: &str);
    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    /// An empty `value` removes the inline property.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    fn viewport_width(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn document_height(&self) -> f64;
    fn scroll_offset(&self) -> f64;

    fn active_element(&self) -> Option<Self::Element>;
    fn focus(&self, element: &Self::Element);
    /// Whether the element is still attached and able to take focus.
    fn can_focus(&self, element: &Self::Element) -> bool;
    fn supports_touch(&self) -> bool;

    fn listen(&self, target: Target<'_, Self::Element>, kind: EventKind, handler: Handler<Self::Element>);
    /// `false` when the frame could not be requested; `callback` will never run.
    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> bool;
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Option<TimerId>;
    fn clear_timeout(&self, id: TimerId);
    fn observe_intersection(
        &self,
        element: &Self::Element,
        threshold: f64,
        callback: IntersectionCallback<Self::Element>,
    ) -> Option<SubscriptionId>;
    fn unobserve(&self, id: SubscriptionId);

    fn console(&self, message: &str, style: Option<&str>);
    fn now_ms(&self) -> f64;
}
