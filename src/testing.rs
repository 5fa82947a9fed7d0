//! In-memory stand-in for the browser document, used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::page::{
    EventKind, Flow, Handler, Intersection, IntersectionCallback, Page, PageEvent, Rect,
    SubscriptionId, Target, TimerId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListenKey {
    Window,
    Document,
    Element(NodeId),
}

struct Node {
    tag: String,
    parent: Option<NodeId>,
    attached: bool,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    style: BTreeMap<String, String>,
    rect: Rect,
}

struct Listener {
    key: ListenKey,
    kind: EventKind,
    handler: Handler<NodeId>,
}

struct PendingTimer {
    id: TimerId,
    due_ms: u64,
    callback: Box<dyn FnOnce()>,
}

struct Subscription {
    element: NodeId,
    callback: IntersectionCallback<NodeId>,
}

#[derive(Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

pub struct FakePage {
    nodes: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<Listener>>,
    frames: RefCell<Vec<Box<dyn FnOnce()>>>,
    frames_available: Cell<bool>,
    timers: RefCell<Vec<PendingTimer>>,
    next_timer: Cell<TimerId>,
    now_ms: Cell<u64>,
    subscriptions: RefCell<HashMap<SubscriptionId, Subscription>>,
    next_subscription: Cell<SubscriptionId>,
    console: RefCell<Vec<String>>,
    viewport: Cell<(f64, f64)>,
    document_height: Cell<f64>,
    scroll: Cell<f64>,
    active: Cell<Option<NodeId>>,
    touch: Cell<bool>,
}

const HTML: NodeId = NodeId(0);
const BODY: NodeId = NodeId(1);

impl FakePage {
    /// A desktop-sized page holding only `<html><body>`.
    pub fn new() -> Rc<Self> {
        let page = Self {
            nodes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            frames_available: Cell::new(true),
            timers: RefCell::new(Vec::new()),
            next_timer: Cell::new(1),
            now_ms: Cell::new(0),
            subscriptions: RefCell::new(HashMap::new()),
            next_subscription: Cell::new(1),
            console: RefCell::new(Vec::new()),
            viewport: Cell::new((1280.0, 720.0)),
            document_height: Cell::new(720.0),
            scroll: Cell::new(0.0),
            active: Cell::new(None),
            touch: Cell::new(false),
        };
        page.push_node("html", None);
        page.push_node("body", Some(HTML));
        Rc::new(page)
    }

    pub fn body_id(&self) -> NodeId {
        BODY
    }

    /// Appends an element described as `tag.class#id` under `parent`.
    pub fn element(&self, parent: NodeId, markup: &str) -> NodeId {
        let compound = parse_compound(markup);
        let id = self.push_node(compound.tag.as_deref().unwrap_or("div"), Some(parent));
        let mut nodes = self.nodes.borrow_mut();
        let node = &mut nodes[id.0];
        node.classes = compound.classes;
        if let Some(element_id) = compound.id {
            node.attributes.insert("id".to_string(), element_id);
        }
        id
    }

    pub fn element_with_text(&self, parent: NodeId, markup: &str, text: &str) -> NodeId {
        let id = self.element(parent, markup);
        self.nodes.borrow_mut()[id.0].text = text.to_string();
        id
    }

    fn push_node(&self, tag: &str, parent: Option<NodeId>) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_string(),
            parent,
            attached: true,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            style: BTreeMap::new(),
            rect: Rect::default(),
        });
        NodeId(nodes.len() - 1)
    }

    pub fn detach(&self, id: NodeId) {
        self.nodes.borrow_mut()[id.0].attached = false;
    }

    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        self.nodes.borrow_mut()[id.0].rect = rect;
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set((width, height));
    }

    pub fn set_document_height(&self, height: f64) {
        self.document_height.set(height);
    }

    pub fn set_scroll(&self, offset: f64) {
        self.scroll.set(offset);
    }

    pub fn set_touch(&self, supported: bool) {
        self.touch.set(supported);
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[id.0].style.get(property).cloned()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.active.get()
    }

    pub fn console_lines(&self) -> Vec<String> {
        self.console.borrow().clone()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.borrow().iter().filter(|listener| listener.kind == kind).count()
    }

    /// Makes `request_animation_frame` refuse new callbacks.
    pub fn set_frames_available(&self, available: bool) {
        self.frames_available.set(available);
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Runs every animation-frame callback queued so far.
    pub fn run_frame(&self) -> usize {
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    /// Moves the clock forward, firing due timers in order.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms.get() + ms;
        loop {
            let next = self
                .timers
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due_ms <= target)
                .min_by_key(|(_, timer)| (timer.due_ms, timer.id))
                .map(|(index, _)| index);
            let Some(index) = next else {
                break;
            };
            let timer = self.timers.borrow_mut().remove(index);
            self.now_ms.set(timer.due_ms);
            (timer.callback)();
        }
        self.now_ms.set(target);
    }

    pub fn report_intersection(&self, id: NodeId, ratio: f64) {
        let callbacks: Vec<_> = self
            .subscriptions
            .borrow()
            .values()
            .filter(|subscription| subscription.element == id)
            .map(|subscription| Rc::clone(&subscription.callback))
            .collect();
        for callback in callbacks {
            callback(
                &id,
                Intersection {
                    ratio,
                    is_intersecting: ratio > 0.0,
                },
            );
        }
    }

    pub fn scroll_to(&self, offset: f64) -> Flow {
        self.scroll.set(offset);
        self.dispatch_to(&[ListenKey::Window], EventKind::Scroll, &PageEvent::Other)
    }

    pub fn resize(&self, width: f64, height: f64) -> Flow {
        self.viewport.set((width, height));
        self.dispatch_to(&[ListenKey::Window], EventKind::Resize, &PageEvent::Other)
    }

    pub fn click(&self, id: NodeId) -> Flow {
        let event = PageEvent::Click { target: Some(id) };
        self.dispatch_to(&self.bubble_path(id), EventKind::Click, &event)
    }

    pub fn key(&self, id: NodeId, key: &str) -> Flow {
        let event = PageEvent::Key {
            key: key.to_string(),
        };
        self.dispatch_to(&self.bubble_path(id), EventKind::KeyDown, &event)
    }

    pub fn mouse_move(&self, id: NodeId, client_x: f64, client_y: f64) -> Flow {
        let event = PageEvent::Pointer { client_x, client_y };
        self.dispatch_to(&self.bubble_path(id), EventKind::MouseMove, &event)
    }

    pub fn mouse_leave(&self, id: NodeId) -> Flow {
        let event = PageEvent::Pointer {
            client_x: 0.0,
            client_y: 0.0,
        };
        self.dispatch_to(&[ListenKey::Element(id)], EventKind::MouseLeave, &event)
    }

    pub fn touch(&self, id: NodeId, kind: EventKind) -> Flow {
        self.dispatch_to(&self.bubble_path(id), kind, &PageEvent::Other)
    }

    fn bubble_path(&self, id: NodeId) -> Vec<ListenKey> {
        let mut path = vec![ListenKey::Element(id)];
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            path.push(ListenKey::Element(parent));
            cursor = self.parent(parent);
        }
        path.push(ListenKey::Document);
        path.push(ListenKey::Window);
        path
    }

    fn dispatch_to(&self, path: &[ListenKey], kind: EventKind, event: &PageEvent<NodeId>) -> Flow {
        let mut flow = Flow::Continue;
        for key in path {
            let handlers: Vec<_> = self
                .listeners
                .borrow()
                .iter()
                .filter(|listener| listener.key == *key && listener.kind == kind)
                .map(|listener| Rc::clone(&listener.handler))
                .collect();
            for handler in handlers {
                if handler(event) == Flow::PreventDefault {
                    flow = Flow::PreventDefault;
                }
            }
        }
        flow
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[id.0].parent
    }

    fn is_attached(&self, id: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !nodes[current.0].attached {
                return false;
            }
            cursor = nodes[current.0].parent;
        }
        true
    }

    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let nodes = self.nodes.borrow();
        let node = &nodes[id.0];
        compound.tag.as_deref().map_or(true, |tag| node.tag == tag)
            && compound
                .id
                .as_deref()
                .map_or(true, |wanted| node.attributes.get("id").map(String::as_str) == Some(wanted))
            && compound
                .classes
                .iter()
                .all(|class| node.classes.iter().any(|own| own == class))
    }

    fn matches(&self, id: NodeId, selector: &[Compound]) -> bool {
        let Some((last, ancestors)) = selector.split_last() else {
            return false;
        };
        if !self.matches_compound(id, last) {
            return false;
        }

        let mut cursor = self.parent(id);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                cursor = self.parent(current);
                if self.matches_compound(current, compound) {
                    break;
                }
            }
        }
        true
    }

    fn select(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        let compounds: Vec<Compound> = selector.split_whitespace().map(parse_compound).collect();
        let count = self.nodes.borrow().len();
        (0..count)
            .map(NodeId)
            .filter(|id| scope.map_or(true, |scope| self.is_descendant(*id, scope)))
            .filter(|id| self.is_attached(*id))
            .filter(|id| self.matches(*id, &compounds))
            .collect()
    }
}

fn parse_compound(raw: &str) -> Compound {
    let mut compound = Compound::default();
    let mut marker = None;
    let mut buffer = String::new();

    let flush = |marker: Option<char>, buffer: &mut String, compound: &mut Compound| {
        if buffer.is_empty() {
            return;
        }
        let value = std::mem::take(buffer);
        match marker {
            Some('.') => compound.classes.push(value),
            Some('#') => compound.id = Some(value),
            _ => compound.tag = Some(value),
        }
    };

    for ch in raw.chars() {
        if ch == '.' || ch == '#' {
            flush(marker, &mut buffer, &mut compound);
            marker = Some(ch);
        } else {
            buffer.push(ch);
        }
    }
    flush(marker, &mut buffer, &mut compound);
    compound
}

impl Page for FakePage {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.select(None, selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(None, selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.select(Some(*scope), selector).into_iter().next()
    }

    fn body(&self) -> Option<NodeId> {
        Some(BODY)
    }

    fn contains(&self, ancestor: &NodeId, element: &NodeId) -> bool {
        ancestor == element || self.is_descendant(*element, *ancestor)
    }

    fn text(&self, element: &NodeId) -> String {
        let count = self.nodes.borrow().len();
        let mut text = self.nodes.borrow()[element.0].text.clone();
        for index in 0..count {
            if self.is_descendant(NodeId(index), *element) {
                text.push_str(&self.nodes.borrow()[index].text);
            }
        }
        text
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.nodes.borrow_mut()[element.0].text = text.to_string();
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[element.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[element.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, element: &NodeId, name: &str) {
        self.nodes.borrow_mut()[element.0].attributes.remove(name);
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[element.0].classes;
        if !classes.iter().any(|own| own == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        self.nodes.borrow_mut()[element.0]
            .classes
            .retain(|own| own != class);
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[element.0]
            .classes
            .iter()
            .any(|own| own == class)
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let style = &mut nodes[element.0].style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        self.nodes.borrow()[element.0].rect
    }

    fn viewport_width(&self) -> f64 {
        self.viewport.get().0
    }

    fn viewport_height(&self) -> f64 {
        self.viewport.get().1
    }

    fn document_height(&self) -> f64 {
        self.document_height.get()
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll.get()
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active.get().or(Some(BODY))
    }

    fn focus(&self, element: &NodeId) {
        if self.can_focus(element) {
            self.active.set(Some(*element));
        }
    }

    fn can_focus(&self, element: &NodeId) -> bool {
        if !self.is_attached(*element) {
            return false;
        }
        let nodes = self.nodes.borrow();
        let node = &nodes[element.0];
        matches!(node.tag.as_str(), "a" | "button" | "input" | "select" | "textarea")
            || node.attributes.contains_key("tabindex")
    }

    fn supports_touch(&self) -> bool {
        self.touch.get()
    }

    fn listen(&self, target: Target<'_, NodeId>, kind: EventKind, handler: Handler<NodeId>) {
        let key = match target {
            Target::Window => ListenKey::Window,
            Target::Document => ListenKey::Document,
            Target::Element(element) => ListenKey::Element(*element),
        };
        self.listeners.borrow_mut().push(Listener { key, kind, handler });
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> bool {
        if !self.frames_available.get() {
            return false;
        }
        self.frames.borrow_mut().push(callback);
        true
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Option<TimerId> {
        let id = self.next_timer.get();
        self.next_timer.set(id + 1);
        self.timers.borrow_mut().push(PendingTimer {
            id,
            due_ms: self.now_ms.get() + u64::from(delay_ms),
            callback,
        });
        Some(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|timer| timer.id != id);
    }

    fn observe_intersection(
        &self,
        element: &NodeId,
        _threshold: f64,
        callback: IntersectionCallback<NodeId>,
    ) -> Option<SubscriptionId> {
        let id = self.next_subscription.get();
        self.next_subscription.set(id + 1);
        self.subscriptions.borrow_mut().insert(
            id,
            Subscription {
                element: *element,
                callback,
            },
        );
        Some(id)
    }

    fn unobserve(&self, id: SubscriptionId) {
        self.subscriptions.borrow_mut().remove(&id);
    }

    fn console(&self, message: &str, style: Option<&str>) {
        let line = match style {
            Some(style) => format!("{message} [{style}]"),
            None => message.to_string(),
        };
        self.console.borrow_mut().push(line);
    }

    fn now_ms(&self) -> f64 {
        self.now_ms.get() as f64
    }
}
