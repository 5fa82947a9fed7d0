use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::logging::{log_event, LogLevel};
use crate::page::{handler, EventKind, Flow, Page, PageEvent, Target};
use crate::selectors::{
    CARD_IMAGE, CARD_IMPACT, CARD_TITLE, LIGHTBOX, LIGHTBOX_CLOSE, LIGHTBOX_DESCRIPTION,
    LIGHTBOX_IMAGE, LIGHTBOX_PLACEHOLDER, LIGHTBOX_TITLE, NO_SCROLL_CLASS, OPEN_CLASS,
    PORTFOLIO_CARD,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightboxImage {
    pub src: String,
    pub alt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightboxItem {
    pub title: String,
    pub description: String,
    pub image: Option<LightboxImage>,
}

impl LightboxItem {
    pub fn from_card<P: Page + ?Sized>(page: &P, card: &P::Element) -> Self {
        let text_of = |selector: &str| {
            page.query_within(card, selector)
                .map(|element| page.text(&element).trim().to_string())
                .unwrap_or_default()
        };

        let title = text_of(CARD_TITLE);
        let description = text_of(CARD_IMPACT);
        let image = page.query_within(card, CARD_IMAGE).and_then(|image| {
            let src = page.attribute(&image, "src")?.trim().to_string();
            if src.is_empty() {
                return None;
            }

            let alt = page
                .attribute(&image, "alt")
                .map(|alt| alt.trim().to_string())
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| title.clone());
            Some(LightboxImage { src, alt })
        });

        Self {
            title,
            description,
            image,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LightboxState<E> {
    Closed,
    Open {
        item: LightboxItem,
        return_focus: Option<E>,
    },
}

struct LightboxParts<E> {
    root: E,
    close: E,
    title: Option<E>,
    description: Option<E>,
    image: Option<E>,
    placeholder: Option<E>,
}

/// The single portfolio modal. Opening while open swaps the content in place.
pub struct Lightbox<P: Page> {
    page: Rc<P>,
    config: EffectsConfig,
    parts: LightboxParts<P::Element>,
    state: RefCell<LightboxState<P::Element>>,
}

impl<P: Page + 'static> Lightbox<P> {
    pub fn new(page: Rc<P>, config: &EffectsConfig) -> Option<Rc<Self>> {
        let root = page.query(LIGHTBOX)?;
        let close = page.query_within(&root, LIGHTBOX_CLOSE)?;
        let parts = LightboxParts {
            title: page.query_within(&root, LIGHTBOX_TITLE),
            description: page.query_within(&root, LIGHTBOX_DESCRIPTION),
            image: page.query_within(&root, LIGHTBOX_IMAGE),
            placeholder: page.query_within(&root, LIGHTBOX_PLACEHOLDER),
            root,
            close,
        };

        if page.attribute(&parts.root, "aria-hidden").is_none() {
            page.set_attribute(&parts.root, "aria-hidden", "true");
        }

        Some(Rc::new(Self {
            page,
            config: *config,
            parts,
            state: RefCell::new(LightboxState::Closed),
        }))
    }

    #[cfg(test)]
    pub fn state(&self) -> LightboxState<P::Element> {
        self.state.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.borrow(), LightboxState::Open { .. })
    }

    pub fn open(&self, card: &P::Element) {
        let item = LightboxItem::from_card(&*self.page, card);
        let body = self.page.body();
        let return_focus = self
            .page
            .active_element()
            .filter(|active| Some(active) != body.as_ref())
            .filter(|active| !self.page.contains(&self.parts.root, active))
            .or_else(|| Some(card.clone()));

        self.render(&item);
        if let Some(body) = body.as_ref() {
            self.page.add_class(body, NO_SCROLL_CLASS);
        }
        self.page.add_class(&self.parts.root, OPEN_CLASS);
        self.page.set_attribute(&self.parts.root, "aria-hidden", "false");
        self.page.focus(&self.parts.close);

        log_event(
            &*self.page,
            &self.config,
            LogLevel::Debug,
            "lightbox_opened",
            json!({ "title": item.title, "hasImage": item.image.is_some() }),
        );
        *self.state.borrow_mut() = LightboxState::Open { item, return_focus };
    }

    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), LightboxState::Closed);
        let LightboxState::Open { return_focus, .. } = previous else {
            return;
        };

        self.page.remove_class(&self.parts.root, OPEN_CLASS);
        self.page.set_attribute(&self.parts.root, "aria-hidden", "true");
        if let Some(body) = self.page.body() {
            self.page.remove_class(&body, NO_SCROLL_CLASS);
        }

        if let Some(target) = return_focus {
            if self.page.can_focus(&target) {
                self.page.focus(&target);
            }
        }
    }

    fn render(&self, item: &LightboxItem) {
        let page = &self.page;
        if let Some(title) = self.parts.title.as_ref() {
            page.set_text(title, &item.title);
        }
        if let Some(description) = self.parts.description.as_ref() {
            page.set_text(description, &item.description);
        }

        match (item.image.as_ref(), self.parts.image.as_ref()) {
            (Some(source), Some(image)) => {
                page.set_attribute(image, "src", &source.src);
                page.set_attribute(image, "alt", &source.alt);
                page.remove_attribute(image, "hidden");
                if let Some(placeholder) = self.parts.placeholder.as_ref() {
                    page.set_attribute(placeholder, "hidden", "");
                }
            }
            (_, image) => {
                if let Some(image) = image {
                    page.remove_attribute(image, "src");
                    page.remove_attribute(image, "alt");
                    page.set_attribute(image, "hidden", "");
                }
                if let Some(placeholder) = self.parts.placeholder.as_ref() {
                    page.remove_attribute(placeholder, "hidden");
                }
            }
        }
    }
}

fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}

/// Gives a card the keyboard and screen-reader surface of a button unless the
/// markup already provides it.
fn make_card_operable<P: Page + ?Sized>(page: &P, card: &P::Element, title: &str) {
    if page.attribute(card, "role").is_none() {
        page.set_attribute(card, "role", "button");
    }
    if page.attribute(card, "tabindex").is_none() {
        page.set_attribute(card, "tabindex", "0");
    }
    if page.attribute(card, "aria-label").is_none() && !title.is_empty() {
        page.set_attribute(card, "aria-label", &format!("View details: {title}"));
    }
}

pub fn install<P: Page + 'static>(page: &Rc<P>, config: &EffectsConfig) -> bool {
    let Some(lightbox) = Lightbox::new(Rc::clone(page), config) else {
        log_event(
            &**page,
            config,
            LogLevel::Debug,
            "effect_skipped",
            json!({ "effect": "lightbox", "reason": "missing lightbox or close control" }),
        );
        return false;
    };

    for card in page.query_all(PORTFOLIO_CARD) {
        let title = LightboxItem::from_card(&**page, &card).title;
        make_card_operable(&**page, &card, &title);

        let on_click = Rc::clone(&lightbox);
        let clicked = card.clone();
        page.listen(
            Target::Element(&card),
            EventKind::Click,
            handler(move |_| {
                on_click.open(&clicked);
                Flow::Continue
            }),
        );

        let on_key = Rc::clone(&lightbox);
        let pressed = card.clone();
        page.listen(
            Target::Element(&card),
            EventKind::KeyDown,
            handler(move |event| match event {
                PageEvent::Key { key } if is_activation_key(key) => {
                    on_key.open(&pressed);
                    Flow::PreventDefault
                }
                _ => Flow::Continue,
            }),
        );
    }

    let on_close = Rc::clone(&lightbox);
    page.listen(
        Target::Element(&lightbox.parts.close),
        EventKind::Click,
        handler(move |_| {
            on_close.close();
            Flow::Continue
        }),
    );

    let on_backdrop = Rc::clone(&lightbox);
    page.listen(
        Target::Element(&lightbox.parts.root),
        EventKind::Click,
        handler(move |event| {
            if let PageEvent::Click {
                target: Some(target),
            } = event
            {
                if *target == on_backdrop.parts.root {
                    on_backdrop.close();
                }
            }
            Flow::Continue
        }),
    );

    let on_escape = Rc::clone(&lightbox);
    page.listen(
        Target::Document,
        EventKind::KeyDown,
        handler(move |event| {
            if let PageEvent::Key { key } = event {
                if key == "Escape" && on_escape.is_open() {
                    on_escape.close();
                }
            }
            Flow::Continue
        }),
    );

    true
}
