pub const PROGRESS_BAR: &str = ".progress-bar";
pub const FADE_SECTION: &str = ".section-fade";
pub const CONTACT_CTA: &str = ".contact-cta";
pub const EMAIL_LINK: &str = ".email-link";
pub const CONFIG_BLOCK: &str = "script#effects-config";

pub const LIGHTBOX: &str = ".lightbox";
pub const LIGHTBOX_CLOSE: &str = ".lightbox-close";
pub const LIGHTBOX_TITLE: &str = ".lightbox-title";
pub const LIGHTBOX_DESCRIPTION: &str = ".lightbox-description";
pub const LIGHTBOX_IMAGE: &str = ".lightbox-image";
pub const LIGHTBOX_PLACEHOLDER: &str = ".lightbox-placeholder";

pub const PORTFOLIO_CARD: &str = ".portfolio-card";
pub const CARD_TITLE: &str = ".card-title";
pub const CARD_IMPACT: &str = ".card-impact";
pub const CARD_IMAGE: &str = ".card-media img";

pub const VISIBLE_CLASS: &str = "visible";
pub const OPEN_CLASS: &str = "open";
pub const NO_SCROLL_CLASS: &str = "no-scroll";
pub const SCROLLING_CLASS: &str = "is-scrolling";
