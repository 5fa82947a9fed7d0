#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod config;
mod debounce;
mod effects;
mod fade_in;
mod lightbox;
mod logging;
mod magnetic;
mod page;
mod progress;
mod scroll_idle;
mod selectors;
mod timers;
mod touch;

#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(test)]
mod testing;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
