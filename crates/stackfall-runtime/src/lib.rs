//! Single-threaded terminal runtime.
//!
//! Fixed-rate ticks, terminal events and redraws are delivered to one
//! [`App`] in sequence, so application state has a single mutation path.

pub use self::{app::App, event_loop::RenderMode, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
