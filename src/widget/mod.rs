//! Widget orchestration
//!
//! One `WidgetController` per embedded question instance. All state lives
//! on the instance with an explicit lifecycle, so several widgets on one
//! page never share anything.

mod controller;
mod params;

pub use controller::{WidgetController, WidgetError, WidgetSnapshot};
pub use params::WidgetParams;
