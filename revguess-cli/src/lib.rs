//! revguess-cli library
//!
//! Presentation-side wiring for the `revguess` binary: logging setup,
//! building the core components from configuration, labels, and turning a
//! selected target into a store page URL.

pub mod app;
pub mod logging;
pub mod navigation;

pub use app::App;
