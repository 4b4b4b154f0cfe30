//! Composite requests and the dispatcher that runs them.

pub mod dispatch;
pub mod request;

pub use dispatch::{composite, fill_rect};
pub use request::{ComposeOptions, ComposeRequest};
