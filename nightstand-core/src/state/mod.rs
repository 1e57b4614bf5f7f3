//! Mode/page navigation state machine
//!
//! Pages, the overlay (navigation, editing or function menu) and the
//! commands user input produces.

pub mod commands;
pub mod mode;
pub mod navigator;

pub use commands::Command;
pub use mode::{DatePage, Function, Mode, PageTimeout};
pub use navigator::{EditKind, EditPlan, EditView, NavContext, Navigator, Overlay};
