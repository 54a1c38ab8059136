//! Per-mode action dispatchers.
//!
//! Each dispatcher owns its slice of engine state and produces at most one
//! [`ActionCommand`](crate::action::ActionCommand) per frame.

pub mod keyboard;
pub mod level;
pub mod pointer;

pub use keyboard::{KeyAction, KeyButton, KeyboardDispatcher, KeyboardLayout};
pub use level::LevelDispatcher;
pub use pointer::PointerDispatcher;
