// Operator console state and the actions bound to keys

pub mod actions;
pub mod input;
pub mod panels;
pub mod state;

pub use input::{handle_input, handle_mouse};
pub use panels::RecordKind;
pub use state::{App, AssignMode, Focus};
