// Quick fixes: pure edit scripts, and applying them to files

mod apply;
mod editor;
mod fix;
mod undo;

pub use apply::{FixApplier, FixSummary};
pub use editor::apply_edits;
pub use fix::TextEdit;
pub use undo::UndoScript;
