pub mod diff;
pub mod history;
pub mod mutate;
pub mod session;

pub use diff::{DiffStatus, NodeDiff, diff};
pub use history::{GenerationOutput, HistoryEntry, HistoryLog, summarize_diff};
pub use mutate::{MutationOp, add_child, edit, remove};
pub use session::Session;
