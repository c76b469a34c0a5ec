pub mod commit;
pub mod flatten;
pub mod id;
pub mod ingest;
pub mod label;
pub mod model;
pub mod project;
pub mod visual;

pub use commit::commit;
pub use flatten::{flatten, flatten_song_node};
pub use id::{IdAlloc, NodeId};
pub use ingest::parse_tree;
pub use model::*;
pub use project::project;
pub use visual::{VisualKind, VisualNode};
