//! Algorithm domain entities.

pub mod content;
pub mod model;

pub use content::{DataEntry, Node, NodeKind, SourceCode};
pub use model::{Algorithm, CreateAlgorithm};
