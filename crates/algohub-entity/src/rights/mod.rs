//! Rights (access level grants) domain entities.

pub mod level;
pub mod model;

pub use level::AccessLevel;
pub use model::{ResourceKind, ResourceRef, RightsEntry};
