//! # algohub-service
//!
//! Permission-gated use cases for AlgoHub. Every mutation asks the
//! [`RightsResolver`](algohub_auth::RightsResolver) what the caller may do,
//! then writes through the stores and the blob mirror.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod algorithm;
pub mod context;
pub mod failure;
pub mod folder;
pub mod rights;
pub mod user;
pub mod validation;

pub use algorithm::{AlgorithmService, ContentValidator};
pub use context::RequestContext;
pub use folder::{FolderContents, FolderService};
pub use rights::RightsAdminService;
pub use user::UserService;
