//! Algorithm management and source document validation.

pub mod service;
pub mod validation;

pub use service::{AlgorithmService, CreateAlgorithmRequest, UpdateAlgorithmRequest};
pub use validation::ContentValidator;
