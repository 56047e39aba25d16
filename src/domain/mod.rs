//! Domain layer - Pure business abstractions
//!
//! No web, HTTP client or SMTP dependencies (no Axum, no reqwest, no lettre).
//! Only the request-scoped data model, collaborator traits and the domain error type.
//! Images are passed around as `image::DynamicImage`.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::DomainError;
pub use models::*;
pub use ports::*;
