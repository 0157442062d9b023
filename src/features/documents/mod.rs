//! Insurance and investment document libraries.

pub mod categorizer;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod preview;
pub mod repositories;
pub mod routes;
pub mod services;

pub use handlers::DocumentState;
pub use preview::PreviewRenderer;
pub use repositories::PgDocumentRepository;
pub use services::DocumentService;
