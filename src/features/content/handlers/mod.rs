mod content_handler;

pub use content_handler::*;
