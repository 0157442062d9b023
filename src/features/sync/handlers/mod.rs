mod sync_handler;

pub use sync_handler::*;
