mod ingest_handler;

pub use ingest_handler::*;
