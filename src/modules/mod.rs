//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for object storage and the external record store.

pub mod record_store;
pub mod storage;
