pub mod catalog;
pub mod dtos;
pub mod handlers;
pub mod routes;
