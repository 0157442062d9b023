mod tag_repository;

pub use tag_repository::{PgTagRepository, TagRepository};
