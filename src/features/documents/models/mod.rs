mod document;

pub use document::{
    validate_source, Document, DocumentCategory, DocumentSource, DocumentType, NewDocument,
    StoredFile,
};
