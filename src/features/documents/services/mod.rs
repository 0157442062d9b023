mod document_service;

pub use document_service::{
    CreateDocumentInput, DocumentService, DownloadOutcome, UploadedFile, HOME_PATH,
};
