// Utility functions
pub mod document_id;
pub mod error;

pub use document_id::*;
pub use error::*;
