//! Request handler module
//!
//! Resolves request paths against the document root and turns the result
//! into file, index, listing or error responses.

pub mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
