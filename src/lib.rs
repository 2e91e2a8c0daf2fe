//! Static file server
//!
//! Serves the files under a document root over HTTP/1.x, with directory
//! listings, index files, conditional and range requests.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

#[cfg(test)]
mod test_util;
