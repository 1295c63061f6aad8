//! Core domain entities.
//!
//! - [`UrlRecord`] - A persisted long URL to short URL mapping
//! - [`NewUrlRecord`] - Input for creating a record

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
