//! Utility functions shared across layers.
//!
//! - [`hasher`] - Content digest used as the short code
//! - [`url_validator`] - Long URL input policy
//! - [`db_error`] - Classification of PostgreSQL errors

pub mod db_error;
pub mod hasher;
pub mod url_validator;
