//! Shared wire types between the intrack client and the backend API.

mod models;

pub use models::*;
