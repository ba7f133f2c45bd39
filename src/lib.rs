// src/lib.rs

//! bookshelf: paginated, cached browsing of public book catalogs

pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
