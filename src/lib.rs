//! ShelfDB: concurrent in-memory book and word collections served over HTTP

pub mod config;
pub mod server;
pub mod service;
pub mod store;
