//! Writium: a document-writing backend with per-article versioning,
//! commenting, share-by-token access, citation tooling, and DOCX export.

pub mod access;
pub mod auth;
pub mod citations;
pub mod db;
pub mod docx;
pub mod error;
pub mod models;
pub mod routes;
pub mod versioning;
