//! docqa - terminal client for a document question-answering backend
//!
//! Upload documents, watch them move through processing, and ask questions
//! against one document or the whole collection.

pub mod api;
pub mod app;
pub mod chat;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod documents;
pub mod error;
pub mod models;
pub mod preview;
pub mod progress;
pub mod registry;
pub mod upload;

pub use config::Config;
pub use error::{Error, Result};
