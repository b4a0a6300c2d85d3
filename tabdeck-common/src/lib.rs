//! # tabdeck Common Library
//!
//! Shared code for the tabdeck service including:
//! - Document model (tabs, components, state)
//! - Document store with whole-file persistence
//! - Pure mutation transforms and the service that persists them
//! - Keyword detection utility
//! - Configuration loading

pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod mutation;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use model::{Component, State, Tab};
pub use service::TabService;
pub use store::DocumentStore;
