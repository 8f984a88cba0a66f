//! Core library for the tasknode CLI.
//!
//! This crate provides:
//! - `api`: REST client for the tasknode backend (auth, upload URLs)
//! - `auth`: OS keychain storage and the session manager
//! - `deploy`: staging and archiving of a project directory
//! - `submit`: the end-to-end submit workflow
//!
//! The binary crate only handles argument parsing and terminal prompts.

pub mod api;
pub mod auth;
pub mod config;
pub mod deploy;
pub mod error;
pub mod submit;

pub use config::Config;
pub use error::{Error, Result};
