//! flowsync - keep flow server projects and flows in a GitHub repository
//!
//! This crate provides the core functionality for the `flowsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Flow and project records as the server exchanges them
//! - [`api`] - Flow server client (`FlowServer` trait, HTTP and in-memory)
//! - [`remote`] - Repository client (`RemoteStore` trait, GitHub and in-memory)
//! - [`sync`] - Push/pull engines, path layout, change detection
//! - [`config`] - Profile and remote registry
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod sync;

pub use error::{Error, Result};
