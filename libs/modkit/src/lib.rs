//! # ModKit - Module System
//!
//! Modules implement a small set of capability traits and are wired into a
//! [`ModuleRegistry`] by the binary. The runner drives every module through
//! the same ordered phases:
//!
//! init → db (migrations) → rest (router composition) → start → wait → stop
//!
//! ```rust,ignore
//! let registry = ModuleRegistry::builder()
//!     .module("api_ingress", &[], ingress.clone())
//!     .rest_host("api_ingress", ingress.clone())
//!     .stateful("api_ingress", ingress)
//!     .build()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

// Core module contracts and traits
pub mod contracts;
pub use crate::contracts::*;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod client_hub;
pub mod registry;

pub use client_hub::ClientHub;
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryError};

pub mod api;
pub use api::problem::{internal_error, Problem, ProblemResponse, ValidationError};
pub use api::OpenApiRegistry;

pub mod runtime;
pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};
