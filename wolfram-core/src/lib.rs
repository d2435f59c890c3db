//! Core library for the Wolfram Alpha question solver.
//!
//! This crate defines:
//! - Configuration (appid, units) and its on-disk form
//! - The `Solver` contract the voice assistant calls into
//! - A Wolfram Alpha implementation answering with a spoken sentence,
//!   an image, or a multi-step explanation
//!
//! It is used by `wolfram-cli`, but can also be embedded by any host.

pub mod config;
pub mod error;
pub mod expand;
pub mod http;
pub mod image_cache;
pub mod model;
pub mod solver;

pub use config::{Config, DEFAULT_APPID, Units};
pub use error::{Result, SolverError};
pub use http::{CachedFetcher, HttpFetch, HttpResponse, ReqwestFetcher};
pub use image_cache::ImageCache;
pub use model::{Context, Pod, Step, StructuredResult, Subpod, SubpodImage};
pub use solver::{Solver, WolframAlphaSolver, solver_from_config};
