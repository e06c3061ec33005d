//! oraimage - Oracle Database image patch tooling
//!
//! Classifies AutoUpgrade download logs into per-architecture package
//! manifests and stages the files a manifest names into a container build
//! context.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,
)]
#![warn(
    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::type_complexity,

    // Best practices
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
)]

pub mod api;
pub mod exceptions;
pub mod exit_codes;
pub mod logger;
pub mod patches;
pub mod utils;
pub mod version;

// Re-export main API functions
pub use api::{
    GenerateOptions, GenerateReport, GeneratedManifest, clean_build_context, generate_manifests,
    locate_manifest, stage_build_context, write_patch_inventory,
};
pub use exceptions::{OraImageError, Result};

// Re-export domain types for advanced usage
pub use patches::{
    Architecture, BuildStager, PackageCategory, PackageManifest, StageOptions, StageReport,
};
