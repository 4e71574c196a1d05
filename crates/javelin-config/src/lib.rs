//! Parse and validate `Javelin.toml` module declarations.

pub mod manifest;

pub use manifest::{BuildSettings, Manifest, ModuleDeclaration, SdkSettings};
