//! Module resolution, classpath construction and action synthesis for Javelin.

pub mod action;
pub mod build;
pub mod classpath;
pub mod combine;
pub mod compile;
pub mod context;
pub mod defaults;
pub mod error;
pub mod module;
pub mod prebuilt;
pub mod registry;
pub mod resolve;
pub mod sdk;
pub mod variant;

pub use action::{Action, ActionGraph, ModulePlan, Rule};
pub use build::{plan, resolve_declarations, resolve_manifest, PlanOptions};
pub use classpath::{ModuleOutputs, ResolvedClasspaths};
pub use context::BuildContext;
pub use error::EngineError;
pub use module::ModuleId;
