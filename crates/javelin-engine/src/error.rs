//! Error types for javelin-engine.

use crate::resolve::EdgeRole;

/// Errors produced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A manifest operation failed.
    #[error("{0}")]
    Manifest(#[from] javelin_config::manifest::ManifestError),

    /// A host or variant name was invalid.
    #[error("{0}")]
    Target(#[from] javelin_targets::TargetError),

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] javelin_util::error::UtilError),

    /// A rule invocation could not be assembled.
    #[error("cannot assemble {module}: {source}")]
    Invocation {
        module: String,
        source: javelin_javac::JavacError,
    },

    /// The action graph could not be serialized.
    #[error("cannot serialize action graph: {message}")]
    Serialize { message: String },

    /// A declaration uses a module type nobody registered.
    #[error("module \"{module}\" has unknown type \"{module_type}\" (known types: {known})")]
    UnknownModuleType {
        module: String,
        module_type: String,
        known: String,
    },

    /// A declaration has no name.
    #[error("a {module_type} module is missing its name")]
    MissingName { module_type: String },

    /// A property was set on a module type that does not accept it.
    #[error("module \"{module}\": {module_type} does not accept property `{property}`")]
    InvalidProperty {
        module: String,
        module_type: String,
        property: &'static str,
    },

    /// Two declarations share a name and no precedence rule applies.
    #[error("module \"{name}\" is declared more than once ({first} and {second})")]
    DuplicateModule {
        name: String,
        first: String,
        second: String,
    },

    /// A defaults template references itself, directly or transitively.
    #[error("cyclic defaults in \"{module}\": {cycle}")]
    CyclicDefaults { module: String, cycle: String },

    /// A `defaults` entry names a module that is not a defaults template.
    #[error("module \"{module}\" lists \"{reference}\" in defaults, but it is a {module_type}, not java_defaults")]
    NotADefaultsModule {
        module: String,
        reference: String,
        module_type: String,
    },

    /// A named dependency has no module in the depending module's variant.
    #[error("module {module} depends on \"{dependency}\" ({role}), which is not defined for this variant")]
    UnresolvedDependency {
        module: String,
        dependency: String,
        role: EdgeRole,
    },

    /// A name is listed in both `libs` and `static_libs`.
    #[error("module \"{module}\" lists \"{dependency}\" in both libs and static_libs")]
    RoleConflict { module: String, dependency: String },

    /// An SDK selector is unrecognized or names an unregistered prebuilt SDK.
    #[error("module {module} has unknown sdk_version \"{version}\"")]
    UnknownSdkVersion { module: String, version: String },

    /// Module dependencies form a cycle.
    #[error("dependency cycle: {cycle}")]
    DependencyCycle { cycle: String },

    /// One or more modules failed to resolve; every collected error is kept.
    #[error("{}", render_errors(.errors))]
    ResolutionFailed { errors: Vec<EngineError> },
}

fn render_errors(errors: &[EngineError]) -> String {
    let mut out = format!("{} module error(s):", errors.len());
    for error in errors {
        out.push_str("\n  ");
        out.push_str(&error.to_string());
    }
    out
}
