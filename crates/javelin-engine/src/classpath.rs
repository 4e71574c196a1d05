//! Bootclasspath and classpath construction from materialized edges.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use javelin_javac::Classpath;

use crate::error::EngineError;
use crate::module::ModuleId;
use crate::resolve::{DependencyPlan, EdgeRole};

/// What a finished module offers the modules that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleOutputs {
    /// Jars placed on a dependent's classpath. Empty for a source library
    /// that produces nothing.
    pub exported: Vec<PathBuf>,
    /// Jars this module merged from its static dependencies, in merge order.
    pub static_closure: Vec<PathBuf>,
}

/// Outputs of every module in completed levels.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    outputs: HashMap<ModuleId, ModuleOutputs>,
}

impl ArtifactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ModuleId) -> Option<&ModuleOutputs> {
        self.outputs.get(id)
    }

    pub fn insert(&mut self, id: ModuleId, outputs: ModuleOutputs) {
        self.outputs.insert(id, outputs);
    }
}

/// The two compile-time search paths of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedClasspaths {
    pub bootclasspath: Classpath,
    pub classpath: Classpath,
}

/// Build the bootclasspath and classpath of `from` by walking its edges in
/// order.
///
/// Static dependencies contribute their exported jars to the classpath too.
/// A jar already on the bootclasspath is not repeated on the classpath.
///
/// # Errors
/// Returns [`EngineError::UnresolvedDependency`] for the first edge whose
/// target has no outputs in `index`.
pub fn build_classpaths(
    from: &ModuleId,
    plan: &DependencyPlan,
    index: &ArtifactIndex,
) -> Result<ResolvedClasspaths, EngineError> {
    let mut resolved = ResolvedClasspaths {
        bootclasspath: if plan.no_bootclasspath {
            Classpath::no_bootclasspath()
        } else {
            Classpath::new()
        },
        classpath: Classpath::new(),
    };

    for edge in &plan.edges {
        let outputs = index
            .get(&edge.to)
            .ok_or_else(|| EngineError::UnresolvedDependency {
                module: from.to_string(),
                dependency: edge.to.name.clone(),
                role: edge.role,
            })?;

        match edge.role {
            EdgeRole::Bootclasspath => {
                for jar in &outputs.exported {
                    resolved.bootclasspath.push_jar(jar);
                }
            }
            EdgeRole::Shared | EdgeRole::Static => {
                for jar in &outputs.exported {
                    if !resolved.bootclasspath.contains_jar(jar) {
                        resolved.classpath.push_jar(jar);
                    }
                }
            }
            EdgeRole::Defaults => {}
        }
    }

    Ok(resolved)
}
