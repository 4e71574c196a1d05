//! Static-dependency merging, device desugaring and exported artifacts.

use std::path::{Path, PathBuf};

use javelin_javac::{CombineJarCommand, DesugarCommand, Invocation};
use javelin_targets::Variant;

use crate::classpath::{ArtifactIndex, ModuleOutputs, ResolvedClasspaths};
use crate::context::BuildContext;
use crate::error::EngineError;
use crate::module::ModuleId;
use crate::resolve::{DependencyPlan, EdgeRole};
use crate::variant::{COMBINED_JAR, DESUGAR_JAR};

/// The post-compile actions of a source library and what it exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packaging {
    pub combine: Option<Invocation>,
    pub desugar: Option<Invocation>,
    pub outputs: ModuleOutputs,
}

/// Jars merged from `plan`'s static dependencies.
///
/// Each static dependency contributes its exported jars followed by its own
/// static closure, depth-first in declaration order. Paths are kept once.
///
/// # Errors
/// Returns [`EngineError::UnresolvedDependency`] if a static dependency has
/// no outputs in `index`.
pub fn static_closure(
    from: &ModuleId,
    plan: &DependencyPlan,
    index: &ArtifactIndex,
) -> Result<Vec<PathBuf>, EngineError> {
    let mut closure: Vec<PathBuf> = Vec::new();
    for dep in plan.targets(EdgeRole::Static) {
        let outputs = index.get(dep).ok_or_else(|| EngineError::UnresolvedDependency {
            module: from.to_string(),
            dependency: dep.name.clone(),
            role: EdgeRole::Static,
        })?;
        for jar in outputs.exported.iter().chain(&outputs.static_closure) {
            if !closure.contains(jar) {
                closure.push(jar.clone());
            }
        }
    }
    Ok(closure)
}

/// Combine the compiled jar with the static closure and, on the device,
/// desugar the result.
///
/// With neither a compiled jar nor anything to merge there is nothing to
/// package and the module exports no jar.
///
/// # Errors
/// Returns an error if a static dependency is unresolved or an invocation
/// cannot be assembled.
pub fn package_library(
    id: &ModuleId,
    compiled: Option<&Path>,
    plan: &DependencyPlan,
    classpaths: &ResolvedClasspaths,
    index: &ArtifactIndex,
    ctx: &BuildContext,
) -> Result<Packaging, EngineError> {
    let closure = static_closure(id, plan, index)?;
    let inputs: Vec<PathBuf> = compiled
        .map(Path::to_path_buf)
        .into_iter()
        .chain(closure.iter().cloned())
        .collect();

    if inputs.is_empty() {
        return Ok(Packaging {
            combine: None,
            desugar: None,
            outputs: ModuleOutputs::default(),
        });
    }

    let invocation_error = |source| EngineError::Invocation {
        module: id.to_string(),
        source,
    };

    let combined = ctx.module_output(id, COMBINED_JAR);
    let combine = CombineJarCommand::new()
        .inputs(&inputs)
        .output(&combined)
        .build()
        .map_err(invocation_error)?;

    let (desugar, exported) = match id.variant {
        Variant::Device => {
            let desugared = ctx.module_output(id, DESUGAR_JAR);
            let desugar = DesugarCommand::new()
                .input(&combined)
                .output(&desugared)
                .bootclasspath(&classpaths.bootclasspath)
                .classpath(&classpaths.classpath)
                .build()
                .map_err(invocation_error)?;
            (Some(desugar), desugared)
        }
        Variant::Host(_) => (None, combined),
    };

    Ok(Packaging {
        combine: Some(combine),
        desugar,
        outputs: ModuleOutputs {
            exported: vec![exported],
            static_closure: closure,
        },
    })
}

/// A prebuilt import exports its declared jars and merges nothing.
pub fn import_outputs(jars: &[PathBuf]) -> ModuleOutputs {
    ModuleOutputs {
        exported: jars.to_vec(),
        static_closure: Vec::new(),
    }
}
