//! Resolution driver: declarations in, action graph out.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use javelin_config::{Manifest, ModuleDeclaration};

use crate::action::{Action, ActionGraph, ModulePlan, Rule};
use crate::classpath::{build_classpaths, ArtifactIndex, ResolvedClasspaths};
use crate::combine::{import_outputs, package_library};
use crate::compile::synthesize_compile;
use crate::context::BuildContext;
use crate::defaults::flatten;
use crate::error::EngineError;
use crate::module::{FlatBody, ModuleId, ModuleRecord, ModuleSet, RecordBody};
use crate::prebuilt::apply_precedence;
use crate::registry::instantiate;
use crate::resolve::{materialize_edges, parallel_levels, DependencyPlan, EdgeRole};
use crate::variant::expand;

/// Options for planning a project from its manifest file.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Path to `Javelin.toml`. Relative build directories are resolved
    /// against its parent.
    pub manifest_path: PathBuf,
    /// Override for `[build].build_dir`.
    pub build_dir: Option<String>,
}

/// Read a manifest, build its context and resolve it.
///
/// # Errors
/// Returns an error if the manifest cannot be read, the context is invalid,
/// or resolution fails.
pub fn plan(options: &PlanOptions) -> Result<(ActionGraph, BuildContext), EngineError> {
    let mut manifest = Manifest::from_path(&options.manifest_path)?;
    if let Some(build_dir) = &options.build_dir {
        manifest.build.build_dir.clone_from(build_dir);
    }
    let project_dir = options
        .manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let ctx = BuildContext::from_settings(project_dir, &manifest.build)?;
    let graph = resolve_manifest(&manifest, &ctx)?;
    Ok((graph, ctx))
}

/// Resolve every module of `manifest`.
///
/// # Errors
/// Returns [`EngineError::ResolutionFailed`] carrying every module error.
pub fn resolve_manifest(manifest: &Manifest, ctx: &BuildContext) -> Result<ActionGraph, EngineError> {
    resolve_declarations(&manifest.modules, ctx)
}

/// Resolve raw module declarations into an action graph.
///
/// Phase 1 runs the declaration passes one after another: registry,
/// precedence, defaults, role validation, variant expansion and edge
/// materialization. Phase 2 walks the dependency levels, building classpaths
/// and actions for the modules of a level in parallel. A module whose
/// dependency failed is skipped without a second error. If anything failed,
/// no graph is returned.
///
/// # Errors
/// Returns [`EngineError::ResolutionFailed`] carrying every module error.
pub fn resolve_declarations(
    decls: &[ModuleDeclaration],
    ctx: &BuildContext,
) -> Result<ActionGraph, EngineError> {
    let start = Instant::now();
    let mut errors: Vec<EngineError> = Vec::new();
    // Names that never became records because of an error.
    let mut failed_names: HashSet<String> = HashSet::new();

    // 1. Registry.
    let mut instantiated = Vec::with_capacity(decls.len());
    for decl in decls {
        match instantiate(decl) {
            Ok(module) => instantiated.push(module),
            Err(error) => {
                failed_names.insert(decl.name.clone());
                errors.push(error);
            }
        }
    }

    // 2. Source/prebuilt precedence.
    let (survivors, duplicate_errors) = apply_precedence(instantiated);
    errors.extend(duplicate_errors);

    // 3. Defaults. A template that failed in the registry is already reported.
    let flat = flatten(&survivors);
    errors.extend(flat.errors.into_iter().filter(|error| {
        !matches!(
            error,
            EngineError::UnresolvedDependency { dependency, role: EdgeRole::Defaults, .. }
                if failed_names.contains(dependency)
        )
    }));
    failed_names.extend(flat.failed);

    // 4. Role validation.
    let mut modules = Vec::with_capacity(flat.modules.len());
    for module in flat.modules {
        if let FlatBody::Library(library) = &module.body {
            let conflicts = library.props.role_conflicts();
            if !conflicts.is_empty() {
                for dependency in conflicts {
                    errors.push(EngineError::RoleConflict {
                        module: module.name.clone(),
                        dependency: dependency.to_owned(),
                    });
                }
                failed_names.insert(module.name.clone());
                continue;
            }
        }
        modules.push(module);
    }

    // 5. Variants.
    let records = ModuleSet::new(expand(&modules, ctx));
    info!(
        modules = modules.len(),
        records = records.len(),
        hosts = ?ctx.hosts,
        "resolving modules"
    );

    // 6. Edges.
    let mut failed: HashSet<ModuleId> = HashSet::new();
    let mut plans: HashMap<ModuleId, DependencyPlan> = HashMap::new();
    for record in records.records() {
        match materialize_edges(record, ctx, &records) {
            Ok(plan) => {
                plans.insert(record.id.clone(), plan);
            }
            Err(error) => {
                errors.push(error);
                failed.insert(record.id.clone());
            }
        }
    }

    // 7. Levels.
    let order: Vec<ModuleId> = records
        .records()
        .iter()
        .map(|record| record.id.clone())
        .filter(|id| !failed.contains(id))
        .collect();
    let (levels, cycle_errors) = parallel_levels(&order, &plans);
    errors.extend(cycle_errors);
    debug!(levels = levels.len(), "computed dependency levels");

    // 8. Classpaths and actions, level by level.
    let mut index = ArtifactIndex::new();
    let mut graph = ActionGraph::default();
    for level in &levels {
        let outcomes: Vec<(ModuleId, Outcome)> = level
            .par_iter()
            .map(|id| {
                let outcome = match (records.get(id), plans.get(id)) {
                    (Some(record), Some(plan)) => {
                        if depends_on_failed(plan, &failed, &failed_names) {
                            Outcome::Skipped
                        } else {
                            match plan_module(record, plan, &index, ctx) {
                                Ok(module_plan) => Outcome::Planned(module_plan),
                                Err(error) => Outcome::Failed(error),
                            }
                        }
                    }
                    _ => Outcome::Skipped,
                };
                (id.clone(), outcome)
            })
            .collect();

        for (id, outcome) in outcomes {
            match outcome {
                Outcome::Planned(module_plan) => {
                    index.insert(id, module_plan.outputs.clone());
                    graph.modules.push(module_plan);
                }
                Outcome::Failed(error) => {
                    errors.push(error);
                    failed.insert(id);
                }
                Outcome::Skipped => {
                    debug!(module = %id, "skipped: a dependency failed");
                    failed.insert(id);
                }
            }
        }
    }

    if !errors.is_empty() {
        warn!(errors = errors.len(), "resolution failed");
        return Err(EngineError::ResolutionFailed { errors });
    }

    info!(
        modules = graph.modules.len(),
        actions = graph.actions().count(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "action graph ready"
    );
    Ok(graph)
}

enum Outcome {
    Planned(ModulePlan),
    Failed(EngineError),
    Skipped,
}

fn depends_on_failed(
    plan: &DependencyPlan,
    failed: &HashSet<ModuleId>,
    failed_names: &HashSet<String>,
) -> bool {
    plan.edges
        .iter()
        .any(|edge| failed.contains(&edge.to) || failed_names.contains(&edge.to.name))
}

/// Classpaths, actions and outputs of one record whose dependencies are all
/// in `index`.
fn plan_module(
    record: &ModuleRecord,
    plan: &DependencyPlan,
    index: &ArtifactIndex,
    ctx: &BuildContext,
) -> Result<ModulePlan, EngineError> {
    let props = match &record.body {
        RecordBody::Import(jars) => {
            return Ok(ModulePlan {
                id: record.id.clone(),
                module_type: record.module_type,
                classpaths: ResolvedClasspaths::default(),
                actions: Vec::new(),
                outputs: import_outputs(jars),
            });
        }
        RecordBody::Library(props) => props,
    };

    let classpaths = build_classpaths(&record.id, plan, index)?;
    let mut actions = Vec::new();

    let compile = synthesize_compile(&record.id, props, &classpaths, ctx)?;
    let compiled = compile.as_ref().map(|invocation| invocation.output.clone());
    if let Some(invocation) = compile {
        actions.push(Action::new(Rule::Javac, invocation));
    }

    let packaging = package_library(
        &record.id,
        compiled.as_deref(),
        plan,
        &classpaths,
        index,
        ctx,
    )?;
    if let Some(invocation) = packaging.combine {
        actions.push(Action::new(Rule::CombineJar, invocation));
    }
    if let Some(invocation) = packaging.desugar {
        actions.push(Action::new(Rule::Desugar, invocation));
    }

    debug!(
        module = %record.id,
        actions = actions.len(),
        bootclasspath = %classpaths.bootclasspath.render(),
        classpath = %classpaths.classpath.render(),
        "planned module"
    );

    Ok(ModulePlan {
        id: record.id.clone(),
        module_type: record.module_type,
        classpaths,
        actions,
        outputs: packaging.outputs,
    })
}
