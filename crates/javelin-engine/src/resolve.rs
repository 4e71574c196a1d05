//! Dependency edge materialization, topological levels and cycle detection.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::context::BuildContext;
use crate::error::EngineError;
use crate::module::{ModuleId, ModuleRecord, ModuleSet, RecordBody};
use crate::sdk::{resolve_sdk, Bootclasspath};

/// Why one module depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    /// Listed in `libs` (or an implicit framework library).
    Shared,
    /// Listed in `static_libs`.
    Static,
    /// Selected by the SDK resolver.
    Bootclasspath,
    /// Listed in `defaults`.
    Defaults,
}

impl fmt::Display for EdgeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeRole::Shared => "libs",
            EdgeRole::Static => "static_libs",
            EdgeRole::Bootclasspath => "bootclasspath",
            EdgeRole::Defaults => "defaults",
        })
    }
}

/// A directed dependency between two modules of the same variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub from: ModuleId,
    pub to: ModuleId,
    pub role: EdgeRole,
}

/// The dependencies of one module record, in classpath order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPlan {
    /// Bootclasspath edges first, then implicit framework libraries, `libs`
    /// and `static_libs`.
    pub edges: Vec<DependencyEdge>,
    /// The SDK resolver asked for the "no bootclasspath" marker.
    pub no_bootclasspath: bool,
}

impl DependencyPlan {
    /// Targets of edges with the given role, in order.
    pub fn targets(&self, role: EdgeRole) -> impl Iterator<Item = &ModuleId> {
        self.edges
            .iter()
            .filter(move |edge| edge.role == role)
            .map(|edge| &edge.to)
    }
}

/// Materialize the dependency edges of one record.
///
/// Edges may point at modules that do not exist in the variant; the classpath
/// builder reports those.
///
/// # Errors
/// Returns an error if the record's SDK selector cannot be resolved.
pub fn materialize_edges(
    record: &ModuleRecord,
    ctx: &BuildContext,
    modules: &ModuleSet,
) -> Result<DependencyPlan, EngineError> {
    let RecordBody::Library(props) = &record.body else {
        return Ok(DependencyPlan::default());
    };

    let sdk = resolve_sdk(&record.id, props, ctx, modules)?;
    let mut plan = DependencyPlan::default();
    let mut push = |name: &str, role: EdgeRole| {
        plan.edges.push(DependencyEdge {
            from: record.id.clone(),
            to: ModuleId::new(name, record.id.variant),
            role,
        });
    };

    let no_bootclasspath = match &sdk.bootclasspath {
        Bootclasspath::Modules(names) => {
            for name in names {
                push(name, EdgeRole::Bootclasspath);
            }
            false
        }
        Bootclasspath::NoBootclasspath => true,
    };
    for name in &sdk.implicit_libs {
        push(name, EdgeRole::Shared);
    }
    for name in &props.libs {
        push(name, EdgeRole::Shared);
    }
    for name in &props.static_libs {
        push(name, EdgeRole::Static);
    }

    plan.no_bootclasspath = no_bootclasspath;
    Ok(plan)
}

/// Group modules into levels that can be processed in parallel.
///
/// Level `n` holds every module whose dependencies all sit in earlier levels.
/// Dependencies outside `order` (unknown names, modules that already failed)
/// do not hold a module back. Within a level, modules keep their position in
/// `order`. Modules on or behind a cycle are left out of every level; one
/// [`EngineError::DependencyCycle`] is returned per distinct cycle.
pub fn parallel_levels(
    order: &[ModuleId],
    plans: &HashMap<ModuleId, DependencyPlan>,
) -> (Vec<Vec<ModuleId>>, Vec<EngineError>) {
    let members: HashSet<&ModuleId> = order.iter().collect();
    let deps_of = |id: &ModuleId| direct_deps(id, plans, &members);

    let mut placed: HashSet<&ModuleId> = HashSet::new();
    let mut remaining: Vec<&ModuleId> = order.iter().collect();
    let mut levels = Vec::new();

    loop {
        let (ready, blocked): (Vec<&ModuleId>, Vec<&ModuleId>) = remaining
            .into_iter()
            .partition(|id| deps_of(id).iter().all(|dep| placed.contains(dep)));
        if ready.is_empty() {
            remaining = blocked;
            break;
        }
        placed.extend(ready.iter().copied());
        levels.push(ready.into_iter().cloned().collect());
        remaining = blocked;
    }

    let mut errors = Vec::new();
    let stuck: HashSet<&ModuleId> = remaining.iter().copied().collect();
    let mut reported: HashSet<&ModuleId> = HashSet::new();
    for &start in &remaining {
        if reported.contains(start) {
            continue;
        }
        if let Some(cycle) = find_cycle(start, &stuck, deps_of) {
            if cycle.iter().any(|id| reported.contains(id)) {
                continue;
            }
            let names: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
            errors.push(EngineError::DependencyCycle {
                cycle: names.join(" -> "),
            });
            reported.extend(cycle);
        }
    }

    (levels, errors)
}

/// Dependencies of `id` that are themselves being levelled.
fn direct_deps<'a>(
    id: &ModuleId,
    plans: &'a HashMap<ModuleId, DependencyPlan>,
    members: &HashSet<&ModuleId>,
) -> Vec<&'a ModuleId> {
    plans
        .get(id)
        .map(|plan| {
            plan.edges
                .iter()
                .map(|edge| &edge.to)
                .filter(|to| members.contains(to))
                .collect()
        })
        .unwrap_or_default()
}

/// Walk from `start` through stuck modules until a module repeats.
///
/// Every stuck module has at least one stuck dependency (a self-edge counts),
/// so the walk always closes a cycle. The returned path starts and ends with
/// the same module.
fn find_cycle<'a>(
    start: &'a ModuleId,
    stuck: &HashSet<&'a ModuleId>,
    deps_of: impl Fn(&ModuleId) -> Vec<&'a ModuleId>,
) -> Option<Vec<&'a ModuleId>> {
    let mut path: Vec<&ModuleId> = vec![start];
    let mut current = start;
    loop {
        let next = deps_of(current).into_iter().find(|dep| stuck.contains(dep))?;
        if let Some(pos) = path.iter().position(|id| *id == next) {
            let mut cycle = path.get(pos..)?.to_vec();
            cycle.push(next);
            return Some(cycle);
        }
        path.push(next);
        current = next;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::{Path, PathBuf};

    use javelin_config::SdkSettings;
    use javelin_targets::{HostOs, Variant};

    use super::*;
    use crate::module::SharedProperties;

    fn ctx() -> BuildContext {
        BuildContext::new(Path::new("/out"), vec![HostOs::Linux], SdkSettings::default())
    }

    fn id(name: &str) -> ModuleId {
        ModuleId::new(name, Variant::Device)
    }

    fn library(name: &str, libs: &[&str], static_libs: &[&str]) -> ModuleRecord {
        ModuleRecord {
            id: id(name),
            module_type: "java_library",
            body: RecordBody::Library(SharedProperties {
                libs: libs.iter().map(|s| (*s).to_owned()).collect(),
                static_libs: static_libs.iter().map(|s| (*s).to_owned()).collect(),
                no_standard_libs: Some(true),
                ..SharedProperties::default()
            }),
        }
    }

    fn plans_for(records: &[ModuleRecord]) -> HashMap<ModuleId, DependencyPlan> {
        let set = ModuleSet::new(records.to_vec());
        records
            .iter()
            .map(|r| (r.id.clone(), materialize_edges(r, &ctx(), &set).unwrap()))
            .collect()
    }

    fn names(level: &[ModuleId]) -> Vec<&str> {
        level.iter().map(|id| id.name.as_str()).collect()
    }

    #[test]
    fn default_sdk_edges_come_first() {
        let record = ModuleRecord {
            id: id("foo"),
            module_type: "java_library",
            body: RecordBody::Library(SharedProperties {
                libs: vec!["bar".to_owned()],
                static_libs: vec!["baz".to_owned()],
                ..SharedProperties::default()
            }),
        };
        let plan = materialize_edges(&record, &ctx(), &ModuleSet::default()).unwrap();
        let edges: Vec<(&str, EdgeRole)> = plan
            .edges
            .iter()
            .map(|e| (e.to.name.as_str(), e.role))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("core-oj", EdgeRole::Bootclasspath),
                ("core-libart", EdgeRole::Bootclasspath),
                ("ext", EdgeRole::Shared),
                ("framework", EdgeRole::Shared),
                ("okhttp", EdgeRole::Shared),
                ("bar", EdgeRole::Shared),
                ("baz", EdgeRole::Static),
            ]
        );
        assert!(!plan.no_bootclasspath);
        assert!(plan.edges.iter().all(|e| e.from == record.id));
    }

    #[test]
    fn opt_out_sets_marker_and_no_edges() {
        let plan = materialize_edges(&library("foo", &[], &[]), &ctx(), &ModuleSet::default()).unwrap();
        assert!(plan.no_bootclasspath);
        assert!(plan.edges.is_empty());
    }

    #[test]
    fn imports_have_no_edges() {
        let record = ModuleRecord {
            id: id("bar"),
            module_type: "java_import",
            body: RecordBody::Import(vec![PathBuf::from("a.jar")]),
        };
        let plan = materialize_edges(&record, &ctx(), &ModuleSet::default()).unwrap();
        assert_eq!(plan, DependencyPlan::default());
    }

    #[test]
    fn edges_stay_in_variant() {
        let record = ModuleRecord {
            id: ModuleId::new("foo", Variant::Host(HostOs::Linux)),
            module_type: "java_library_host",
            body: RecordBody::Library(SharedProperties {
                libs: vec!["bar".to_owned()],
                ..SharedProperties::default()
            }),
        };
        let plan = materialize_edges(&record, &ctx(), &ModuleSet::default()).unwrap();
        assert_eq!(plan.edges.len(), 1);
        assert_eq!(
            plan.edges.first().unwrap().to,
            ModuleId::new("bar", Variant::Host(HostOs::Linux))
        );
    }

    #[test]
    fn levels_respect_dependencies() {
        let records = vec![
            library("app", &["mid"], &[]),
            library("mid", &[], &["leaf"]),
            library("leaf", &[], &[]),
            library("other", &[], &[]),
        ];
        let order: Vec<ModuleId> = records.iter().map(|r| r.id.clone()).collect();
        let (levels, errors) = parallel_levels(&order, &plans_for(&records));
        assert!(errors.is_empty());
        let levels: Vec<Vec<&str>> = levels.iter().map(|l| names(l)).collect();
        assert_eq!(levels, vec![vec!["leaf", "other"], vec!["mid"], vec!["app"]]);
    }

    #[test]
    fn unknown_and_excluded_deps_do_not_block() {
        let records = vec![library("foo", &["missing", "failed"], &[]), library("failed", &[], &[])];
        let order = vec![id("foo")];
        let (levels, errors) = parallel_levels(&order, &plans_for(&records));
        assert!(errors.is_empty());
        assert_eq!(levels.len(), 1);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let records = vec![library("foo", &["foo"], &[])];
        let order = vec![id("foo")];
        let (levels, errors) = parallel_levels(&order, &plans_for(&records));
        assert!(levels.is_empty());
        assert!(matches!(
            errors.first(),
            Some(EngineError::DependencyCycle { cycle }) if cycle == "foo (android_common) -> foo (android_common)"
        ));
    }

    #[test]
    fn cycle_reported_once() {
        let records = vec![
            library("a", &["b"], &[]),
            library("b", &[], &["a"]),
            library("c", &["a"], &[]),
            library("d", &[], &[]),
        ];
        let order: Vec<ModuleId> = records.iter().map(|r| r.id.clone()).collect();
        let (levels, errors) = parallel_levels(&order, &plans_for(&records));
        assert_eq!(levels.len(), 1);
        assert_eq!(names(levels.first().unwrap()), vec!["d"]);
        assert_eq!(errors.len(), 1);
        let err = errors.first().unwrap().to_string();
        assert!(
            err.contains("a (android_common) -> b (android_common) -> a (android_common)"),
            "error was: {err}"
        );
    }
}
