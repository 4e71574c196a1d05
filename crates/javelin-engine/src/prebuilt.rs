//! Source-versus-prebuilt precedence.
//!
//! A source library and a prebuilt import may share a name. The prebuilt is
//! used only when it sets `prefer = true`; otherwise the source module wins.
//! The losing declaration is removed before defaults are flattened. Every
//! other name collision is an error.

use std::collections::HashMap;

use tracing::debug;

use crate::error::EngineError;
use crate::module::{ModuleBody, ModuleDecl, ModuleKind};

/// Apply the precedence policy, keeping declaration order for survivors.
///
/// On a collision the policy cannot settle, the first declaration is kept
/// and a [`EngineError::DuplicateModule`] is reported for each later one.
pub fn apply_precedence(decls: Vec<ModuleDecl>) -> (Vec<ModuleDecl>, Vec<EngineError>) {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, decl) in decls.iter().enumerate() {
        by_name.entry(decl.name.as_str()).or_default().push(i);
    }

    let mut dropped = vec![false; decls.len()];
    let mut errors = Vec::new();

    for (i, decl) in decls.iter().enumerate() {
        let Some(group) = by_name.get(decl.name.as_str()) else {
            continue;
        };
        // Handle each group once, at its first member.
        if group.first() != Some(&i) || group.len() < 2 {
            continue;
        }

        if let Some(loser) = precedence_loser(&decls, group) {
            if let Some(loser_decl) = decls.get(loser) {
                debug!(
                    module = %decl.name,
                    dropped = loser_decl.module_type,
                    "source/prebuilt precedence"
                );
            }
            if let Some(flag) = dropped.get_mut(loser) {
                *flag = true;
            }
            continue;
        }

        for &later in group.iter().skip(1) {
            if let Some(later_decl) = decls.get(later) {
                errors.push(EngineError::DuplicateModule {
                    name: decl.name.clone(),
                    first: decl.module_type.to_owned(),
                    second: later_decl.module_type.to_owned(),
                });
            }
            if let Some(flag) = dropped.get_mut(later) {
                *flag = true;
            }
        }
    }

    let survivors = decls
        .into_iter()
        .zip(dropped)
        .filter_map(|(decl, drop)| (!drop).then_some(decl))
        .collect();
    (survivors, errors)
}

/// For a group of exactly one source library and one prebuilt import,
/// return the index of the declaration that loses.
fn precedence_loser(decls: &[ModuleDecl], group: &[usize]) -> Option<usize> {
    let [a, b] = group else {
        return None;
    };
    let (first, second) = (decls.get(*a)?, decls.get(*b)?);

    let (source, prebuilt, prebuilt_decl) = match (first.kind(), second.kind()) {
        (ModuleKind::SourceLibrary, ModuleKind::PrebuiltImport) => (*a, *b, second),
        (ModuleKind::PrebuiltImport, ModuleKind::SourceLibrary) => (*b, *a, first),
        _ => return None,
    };
    let prefer = matches!(&prebuilt_decl.body, ModuleBody::PrebuiltImport(import) if import.prefer);

    Some(if prefer { source } else { prebuilt })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::module::{HostSupport, ImportDecl, LibraryDecl, SharedProperties};

    fn library(name: &str) -> ModuleDecl {
        ModuleDecl {
            name: name.to_owned(),
            module_type: "java_library",
            defaults: Vec::new(),
            body: ModuleBody::SourceLibrary(LibraryDecl {
                props: SharedProperties::default(),
                hosts: HostSupport::DeviceOnly,
            }),
        }
    }

    fn import(name: &str, prefer: bool) -> ModuleDecl {
        ModuleDecl {
            name: name.to_owned(),
            module_type: "java_import",
            defaults: Vec::new(),
            body: ModuleBody::PrebuiltImport(ImportDecl {
                jars: vec![format!("{name}.jar")],
                hosts: HostSupport::DeviceOnly,
                prefer,
            }),
        }
    }

    #[test]
    fn distinct_names_untouched() {
        let (kept, errors) = apply_precedence(vec![library("foo"), import("bar", false)]);
        assert!(errors.is_empty());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn source_wins_without_prefer() {
        let (kept, errors) = apply_precedence(vec![import("bar", false), library("bar")]);
        assert!(errors.is_empty());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().unwrap().kind(), ModuleKind::SourceLibrary);
    }

    #[test]
    fn prebuilt_wins_with_prefer() {
        let (kept, errors) = apply_precedence(vec![library("bar"), import("bar", true)]);
        assert!(errors.is_empty());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().unwrap().kind(), ModuleKind::PrebuiltImport);
    }

    #[test]
    fn two_sources_are_duplicates() {
        let (kept, errors) = apply_precedence(vec![library("foo"), library("foo")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.first(),
            Some(EngineError::DuplicateModule { name, .. }) if name == "foo"
        ));
    }

    #[test]
    fn three_way_collision_reports_each_extra() {
        let (kept, errors) =
            apply_precedence(vec![library("foo"), import("foo", true), library("foo")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn survivors_keep_declaration_order() {
        let (kept, _) = apply_precedence(vec![
            library("a"),
            import("b", false),
            library("b"),
            library("c"),
        ]);
        let names: Vec<(&str, ModuleKind)> =
            kept.iter().map(|d| (d.name.as_str(), d.kind())).collect();
        assert_eq!(
            names,
            vec![
                ("a", ModuleKind::SourceLibrary),
                ("b", ModuleKind::SourceLibrary),
                ("c", ModuleKind::SourceLibrary),
            ]
        );
    }
}
