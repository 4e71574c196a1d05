//! Defaults flattening.
//!
//! A module's effective properties are the properties of each referenced
//! `java_defaults` template (itself flattened first), in reference order,
//! followed by the module's own. Templates are consumed here and never reach
//! variant expansion.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::EngineError;
use crate::module::{FlatBody, FlatModule, LibraryDecl, ModuleBody, ModuleDecl, SharedProperties};
use crate::resolve::EdgeRole;

/// Output of [`flatten`].
#[derive(Debug, Default)]
pub struct Flattened {
    /// Buildable modules, in declaration order.
    pub modules: Vec<FlatModule>,
    pub errors: Vec<EngineError>,
    /// Names of buildable modules dropped because of an error, including
    /// modules that only used a broken template.
    pub failed: HashSet<String>,
}

/// A template that failed is reported once; later users only need to know
/// that it failed.
enum Failure {
    New(EngineError),
    Reported,
}

struct Merger<'a> {
    decls: HashMap<&'a str, &'a ModuleDecl>,
    /// `None` marks a template whose flattening failed.
    cache: HashMap<&'a str, Option<SharedProperties>>,
}

impl<'a> Merger<'a> {
    fn new(decls: &'a [ModuleDecl]) -> Self {
        Self {
            decls: decls.iter().map(|d| (d.name.as_str(), d)).collect(),
            cache: HashMap::new(),
        }
    }

    /// Merge `references` then `own` for the module `owner`.
    fn merge(
        &mut self,
        owner: &'a str,
        references: &'a [String],
        own: &SharedProperties,
        stack: &mut Vec<&'a str>,
    ) -> Result<SharedProperties, Failure> {
        let mut merged = SharedProperties::default();
        for reference in references {
            let props = self.template(owner, reference, stack)?;
            merged.append(&props);
        }
        merged.append(own);
        Ok(merged)
    }

    /// Flatten the template `name`, referenced from `owner`.
    fn template(
        &mut self,
        owner: &'a str,
        name: &'a str,
        stack: &mut Vec<&'a str>,
    ) -> Result<SharedProperties, Failure> {
        if let Some(start) = stack.iter().position(|n| *n == name) {
            let mut cycle: Vec<&str> = stack.get(start..).unwrap_or_default().to_vec();
            cycle.push(name);
            return Err(Failure::New(EngineError::CyclicDefaults {
                module: name.to_owned(),
                cycle: cycle.join(" -> "),
            }));
        }

        match self.cache.get(name) {
            Some(Some(props)) => return Ok(props.clone()),
            Some(None) => return Err(Failure::Reported),
            None => {}
        }

        let Some(decl) = self.decls.get(name).copied() else {
            return Err(Failure::New(EngineError::UnresolvedDependency {
                module: owner.to_owned(),
                dependency: name.to_owned(),
                role: EdgeRole::Defaults,
            }));
        };
        let ModuleBody::DefaultsTemplate(own) = &decl.body else {
            return Err(Failure::New(EngineError::NotADefaultsModule {
                module: owner.to_owned(),
                reference: name.to_owned(),
                module_type: decl.module_type.to_owned(),
            }));
        };

        stack.push(name);
        let result = self.merge(name, &decl.defaults, own, stack);
        stack.pop();

        self.cache.insert(name, result.as_ref().ok().cloned());
        result
    }
}

/// Flatten every module's defaults.
///
/// Templates are checked first, in declaration order, so a broken template
/// is reported once no matter how many modules use it.
pub fn flatten(decls: &[ModuleDecl]) -> Flattened {
    let mut merger = Merger::new(decls);
    let mut out = Flattened::default();

    for decl in decls {
        if matches!(decl.body, ModuleBody::DefaultsTemplate(_)) {
            let mut stack = Vec::new();
            if let Err(Failure::New(error)) = merger.template(&decl.name, &decl.name, &mut stack) {
                out.errors.push(error);
            }
        }
    }

    for decl in decls {
        match &decl.body {
            ModuleBody::DefaultsTemplate(_) => {}
            ModuleBody::PrebuiltImport(import) => out.modules.push(FlatModule {
                name: decl.name.clone(),
                module_type: decl.module_type,
                body: FlatBody::Import(import.clone()),
            }),
            ModuleBody::SourceLibrary(library) => {
                let mut stack = vec![decl.name.as_str()];
                match merger.merge(&decl.name, &decl.defaults, &library.props, &mut stack) {
                    Ok(props) => {
                        if !decl.defaults.is_empty() {
                            debug!(module = %decl.name, defaults = ?decl.defaults, "flattened defaults");
                        }
                        out.modules.push(FlatModule {
                            name: decl.name.clone(),
                            module_type: decl.module_type,
                            body: FlatBody::Library(LibraryDecl {
                                props,
                                hosts: library.hosts,
                            }),
                        });
                    }
                    Err(failure) => {
                        if let Failure::New(error) = failure {
                            out.errors.push(error);
                        }
                        out.failed.insert(decl.name.clone());
                    }
                }
            }
        }
    }

    out
}
