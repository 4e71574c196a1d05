//! Module declarations and per-variant module records.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use javelin_targets::Variant;

/// Identity of a module record: its name within one variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId {
    pub name: String,
    pub variant: Variant,
}

impl ModuleId {
    pub fn new(name: &str, variant: Variant) -> Self {
        Self {
            name: name.to_owned(),
            variant,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.variant)
    }
}

/// The three shapes a declared module can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    SourceLibrary,
    PrebuiltImport,
    DefaultsTemplate,
}

/// Properties shared by source libraries and defaults templates.
///
/// `srcs`, `libs` and `static_libs` are ordered sets; [`SharedProperties::append`]
/// keeps the first occurrence of each value. `javacflags` is a plain sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedProperties {
    pub srcs: Vec<String>,
    pub libs: Vec<String>,
    pub static_libs: Vec<String>,
    pub javacflags: Vec<String>,
    pub sdk_version: Option<String>,
    pub no_standard_libs: Option<bool>,
}

impl SharedProperties {
    /// Merge `later` after `self`. Name and path lists are concatenated
    /// without duplicates, flags are concatenated as is. Scalars take
    /// `later`'s value when it is set and non-empty.
    pub fn append(&mut self, later: &SharedProperties) {
        extend_unique(&mut self.srcs, &later.srcs);
        extend_unique(&mut self.libs, &later.libs);
        extend_unique(&mut self.static_libs, &later.static_libs);
        self.javacflags.extend_from_slice(&later.javacflags);

        match later.sdk_version.as_deref() {
            Some(v) if !v.is_empty() => self.sdk_version = Some(v.to_owned()),
            Some(_) if self.sdk_version.is_none() => self.sdk_version = Some(String::new()),
            _ => {}
        }
        if later.no_standard_libs.is_some() {
            self.no_standard_libs = later.no_standard_libs;
        }
    }

    /// Names listed under both `libs` and `static_libs`, in `libs` order.
    pub fn role_conflicts(&self) -> Vec<&str> {
        self.libs
            .iter()
            .filter(|name| self.static_libs.contains(name))
            .map(String::as_str)
            .collect()
    }
}

fn extend_unique(dest: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !dest.contains(value) {
            dest.push(value.clone());
        }
    }
}

/// Which variants a module is instantiated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSupport {
    DeviceOnly,
    HostOnly,
    HostAndDevice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDecl {
    pub props: SharedProperties,
    pub hosts: HostSupport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub jars: Vec<String>,
    pub hosts: HostSupport,
    /// Take this prebuilt over a source module of the same name.
    pub prefer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleBody {
    SourceLibrary(LibraryDecl),
    PrebuiltImport(ImportDecl),
    DefaultsTemplate(SharedProperties),
}

/// A declaration accepted by the module registry, before any pass has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub name: String,
    /// Registry tag the module was declared with (e.g. `"java_library"`).
    pub module_type: &'static str,
    pub defaults: Vec<String>,
    pub body: ModuleBody,
}

impl ModuleDecl {
    pub fn kind(&self) -> ModuleKind {
        match self.body {
            ModuleBody::SourceLibrary(_) => ModuleKind::SourceLibrary,
            ModuleBody::PrebuiltImport(_) => ModuleKind::PrebuiltImport,
            ModuleBody::DefaultsTemplate(_) => ModuleKind::DefaultsTemplate,
        }
    }
}

/// A buildable module after defaults flattening. Templates are gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatBody {
    Library(LibraryDecl),
    Import(ImportDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatModule {
    pub name: String,
    pub module_type: &'static str,
    pub body: FlatBody,
}

/// Resolved properties of one module in one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    Library(SharedProperties),
    /// Prebuilt jars, used verbatim as the module's artifacts.
    Import(Vec<PathBuf>),
}

/// The immutable input to Phase 2 for one (module, variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub module_type: &'static str,
    pub body: RecordBody,
}

impl ModuleRecord {
    pub fn kind(&self) -> ModuleKind {
        match self.body {
            RecordBody::Library(_) => ModuleKind::SourceLibrary,
            RecordBody::Import(_) => ModuleKind::PrebuiltImport,
        }
    }
}

/// All module records of a build, in declaration order then variant order.
#[derive(Debug, Default)]
pub struct ModuleSet {
    records: Vec<ModuleRecord>,
    index: HashMap<ModuleId, usize>,
}

impl ModuleSet {
    /// Index `records`. A later record with an id already present is dropped.
    pub fn new(records: Vec<ModuleRecord>) -> Self {
        let mut set = Self::default();
        for record in records {
            if set.index.contains_key(&record.id) {
                continue;
            }
            set.index.insert(record.id.clone(), set.records.len());
            set.records.push(record);
        }
        set
    }

    pub fn get(&self, id: &ModuleId) -> Option<&ModuleRecord> {
        self.index.get(id).and_then(|&i| self.records.get(i))
    }

    pub fn records(&self) -> &[ModuleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
