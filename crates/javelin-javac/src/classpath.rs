//! Ordered, deduplicated classpaths and their flag renderings.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

/// Separator placed between classpath entries in a rendered flag value.
pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Literal rendering of the "no bootclasspath" marker.
pub const NO_BOOTCLASSPATH: &str = "\"\"";

/// One classpath entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    /// A jar produced by (or declared by) an upstream module.
    Jar(PathBuf),
    /// Compile with no implicit bootclasspath. Rendered in flags, never a
    /// build dependency.
    NoBootclasspath,
}

impl ClasspathEntry {
    /// Render this entry the way it appears inside a flag value.
    pub fn render(&self) -> String {
        match self {
            ClasspathEntry::Jar(path) => path.display().to_string(),
            ClasspathEntry::NoBootclasspath => NO_BOOTCLASSPATH.to_owned(),
        }
    }
}

impl Serialize for ClasspathEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

/// An ordered classpath. Entries are unique; the first insertion wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Classpath {
    entries: Vec<ClasspathEntry>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bootclasspath holding only the "no bootclasspath" marker.
    pub fn no_bootclasspath() -> Self {
        Self {
            entries: vec![ClasspathEntry::NoBootclasspath],
        }
    }

    /// Append an entry unless it is already present.
    ///
    /// Returns `true` if the entry was added.
    pub fn push(&mut self, entry: ClasspathEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Append a jar path unless it is already present.
    pub fn push_jar(&mut self, path: &Path) -> bool {
        self.push(ClasspathEntry::Jar(path.to_path_buf()))
    }

    /// Whether `path` is already on this classpath.
    pub fn contains_jar(&self, path: &Path) -> bool {
        self.jars().any(|jar| jar == path)
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    /// The real jar entries, skipping the "no bootclasspath" marker.
    pub fn jars(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|entry| match entry {
            ClasspathEntry::Jar(path) => Some(path.as_path()),
            ClasspathEntry::NoBootclasspath => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries joined with [`PATH_SEPARATOR`].
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ClasspathEntry::render)
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }

    /// Render as a single `javac`-style flag (`-classpath a:b`).
    ///
    /// An empty classpath renders as the empty string so the rule omits the
    /// flag entirely.
    pub fn form_javac_flag(&self, flag: &str) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{flag} {}", self.render())
        }
    }

    /// Render as one `<flag> <jar>` pair per jar, space separated.
    ///
    /// The "no bootclasspath" marker has no jar and contributes nothing.
    pub fn form_repeated_flag(&self, flag: &str) -> String {
        self.jars()
            .map(|jar| format!("{flag} {}", jar.display()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
