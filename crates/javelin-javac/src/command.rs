//! Builders for the rule invocations handed to the action-execution engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::classpath::Classpath;
use crate::error::JavacError;

/// A fully described rule invocation: what it reads, what it must wait on,
/// what it writes, and the values substituted into its command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Explicit inputs, in order.
    pub inputs: Vec<PathBuf>,
    /// Files the invocation depends on without naming them as inputs. Any
    /// change to one of these must re-run the invocation.
    pub implicits: Vec<PathBuf>,
    pub output: PathBuf,
    pub args: BTreeMap<String, String>,
}

/// Jars of the bootclasspath followed by jars of the classpath. The
/// "no bootclasspath" marker is not a file and is left out.
fn implicit_jars(bootclasspath: &Classpath, classpath: &Classpath) -> Vec<PathBuf> {
    bootclasspath
        .jars()
        .chain(classpath.jars())
        .map(Path::to_path_buf)
        .collect()
}

/// Builder for a `javac` invocation.
#[derive(Debug, Default)]
pub struct JavacCommand {
    sources: Vec<PathBuf>,
    output: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    bootclasspath: Classpath,
    classpath: Classpath,
    flags: Vec<String>,
}

impl JavacCommand {
    /// Create a new empty command builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source files to compile.
    pub fn sources(mut self, paths: &[PathBuf]) -> Self {
        self.sources = paths.to_vec();
        self
    }

    /// Set the jar the compiled classes are packed into.
    pub fn output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }

    /// Set the scratch directory for `.class` files.
    pub fn out_dir(mut self, path: &Path) -> Self {
        self.out_dir = Some(path.to_path_buf());
        self
    }

    pub fn bootclasspath(mut self, bootclasspath: &Classpath) -> Self {
        self.bootclasspath = bootclasspath.clone();
        self
    }

    pub fn classpath(mut self, classpath: &Classpath) -> Self {
        self.classpath = classpath.clone();
        self
    }

    /// Extra compiler flags, passed through verbatim.
    pub fn flags(mut self, flags: &[String]) -> Self {
        self.flags = flags.to_vec();
        self
    }

    /// Assemble the invocation without executing anything.
    ///
    /// # Errors
    /// Returns an error if sources or the output path are not set.
    pub fn build(&self) -> Result<Invocation, JavacError> {
        if self.sources.is_empty() {
            return Err(JavacError::NoSources);
        }
        let Some(output) = &self.output else {
            return Err(JavacError::NoOutput { rule: "javac" });
        };

        let mut args = BTreeMap::new();
        args.insert("javacFlags".to_owned(), self.flags.join(" "));
        args.insert(
            "bootClasspath".to_owned(),
            self.bootclasspath.form_javac_flag("-bootclasspath"),
        );
        args.insert(
            "classpath".to_owned(),
            self.classpath.form_javac_flag("-classpath"),
        );
        if let Some(out_dir) = &self.out_dir {
            args.insert("outDir".to_owned(), out_dir.display().to_string());
        }

        Ok(Invocation {
            inputs: self.sources.clone(),
            implicits: implicit_jars(&self.bootclasspath, &self.classpath),
            output: output.clone(),
            args,
        })
    }
}

/// Builder for a `combineJar` invocation merging several jars into one.
#[derive(Debug, Default)]
pub struct CombineJarCommand {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
}

impl CombineJarCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the jars to merge. Earlier jars win on duplicate entries.
    pub fn inputs(mut self, paths: &[PathBuf]) -> Self {
        self.inputs = paths.to_vec();
        self
    }

    pub fn output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }

    /// # Errors
    /// Returns an error if there is nothing to merge or no output path.
    pub fn build(&self) -> Result<Invocation, JavacError> {
        if self.inputs.is_empty() {
            return Err(JavacError::NoInputs { rule: "combineJar" });
        }
        let Some(output) = &self.output else {
            return Err(JavacError::NoOutput { rule: "combineJar" });
        };
        Ok(Invocation {
            inputs: self.inputs.clone(),
            implicits: Vec::new(),
            output: output.clone(),
            args: BTreeMap::new(),
        })
    }
}

/// Builder for a `desugar` invocation rewriting a combined jar for the device.
#[derive(Debug, Default)]
pub struct DesugarCommand {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    bootclasspath: Classpath,
    classpath: Classpath,
}

impl DesugarCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.input = Some(path.to_path_buf());
        self
    }

    pub fn output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }

    pub fn bootclasspath(mut self, bootclasspath: &Classpath) -> Self {
        self.bootclasspath = bootclasspath.clone();
        self
    }

    pub fn classpath(mut self, classpath: &Classpath) -> Self {
        self.classpath = classpath.clone();
        self
    }

    /// # Errors
    /// Returns an error if the input or output path is not set.
    pub fn build(&self) -> Result<Invocation, JavacError> {
        let Some(input) = &self.input else {
            return Err(JavacError::NoInputs { rule: "desugar" });
        };
        let Some(output) = &self.output else {
            return Err(JavacError::NoOutput { rule: "desugar" });
        };

        let mut args = BTreeMap::new();
        args.insert(
            "bootClasspath".to_owned(),
            self.bootclasspath.form_repeated_flag("--bootclasspath_entry"),
        );
        args.insert(
            "classpath".to_owned(),
            self.classpath.form_repeated_flag("--classpath_entry"),
        );

        Ok(Invocation {
            inputs: vec![input.clone()],
            implicits: implicit_jars(&self.bootclasspath, &self.classpath),
            output: output.clone(),
            args,
        })
    }
}
