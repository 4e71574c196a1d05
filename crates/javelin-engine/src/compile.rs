//! The `javac` action of a source library.

use std::path::PathBuf;

use javelin_javac::{Invocation, JavacCommand};

use crate::classpath::ResolvedClasspaths;
use crate::context::BuildContext;
use crate::error::EngineError;
use crate::module::{ModuleId, SharedProperties};
use crate::variant::COMPILED_JAR;

/// Scratch directory for `.class` files, inside the module directory.
const CLASSES_DIR: &str = "classes";

/// Synthesize the compile invocation for a source library.
///
/// Returns `Ok(None)` when the module has no sources.
///
/// # Errors
/// Returns an error if the invocation cannot be assembled.
pub fn synthesize_compile(
    id: &ModuleId,
    props: &SharedProperties,
    classpaths: &ResolvedClasspaths,
    ctx: &BuildContext,
) -> Result<Option<Invocation>, EngineError> {
    if props.srcs.is_empty() {
        return Ok(None);
    }

    let sources: Vec<PathBuf> = props.srcs.iter().map(PathBuf::from).collect();
    JavacCommand::new()
        .sources(&sources)
        .output(&ctx.module_output(id, COMPILED_JAR))
        .out_dir(&ctx.module_output(id, CLASSES_DIR))
        .bootclasspath(&classpaths.bootclasspath)
        .classpath(&classpaths.classpath)
        .flags(&props.javacflags)
        .build()
        .map(Some)
        .map_err(|source| EngineError::Invocation {
            module: id.to_string(),
            source,
        })
}
