//! Classpath rendering and rule invocations for `javac`, `combineJar` and `desugar`.

pub mod classpath;
pub mod command;
pub mod error;

pub use classpath::{Classpath, ClasspathEntry, NO_BOOTCLASSPATH, PATH_SEPARATOR};
pub use command::{CombineJarCommand, DesugarCommand, Invocation, JavacCommand};
pub use error::JavacError;
