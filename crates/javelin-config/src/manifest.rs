use serde::{Deserialize, Serialize};
use std::path::Path;

/// The `Javelin.toml` project manifest: build settings plus module declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub build: BuildSettings,
    /// Module declarations in file order.
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDeclaration>,
}

/// The `[build]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    /// Build root, relative to the directory holding `Javelin.toml`.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    /// Host operating systems to create host variants for. Empty means the
    /// OS javelin is running on.
    #[serde(default)]
    pub host_os: Vec<String>,
    #[serde(default)]
    pub sdk: SdkSettings,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            host_os: Vec::new(),
            sdk: SdkSettings::default(),
        }
    }
}

fn default_build_dir() -> String {
    "out".to_owned()
}

/// The `[build.sdk]` table: which modules stand in for the platform libraries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkSettings {
    /// Core runtime modules placed on the bootclasspath when no SDK is selected.
    #[serde(default = "default_bootclasspath")]
    pub default_bootclasspath: Vec<String>,
    /// Framework modules placed on the classpath when no SDK is selected.
    #[serde(default = "default_libraries")]
    pub default_libraries: Vec<String>,
    #[serde(default = "default_current_stubs")]
    pub current_stubs: String,
    #[serde(default = "default_system_current_stubs")]
    pub system_current_stubs: String,
    #[serde(default = "default_test_current_stubs")]
    pub test_current_stubs: String,
    /// Prefix of prebuilt SDK module names; `sdk_version = "14"` selects
    /// `<prefix>14`.
    #[serde(default = "default_prebuilt_prefix")]
    pub prebuilt_prefix: String,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            default_bootclasspath: default_bootclasspath(),
            default_libraries: default_libraries(),
            current_stubs: default_current_stubs(),
            system_current_stubs: default_system_current_stubs(),
            test_current_stubs: default_test_current_stubs(),
            prebuilt_prefix: default_prebuilt_prefix(),
        }
    }
}

fn default_bootclasspath() -> Vec<String> {
    vec!["core-oj".to_owned(), "core-libart".to_owned()]
}

fn default_libraries() -> Vec<String> {
    vec![
        "ext".to_owned(),
        "framework".to_owned(),
        "okhttp".to_owned(),
    ]
}

fn default_current_stubs() -> String {
    "android_stubs_current".to_owned()
}

fn default_system_current_stubs() -> String {
    "android_system_stubs_current".to_owned()
}

fn default_test_current_stubs() -> String {
    "android_test_stubs_current".to_owned()
}

fn default_prebuilt_prefix() -> String {
    "sdk_v".to_owned()
}

/// One `[[module]]` table as written.
///
/// Every property is optional here; which ones a module type accepts is
/// decided by the engine's module registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDeclaration {
    /// Module type tag, e.g. `"java_library"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jars: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_libs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javacflags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_standard_libs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_supported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer: Option<bool>,
}

impl Manifest {
    /// Read and parse a `Javelin.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse manifest text. `origin` names the source in error messages.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid manifest.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|e| ManifestError::Parse {
            path: origin.to_owned(),
            source: e,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid Javelin.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}


#[cfg(test)]
mod proptests {
    use super::Manifest;

    use proptest::prelude::proptest;

    proptest! {
        /// Arbitrary input must produce Ok or Err, never a panic.
        #[test]
        fn parse_never_panics(content in ".*") {
            let _ = Manifest::parse(&content, "fuzz");
        }
    }
}
