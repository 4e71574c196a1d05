//! The explicit build context threaded through resolution and action synthesis.

use std::path::{Path, PathBuf};

use javelin_config::{BuildSettings, SdkSettings};
use javelin_targets::{host_os, HostOs};

use crate::error::EngineError;
use crate::module::ModuleId;

/// Everything resolution needs to know about the build beyond the modules.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Root of all generated files.
    pub build_root: PathBuf,
    /// Host operating systems that host-capable modules get a variant for.
    pub hosts: Vec<HostOs>,
    pub sdk: SdkSettings,
}

impl BuildContext {
    pub fn new(build_root: &Path, hosts: Vec<HostOs>, sdk: SdkSettings) -> Self {
        Self {
            build_root: build_root.to_path_buf(),
            hosts,
            sdk,
        }
    }

    /// Build a context from the `[build]` table of a manifest living in
    /// `project_dir`.
    ///
    /// An empty `host_os` list means the OS javelin runs on.
    ///
    /// # Errors
    /// Returns an error if a host OS name is unknown, or if no host list is
    /// given and the running OS has no host variant.
    pub fn from_settings(project_dir: &Path, settings: &BuildSettings) -> Result<Self, EngineError> {
        let hosts = if settings.host_os.is_empty() {
            vec![host_os()?]
        } else {
            let mut hosts = Vec::with_capacity(settings.host_os.len());
            for name in &settings.host_os {
                let os: HostOs = name.parse()?;
                if !hosts.contains(&os) {
                    hosts.push(os);
                }
            }
            hosts
        };

        Ok(Self::new(
            &project_dir.join(&settings.build_dir),
            hosts,
            settings.sdk.clone(),
        ))
    }

    /// `<build_root>/.intermediates/<module>/<variant>`.
    pub fn module_dir(&self, id: &ModuleId) -> PathBuf {
        self.build_root
            .join(".intermediates")
            .join(&id.name)
            .join(id.variant.dir_name())
    }

    /// A file inside [`BuildContext::module_dir`].
    pub fn module_output(&self, id: &ModuleId, file: &str) -> PathBuf {
        self.module_dir(id).join(file)
    }
}
