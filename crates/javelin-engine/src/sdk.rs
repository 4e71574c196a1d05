//! SDK version resolution: which modules form a module's bootclasspath.

use javelin_targets::Variant;

use crate::context::BuildContext;
use crate::error::EngineError;
use crate::module::{ModuleId, ModuleKind, ModuleSet, SharedProperties};

/// A parsed `sdk_version` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkVersion {
    /// Unset or `""`: build against the platform itself.
    Default,
    /// A released API level, served by a prebuilt SDK module.
    Numeric(u32),
    Current,
    SystemCurrent,
    TestCurrent,
}

impl SdkVersion {
    /// Parse a selector. Returns `None` for anything unrecognized.
    pub fn parse(selector: Option<&str>) -> Option<Self> {
        match selector.unwrap_or_default() {
            "" => Some(SdkVersion::Default),
            "current" => Some(SdkVersion::Current),
            "system_current" => Some(SdkVersion::SystemCurrent),
            "test_current" => Some(SdkVersion::TestCurrent),
            other if other.bytes().all(|b| b.is_ascii_digit()) => other
                .parse()
                .ok()
                .filter(|level: &u32| level.to_string() == other)
                .map(SdkVersion::Numeric),
            _ => None,
        }
    }
}

/// What goes on the bootclasspath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootclasspath {
    /// These modules, in order. May be empty.
    Modules(Vec<String>),
    /// Compile with no implicit bootclasspath at all.
    NoBootclasspath,
}

/// The standard-library half of a module's dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkDeps {
    pub bootclasspath: Bootclasspath,
    /// Framework modules implicitly placed on the classpath ahead of `libs`.
    pub implicit_libs: Vec<String>,
}

/// Map a module's SDK selector and opt-out flag to its standard libraries.
///
/// The selector must be recognized in every variant. Host variants then get
/// no implicit bootclasspath and ignore the opt-out flag. On the device,
/// `no_standard_libs` takes precedence over any recognized selector. Only the
/// default selector adds the framework libraries.
///
/// # Errors
/// Returns [`EngineError::UnknownSdkVersion`] if the selector is not
/// recognized, or is numeric with no matching prebuilt SDK module on the
/// device.
pub fn resolve_sdk(
    id: &ModuleId,
    props: &SharedProperties,
    ctx: &BuildContext,
    modules: &ModuleSet,
) -> Result<SdkDeps, EngineError> {
    let unknown = || EngineError::UnknownSdkVersion {
        module: id.to_string(),
        version: props.sdk_version.clone().unwrap_or_default(),
    };
    let version = SdkVersion::parse(props.sdk_version.as_deref()).ok_or_else(unknown)?;

    if id.variant.is_host() {
        return Ok(SdkDeps {
            bootclasspath: Bootclasspath::Modules(Vec::new()),
            implicit_libs: Vec::new(),
        });
    }

    if props.no_standard_libs.unwrap_or(false) {
        return Ok(SdkDeps {
            bootclasspath: Bootclasspath::NoBootclasspath,
            implicit_libs: Vec::new(),
        });
    }

    let stubs = |name: &str| SdkDeps {
        bootclasspath: Bootclasspath::Modules(vec![name.to_owned()]),
        implicit_libs: Vec::new(),
    };

    let sdk = &ctx.sdk;
    Ok(match version {
        SdkVersion::Default => SdkDeps {
            bootclasspath: Bootclasspath::Modules(sdk.default_bootclasspath.clone()),
            implicit_libs: sdk.default_libraries.clone(),
        },
        SdkVersion::Numeric(level) => {
            let name = format!("{}{level}", sdk.prebuilt_prefix);
            let prebuilt = ModuleId::new(&name, Variant::Device);
            match modules.get(&prebuilt) {
                Some(record) if record.kind() == ModuleKind::PrebuiltImport => stubs(&name),
                _ => return Err(unknown()),
            }
        }
        SdkVersion::Current => stubs(&sdk.current_stubs),
        SdkVersion::SystemCurrent => stubs(&sdk.system_current_stubs),
        SdkVersion::TestCurrent => stubs(&sdk.test_current_stubs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::{Path, PathBuf};

    use javelin_config::SdkSettings;
    use javelin_targets::HostOs;

    use super::*;
    use crate::module::{ModuleRecord, RecordBody};

    fn ctx() -> BuildContext {
        BuildContext::new(Path::new("/out"), vec![HostOs::Linux], SdkSettings::default())
    }

    fn sdk_modules() -> ModuleSet {
        ModuleSet::new(vec![ModuleRecord {
            id: ModuleId::new("sdk_v14", Variant::Device),
            module_type: "android_prebuilt_sdk",
            body: RecordBody::Import(vec![PathBuf::from("sdk_v14.jar")]),
        }])
    }

    fn resolve(variant: Variant, sdk_version: Option<&str>, no_std: Option<bool>) -> Result<SdkDeps, EngineError> {
        let props = SharedProperties {
            sdk_version: sdk_version.map(str::to_owned),
            no_standard_libs: no_std,
            ..SharedProperties::default()
        };
        resolve_sdk(&ModuleId::new("foo", variant), &props, &ctx(), &sdk_modules())
    }

    fn modules(names: &[&str]) -> Bootclasspath {
        Bootclasspath::Modules(names.iter().map(|n| (*n).to_owned()).collect())
    }

    #[test]
    fn parse_selectors() {
        assert_eq!(SdkVersion::parse(None), Some(SdkVersion::Default));
        assert_eq!(SdkVersion::parse(Some("")), Some(SdkVersion::Default));
        assert_eq!(SdkVersion::parse(Some("14")), Some(SdkVersion::Numeric(14)));
        assert_eq!(SdkVersion::parse(Some("current")), Some(SdkVersion::Current));
        assert_eq!(SdkVersion::parse(Some("system_current")), Some(SdkVersion::SystemCurrent));
        assert_eq!(SdkVersion::parse(Some("test_current")), Some(SdkVersion::TestCurrent));
        assert_eq!(SdkVersion::parse(Some("-3")), None);
        assert_eq!(SdkVersion::parse(Some("core_current")), None);
        assert_eq!(SdkVersion::parse(Some("99999999999999")), None);
        assert_eq!(SdkVersion::parse(Some("014")), None);
        assert_eq!(SdkVersion::parse(Some("0")), Some(SdkVersion::Numeric(0)));
    }

    #[test]
    fn default_uses_core_and_framework() {
        let deps = resolve(Variant::Device, None, None).unwrap();
        assert_eq!(deps.bootclasspath, modules(&["core-oj", "core-libart"]));
        assert_eq!(deps.implicit_libs, vec!["ext", "framework", "okhttp"]);
        assert_eq!(resolve(Variant::Device, Some(""), None).unwrap(), deps);
    }

    #[test]
    fn numeric_uses_prebuilt_sdk() {
        let deps = resolve(Variant::Device, Some("14"), None).unwrap();
        assert_eq!(deps.bootclasspath, modules(&["sdk_v14"]));
        assert!(deps.implicit_libs.is_empty());
    }

    #[test]
    fn numeric_without_prebuilt_is_unknown() {
        let err = resolve(Variant::Device, Some("15"), None).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSdkVersion { ref version, .. } if version == "15"));
    }

    #[test]
    fn stubs_selectors() {
        for (selector, stubs) in [
            ("current", "android_stubs_current"),
            ("system_current", "android_system_stubs_current"),
            ("test_current", "android_test_stubs_current"),
        ] {
            let deps = resolve(Variant::Device, Some(selector), None).unwrap();
            assert_eq!(deps.bootclasspath, modules(&[stubs]));
            assert!(deps.implicit_libs.is_empty());
        }
    }

    #[test]
    fn opt_out_wins_over_selector() {
        let deps = resolve(Variant::Device, Some("current"), Some(true)).unwrap();
        assert_eq!(deps.bootclasspath, Bootclasspath::NoBootclasspath);
        assert!(deps.implicit_libs.is_empty());
    }

    #[test]
    fn unknown_selector_rejected() {
        assert!(resolve(Variant::Device, Some("latest"), None).is_err());
    }

    #[test]
    fn leading_zero_does_not_alias_prebuilt() {
        let err = resolve(Variant::Device, Some("014"), None).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSdkVersion { ref version, .. } if version == "014"));
    }

    #[test]
    fn host_still_rejects_unknown_selector() {
        let host = Variant::Host(HostOs::Linux);
        let err = resolve(host, Some("latest"), None).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSdkVersion { ref version, .. } if version == "latest"));
    }

    #[test]
    fn host_gets_nothing() {
        let host = Variant::Host(HostOs::Linux);
        for (selector, no_std) in [(None, None), (None, Some(true)), (Some("current"), None), (Some("15"), None)] {
            let deps = resolve(host, selector, no_std).unwrap();
            assert_eq!(deps.bootclasspath, modules(&[]));
            assert!(deps.implicit_libs.is_empty());
        }
    }
}
