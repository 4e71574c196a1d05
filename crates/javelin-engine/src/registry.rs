//! Static registry of module types.
//!
//! Each `[[module]]` table names its type with a tag. The tag selects a
//! constructor that checks which properties the type accepts and produces a
//! [`ModuleDecl`] carrying the matching [`ModuleBody`] variant.

use javelin_config::ModuleDeclaration;

use crate::error::EngineError;
use crate::module::{HostSupport, ImportDecl, LibraryDecl, ModuleBody, ModuleDecl, SharedProperties};

type Constructor = fn(&ModuleDeclaration) -> Result<ModuleDecl, EngineError>;

const MODULE_TYPES: &[(&str, Constructor)] = &[
    ("java_library", java_library),
    ("java_library_host", java_library_host),
    ("java_import", java_import),
    ("android_prebuilt_sdk", android_prebuilt_sdk),
    ("java_defaults", java_defaults),
];

/// Look up the constructor for a module type tag.
pub fn lookup(module_type: &str) -> Option<Constructor> {
    MODULE_TYPES
        .iter()
        .find(|(tag, _)| *tag == module_type)
        .map(|(_, constructor)| *constructor)
}

/// Comma-separated list of registered module types (for error messages).
pub fn registered_types() -> String {
    MODULE_TYPES
        .iter()
        .map(|(tag, _)| *tag)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turn one raw declaration into a typed module declaration.
///
/// # Errors
/// Returns an error if the type is unknown, the name is empty, or a property
/// is set that the type does not accept.
pub fn instantiate(decl: &ModuleDeclaration) -> Result<ModuleDecl, EngineError> {
    let Some(constructor) = lookup(&decl.kind) else {
        return Err(EngineError::UnknownModuleType {
            module: decl.name.clone(),
            module_type: decl.kind.clone(),
            known: registered_types(),
        });
    };
    if decl.name.is_empty() {
        return Err(EngineError::MissingName {
            module_type: decl.kind.clone(),
        });
    }
    constructor(decl)
}

fn reject(
    decl: &ModuleDeclaration,
    module_type: &'static str,
    property: &'static str,
    present: bool,
) -> Result<(), EngineError> {
    if present {
        return Err(EngineError::InvalidProperty {
            module: decl.name.clone(),
            module_type: module_type.to_owned(),
            property,
        });
    }
    Ok(())
}

fn shared_properties(decl: &ModuleDeclaration) -> SharedProperties {
    SharedProperties {
        srcs: decl.srcs.clone().unwrap_or_default(),
        libs: decl.libs.clone().unwrap_or_default(),
        static_libs: decl.static_libs.clone().unwrap_or_default(),
        javacflags: decl.javacflags.clone().unwrap_or_default(),
        sdk_version: decl.sdk_version.clone(),
        no_standard_libs: decl.no_standard_libs,
    }
}

fn host_support(host_supported: Option<bool>) -> HostSupport {
    if host_supported.unwrap_or(false) {
        HostSupport::HostAndDevice
    } else {
        HostSupport::DeviceOnly
    }
}

fn library(
    decl: &ModuleDeclaration,
    module_type: &'static str,
    hosts: HostSupport,
) -> Result<ModuleDecl, EngineError> {
    reject(decl, module_type, "jars", decl.jars.is_some())?;
    reject(decl, module_type, "prefer", decl.prefer.is_some())?;
    Ok(ModuleDecl {
        name: decl.name.clone(),
        module_type,
        defaults: decl.defaults.clone().unwrap_or_default(),
        body: ModuleBody::SourceLibrary(LibraryDecl {
            props: shared_properties(decl),
            hosts,
        }),
    })
}

fn java_library(decl: &ModuleDeclaration) -> Result<ModuleDecl, EngineError> {
    library(decl, "java_library", host_support(decl.host_supported))
}

fn java_library_host(decl: &ModuleDeclaration) -> Result<ModuleDecl, EngineError> {
    reject(decl, "java_library_host", "host_supported", decl.host_supported.is_some())?;
    library(decl, "java_library_host", HostSupport::HostOnly)
}

fn import(
    decl: &ModuleDeclaration,
    module_type: &'static str,
    hosts: HostSupport,
) -> Result<ModuleDecl, EngineError> {
    for (property, present) in [
        ("srcs", decl.srcs.is_some()),
        ("libs", decl.libs.is_some()),
        ("static_libs", decl.static_libs.is_some()),
        ("defaults", decl.defaults.is_some()),
        ("javacflags", decl.javacflags.is_some()),
        ("sdk_version", decl.sdk_version.is_some()),
        ("no_standard_libs", decl.no_standard_libs.is_some()),
    ] {
        reject(decl, module_type, property, present)?;
    }
    Ok(ModuleDecl {
        name: decl.name.clone(),
        module_type,
        defaults: Vec::new(),
        body: ModuleBody::PrebuiltImport(ImportDecl {
            jars: decl.jars.clone().unwrap_or_default(),
            hosts,
            prefer: decl.prefer.unwrap_or(false),
        }),
    })
}

fn java_import(decl: &ModuleDeclaration) -> Result<ModuleDecl, EngineError> {
    import(decl, "java_import", host_support(decl.host_supported))
}

fn android_prebuilt_sdk(decl: &ModuleDeclaration) -> Result<ModuleDecl, EngineError> {
    reject(decl, "android_prebuilt_sdk", "host_supported", decl.host_supported.is_some())?;
    import(decl, "android_prebuilt_sdk", HostSupport::DeviceOnly)
}

fn java_defaults(decl: &ModuleDeclaration) -> Result<ModuleDecl, EngineError> {
    for (property, present) in [
        ("jars", decl.jars.is_some()),
        ("host_supported", decl.host_supported.is_some()),
        ("prefer", decl.prefer.is_some()),
    ] {
        reject(decl, "java_defaults", property, present)?;
    }
    Ok(ModuleDecl {
        name: decl.name.clone(),
        module_type: "java_defaults",
        defaults: decl.defaults.clone().unwrap_or_default(),
        body: ModuleBody::DefaultsTemplate(shared_properties(decl)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::module::ModuleKind;

    fn declaration(kind: &str, name: &str) -> ModuleDeclaration {
        ModuleDeclaration {
            kind: kind.to_owned(),
            name: name.to_owned(),
            ..ModuleDeclaration::default()
        }
    }

    #[test]
    fn every_registered_type_resolves() {
        for tag in [
            "java_library",
            "java_library_host",
            "java_import",
            "android_prebuilt_sdk",
            "java_defaults",
        ] {
            assert!(lookup(tag).is_some(), "{tag} should be registered");
        }
    }

    #[test]
    fn library_kinds() {
        let lib = instantiate(&declaration("java_library", "foo")).unwrap();
        assert_eq!(lib.kind(), ModuleKind::SourceLibrary);
        assert_eq!(lib.module_type, "java_library");

        let host = instantiate(&declaration("java_library_host", "foo")).unwrap();
        match host.body {
            ModuleBody::SourceLibrary(decl) => assert_eq!(decl.hosts, HostSupport::HostOnly),
            other => unreachable!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn host_supported_library_builds_both() {
        let mut decl = declaration("java_library", "foo");
        decl.host_supported = Some(true);
        match instantiate(&decl).unwrap().body {
            ModuleBody::SourceLibrary(lib) => assert_eq!(lib.hosts, HostSupport::HostAndDevice),
            other => unreachable!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn import_carries_jars_and_prefer() {
        let mut decl = declaration("java_import", "bar");
        decl.jars = Some(vec!["a.jar".to_owned()]);
        decl.prefer = Some(true);
        match instantiate(&decl).unwrap().body {
            ModuleBody::PrebuiltImport(import) => {
                assert_eq!(import.jars, vec!["a.jar"]);
                assert!(import.prefer);
                assert_eq!(import.hosts, HostSupport::DeviceOnly);
            }
            other => unreachable!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn defaults_template_keeps_shared_properties() {
        let mut decl = declaration("java_defaults", "common");
        decl.srcs = Some(vec!["a.java".to_owned()]);
        decl.sdk_version = Some("current".to_owned());
        let template = instantiate(&decl).unwrap();
        assert_eq!(template.kind(), ModuleKind::DefaultsTemplate);
        match template.body {
            ModuleBody::DefaultsTemplate(props) => {
                assert_eq!(props.srcs, vec!["a.java"]);
                assert_eq!(props.sdk_version.as_deref(), Some("current"));
            }
            other => unreachable!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn srcs_on_import_rejected() {
        let mut decl = declaration("java_import", "bar");
        decl.srcs = Some(vec!["a.java".to_owned()]);
        let err = instantiate(&decl).unwrap_err().to_string();
        assert!(err.contains("`srcs`"), "error was: {err}");
    }

    #[test]
    fn jars_on_library_rejected() {
        let mut decl = declaration("java_library", "foo");
        decl.jars = Some(vec!["a.jar".to_owned()]);
        assert!(matches!(
            instantiate(&decl),
            Err(EngineError::InvalidProperty { property: "jars", .. })
        ));
    }

    #[test]
    fn unknown_type_lists_known_types() {
        let err = instantiate(&declaration("cc_library", "foo"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("cc_library"), "error was: {err}");
        assert!(err.contains("java_import"), "error was: {err}");
    }

    #[test]
    fn empty_name_rejected() {
        assert!(matches!(
            instantiate(&declaration("java_library", "")),
            Err(EngineError::MissingName { .. })
        ));
    }
}
