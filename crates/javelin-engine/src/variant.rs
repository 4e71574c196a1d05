//! Variant selection and per-variant output naming.

use std::path::PathBuf;

use javelin_targets::Variant;

use crate::context::BuildContext;
use crate::module::{FlatBody, FlatModule, HostSupport, ModuleId, ModuleRecord, RecordBody};

/// Jar written by the compile action.
pub const COMPILED_JAR: &str = "classes-compiled.jar";
/// Jar written by the combine action.
pub const COMBINED_JAR: &str = "classes-combined.jar";
/// Jar written by the device-only desugar action.
pub const DESUGAR_JAR: &str = "classes-desugar.jar";

/// The jar a source library advertises to its dependents in `variant`.
pub fn exported_jar_name(variant: Variant) -> &'static str {
    match variant {
        Variant::Device => DESUGAR_JAR,
        Variant::Host(_) => COMBINED_JAR,
    }
}

/// The variants a module is instantiated for: device first, then each
/// configured host.
pub fn variants_for(hosts: HostSupport, ctx: &BuildContext) -> Vec<Variant> {
    let host_variants = ctx.hosts.iter().map(|os| Variant::Host(*os));
    match hosts {
        HostSupport::DeviceOnly => vec![Variant::Device],
        HostSupport::HostOnly => host_variants.collect(),
        HostSupport::HostAndDevice => std::iter::once(Variant::Device)
            .chain(host_variants)
            .collect(),
    }
}

/// Expand flattened modules into one record per applicable variant.
///
/// Records come out in declaration order, variants of one module together.
pub fn expand(modules: &[FlatModule], ctx: &BuildContext) -> Vec<ModuleRecord> {
    let mut records = Vec::new();
    for module in modules {
        let hosts = match &module.body {
            FlatBody::Library(lib) => lib.hosts,
            FlatBody::Import(import) => import.hosts,
        };
        for variant in variants_for(hosts, ctx) {
            let body = match &module.body {
                FlatBody::Library(lib) => RecordBody::Library(lib.props.clone()),
                FlatBody::Import(import) => {
                    RecordBody::Import(import.jars.iter().map(PathBuf::from).collect())
                }
            };
            records.push(ModuleRecord {
                id: ModuleId::new(&module.name, variant),
                module_type: module.module_type,
                body,
            });
        }
    }
    records
}
