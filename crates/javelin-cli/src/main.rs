#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use javelin_engine::{ActionGraph, BuildContext, EngineError, PlanOptions};
use javelin_targets::Variant;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "javelin", about = "Resolve Java module classpaths and plan their build actions")]
#[command(version)]
struct Cli {
    /// Path to the module declaration file
    #[arg(long, global = true, default_value = "Javelin.toml")]
    config: PathBuf,
    /// Override the build directory from the declaration file
    #[arg(long, global = true)]
    build_dir: Option<String>,
    /// Log resolution passes (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve every module and print the action graph as JSON
    Plan {
        /// Write the graph to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the resolved bootclasspath and classpath of one module
    Classpath {
        /// Module name
        module: String,
        /// Variant directory name (e.g. "android_common", "linux_common")
        #[arg(long, default_value = "android_common")]
        variant: String,
    },
    /// List every module variant and its type
    Modules,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = PlanOptions {
        manifest_path: cli.config,
        build_dir: cli.build_dir,
    };
    let result = match cli.command {
        Command::Plan { out } => cmd_plan(&options, out.as_deref()),
        Command::Classpath { module, variant } => cmd_classpath(&options, &module, &variant),
        Command::Modules => cmd_modules(&options),
    };

    if let Err(err) = result {
        report(err.as_ref());
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Print one `error:` line per module error.
fn report(err: &(dyn Error + 'static)) {
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::ResolutionFailed { errors }) => {
            for error in errors {
                eprintln!("error: {error}");
            }
        }
        _ => eprintln!("error: {err}"),
    }
}

fn load(options: &PlanOptions) -> Result<(ActionGraph, BuildContext), Box<dyn Error>> {
    if !options.manifest_path.exists() {
        return Err(format!(
            "no {} found; pass --config to point at a declaration file",
            options.manifest_path.display()
        )
        .into());
    }
    tracing::debug!(config = %options.manifest_path.display(), "loading declarations");
    Ok(javelin_engine::plan(options)?)
}

fn cmd_plan(options: &PlanOptions, out: Option<&Path>) -> CliResult {
    let (graph, _) = load(options)?;
    match out {
        Some(path) => {
            graph.write_to(path)?;
            eprintln!("    Wrote {} module plan(s) to {}", graph.modules.len(), path.display());
        }
        None => println!("{}", graph.to_json()?),
    }
    eprintln!("    Fingerprint {}", graph.fingerprint()?);
    Ok(())
}

fn cmd_classpath(options: &PlanOptions, module: &str, variant: &str) -> CliResult {
    let variant: Variant = variant.parse()?;
    let (graph, _) = load(options)?;
    let Some(plan) = graph.module(module, variant) else {
        return Err(format!("no module \"{module}\" in variant {variant}").into());
    };
    println!("bootclasspath: {}", plan.classpaths.bootclasspath.render());
    println!("classpath: {}", plan.classpaths.classpath.render());
    Ok(())
}

fn cmd_modules(options: &PlanOptions) -> CliResult {
    let (graph, ctx) = load(options)?;
    let mut plans: Vec<_> = graph.modules.iter().collect();
    plans.sort_by(|a, b| a.id.cmp(&b.id));
    for plan in plans {
        println!(
            "{:<32} {:<16} {}",
            plan.id.name,
            plan.id.variant.dir_name(),
            plan.module_type
        );
    }
    eprintln!("    Build root {}", ctx.build_root.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_plan_defaults() {
        let cli = Cli::try_parse_from(["javelin", "plan"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("Javelin.toml"));
        assert!(cli.build_dir.is_none());
        assert!(!cli.verbose);
        match cli.command {
            Command::Plan { out } => assert!(out.is_none()),
            other => panic!("expected Plan, got {other:?}"),
        }
    }

    #[test]
    fn parse_plan_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "javelin",
            "plan",
            "--out",
            "actions.json",
            "--config",
            "sub/Javelin.toml",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("sub/Javelin.toml"));
        assert!(cli.verbose);
        match cli.command {
            Command::Plan { out } => assert_eq!(out, Some(PathBuf::from("actions.json"))),
            other => panic!("expected Plan, got {other:?}"),
        }
    }

    #[test]
    fn parse_classpath_variant() {
        let cli =
            Cli::try_parse_from(["javelin", "classpath", "foo", "--variant", "linux_common"])
                .unwrap();
        match cli.command {
            Command::Classpath { module, variant } => {
                assert_eq!(module, "foo");
                assert_eq!(variant, "linux_common");
            }
            other => panic!("expected Classpath, got {other:?}"),
        }
    }

    #[test]
    fn parse_classpath_requires_module() {
        let err = Cli::try_parse_from(["javelin", "classpath"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parse_unknown_subcommand() {
        let err = Cli::try_parse_from(["javelin", "build"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn load_missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = PlanOptions {
            manifest_path: dir.path().join("Javelin.toml"),
            build_dir: None,
        };
        let err = load(&options).unwrap_err().to_string();
        assert!(err.contains("--config"), "error was: {err}");
    }

    #[test]
    fn plan_writes_graph_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Javelin.toml");
        std::fs::write(
            &manifest,
            r#"
[build]
host_os = ["linux"]

[[module]]
type = "java_import"
name = "bar"
jars = ["bar.jar"]

[[module]]
type = "java_library"
name = "foo"
srcs = ["Foo.java"]
libs = ["bar"]
no_standard_libs = true
"#,
        )
        .unwrap();
        let options = PlanOptions {
            manifest_path: manifest,
            build_dir: None,
        };
        let out = dir.path().join("gen").join("actions.json");
        cmd_plan(&options, Some(&out)).unwrap();
        let json = std::fs::read_to_string(&out).unwrap();
        assert!(json.contains("\"rule\": \"javac\""), "json was: {json}");
        assert!(json.contains("bar.jar"), "json was: {json}");
    }

    #[test]
    fn classpath_rejects_unknown_variant() {
        let options = PlanOptions {
            manifest_path: PathBuf::from("Javelin.toml"),
            build_dir: None,
        };
        let err = cmd_classpath(&options, "foo", "android_arm64").unwrap_err();
        assert!(err.to_string().contains("android_arm64"), "error was: {err}");
    }
}
