//! The action graph handed to the execution engine.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use javelin_javac::Invocation;
use javelin_targets::Variant;

use crate::classpath::{ModuleOutputs, ResolvedClasspaths};
use crate::error::EngineError;
use crate::module::ModuleId;

/// The rule an action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rule {
    #[serde(rename = "javac")]
    Javac,
    #[serde(rename = "combineJar")]
    CombineJar,
    #[serde(rename = "desugar")]
    Desugar,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Javac => "javac",
            Rule::CombineJar => "combineJar",
            Rule::Desugar => "desugar",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub rule: Rule,
    pub inputs: Vec<PathBuf>,
    pub implicits: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
    pub args: BTreeMap<String, String>,
}

impl Action {
    pub fn new(rule: Rule, invocation: Invocation) -> Self {
        Self {
            rule,
            inputs: invocation.inputs,
            implicits: invocation.implicits,
            outputs: vec![invocation.output],
            args: invocation.args,
        }
    }
}

/// Everything resolved for one module in one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePlan {
    #[serde(flatten)]
    pub id: ModuleId,
    pub module_type: &'static str,
    /// Empty for prebuilt imports.
    pub classpaths: ResolvedClasspaths,
    pub actions: Vec<Action>,
    pub outputs: ModuleOutputs,
}

impl ModulePlan {
    /// The first action running `rule`, if any.
    pub fn rule(&self, rule: Rule) -> Option<&Action> {
        self.actions.iter().find(|action| action.rule == rule)
    }
}

/// Module plans in dependency order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionGraph {
    pub modules: Vec<ModulePlan>,
}

impl ActionGraph {
    /// Look up the plan of `name` in `variant`.
    pub fn module(&self, name: &str, variant: Variant) -> Option<&ModulePlan> {
        self.modules
            .iter()
            .find(|plan| plan.id.name == name && plan.id.variant == variant)
    }

    /// Every action of every module, in graph order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.modules.iter().flat_map(|plan| plan.actions.iter())
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Serialize {
            message: e.to_string(),
        })
    }

    /// SHA-256 over the JSON form. Identical declarations always produce the
    /// same fingerprint.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn fingerprint(&self) -> Result<String, EngineError> {
        Ok(javelin_util::hash::sha256_bytes(self.to_json()?.as_bytes()))
    }

    /// Write the JSON form to `path` atomically.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn write_to(&self, path: &Path) -> Result<(), EngineError> {
        let json = self.to_json()?;
        javelin_util::fs::write_atomic(path, &json)?;
        Ok(())
    }
}
