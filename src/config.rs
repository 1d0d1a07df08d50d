use crate::classifier::Classifier;
use crate::errors::Result;
use crate::patterns::TEXT_EXTENSIONS;
use crate::rules::{Rule, RuleTable};
use crate::walker::WalkOptions;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One `pattern -> replacement` row of a config file.
#[derive(Deserialize, Clone, Debug)]
pub struct RuleConfig {
    /// The case-insensitive regex pattern.
    pub pattern: String,
    /// The literal replacement text.
    pub replacement: String,
}

/// Configuration for a sanitize run, as read from YAML.
///
/// ```yaml
/// rules:
///   - pattern: '\bAcme\s+Corp\b'
///     replacement: 'Customer-X'
/// extensions: [md, txt]
/// skip_dirs: [.git, target]
/// respect_gitignore: false
/// ```
#[derive(Deserialize, Clone, Debug, Default)]
pub struct SanitizeConfig {
    /// Rules in application order. An empty list falls back to the built-in table.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Extensions always treated as text. Replaces the default allow-list.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Directory names to prune. Replaces the default skip set.
    #[serde(default)]
    pub skip_dirs: Option<Vec<String>>,
    /// Honour `.gitignore` files during traversal.
    #[serde(default)]
    pub respect_gitignore: bool,
}

impl SanitizeConfig {
    /// Compiles the configured rules, or the built-in table if none are configured.
    pub fn rule_table(&self) -> Result<RuleTable> {
        if self.rules.is_empty() {
            return RuleTable::builtin();
        }
        let rules = self
            .rules
            .iter()
            .map(|r| Rule::new(r.pattern.as_str(), r.replacement.as_str()))
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleTable::new(rules))
    }

    pub fn classifier(&self) -> Classifier {
        match &self.extensions {
            Some(exts) => Classifier::new(exts),
            None => Classifier::new(TEXT_EXTENSIONS),
        }
    }

    pub fn walk_options(&self) -> WalkOptions {
        let mut options = WalkOptions {
            respect_gitignore: self.respect_gitignore,
            ..WalkOptions::default()
        };
        if let Some(dirs) = &self.skip_dirs {
            options.skip_dirs = dirs.clone();
        }
        options
    }
}

/// A utility for locating and loading configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. The path as given (absolute, or relative to the current directory).
    /// 2. A path relative to the `working_dir`.
    /// 3. Inside the user's `scrubber` config directory.
    /// 4. Next to the executable.
    pub fn find_config(config_path: &Path, working_dir: &Path) -> Result<PathBuf> {
        let mut candidates = vec![config_path.to_path_buf()];
        if config_path.is_relative() {
            candidates.push(working_dir.join(config_path));
            if let Some(config_dir) = dirs::config_dir() {
                candidates.push(config_dir.join("scrubber").join(config_path));
            }
            if let Some(exe_dir) = env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
            {
                candidates.push(exe_dir.join(config_path));
            }
        }

        if let Some(found) = candidates.iter().find(|c| c.is_file()) {
            return Ok(found.clone());
        }

        let tried: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried.join("\n  - ")
        )
        .into())
    }

    /// Loads a `SanitizeConfig` from a YAML file.
    pub fn load(path: &Path) -> Result<SanitizeConfig> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}
