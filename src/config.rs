use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use encoding_rs::Encoding;
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{CatalogHeader, resolve_encoding},
    core::rules::{AnnotationRule, MethodRule, RuleError, RuleRegistry},
};

pub const CONFIG_FILE_NAME: &str = ".glotpotrc.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_remove_unused")]
    pub remove_unused: bool,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<MethodRule>,
    #[serde(default)]
    pub annotations: Vec<AnnotationRule>,
    #[serde(default = "default_header_comments")]
    pub header_comments: Vec<String>,
    #[serde(default = "default_header_fields")]
    pub header_fields: Vec<String>,
}

fn default_includes() -> Vec<String> {
    vec!["src/main/java".to_string()]
}

fn default_output() -> String {
    "src/main/po/keys.pot".to_string()
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_remove_unused() -> bool {
    true
}

/// The gettext-commons `I18n` methods.
fn default_keywords() -> Vec<MethodRule> {
    vec![
        MethodRule::new("tr", 0, None),
        MethodRule::new("marktr", 0, None),
        MethodRule::new("trc", 1, None),
        MethodRule::new("trn", 0, Some(1)),
        MethodRule::new("trnc", 1, Some(2)),
    ]
}

fn default_header_comments() -> Vec<String> {
    [
        "SOME DESCRIPTIVE TITLE.",
        "Copyright (C) YEAR THE PACKAGE'S COPYRIGHT HOLDER",
        "This file is distributed under the same license as the PACKAGE package.",
        "FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.",
        "",
    ]
    .map(String::from)
    .to_vec()
}

fn default_header_fields() -> Vec<String> {
    [
        "Project-Id-Version: PACKAGE VERSION",
        "MIME-Version: 1.0",
        "Plural-Forms: nplurals=INTEGER; plural=EXPRESSION;",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            ignores: Vec::new(),
            output: default_output(),
            encoding: default_encoding(),
            remove_unused: default_remove_unused(),
            keywords: default_keywords(),
            annotations: Vec::new(),
            header_comments: default_header_comments(),
            header_fields: default_header_fields(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns, an unknown encoding label,
    /// a malformed header field or an invalid extraction rule.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.output.trim().is_empty() {
            bail!("'output' must not be empty");
        }

        self.encoding()
            .with_context(|| format!("Invalid 'encoding': \"{}\"", self.encoding))?;

        for field in &self.header_fields {
            let valid = field
                .split_once(':')
                .is_some_and(|(name, _)| !name.trim().is_empty());
            if !valid || field.contains('\n') {
                bail!(
                    "Invalid entry in 'headerFields': \"{}\" (expected \"Name: value\")",
                    field
                );
            }
        }

        self.registry().context("Invalid extraction rules")?;

        Ok(())
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        Ok(resolve_encoding(&self.encoding)?)
    }

    pub fn registry(&self) -> std::result::Result<RuleRegistry, RuleError> {
        RuleRegistry::new(
            self.keywords.iter().cloned(),
            self.annotations.iter().cloned(),
        )
    }

    pub fn header(&self) -> CatalogHeader {
        CatalogHeader {
            comments: self.header_comments.clone(),
            fields: self.header_fields.clone(),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir
        .canonicalize()
        .unwrap_or_else(|_| start_dir.to_path_buf());

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Where the config was read from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config
                .validate()
                .with_context(|| format!("Invalid config file: {:?}", path))?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
