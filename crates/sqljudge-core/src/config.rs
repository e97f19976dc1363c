use crate::errors::ConfigError;
use crate::statement::PolicyRules;
use crate::translator::Translator;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Run configuration handed over by the grading platform, plus the
/// exercise-level judging options that may be merged into it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JudgeConfig {
    #[serde(default, deserialize_with = "lenient_number")]
    pub memory_limit: u64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub time_limit: u64,
    #[serde(default)]
    pub programming_language: String,
    #[serde(default = "default_natural_language")]
    pub natural_language: String,
    pub resources: PathBuf,
    pub source: PathBuf,
    #[serde(default)]
    pub judge: Option<PathBuf>,
    pub workdir: PathBuf,

    #[serde(default = "default_max_rows", deserialize_with = "lenient_number")]
    pub max_rows: usize,
    #[serde(default = "default_true")]
    pub semicolon_warning: bool,
    #[serde(default = "default_true")]
    pub strict_identical_order_by: bool,
    #[serde(default = "default_true")]
    pub allow_different_column_order: bool,

    /// Seed files relative to `resources`; takes precedence over `database_dir`.
    #[serde(default)]
    pub database_files: Option<Vec<String>>,
    #[serde(default = "default_database_dir")]
    pub database_dir: String,
    #[serde(default = "default_solution_sql")]
    pub solution_sql: String,
    #[serde(default)]
    pub pragma_startup_queries: Option<String>,

    #[serde(default = "default_forbidden_symbols")]
    pub pre_execution_forbidden_symbolregex: Vec<String>,
    #[serde(default)]
    pub pre_execution_mandatory_symbolregex: Vec<String>,
    #[serde(default)]
    pub pre_execution_forbidden_fullregex: Vec<String>,
    #[serde(default)]
    pub pre_execution_mandatory_fullregex: Vec<String>,
    #[serde(default)]
    pub post_execution_forbidden_symbolregex: Vec<String>,
    #[serde(default)]
    pub post_execution_mandatory_symbolregex: Vec<String>,
    #[serde(default)]
    pub post_execution_forbidden_fullregex: Vec<String>,
    #[serde(default)]
    pub post_execution_mandatory_fullregex: Vec<String>,
}

fn default_natural_language() -> String {
    "en".into()
}
fn default_max_rows() -> usize {
    100
}
fn default_true() -> bool {
    true
}
fn default_database_dir() -> String {
    ".".into()
}
fn default_solution_sql() -> String {
    "./solution.sql".into()
}
fn default_forbidden_symbols() -> Vec<String> {
    vec![
        r#"[\["'`]?sqlite_(temp_)?(master|schema)[\]"'`]?"#.into(),
        "pragma".into(),
    ]
}

/// Accepts `12` as well as `"12"`.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString<T> {
        Number(T),
        String(String),
    }

    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A seed database as it will be used in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFile {
    pub name: String,
    pub path: PathBuf,
}

impl JudgeConfig {
    pub fn translator(&self) -> Translator {
        Translator::from_code(&self.natural_language)
    }

    pub fn pre_execution_rules(&self) -> PolicyRules {
        PolicyRules {
            forbidden_symbol: self.pre_execution_forbidden_symbolregex.clone(),
            mandatory_symbol: self.pre_execution_mandatory_symbolregex.clone(),
            forbidden_full: self.pre_execution_forbidden_fullregex.clone(),
            mandatory_full: self.pre_execution_mandatory_fullregex.clone(),
        }
    }

    pub fn post_execution_rules(&self) -> PolicyRules {
        PolicyRules {
            forbidden_symbol: self.post_execution_forbidden_symbolregex.clone(),
            mandatory_symbol: self.post_execution_mandatory_symbolregex.clone(),
            forbidden_full: self.post_execution_forbidden_fullregex.clone(),
            mandatory_full: self.post_execution_mandatory_fullregex.clone(),
        }
    }

    pub fn solution_path(&self) -> PathBuf {
        self.resources.join(&self.solution_sql)
    }

    /// Seed files from `database_files`, or every `*.sqlite` in
    /// `database_dir` sorted by name.
    pub fn seed_files(&self) -> Result<Vec<SeedFile>, ConfigError> {
        let seeds = match &self.database_files {
            Some(files) => {
                let mut seeds = Vec::with_capacity(files.len());
                for name in files {
                    let path = self.resources.join(name);
                    if !path.exists() {
                        return Err(ConfigError(format!(
                            "Could not find database file: '{}'.",
                            path.display()
                        )));
                    }
                    seeds.push(SeedFile {
                        name: name.clone(),
                        path,
                    });
                }
                seeds
            }
            None => {
                let dir = self.resources.join(&self.database_dir);
                let entries = std::fs::read_dir(&dir).map_err(|_| {
                    ConfigError(format!(
                        "Could not find database directory: '{}'.",
                        dir.display()
                    ))
                })?;

                let names: BTreeSet<String> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| name.ends_with(".sqlite"))
                    .collect();
                names
                    .into_iter()
                    .map(|name| SeedFile {
                        path: dir.join(&name),
                        name,
                    })
                    .collect()
            }
        };

        if seeds.is_empty() {
            return Err(ConfigError(
                "Could not find database files. Make sure that the database directory contains \
                 '*.sqlite' files or a valid 'database_files' option is provided."
                    .into(),
            ));
        }
        Ok(seeds)
    }
}

pub fn parse_config(raw: &str) -> Result<JudgeConfig, ConfigError> {
    let mut ignored_keys = BTreeSet::new();
    let mut deserializer = serde_json::Deserializer::from_str(raw);

    let cfg: JudgeConfig = serde_ignored::deserialize(&mut deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse config JSON: {}", e)))?;
    deserializer
        .end()
        .map_err(|e| ConfigError(format!("failed to parse config JSON: {}", e)))?;

    if !ignored_keys.is_empty() {
        tracing::debug!(event = "judge.config.ignored_keys", keys = ?ignored_keys);
    }

    if cfg.max_rows == 0 {
        return Err(ConfigError("max_rows must be at least 1".into()));
    }

    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<JudgeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw)
}
