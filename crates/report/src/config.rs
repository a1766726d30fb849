use anyhow::{Context, Result, bail};
use extract::Dialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub subjects: Vec<SubjectConfig>,
    pub parsing: ParsingConfig,
    pub resolution: ResolutionConfig,
    pub export: ExportConfig,
}

/// One food subject and the response table produced for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectConfig {
    pub name: String,
    /// Substrings that mark a mapping key as this subject.
    pub synonyms: Vec<String>,
    pub responses: PathBuf,
    /// Response column to parse.
    #[serde(default = "default_prompt_variant")]
    pub prompt_variant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParsingConfig {
    /// Marker order; the first one present in a response wins.
    pub dialects: Vec<Dialect>,
    pub nested_group_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolutionConfig {
    pub abbreviation_window: usize,
    pub id_namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: String,
    pub output_dir: PathBuf,
}

fn default_prompt_variant() -> String {
    "step_by_step_prompt".to_string()
}

impl SubjectConfig {
    fn new(name: &str, synonyms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            responses: PathBuf::from(format!("data/llm_outputs_{}.csv", name)),
            prompt_variant: default_prompt_variant(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            subjects: vec![
                SubjectConfig::new(
                    "dairy",
                    &[
                        "dairy",
                        "dairy product",
                        "dairy products",
                        "dairy food product",
                        "dairy food products",
                    ],
                ),
                SubjectConfig::new("maize", &["maize", "corn"]),
                SubjectConfig::new("salmon", &["salmon"]),
                SubjectConfig::new(
                    "leafy_greens",
                    &["leafy green", "leafy greens", "leafy vegetable", "leafy vegetables"],
                ),
                SubjectConfig::new("shellfish", &["shellfish"]),
            ],
            parsing: ParsingConfig::default(),
            resolution: ResolutionConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            dialects: vec![
                Dialect::DictionaryHeader,
                Dialect::Fenced,
                Dialect::BareLiteral,
            ],
            nested_group_cap: extract::fallback::DEFAULT_NESTED_GROUP_CAP,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            abbreviation_window: extract::abbreviation::DEFAULT_WINDOW,
            id_namespace: extract::lexicon::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: "|".to_string(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl AppConfig {
    /// Defaults when `path` is `None`; otherwise the JSON file, with
    /// omitted sections taking their defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read config: {:?}", path))?;
                Self::from_json(&content).with_context(|| format!("Invalid config: {:?}", path))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config JSON")
    }

    pub fn validate(&self) -> Result<()> {
        if self.subjects.is_empty() {
            bail!("No subjects configured");
        }
        for subject in &self.subjects {
            if subject.name.trim().is_empty() {
                bail!("Subject with empty name");
            }
            if subject.synonyms.iter().all(|s| s.trim().is_empty()) {
                bail!("Subject '{}' has no synonyms", subject.name);
            }
            if subject.prompt_variant.trim().is_empty() {
                bail!("Subject '{}' has no prompt variant", subject.name);
            }
        }
        if self.parsing.dialects.is_empty() {
            bail!("No dialects enabled");
        }
        if self.parsing.nested_group_cap == 0 {
            bail!("nested_group_cap must be at least 1");
        }
        if self.resolution.abbreviation_window == 0 {
            bail!("abbreviation_window must be at least 1");
        }
        if self.export.delimiter.is_empty() {
            bail!("Export delimiter must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.subjects.len(), 5);
        assert_eq!(config.parsing.nested_group_cap, 64);
        assert_eq!(config.resolution.abbreviation_window, 6);
        assert_eq!(config.resolution.id_namespace, "CHEBI");
        assert_eq!(config.export.delimiter, "|");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "subjects": [{"name": "rice", "synonyms": ["rice"], "responses": "rice.csv"}],
                "parsing": {"dialects": ["fenced", "dictionary_header"]}
            }"#,
        )
        .unwrap();
        assert_eq!(config.subjects[0].prompt_variant, "step_by_step_prompt");
        assert_eq!(config.parsing.dialects, vec![Dialect::Fenced, Dialect::DictionaryHeader]);
        assert_eq!(config.parsing.nested_group_cap, 64);
        assert_eq!(config.export.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.resolution.abbreviation_window = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.parsing.nested_group_cap = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.subjects[1].synonyms = vec![" ".to_string()];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.subjects[0].name.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_dialect_is_rejected() {
        assert!(AppConfig::from_json(r#"{"parsing": {"dialects": ["yaml"]}}"#).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export": {"delimiter": ";", "output_dir": "out"}}"#).unwrap();

        let config = AppConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.export.delimiter, ";");
        assert_eq!(config.subjects.len(), 5);

        assert!(AppConfig::load(Some(&dir.path().join("absent.json"))).await.is_err());
    }
}
