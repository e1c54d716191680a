use crate::core::block_rule::BlockRule;
use crate::core::patcher::RuleSet;
use crate::core::regex_rule::{compile_pattern, Occurrences, PatternFlags, RegexRule};
use crate::core::ConfigProvider;
use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchConfig {
    pub patch: PatchInfo,
    pub target: TargetConfig,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    pub strict: Option<bool>,
    pub backup: Option<bool>,
    pub warn_on_no_match: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDefinition {
    Regex(RegexRuleConfig),
    Block(BlockRuleConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexRuleConfig {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub occurrences: Occurrences,
    pub dot_matches_newline: Option<bool>,
    pub case_insensitive: Option<bool>,
    pub literal_replacement: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockRuleConfig {
    pub name: String,
    pub open: String,
    pub close: String,
    pub contains: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub occurrences: Occurrences,
    pub trim_line: Option<bool>,
}

impl RuleDefinition {
    pub fn name(&self) -> &str {
        match self {
            RuleDefinition::Regex(rule) => &rule.name,
            RuleDefinition::Block(rule) => &rule.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuleDefinition::Regex(_) => "regex",
            RuleDefinition::Block(_) => "block",
        }
    }

    fn validate_fields(&self, index: usize) -> Result<()> {
        let field = |name: &str| format!("rules[{}].{}", index, name);
        validation::validate_non_empty_string(&field("name"), self.name())?;

        match self {
            RuleDefinition::Regex(rule) => {
                validation::validate_non_empty_string(&field("pattern"), &rule.pattern)?;
            }
            RuleDefinition::Block(rule) => {
                validation::validate_non_empty_string(&field("open"), &rule.open)?;
                validation::validate_non_empty_string(&field("close"), &rule.close)?;
                validation::validate_non_empty_string(&field("contains"), &rule.contains)?;
                if rule.open == rule.close {
                    return Err(PatchError::InvalidConfigValueError {
                        field: field("close"),
                        value: rule.close.clone(),
                        reason: "Closing marker must differ from the opening marker".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn compile_into(&self, rules: &mut RuleSet) -> Result<()> {
        match self {
            RuleDefinition::Regex(rule) => {
                let flags = PatternFlags {
                    dot_matches_newline: rule.dot_matches_newline.unwrap_or(true),
                    case_insensitive: rule.case_insensitive.unwrap_or(false),
                };
                let regex = compile_pattern(&rule.name, &rule.pattern, flags)?;
                rules.push(
                    RegexRule::new(&rule.name, regex, &rule.replacement)
                        .with_occurrences(rule.occurrences)
                        .with_literal_replacement(rule.literal_replacement.unwrap_or(false)),
                );
            }
            RuleDefinition::Block(rule) => {
                let contains = compile_pattern(&rule.name, &rule.contains, PatternFlags::default())?;
                rules.push(
                    BlockRule::new(&rule.name, &rule.open, &rule.close, contains)
                        .with_replacement(&rule.replacement)
                        .with_occurrences(rule.occurrences)
                        .with_trim_line(rule.trim_line.unwrap_or(true)),
                );
            }
        }
        Ok(())
    }
}

impl PatchConfig {
    /// 從 TOML 檔案載入規則設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PatchError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析規則設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: PatchConfig =
            toml::from_str(content).map_err(|e| PatchError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        // 只替換目標路徑中的環境變數；規則內容常含有 `${...}` 模板字串
        config.target.path = Self::substitute_env_vars(&config.target.path)?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${PROJECT_ROOT} 或 ${PROJECT_ROOT:-.})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").map_err(|e| {
            PatchError::ConfigError {
                message: format!("Invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match (std::env::var(var_name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => caps[0].to_string(),
            }
        });

        Ok(result.into_owned())
    }

    pub fn set_target(&mut self, path: impl AsRef<Path>) {
        self.target.path = path.as_ref().to_string_lossy().into_owned();
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("patch.name", &self.patch.name)?;
        validation::validate_path("target.path", &self.target.path)?;
        validation::validate_non_empty_list("rules", &self.rules)?;

        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate_fields(index)?;
        }
        validation::validate_unique_names("rules.name", self.rules.iter().map(|r| r.name()))?;

        Ok(())
    }

    /// Compiles the rule definitions in file order.
    pub fn compile_rules(&self) -> Result<RuleSet> {
        let mut rules = RuleSet::new();
        for definition in &self.rules {
            definition.compile_into(&mut rules)?;
        }
        Ok(rules)
    }
}

impl ConfigProvider for PatchConfig {
    fn target_path(&self) -> &Path {
        Path::new(&self.target.path)
    }

    fn strict(&self) -> bool {
        self.options.strict.unwrap_or(false)
    }

    fn backup_enabled(&self) -> bool {
        self.options.backup.unwrap_or(false)
    }

    fn warn_on_no_match(&self) -> bool {
        self.options.warn_on_no_match.unwrap_or(true)
    }
}

impl Validate for PatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()?;
        // 先編譯一次，讓壞掉的正規表示式在載入檔案前就被回報
        self.compile_rules().map(|_| ())
    }
}
