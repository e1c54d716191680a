//! Rule files compiled into the binary.

use crate::config::patch_config::PatchConfig;
use crate::utils::error::{PatchError, Result};

#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub summary: &'static str,
    source: &'static str,
}

impl Preset {
    pub fn load(&self) -> Result<PatchConfig> {
        PatchConfig::from_toml_str(self.source)
    }
}

const PRESETS: &[Preset] = &[Preset {
    name: "legal-pulse-tabs",
    summary: "Remove the risks, recommendations and history tabs from LegalPulse.tsx",
    source: include_str!("../../presets/legal-pulse-tabs.toml"),
}];

pub fn all() -> &'static [Preset] {
    PRESETS
}

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

pub fn load(name: &str) -> Result<PatchConfig> {
    let preset = find(name).ok_or_else(|| PatchError::InvalidConfigValueError {
        field: "--preset".to_string(),
        value: name.to_string(),
        reason: format!(
            "Unknown preset. Available presets: {}",
            PRESETS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
        ),
    })?;
    preset.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;

    #[test]
    fn test_every_preset_is_valid() {
        for preset in all() {
            let config = preset.load().unwrap();
            config.validate().unwrap();
            assert_eq!(config.patch.name, preset.name);
        }
    }

    #[test]
    fn test_unknown_preset() {
        let err = load("no-such-preset").unwrap_err();
        assert!(err.to_string().contains("legal-pulse-tabs"));
    }

    #[test]
    fn test_legal_pulse_rule_order() {
        let config = load("legal-pulse-tabs").unwrap();
        let names: Vec<_> = config.rules.iter().map(|r| r.name()).collect();
        assert_eq!(names.first(), Some(&"narrow-tab-union"));
        assert_eq!(names.len(), 9);
    }
}
