//! Persisted runtime settings (spec §7).
//!
//! Load order: `<workdir>/combiner.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolution engine mode (spec §4.11, §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpMode {
    Choose,
    Merge,
}

impl Default for OpMode {
    fn default() -> Self {
        OpMode::Merge
    }
}

/// Persisted settings, runtime-mutable via the settings subcommand (spec §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub op_mode: OpMode,
    pub pokedex_fix: bool,
    pub exclude_pseudoforms: bool,
    pub process_mods: bool,
    pub combine_pokemon_moves: bool,
    pub keep_duplicate_sas_on_move: bool,
    pub keep_duplicate_spawns_on_move: bool,
    pub species_strict_key_match: bool,
    pub show_warnings: bool,
    pub show_helper_text: bool,
    pub auto_start: bool,
    pub auto_load_order_mode: bool,
    pub alternate_icon: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            op_mode: OpMode::default(),
            pokedex_fix: false,
            exclude_pseudoforms: false,
            process_mods: false,
            combine_pokemon_moves: true,
            keep_duplicate_sas_on_move: false,
            keep_duplicate_spawns_on_move: false,
            species_strict_key_match: false,
            show_warnings: true,
            show_helper_text: true,
            auto_start: false,
            auto_load_order_mode: false,
            alternate_icon: false,
        }
    }
}

/// Helper to parse a `"true"`/`"false"`/numeric env var and apply it.
fn env_override_bool(var: &str, target: &mut bool) {
    if let Ok(v) = std::env::var(var) {
        match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => *target = true,
            "0" | "false" | "no" => *target = false,
            _ => {}
        }
    }
}

impl Settings {
    /// Load settings from `<workdir>/combiner.toml`, applying env-var
    /// overrides and falling back to defaults when no file exists.
    pub fn load(workdir: &Path) -> Result<Self> {
        let config_path = workdir.join("combiner.toml");

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(mode) = std::env::var("COMBINER_OP_MODE") {
            match mode.to_ascii_uppercase().as_str() {
                "CHOOSE" => settings.op_mode = OpMode::Choose,
                "MERGE" => settings.op_mode = OpMode::Merge,
                _ => {}
            }
        }
        env_override_bool("COMBINER_POKEDEX_FIX", &mut settings.pokedex_fix);
        env_override_bool(
            "COMBINER_EXCLUDE_PSEUDOFORMS",
            &mut settings.exclude_pseudoforms,
        );
        env_override_bool("COMBINER_PROCESS_MODS", &mut settings.process_mods);
        env_override_bool(
            "COMBINER_COMBINE_POKEMON_MOVES",
            &mut settings.combine_pokemon_moves,
        );
        env_override_bool(
            "COMBINER_KEEP_DUPLICATE_SAS_ON_MOVE",
            &mut settings.keep_duplicate_sas_on_move,
        );
        env_override_bool(
            "COMBINER_KEEP_DUPLICATE_SPAWNS_ON_MOVE",
            &mut settings.keep_duplicate_spawns_on_move,
        );
        env_override_bool(
            "COMBINER_SPECIES_STRICT_KEY_MATCH",
            &mut settings.species_strict_key_match,
        );
        env_override_bool("COMBINER_SHOW_WARNINGS", &mut settings.show_warnings);
        env_override_bool("COMBINER_SHOW_HELPER_TEXT", &mut settings.show_helper_text);
        env_override_bool("COMBINER_AUTO_START", &mut settings.auto_start);
        env_override_bool(
            "COMBINER_AUTO_LOAD_ORDER_MODE",
            &mut settings.auto_load_order_mode,
        );
        env_override_bool("COMBINER_ALTERNATE_ICON", &mut settings.alternate_icon);

        settings.apply_dependency_rules();
        Ok(settings)
    }

    pub fn save(&self, workdir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(workdir.join("combiner.toml"), content)?;
        Ok(())
    }

    /// Enforce the two dependency rules from spec §7: `exclude_pseudoforms`
    /// requires `pokedex_fix`; the `keep_duplicate_*_on_move` flags are only
    /// effective in CHOOSE mode. Rather than reject an inconsistent file,
    /// silently normalize it — the settings menu always leaves a consistent
    /// state, so an inconsistency can only arrive via a hand-edited file.
    pub fn apply_dependency_rules(&mut self) {
        if !self.pokedex_fix {
            self.exclude_pseudoforms = false;
        }
        if self.op_mode != OpMode::Choose {
            self.keep_duplicate_sas_on_move = false;
            self.keep_duplicate_spawns_on_move = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_spec_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.op_mode, OpMode::Merge);
        assert!(!settings.pokedex_fix);
        assert!(settings.show_warnings);
    }

    #[test]
    fn load_nonexistent_falls_back_to_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(settings.op_mode, OpMode::Merge);
    }

    #[test]
    fn load_from_toml_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("combiner.toml"),
            r#"
op_mode = "CHOOSE"
pokedex_fix = true
exclude_pseudoforms = true
"#,
        )
        .unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.op_mode, OpMode::Choose);
        assert!(settings.pokedex_fix);
        assert!(settings.exclude_pseudoforms);
    }

    #[test]
    fn dependency_rule_clears_exclude_pseudoforms_without_pokedex_fix() {
        let mut settings = Settings {
            pokedex_fix: false,
            exclude_pseudoforms: true,
            ..Settings::default()
        };
        settings.apply_dependency_rules();
        assert!(!settings.exclude_pseudoforms);
    }

    #[test]
    fn dependency_rule_clears_keep_duplicate_flags_outside_choose_mode() {
        let mut settings = Settings {
            op_mode: OpMode::Merge,
            keep_duplicate_sas_on_move: true,
            keep_duplicate_spawns_on_move: true,
            ..Settings::default()
        };
        settings.apply_dependency_rules();
        assert!(!settings.keep_duplicate_sas_on_move);
        assert!(!settings.keep_duplicate_spawns_on_move);
    }

    #[test]
    fn env_override_applies_on_top_of_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("COMBINER_OP_MODE", "CHOOSE");
        let settings = Settings::load(tmp.path()).unwrap();
        std::env::remove_var("COMBINER_OP_MODE");
        assert_eq!(settings.op_mode, OpMode::Choose);
    }
}
