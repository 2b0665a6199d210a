//! Interactive-prompt abstraction (Design Note: "Interactive prompts in
//! the core" — `Chooser` is the capability both the CLI and tests provide).

/// One pack's candidacy for an entity the Resolution Engine cannot decide
/// on its own; shown to the operator in the residual phase.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub pack_name: String,
    pub is_base: bool,
    pub is_mod: bool,
}

/// Abstracts the interactive prompts spec.md's source embeds directly in
/// the resolution core. `pick` returns the chosen pack's name; `notify`
/// surfaces an informational message (e.g. a `--!` warning).
pub trait Chooser {
    fn pick(&mut self, entity_name: &str, candidates: &[Candidate]) -> String;
    fn notify(&mut self, message: &str);
}

/// Always picks the first candidate in load order — non-interactive,
/// suitable for `combine --auto` and CI.
#[derive(Debug, Default)]
pub struct AutoChooser {
    pub notifications: Vec<String>,
}

impl Chooser for AutoChooser {
    fn pick(&mut self, _entity_name: &str, candidates: &[Candidate]) -> String {
        candidates[0].pack_name.clone()
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}

/// Replays a fixed script of answers, keyed by entity name; tests supply
/// this instead of a human (Design Note).
#[derive(Debug, Default)]
pub struct ScriptedChooser {
    pub answers: std::collections::HashMap<String, String>,
    pub notifications: Vec<String>,
}

impl Chooser for ScriptedChooser {
    fn pick(&mut self, entity_name: &str, candidates: &[Candidate]) -> String {
        self.answers
            .get(entity_name)
            .cloned()
            .unwrap_or_else(|| candidates[0].pack_name.clone())
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
