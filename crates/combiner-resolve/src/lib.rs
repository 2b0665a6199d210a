//! CHOOSE/MERGE resolution engine: decides, per entity, which pack's
//! contributions survive into the exported pack (spec §4.11–§4.12).

pub mod choose;
pub mod chooser;
pub mod merge;

pub use choose::{ChoiceOutcome, CompStamp};
pub use chooser::{AutoChooser, Candidate, Chooser, ScriptedChooser};
