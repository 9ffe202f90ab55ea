//! Classification domain - external classifier call plus deterministic
//! post-processing of its score and priority.

pub mod classifier;
pub mod prompts;
pub mod rules;
pub mod schema;

pub use classifier::{Classified, EventClassifier};
pub use rules::{RuleHit, ScoringRules};
pub use schema::{EventAnalysis, EventDraft, Priority};
