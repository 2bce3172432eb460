//! Intent core - classification of natural-language product requests
//!
//! Routes free-form messages to one of five product tools (create, update,
//! delete, get, list) plus typed arguments, via two independent paths: a
//! corpus-trained probabilistic classifier and a rule-based joint
//! intent/slot classifier. Both share one slot extraction engine and one
//! result assembler.

pub mod assembler;
pub mod classifier;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod model;
pub mod persistence;
pub mod rules;
pub mod similarity;
pub mod slots;
pub mod trainer;
pub mod types;

pub use assembler::{response_message, to_value};
pub use classifier::CorpusClassifier;
pub use corpus::{CorpusSource, CsvCorpusDir};
pub use engine::ClassifierEngine;
pub use error::{Error, Result};
pub use model::TextModel;
pub use persistence::{JsonModelStore, ModelStore, StoredModel};
pub use rules::RuleClassifier;
pub use slots::{SlotExtractor, SlotName};
pub use trainer::{ClassifierTrainer, TrainingStats};
pub use types::{
    ClassificationResult, CreateArgs, DeleteArgs, GetArgs, IntentResult, ListArgs, QueryPattern,
    Slot, ToolArgs, ToolId, UpdateArgs,
};
