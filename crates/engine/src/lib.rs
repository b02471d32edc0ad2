//! `lexcanon-engine`: lexicon validation and alt-spelling consolidation.
//!
//! Pure engine crate: receives the lexicon text, returns diagnostics or a
//! report of canonical definitions. No CLI or file IO.

pub mod config;
pub mod error;
pub mod grammar;
pub mod graph;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod revision;
pub mod validation;

pub use config::{LexiconPolicy, MisspellingPolicy};
pub use error::{Diagnostic, DiagnosticKind, LexiconError};
pub use model::{Entry, NodeKey, PartOfSpeech, Sense, WordRecord};
pub use pipeline::{run, Lexicon};
pub use render::{Report, ReportRow, ReportSummary};
