//! Backward-compatibility checking of two module revisions.

pub mod engine;
pub mod finding;
pub mod path;

pub use engine::{validate, RfcVersion, UnknownRfcVersion};
pub use finding::{Finding, FindingCatalog, FindingKind, ReportEntry, Severity};
pub use path::PathTracker;
