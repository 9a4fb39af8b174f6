//! Backward-compatibility checking for YANG modules.
//!
//! [`yin::ModuleLoader`] turns YIN documents into resolved [`model::ModuleModel`]s,
//! [`check::validate`] compares an old and a new revision of a module and
//! collects every rule violation into a [`check::FindingCatalog`], and
//! [`format`] renders that catalog for people or machines.

pub mod check;
pub mod format;
pub mod model;
pub mod parser;
pub mod tree;
pub mod yin;

pub use check::{validate, Finding, FindingCatalog, FindingKind, RfcVersion, Severity};
pub use format::{format_json, format_report, format_summary};
pub use model::ModuleModel;
pub use parser::{parse, parse_file, ParseError};
pub use tree::XmlNode;
pub use yin::{LoadError, ModuleLoader};
