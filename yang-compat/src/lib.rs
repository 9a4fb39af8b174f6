//! Command-line front end for `yang-compat-core`: settings files and
//! terminal rendering of the compatibility report.

pub mod config;
pub mod report;
