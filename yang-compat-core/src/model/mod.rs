//! Resolved YANG schema model.
//!
//! These types describe a module after all groupings, typedef chains and
//! imports have been resolved. They are produced by [`crate::yin`] (or any
//! other provider) and are read-only input to [`crate::check::validate`].

pub mod module;
pub mod node;
pub mod path;
pub mod types;

pub use module::{
    find_by_local_name, Augmentation, Identity, InvalidRevision, ModuleModel, QName, Revision,
    Status,
};
pub use node::{ElementCountConstraint, MustConstraint, NodeKind, SchemaNode};
pub use path::{PathSegment, SchemaPath};
pub use types::{
    format_scaled, Bit, BuiltinType, EnumPair, Interval, LengthConstraint, PatternConstraint,
    RangeConstraint, TypeDef, TypeRestrictions, YANG_NAMESPACE,
};
