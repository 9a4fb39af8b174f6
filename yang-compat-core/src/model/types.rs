use std::fmt::{self, Display, Formatter};

use super::module::{QName, Status};

/// Namespace used for the qualified names of built-in types.
pub const YANG_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:1";

/// The YANG built-in types every type chain ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Binary,
    Bits,
    Boolean,
    Decimal64,
    Empty,
    Enumeration,
    Identityref,
    InstanceIdentifier,
    Int8,
    Int16,
    Int32,
    Int64,
    Leafref,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Union,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 19] = [
        BuiltinType::Binary,
        BuiltinType::Bits,
        BuiltinType::Boolean,
        BuiltinType::Decimal64,
        BuiltinType::Empty,
        BuiltinType::Enumeration,
        BuiltinType::Identityref,
        BuiltinType::InstanceIdentifier,
        BuiltinType::Int8,
        BuiltinType::Int16,
        BuiltinType::Int32,
        BuiltinType::Int64,
        BuiltinType::Leafref,
        BuiltinType::String,
        BuiltinType::Uint8,
        BuiltinType::Uint16,
        BuiltinType::Uint32,
        BuiltinType::Uint64,
        BuiltinType::Union,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Binary => "binary",
            BuiltinType::Bits => "bits",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Decimal64 => "decimal64",
            BuiltinType::Empty => "empty",
            BuiltinType::Enumeration => "enumeration",
            BuiltinType::Identityref => "identityref",
            BuiltinType::InstanceIdentifier => "instance-identifier",
            BuiltinType::Int8 => "int8",
            BuiltinType::Int16 => "int16",
            BuiltinType::Int32 => "int32",
            BuiltinType::Int64 => "int64",
            BuiltinType::Leafref => "leafref",
            BuiltinType::String => "string",
            BuiltinType::Uint8 => "uint8",
            BuiltinType::Uint16 => "uint16",
            BuiltinType::Uint32 => "uint32",
            BuiltinType::Uint64 => "uint64",
            BuiltinType::Union => "union",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Value space of the integer types.
    pub fn integer_bounds(self) -> Option<Interval> {
        let (min, max): (i128, i128) = match self {
            BuiltinType::Int8 => (i8::MIN.into(), i8::MAX.into()),
            BuiltinType::Int16 => (i16::MIN.into(), i16::MAX.into()),
            BuiltinType::Int32 => (i32::MIN.into(), i32::MAX.into()),
            BuiltinType::Int64 => (i64::MIN.into(), i64::MAX.into()),
            BuiltinType::Uint8 => (0, u8::MAX.into()),
            BuiltinType::Uint16 => (0, u16::MAX.into()),
            BuiltinType::Uint32 => (0, u32::MAX.into()),
            BuiltinType::Uint64 => (0, u64::MAX.into()),
            _ => return None,
        };
        Some(Interval::new(min, max))
    }
}

impl Display for BuiltinType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed interval of integers. Decimal64 values are stored scaled by
/// their fraction-digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub min: i128,
    pub max: i128,
}

impl Interval {
    pub fn new(min: i128, max: i128) -> Self {
        Self { min, max }
    }

    pub fn single(value: i128) -> Self {
        Self::new(value, value)
    }
}

fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|interval| (interval.min, interval.max));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.min <= last.max.saturating_add(1) => {
                last.max = last.max.max(interval.max);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Whether every value of `inner` lies inside the union of `outer`.
fn intervals_cover(outer: &[Interval], inner: &[Interval]) -> bool {
    let merged = merge_intervals(outer);
    inner.iter().all(|needle| {
        merged
            .iter()
            .any(|hay| hay.min <= needle.min && needle.max <= hay.max)
    })
}

fn write_intervals(
    f: &mut Formatter<'_>,
    intervals: &[Interval],
    render: impl Fn(i128) -> String,
) -> fmt::Result {
    let rendered: Vec<String> = intervals
        .iter()
        .map(|interval| {
            if interval.min == interval.max {
                render(interval.min)
            } else {
                format!("{}..{}", render(interval.min), render(interval.max))
            }
        })
        .collect();
    write!(f, "[{}]", rendered.join(" | "))
}

/// Effective `length` restriction of a string or binary type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LengthConstraint {
    pub intervals: Vec<Interval>,
}

impl LengthConstraint {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    /// The implicit length of an unrestricted string: `0..18446744073709551615`.
    pub fn unrestricted() -> Self {
        Self::new(vec![Interval::new(0, u64::MAX.into())])
    }

    pub fn is_unrestricted(&self) -> bool {
        merge_intervals(&self.intervals) == Self::unrestricted().intervals
    }

    pub fn is_superset_of(&self, other: &LengthConstraint) -> bool {
        intervals_cover(&self.intervals, &other.intervals)
    }
}

impl Display for LengthConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_intervals(f, &self.intervals, |value| value.to_string())
    }
}

/// Effective `range` restriction of an integer or decimal64 type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeConstraint {
    pub intervals: Vec<Interval>,
    /// Number of implied decimal places; zero for integer types.
    pub fraction_digits: u8,
}

impl RangeConstraint {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self {
            intervals,
            fraction_digits: 0,
        }
    }

    pub fn decimal(intervals: Vec<Interval>, fraction_digits: u8) -> Self {
        Self {
            intervals,
            fraction_digits,
        }
    }

    fn rescaled(&self, fraction_digits: u8) -> Vec<Interval> {
        let factor = 10_i128.pow(u32::from(fraction_digits.saturating_sub(self.fraction_digits)));
        self.intervals
            .iter()
            .map(|interval| {
                Interval::new(
                    interval.min.saturating_mul(factor),
                    interval.max.saturating_mul(factor),
                )
            })
            .collect()
    }

    pub fn is_superset_of(&self, other: &RangeConstraint) -> bool {
        let digits = self.fraction_digits.max(other.fraction_digits);
        intervals_cover(&self.rescaled(digits), &other.rescaled(digits))
    }
}

impl Display for RangeConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let digits = self.fraction_digits;
        write_intervals(f, &self.intervals, |value| format_scaled(value, digits))
    }
}

/// Render a scaled integer with `digits` implied decimal places.
pub fn format_scaled(value: i128, digits: u8) -> String {
    if digits == 0 {
        return value.to_string();
    }
    let factor = 10_i128.pow(u32::from(digits));
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let factor = factor.unsigned_abs();
    format!(
        "{sign}{}.{:0width$}",
        abs / factor,
        abs % factor,
        width = usize::from(digits)
    )
}

/// A `pattern` restriction with its substatements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternConstraint {
    pub regex: String,
    pub invert_match: bool,
    pub error_message: Option<String>,
    pub error_app_tag: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl PatternConstraint {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            invert_match: false,
            error_message: None,
            error_app_tag: None,
            description: None,
            reference: None,
        }
    }
}

impl Display for PatternConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.invert_match {
            write!(f, "!'{}'", self.regex)
        } else {
            write!(f, "'{}'", self.regex)
        }
    }
}

/// One `enum` of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumPair {
    pub name: String,
    pub value: i32,
    pub status: Status,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl EnumPair {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
            status: Status::Current,
            description: None,
            reference: None,
        }
    }

    /// Two enums denote the same value when name and value agree.
    pub fn same_value(&self, other: &EnumPair) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl Display for EnumPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// One `bit` of a bits type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bit {
    pub name: String,
    pub position: u32,
    pub reference: Option<String>,
}

impl Bit {
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            position,
            reference: None,
        }
    }

    pub fn same_bit(&self, other: &Bit) -> bool {
        self.name == other.name && self.position == other.position
    }
}

impl Display for Bit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.position)
    }
}

/// Effective facets of a type, by built-in kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRestrictions {
    None,
    Binary {
        length: Option<LengthConstraint>,
    },
    String {
        length: Option<LengthConstraint>,
        patterns: Vec<PatternConstraint>,
    },
    Numeric {
        range: Option<RangeConstraint>,
    },
    Enumeration(Vec<EnumPair>),
    Bits(Vec<Bit>),
    Identityref {
        bases: Vec<QName>,
    },
    Union(Vec<TypeDef>),
}

impl TypeRestrictions {
    fn for_builtin(builtin: BuiltinType) -> Self {
        match builtin {
            BuiltinType::Binary => TypeRestrictions::Binary { length: None },
            BuiltinType::String => TypeRestrictions::String {
                length: None,
                patterns: Vec::new(),
            },
            BuiltinType::Decimal64 => TypeRestrictions::Numeric { range: None },
            BuiltinType::Enumeration => TypeRestrictions::Enumeration(Vec::new()),
            BuiltinType::Bits => TypeRestrictions::Bits(Vec::new()),
            BuiltinType::Identityref => TypeRestrictions::Identityref { bases: Vec::new() },
            BuiltinType::Union => TypeRestrictions::Union(Vec::new()),
            other => match other.integer_bounds() {
                Some(bounds) => TypeRestrictions::Numeric {
                    range: Some(RangeConstraint::new(vec![bounds])),
                },
                None => TypeRestrictions::None,
            },
        }
    }
}

/// A type: either a built-in root or a restriction of a base type.
///
/// Facets are effective values: a derived type carries whatever it inherits
/// from its base unless it restricts them itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub qname: QName,
    pub base_type: Option<Box<TypeDef>>,
    pub default_value: Option<String>,
    pub units: Option<String>,
    pub status: Status,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub restrictions: TypeRestrictions,
}

impl TypeDef {
    pub fn builtin(builtin: BuiltinType) -> Self {
        Self {
            qname: QName::new(YANG_NAMESPACE, builtin.name()),
            base_type: None,
            default_value: None,
            units: None,
            status: Status::Current,
            description: None,
            reference: None,
            restrictions: TypeRestrictions::for_builtin(builtin),
        }
    }

    /// A new type named `qname` deriving from `base` and inheriting its
    /// facets, default and units.
    pub fn derived(qname: QName, base: TypeDef) -> Self {
        Self {
            qname,
            default_value: base.default_value.clone(),
            units: base.units.clone(),
            status: Status::Current,
            description: None,
            reference: None,
            restrictions: base.restrictions.clone(),
            base_type: Some(Box::new(base)),
        }
    }

    /// The built-in type at the end of the base chain.
    pub fn root(&self) -> &TypeDef {
        let mut current = self;
        while let Some(base) = current.base_type.as_deref() {
            current = base;
        }
        current
    }

    /// Local name of the built-in root type, e.g. `string`.
    pub fn builtin_name(&self) -> &str {
        &self.root().qname.local_name
    }

    pub fn builtin_kind(&self) -> Option<BuiltinType> {
        BuiltinType::from_name(self.builtin_name())
    }

    pub fn length(&self) -> Option<&LengthConstraint> {
        match &self.restrictions {
            TypeRestrictions::Binary { length } | TypeRestrictions::String { length, .. } => {
                length.as_ref()
            }
            _ => None,
        }
    }

    pub fn range(&self) -> Option<&RangeConstraint> {
        match &self.restrictions {
            TypeRestrictions::Numeric { range } => range.as_ref(),
            _ => None,
        }
    }

    pub fn patterns(&self) -> &[PatternConstraint] {
        match &self.restrictions {
            TypeRestrictions::String { patterns, .. } => patterns,
            _ => &[],
        }
    }

    pub fn enums(&self) -> &[EnumPair] {
        match &self.restrictions {
            TypeRestrictions::Enumeration(enums) => enums,
            _ => &[],
        }
    }

    pub fn bits(&self) -> &[Bit] {
        match &self.restrictions {
            TypeRestrictions::Bits(bits) => bits,
            _ => &[],
        }
    }

    pub fn identity_bases(&self) -> Option<&[QName]> {
        match &self.restrictions {
            TypeRestrictions::Identityref { bases } => Some(bases),
            _ => None,
        }
    }
}
