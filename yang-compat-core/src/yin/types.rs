use tracing::trace;

use super::resolve::{
    description_of, invalid, reference_of, required_attr, status_of, Resolver, Scope,
};
use super::LoadError;
use crate::model::{
    Bit, BuiltinType, EnumPair, Interval, LengthConstraint, PatternConstraint, QName,
    RangeConstraint, TypeDef, TypeRestrictions,
};
use crate::tree::XmlNode;

/// Substatements of `type` that restrict or complete the referenced type.
const RESTRICTIONS: [&str; 8] = [
    "length",
    "pattern",
    "range",
    "fraction-digits",
    "enum",
    "bit",
    "base",
    "type",
];

impl<'a> Resolver<'a> {
    /// Resolve a `type` statement to its effective type.
    pub fn resolve_type(&self, type_stmt: &'a XmlNode, scope: &Scope<'a>) -> Result<TypeDef, LoadError> {
        let name = required_attr(type_stmt, "name", scope.module_name())?;
        let base = match BuiltinType::from_name(name.trim()) {
            Some(builtin) => TypeDef::builtin(builtin),
            None => {
                let (stmt, def_scope) = self
                    .find_definition("typedef", name, scope)?
                    .ok_or_else(|| LoadError::UnresolvedType {
                        module: scope.module_name().to_string(),
                        name: name.to_string(),
                    })?;
                self.build_typedef(stmt, def_scope.deeper(name)?)?
            }
        };

        let restricted = type_stmt
            .children
            .iter()
            .any(|child| RESTRICTIONS.contains(&child.tag.as_str()));
        let resolved = if restricted {
            trace!(type_name = name, "applying inline restrictions");
            let qname = base.qname.clone();
            let (status, description, reference) =
                (base.status, base.description.clone(), base.reference.clone());
            let mut derived = TypeDef::derived(qname, base);
            derived.status = status;
            derived.description = description;
            derived.reference = reference;
            self.restrict(&mut derived, type_stmt, scope)?;
            derived
        } else {
            base
        };

        if resolved.identity_bases().is_some_and(<[_]>::is_empty) {
            return Err(LoadError::MissingStatement {
                module: scope.module_name().to_string(),
                statement: "base (in identityref type)".to_string(),
            });
        }
        Ok(resolved)
    }

    /// Build a `typedef` statement. `scope` is the scope the typedef is
    /// declared in.
    pub fn build_typedef(&self, stmt: &'a XmlNode, scope: Scope<'a>) -> Result<TypeDef, LoadError> {
        let module = scope.module_name();
        let name = required_attr(stmt, "name", module)?;
        let type_stmt = stmt
            .get_child("type")
            .ok_or_else(|| LoadError::MissingStatement {
                module: module.to_string(),
                statement: format!("type (in typedef {name})"),
            })?;
        let inner = self.resolve_type(type_stmt, &scope)?;

        let qname = QName::new(scope.source.namespace.clone(), name).with_revision(scope.source.revision);
        let mut typedef = TypeDef::derived(qname, inner);
        if let Some(default) = stmt.child_attr("default", "value") {
            typedef.default_value = Some(default.to_string());
        }
        if let Some(units) = stmt.child_attr("units", "name") {
            typedef.units = Some(units.to_string());
        }
        typedef.status = status_of(stmt, module)?;
        typedef.description = description_of(stmt);
        typedef.reference = reference_of(stmt);
        Ok(typedef)
    }

    fn restrict(&self, typedef: &mut TypeDef, type_stmt: &'a XmlNode, scope: &Scope<'a>) -> Result<(), LoadError> {
        let module = scope.module_name();
        let builtin = typedef.builtin_kind();
        match &mut typedef.restrictions {
            TypeRestrictions::String { length, patterns } => {
                if let Some(expr) = type_stmt.child_attr("length", "value") {
                    *length = Some(parse_length(expr, length.as_ref(), module)?);
                }
                for stmt in type_stmt.get_children("pattern") {
                    patterns.push(pattern_of(stmt, module)?);
                }
            }
            TypeRestrictions::Binary { length } => {
                if let Some(expr) = type_stmt.child_attr("length", "value") {
                    *length = Some(parse_length(expr, length.as_ref(), module)?);
                }
            }
            TypeRestrictions::Numeric { range } => {
                if builtin == Some(BuiltinType::Decimal64) {
                    if let Some(raw) = type_stmt.child_attr("fraction-digits", "value") {
                        *range = Some(decimal64_range(parse_fraction_digits(raw, module)?));
                    }
                }
                if let Some(expr) = type_stmt.child_attr("range", "value") {
                    let base = range
                        .as_ref()
                        .ok_or_else(|| invalid(module, "range without fraction-digits", expr))?;
                    *range = Some(parse_range(expr, base, module)?);
                }
            }
            TypeRestrictions::Enumeration(enums) => {
                let declared = type_stmt.get_children("enum");
                if !declared.is_empty() {
                    let resolved = enums_of(&declared, enums, module)?;
                    *enums = resolved;
                }
            }
            TypeRestrictions::Bits(bits) => {
                let declared = type_stmt.get_children("bit");
                if !declared.is_empty() {
                    let resolved = bits_of(&declared, bits, module)?;
                    *bits = resolved;
                }
            }
            TypeRestrictions::Identityref { bases } => {
                let declared = type_stmt.get_children("base");
                if !declared.is_empty() {
                    *bases = declared
                        .into_iter()
                        .map(|stmt| self.qualify(required_attr(stmt, "name", module)?, scope))
                        .collect::<Result<_, _>>()?;
                }
            }
            TypeRestrictions::Union(members) => {
                for member in type_stmt.get_children("type") {
                    members.push(self.resolve_type(member, scope)?);
                }
            }
            TypeRestrictions::None => {}
        }
        Ok(())
    }
}

fn decimal64_range(fraction_digits: u8) -> RangeConstraint {
    RangeConstraint::decimal(
        vec![Interval::new(i64::MIN.into(), i64::MAX.into())],
        fraction_digits,
    )
}

fn parse_fraction_digits(raw: &str, module: &str) -> Result<u8, LoadError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|digits| (1..=18).contains(digits))
        .ok_or_else(|| invalid(module, "fraction-digits", raw))
}

/// Parse a `length` expression such as `1..64 | 128..max`. `min` and `max`
/// refer to the base restriction, or `0` and `2^64-1` when there is none.
pub(crate) fn parse_length(
    expr: &str,
    base: Option<&LengthConstraint>,
    module: &str,
) -> Result<LengthConstraint, LoadError> {
    let base = base.cloned().unwrap_or_else(LengthConstraint::unrestricted);
    let intervals = parse_intervals(expr, &base.intervals, module, "length", |raw| {
        raw.parse::<u64>().ok().map(i128::from)
    })?;
    Ok(LengthConstraint::new(intervals))
}

/// Parse a `range` expression against the base range. Decimal bounds are
/// scaled by the base's fraction-digits.
pub(crate) fn parse_range(
    expr: &str,
    base: &RangeConstraint,
    module: &str,
) -> Result<RangeConstraint, LoadError> {
    let digits = base.fraction_digits;
    let intervals = parse_intervals(expr, &base.intervals, module, "range", |raw| {
        if digits == 0 {
            raw.parse::<i128>().ok()
        } else {
            parse_decimal(raw, digits)
        }
    })?;
    Ok(RangeConstraint::decimal(intervals, digits))
}

fn parse_intervals(
    expr: &str,
    base: &[Interval],
    module: &str,
    what: &'static str,
    number: impl Fn(&str) -> Option<i128>,
) -> Result<Vec<Interval>, LoadError> {
    let lowest = base.iter().map(|interval| interval.min).min();
    let highest = base.iter().map(|interval| interval.max).max();
    let bound = |raw: &str| -> Result<i128, LoadError> {
        let value = match raw.trim() {
            "min" => lowest,
            "max" => highest,
            other => number(other),
        };
        value.ok_or_else(|| invalid(module, what, expr))
    };

    expr.split('|')
        .map(|part| {
            let interval = match part.split_once("..") {
                Some((lo, hi)) => Interval::new(bound(lo)?, bound(hi)?),
                None => Interval::single(bound(part)?),
            };
            if interval.min > interval.max {
                return Err(invalid(module, what, expr));
            }
            Ok(interval)
        })
        .collect()
}

/// Parse a decimal literal into an integer scaled by `digits` places.
fn parse_decimal(raw: &str, digits: u8) -> Option<i128> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let width = usize::from(digits);
    if int_part.is_empty() || frac_part.len() > width {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let scaled = format!("{int_part}{frac_part:0<width$}").parse::<i128>().ok()?;
    Some(if negative { -scaled } else { scaled })
}

fn pattern_of(stmt: &XmlNode, module: &str) -> Result<PatternConstraint, LoadError> {
    let mut pattern = PatternConstraint::new(required_attr(stmt, "value", module)?);
    pattern.invert_match = stmt.child_attr("modifier", "value") == Some("invert-match");
    pattern.error_message = stmt.child_text("error-message", "value").map(str::to_string);
    pattern.error_app_tag = stmt.child_attr("error-app-tag", "value").map(str::to_string);
    pattern.description = description_of(stmt);
    pattern.reference = reference_of(stmt);
    Ok(pattern)
}

/// Build the enums of a restriction. Values not given explicitly are taken
/// from the base enum of the same name, or one past the highest so far.
fn enums_of(declared: &[&XmlNode], inherited: &[EnumPair], module: &str) -> Result<Vec<EnumPair>, LoadError> {
    let mut next: i64 = 0;
    let mut enums = Vec::with_capacity(declared.len());
    for stmt in declared {
        let name = required_attr(stmt, "name", module)?;
        let value = match stmt.child_attr("value", "value") {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| invalid(module, "enum value", raw))?,
            None => match inherited.iter().find(|base| base.name == name) {
                Some(base) => base.value,
                None => i32::try_from(next).map_err(|_| invalid(module, "enum value", name))?,
            },
        };
        next = next.max(i64::from(value) + 1);

        let mut pair = EnumPair::new(name, value);
        pair.status = status_of(stmt, module)?;
        pair.description = description_of(stmt);
        pair.reference = reference_of(stmt);
        enums.push(pair);
    }
    Ok(enums)
}

fn bits_of(declared: &[&XmlNode], inherited: &[Bit], module: &str) -> Result<Vec<Bit>, LoadError> {
    let mut next: u64 = 0;
    let mut bits = Vec::with_capacity(declared.len());
    for stmt in declared {
        let name = required_attr(stmt, "name", module)?;
        let position = match stmt.child_attr("position", "value") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(module, "bit position", raw))?,
            None => match inherited.iter().find(|base| base.name == name) {
                Some(base) => base.position,
                None => u32::try_from(next).map_err(|_| invalid(module, "bit position", name))?,
            },
        };
        next = next.max(u64::from(position) + 1);

        let mut bit = Bit::new(name, position);
        bit.reference = reference_of(stmt);
        bits.push(bit);
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{parse_decimal, parse_length, parse_range};
    use crate::model::{BuiltinType, Interval, LengthConstraint, RangeConstraint};

    #[test]
    fn length_keywords_follow_the_base() {
        let base = LengthConstraint::new(vec![Interval::new(1, 255)]);
        let narrowed = parse_length("min..32 | 64..max", Some(&base), "m").expect("length");
        assert_eq!(
            narrowed.intervals,
            [Interval::new(1, 32), Interval::new(64, 255)]
        );

        let open = parse_length("8..max", None, "m").expect("length");
        assert_eq!(open.intervals, [Interval::new(8, u64::MAX.into())]);
    }

    #[test]
    fn integer_range_uses_builtin_bounds() {
        let base = RangeConstraint::new(vec![BuiltinType::Int8.integer_bounds().expect("int")]);
        let range = parse_range("min..-1 | 1 | 10..max", &base, "m").expect("range");
        assert_eq!(
            range.intervals,
            [
                Interval::new(-128, -1),
                Interval::single(1),
                Interval::new(10, 127)
            ]
        );
        assert!(parse_range("5..1", &base, "m").is_err());
        assert!(parse_range("abc", &base, "m").is_err());
    }

    #[test]
    fn decimal_literals_are_scaled() {
        assert_eq!(parse_decimal("1.5", 2), Some(150));
        assert_eq!(parse_decimal("-0.25", 2), Some(-25));
        assert_eq!(parse_decimal("3", 1), Some(30));
        assert_eq!(parse_decimal("1.234", 2), None);
        assert_eq!(parse_decimal(".5", 2), None);

        let base = RangeConstraint::decimal(vec![Interval::new(-1000, 1000)], 2);
        let range = parse_range("0.5..max", &base, "m").expect("range");
        assert_eq!(range.intervals, [Interval::new(50, 1000)]);
        assert_eq!(range.fraction_digits, 2);
    }

    #[test]
    fn inline_pattern_is_read_from_yin() {
        let root = crate::parser::parse(
            br#"<type name="string">
                  <pattern value="[a-z]+">
                    <modifier value="invert-match"/>
                    <error-message><value>lowercase only</value></error-message>
                  </pattern>
                </type>"#,
        )
        .expect("xml");
        let pattern = super::pattern_of(&root.children[0], "m").expect("pattern");
        assert_eq!(pattern.regex, "[a-z]+");
        assert!(pattern.invert_match);
        assert_eq!(pattern.error_message.as_deref(), Some("lowercase only"));
    }
}
