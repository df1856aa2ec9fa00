//! Materialized AMI parameter definitions.
//!
//! A parameter leaf in the expression tree is a list of tag nodes such as
//! `(Usage In)`, `(Type Integer)` and `(Range 27 6 27)`. [`Parameter::from_tags`]
//! turns that list into a typed [`Parameter`], converting every value to
//! the declared type.

use std::fmt;

use super::ast::{Atom, Expr};
use crate::error::{IbisAmiError, Result};

/// Tag labels recognized inside a parameter definition.
pub const PARAM_DEF_TAGS: [&str; 12] = [
    "Usage",
    "Type",
    "Format",
    "Default",
    "Description",
    "Value",
    "Range",
    "List",
    "List_Tip",
    "Corner",
    "Increment",
    "Steps",
];

/// True when `label` is one of the parameter-definition tags.
pub fn is_param_tag(label: &str) -> bool {
    PARAM_DEF_TAGS.contains(&label)
}

/// Direction of a parameter between the simulator and the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    In,
    Out,
    InOut,
    Info,
}

impl Usage {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "In" => Some(Usage::In),
            "Out" => Some(Usage::Out),
            "InOut" => Some(Usage::InOut),
            "Info" => Some(Usage::Info),
            _ => None,
        }
    }

    /// True for parameters passed into the model at initialization.
    pub fn is_input(&self) -> bool {
        matches!(self, Usage::In | Usage::InOut)
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Usage::In => "In",
            Usage::Out => "Out",
            Usage::InOut => "InOut",
            Usage::Info => "Info",
        };
        write!(f, "{}", name)
    }
}

/// Declared value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Boolean,
    Integer,
    Long,
    Float,
    Ui,
    Tap,
    String,
}

impl ParamType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Boolean" => Some(ParamType::Boolean),
            "Integer" => Some(ParamType::Integer),
            "Long" => Some(ParamType::Long),
            "Float" => Some(ParamType::Float),
            "UI" => Some(ParamType::Ui),
            "Tap" => Some(ParamType::Tap),
            "String" => Some(ParamType::String),
            _ => None,
        }
    }

    /// Convert a parsed atom to this type.
    pub fn coerce(&self, atom: &Atom) -> Option<ParamValue> {
        match (self, atom) {
            (ParamType::Boolean, Atom::Bool(b)) => Some(ParamValue::Bool(*b)),
            (ParamType::Boolean, Atom::Symbol(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(ParamValue::Bool(true)),
                "false" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            (ParamType::Integer | ParamType::Long, Atom::Number { value, .. }) => {
                integral(*value).map(ParamValue::Int)
            }
            (ParamType::Float | ParamType::Ui | ParamType::Tap, Atom::Number { value, .. }) => {
                Some(ParamValue::Float(*value))
            }
            (ParamType::String, atom) => Some(ParamValue::Str(atom.text())),
            _ => None,
        }
    }

    /// Check a caller-supplied value, widening integers to floats.
    pub fn accept(&self, value: ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (ParamType::Boolean, v @ ParamValue::Bool(_)) => Some(v),
            (ParamType::Integer | ParamType::Long, v @ ParamValue::Int(_)) => Some(v),
            (ParamType::Integer | ParamType::Long, ParamValue::Float(x)) => {
                integral(x).map(ParamValue::Int)
            }
            (ParamType::Float | ParamType::Ui | ParamType::Tap, v @ ParamValue::Float(_)) => {
                Some(v)
            }
            (ParamType::Float | ParamType::Ui | ParamType::Tap, ParamValue::Int(i)) => {
                Some(ParamValue::Float(i as f64))
            }
            (ParamType::String, v @ ParamValue::Str(_)) => Some(v),
            _ => None,
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Boolean => "Boolean",
            ParamType::Integer => "Integer",
            ParamType::Long => "Long",
            ParamType::Float => "Float",
            ParamType::Ui => "UI",
            ParamType::Tap => "Tap",
            ParamType::String => "String",
        };
        write!(f, "{}", name)
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Rendering used in parameter files: strings quoted.
    pub fn to_source(&self) -> String {
        match self {
            ParamValue::Str(s) => format!("\"{}\"", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(true) => write!(f, "True"),
            ParamValue::Bool(false) => write!(f, "False"),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{:?}", x),
            ParamValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// How the legal values of a parameter are described.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamFormat {
    Value(ParamValue),
    Range {
        min: ParamValue,
        max: ParamValue,
    },
    List {
        options: Vec<ParamValue>,
        tips: Vec<String>,
    },
    Corner {
        typ: ParamValue,
        min: ParamValue,
        max: ParamValue,
    },
    Increment {
        min: ParamValue,
        max: ParamValue,
        delta: ParamValue,
    },
    Steps {
        min: ParamValue,
        max: ParamValue,
        steps: ParamValue,
    },
}

impl ParamFormat {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamFormat::Value(_) => "Value",
            ParamFormat::Range { .. } => "Range",
            ParamFormat::List { .. } => "List",
            ParamFormat::Corner { .. } => "Corner",
            ParamFormat::Increment { .. } => "Increment",
            ParamFormat::Steps { .. } => "Steps",
        }
    }
}

/// A fully materialized parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub usage: Usage,
    pub param_type: ParamType,
    pub format: Option<ParamFormat>,
    pub default: Option<ParamValue>,
    /// Starts out equal to `default`
    pub current_value: Option<ParamValue>,
    pub description: Option<String>,
}

/// Tag contents gathered before the type is known.
#[derive(Default)]
struct RawTags<'t> {
    usage: Option<&'t Atom>,
    param_type: Option<&'t Atom>,
    description: Option<String>,
    default: Option<&'t Atom>,
    format: Option<(String, Vec<&'t Atom>)>,
    tips: Vec<String>,
}

impl Parameter {
    /// Build a parameter from its tag list.
    pub fn from_tags(name: &str, tags: &[Expr]) -> Result<Self> {
        let err = |msg: String| IbisAmiError::ami_param(name, msg);
        let mut raw = RawTags::default();

        for tag in tags {
            let Expr::Node(node) = tag else {
                return Err(err(format!("Malformed tag: {}", tag_text(tag))));
            };
            let atoms = node
                .children
                .iter()
                .map(|child| {
                    child
                        .as_atom()
                        .ok_or_else(|| err(format!("Nested expression in tag '{}'", node.label)))
                })
                .collect::<Result<Vec<&Atom>>>()?;

            match node.label.as_str() {
                "Usage" => raw.usage = atoms.first().copied(),
                "Type" => raw.param_type = atoms.first().copied(),
                "Description" => {
                    raw.description = Some(
                        atoms
                            .iter()
                            .map(|a| a.text())
                            .collect::<Vec<_>>()
                            .join(" "),
                    )
                }
                "Default" => raw.default = atoms.first().copied(),
                "List_Tip" => raw.tips = atoms.iter().map(|a| a.text()).collect(),
                "Format" => {
                    let Some((kind, values)) = atoms.split_first() else {
                        return Err(err("Empty 'Format' tag".to_string()));
                    };
                    set_format(&mut raw, kind.text(), values.to_vec()).map_err(err)?;
                }
                kind @ ("Value" | "Range" | "List" | "Corner" | "Increment" | "Steps") => {
                    set_format(&mut raw, kind.to_string(), atoms).map_err(err)?;
                }
                other => return Err(err(format!("Unrecognized tag '{}'", other))),
            }
        }

        let usage = match raw.usage {
            Some(atom) => Usage::from_str(&atom.text())
                .ok_or_else(|| err(format!("Unrecognized usage '{}'", atom.text())))?,
            None => return Err(err("Missing 'Usage' tag".to_string())),
        };
        let param_type = match raw.param_type {
            Some(atom) => ParamType::from_str(&atom.text())
                .ok_or_else(|| err(format!("Unrecognized type '{}'", atom.text())))?,
            None => return Err(err("Missing 'Type' tag".to_string())),
        };

        let coerce = |atom: &Atom| {
            param_type.coerce(atom).ok_or_else(|| {
                err(format!(
                    "Value '{}' is not of type {}",
                    atom.text(),
                    param_type
                ))
            })
        };

        let mut default = raw.default.map(coerce).transpose()?;
        let format = match raw.format {
            None => None,
            Some((kind, atoms)) => {
                let values = atoms.into_iter().map(coerce).collect::<Result<Vec<_>>>()?;
                let (format, implied_default) =
                    build_format(&kind, values, raw.tips).map_err(err)?;
                if default.is_none() {
                    default = implied_default;
                }
                Some(format)
            }
        };

        Ok(Parameter {
            name: name.to_string(),
            usage,
            param_type,
            format,
            current_value: default.clone(),
            default,
            description: raw.description,
        })
    }

    /// Replace the current value, checking it against the declared type.
    pub fn set_current_value(&mut self, value: ParamValue) -> Result<()> {
        let found = value.to_string();
        match self.param_type.accept(value) {
            Some(value) => {
                self.current_value = Some(value);
                Ok(())
            }
            None => Err(IbisAmiError::ValueTypeMismatch {
                name: self.name.clone(),
                expected: self.param_type.to_string(),
                found,
            }),
        }
    }
}

fn set_format<'t>(
    raw: &mut RawTags<'t>,
    kind: String,
    values: Vec<&'t Atom>,
) -> std::result::Result<(), String> {
    if let Some((existing, _)) = &raw.format {
        return Err(format!(
            "Multiple formats given ('{}' and '{}')",
            existing, kind
        ));
    }
    raw.format = Some((kind, values));
    Ok(())
}

/// Build a format and the default it implies.
fn build_format(
    kind: &str,
    values: Vec<ParamValue>,
    tips: Vec<String>,
) -> std::result::Result<(ParamFormat, Option<ParamValue>), String> {
    let arity = |expected: &str| {
        format!(
            "'{}' expects {} values, got {}",
            kind,
            expected,
            values.len()
        )
    };

    match (kind, values.len()) {
        ("Value", 1) => {
            let v = values[0].clone();
            Ok((ParamFormat::Value(v.clone()), Some(v)))
        }
        ("Value", _) => Err(arity("1")),
        ("Range", 3) => {
            let [default, min, max] = three(&values);
            Ok((ParamFormat::Range { min, max }, Some(default)))
        }
        ("Range", 2) => {
            let (min, max) = (values[0].clone(), values[1].clone());
            Ok((ParamFormat::Range { min: min.clone(), max }, Some(min)))
        }
        ("Range", _) => Err(arity("2 or 3")),
        ("List", n) if n > 0 => {
            let default = values.first().cloned();
            Ok((ParamFormat::List { options: values, tips }, default))
        }
        ("List", _) => Err(arity("at least 1")),
        ("Corner", 3) => {
            let [typ, min, max] = three(&values);
            Ok((
                ParamFormat::Corner {
                    typ: typ.clone(),
                    min,
                    max,
                },
                Some(typ),
            ))
        }
        ("Corner", _) => Err(arity("3")),
        ("Increment" | "Steps", 4) => {
            let default = values[0].clone();
            let [min, max, step] = three(&values[1..]);
            Ok((stepped(kind, min, max, step), Some(default)))
        }
        ("Increment" | "Steps", 3) => {
            let [min, max, step] = three(&values);
            Ok((stepped(kind, min.clone(), max, step), Some(min)))
        }
        ("Increment" | "Steps", _) => Err(arity("3 or 4")),
        (other, _) => Err(format!("Unrecognized format '{}'", other)),
    }
}

fn three(values: &[ParamValue]) -> [ParamValue; 3] {
    [values[0].clone(), values[1].clone(), values[2].clone()]
}

fn stepped(kind: &str, min: ParamValue, max: ParamValue, step: ParamValue) -> ParamFormat {
    if kind == "Steps" {
        ParamFormat::Steps {
            min,
            max,
            steps: step,
        }
    } else {
        ParamFormat::Increment {
            min,
            max,
            delta: step,
        }
    }
}

fn tag_text(expr: &Expr) -> String {
    match expr {
        Expr::Atom(atom) => atom.to_string(),
        Expr::Node(node) => format!("({} ...)", node.label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ami::parser::parse_expr;
    use crate::config::ParseConfig;

    fn build(text: &str) -> Result<Parameter> {
        let node = parse_expr(text, &ParseConfig::default()).unwrap();
        Parameter::from_tags(&node.label, &node.children)
    }

    #[test]
    fn test_range_with_default() {
        let p = build("(tx_tap_units (Usage In) (Type Integer) (Range 27 6 27) (Description \"units\"))")
            .unwrap();
        assert_eq!(p.usage, Usage::In);
        assert_eq!(p.param_type, ParamType::Integer);
        assert_eq!(p.default, Some(ParamValue::Int(27)));
        assert_eq!(p.current_value, Some(ParamValue::Int(27)));
        assert_eq!(
            p.format,
            Some(ParamFormat::Range {
                min: ParamValue::Int(6),
                max: ParamValue::Int(27)
            })
        );
        assert_eq!(p.description.as_deref(), Some("units"));
    }

    #[test]
    fn test_format_tag_form() {
        let p = build("(p (Usage In) (Type Float) (Format Range 0.5 0 1) (Default 0.25))").unwrap();
        assert_eq!(p.default, Some(ParamValue::Float(0.25)));
        assert_eq!(p.format.as_ref().map(ParamFormat::kind), Some("Range"));
    }

    #[test]
    fn test_value_string_and_bool() {
        let p = build("(AMI_Version (Usage Info) (Type String) (Value \"5.1\"))").unwrap();
        assert_eq!(p.current_value, Some(ParamValue::Str("5.1".to_string())));

        let p = build("(GetWave_Exists (Usage Info) (Type Boolean) (Value True))").unwrap();
        assert_eq!(p.current_value, Some(ParamValue::Bool(true)));
    }

    #[test]
    fn test_list_defaults_to_first() {
        let p = build("(mode (Usage In) (Type Integer) (List 1 2 3) (List_Tip a b c))").unwrap();
        assert_eq!(p.default, Some(ParamValue::Int(1)));
        match p.format {
            Some(ParamFormat::List { options, tips }) => {
                assert_eq!(options.len(), 3);
                assert_eq!(tips, vec!["a", "b", "c"]);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_no_format_leaves_value_empty() {
        let p = build("(p (Usage Out) (Type Float))").unwrap();
        assert!(p.format.is_none());
        assert!(p.current_value.is_none());
    }

    #[test]
    fn test_missing_usage_or_type() {
        let err = build("(p (Type Float) (Value 1))").unwrap_err();
        assert!(matches!(err, IbisAmiError::AmiParam { ref message, .. } if message.contains("Usage")));
        assert!(build("(p (Usage In) (Value 1))").is_err());
    }

    #[test]
    fn test_type_mismatch_and_bad_tag() {
        assert!(build("(p (Usage In) (Type Integer) (Value 1.5))").is_err());
        assert!(build("(p (Usage In) (Type Integer) (Bogus 1))").is_err());
        assert!(build("(p (Usage In) (Type Integer) (Value 1) (Range 0 1))").is_err());
    }

    #[test]
    fn test_set_current_value_checks_type() {
        let mut p = build("(p (Usage In) (Type Float) (Range 0.5 0 1))").unwrap();
        p.set_current_value(ParamValue::Int(1)).unwrap();
        assert_eq!(p.current_value, Some(ParamValue::Float(1.0)));
        assert!(matches!(
            p.set_current_value(ParamValue::Bool(true)),
            Err(IbisAmiError::ValueTypeMismatch { .. })
        ));
    }
}
