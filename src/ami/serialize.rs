//! Writing parameter trees back out as S-expressions.
//!
//! Two forms are produced: full definitions (re-parseable as a parameter
//! file) and the compact `(name value)` string handed to a model
//! executable at initialization.

use super::param::{ParamFormat, ParamValue, Parameter};
use super::tree::{ParamGroup, ParamTree};

const INDENT: &str = "    ";

/// Render one parameter definition on a single line.
///
/// `Range`, `Increment` and `Steps` carry the default as their first value.
/// A `(Default ..)` tag is written only when the default differs from the
/// one the format implies on re-reading.
pub fn param_to_sexpr(param: &Parameter) -> String {
    let mut out = format!(
        "({} (Usage {}) (Type {})",
        param.name, param.usage, param.param_type
    );
    let default = param.default.as_ref();

    let implied = match &param.format {
        Some(format) => {
            let (values, implied) = format_values(format, default);
            out.push_str(&format!(" ({}", format.kind()));
            for v in values {
                out.push(' ');
                out.push_str(&v.to_source());
            }
            out.push(')');

            if let ParamFormat::List { tips, .. } = format {
                if !tips.is_empty() {
                    out.push_str(" (List_Tip");
                    for tip in tips {
                        out.push_str(&format!(" \"{}\"", tip));
                    }
                    out.push(')');
                }
            }
            implied
        }
        None => None,
    };

    if let Some(d) = default {
        if implied != Some(d) {
            out.push_str(&format!(" (Default {})", d.to_source()));
        }
    }
    if let Some(desc) = &param.description {
        out.push_str(&format!(" (Description \"{}\")", desc));
    }
    out.push(')');
    out
}

/// Values written for a format, and the default they imply when parsed back.
fn format_values<'v>(
    format: &'v ParamFormat,
    default: Option<&'v ParamValue>,
) -> (Vec<&'v ParamValue>, Option<&'v ParamValue>) {
    match format {
        ParamFormat::Value(v) => (vec![v], Some(v)),
        ParamFormat::Range { min, max } => (with_default(default, &[min, max]), default),
        ParamFormat::List { options, .. } => (options.iter().collect(), options.first()),
        ParamFormat::Corner { typ, min, max } => (vec![typ, min, max], Some(typ)),
        ParamFormat::Increment { min, max, delta } => {
            (with_default(default, &[min, max, delta]), default)
        }
        ParamFormat::Steps { min, max, steps } => {
            (with_default(default, &[min, max, steps]), default)
        }
    }
}

fn with_default<'v>(default: Option<&'v ParamValue>, rest: &[&'v ParamValue]) -> Vec<&'v ParamValue> {
    default.into_iter().chain(rest.iter().copied()).collect()
}

fn write_group(out: &mut String, name: &str, group: &ParamGroup, depth: usize) {
    let pad = INDENT.repeat(depth);
    out.push_str(&format!("{}({}", pad, name));
    if let Some(desc) = &group.description {
        out.push_str(&format!("\n{}{}(Description \"{}\")", pad, INDENT, desc));
    }
    for (key, entry) in group.iter() {
        out.push('\n');
        match entry {
            ParamTree::Param(p) => {
                out.push_str(&pad);
                out.push_str(INDENT);
                out.push_str(&param_to_sexpr(&renamed(p, key)));
            }
            ParamTree::Group(g) => write_group(out, key, g, depth + 1),
        }
    }
    out.push(')');
}

/// Parameters keep their own name, but the map key is authoritative.
fn renamed(param: &Parameter, key: &str) -> Parameter {
    let mut p = param.clone();
    p.name = key.to_string();
    p
}

/// Render a complete parameter file.
pub fn serialize_tree(
    root_name: &str,
    description: Option<&str>,
    reserved: &ParamGroup,
    model_specific: &ParamGroup,
) -> String {
    let mut out = format!("({}", root_name);
    if let Some(desc) = description {
        out.push_str(&format!("\n{}(Description \"{}\")", INDENT, desc));
    }
    out.push('\n');
    write_group(&mut out, "Reserved_Parameters", reserved, 1);
    out.push('\n');
    write_group(&mut out, "Model_Specific", model_specific, 1);
    out.push_str("\n)\n");
    out
}

/// Render current values as `(root (name value) (group (name value)))`.
///
/// Parameters without a current value are left out.
pub fn serialize_values(root_name: &str, group: &ParamGroup) -> String {
    let mut out = format!("({}", root_name);
    write_values(&mut out, group);
    out.push(')');
    out
}

fn write_values(out: &mut String, group: &ParamGroup) {
    for (name, entry) in group.iter() {
        match entry {
            ParamTree::Param(p) => {
                if let Some(v) = &p.current_value {
                    out.push_str(&format!(" ({} {})", name, v.to_source()));
                }
            }
            ParamTree::Group(g) => {
                out.push_str(&format!(" ({}", name));
                write_values(out, g);
                out.push(')');
            }
        }
    }
}
