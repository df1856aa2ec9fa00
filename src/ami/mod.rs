//! IBIS-AMI parameter-definition files (`.ami`).
//!
//! A parameter file is a single parenthesized tree. The root names the
//! model; beneath it sit two required groups, `Reserved_Parameters` and
//! `Model_Specific`, whose leaves are parameter definitions.
//!
//! # Grammar Overview
//!
//! ```text
//! file    = node
//! node    = '(' label { node | atom } ')'
//! label   = tap_index | symbol
//! atom    = string | "True" | "False" | number | symbol
//! comment = '|' { any_char }
//!
//! tap_index = ['-'|'+'] digit+            (followed by whitespace)
//! number    = ['-'|'+'] digits ['.' digits] [('e'|'E') ['-'|'+'] digit+] [suffix]
//! suffix    = 'T' | 'G' | 'M' | 'k' | 'm' | 'u' | 'n' | 'p' | 'f'
//! symbol    = (letter | digit | '_') { not whitespace or paren }
//! ```
//!
//! # Parameter Definitions
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `Usage` | `In`, `Out`, `InOut` or `Info` |
//! | `Type` | `Boolean`, `Integer`, `Float`, `UI`, `Tap`, `String` |
//! | `Value` / `Range` / `List` / `Corner` / `Increment` / `Steps` | Legal values |
//! | `Format <kind> ...` | Same as the bare kind tag |
//! | `Default` | Overrides the default implied by the format |
//! | `Description` | Free text |
//! | `List_Tip` | Display labels for `List` options |
//!
//! # Example
//!
//! ```text
//! (example_tx
//!     (Description "Example Tx model")
//!     (Reserved_Parameters
//!         (AMI_Version (Usage Info) (Type String) (Value "5.1"))
//!         (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
//!         (GetWave_Exists (Usage Info) (Type Boolean) (Value True)))
//!     (Model_Specific
//!         (tx_tap_units (Usage In) (Type Integer) (Range 27 6 27))))
//! ```

pub mod ast;
pub mod param;
pub mod parser;
pub mod serialize;
pub mod tree;
pub mod validate;

use std::path::Path;

use tracing::{debug, info};

pub use ast::{Atom, Expr, Node};
pub use param::{ParamFormat, ParamType, ParamValue, Parameter, Usage};
pub use tree::{ParamGroup, ParamTree, ParsedNode};
pub use validate::{MODEL_SPECIFIC_GROUP, RESERVED_GROUP};

use crate::config::ParseConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{IbisAmiError, Result};

/// A parsed and checked parameter-definition file.
#[derive(Debug, Clone)]
pub struct AmiFile {
    pub root_name: String,
    pub description: Option<String>,
    pub reserved: ParamGroup,
    pub model_specific: ParamGroup,
    /// Non-fatal findings, in discovery order
    pub diagnostics: Diagnostics,
}

impl AmiFile {
    /// All findings rendered as one message; empty when clean.
    pub fn message(&self) -> String {
        self.diagnostics.to_string()
    }

    /// Look up a tree entry by path, starting with a top-level group name.
    pub fn fetch(&self, path: &[&str]) -> Option<&ParamTree> {
        let (group, rest) = path.split_first()?;
        let group = match *group {
            RESERVED_GROUP => &self.reserved,
            MODEL_SPECIFIC_GROUP => &self.model_specific,
            _ => return None,
        };
        group.get_path(rest)
    }

    /// Look up a parameter by path.
    pub fn fetch_param(&self, path: &[&str]) -> Result<&Parameter> {
        match self.fetch(path) {
            Some(ParamTree::Param(p)) => Ok(p),
            Some(ParamTree::Group(_)) => Err(IbisAmiError::NotAParameter {
                path: path.join("."),
            }),
            None => Err(IbisAmiError::ParameterNotFound {
                path: path.join("."),
            }),
        }
    }

    /// Current value of the parameter at `path`, if it has one.
    pub fn fetch_param_value(&self, path: &[&str]) -> Result<Option<&ParamValue>> {
        Ok(self.fetch_param(path)?.current_value.as_ref())
    }

    /// Set the current value of the parameter at `path`.
    pub fn set_param_value(&mut self, path: &[&str], value: ParamValue) -> Result<()> {
        let joined = path.join(".");
        let (group, rest) = path
            .split_first()
            .ok_or_else(|| IbisAmiError::ParameterNotFound { path: joined.clone() })?;
        let group = match *group {
            RESERVED_GROUP => &mut self.reserved,
            MODEL_SPECIFIC_GROUP => &mut self.model_specific,
            _ => return Err(IbisAmiError::ParameterNotFound { path: joined }),
        };
        match group.get_path_mut(rest) {
            Some(ParamTree::Param(p)) => p.set_current_value(value),
            Some(ParamTree::Group(_)) => Err(IbisAmiError::NotAParameter { path: joined }),
            None => Err(IbisAmiError::ParameterNotFound { path: joined }),
        }
    }

    fn reserved_bool(&self, name: &str) -> Option<bool> {
        self.reserved
            .param(name)?
            .current_value
            .as_ref()?
            .as_bool()
    }

    /// Whether the model implements `AMI_GetWave`.
    pub fn getwave_exists(&self) -> Option<bool> {
        self.reserved_bool("GetWave_Exists")
    }

    /// Whether `AMI_Init` returns a modified impulse response.
    pub fn returns_impulse(&self) -> Option<bool> {
        self.reserved_bool("Init_Returns_Impulse")
    }

    /// Touchstone file named by the `Ts4file` reserved parameter.
    pub fn ts4file(&self) -> Option<&str> {
        self.reserved.param("Ts4file")?.current_value.as_ref()?.as_str()
    }

    /// Model-specific parameters the simulator passes in (`In` and `InOut`).
    pub fn input_params(&self) -> ParamGroup {
        self.model_specific.filtered(&|p| p.usage.is_input())
    }

    /// Input parameters as the string handed to the model's initializer.
    pub fn serialize_input_params(&self) -> String {
        serialize::serialize_values(&self.root_name, &self.input_params())
    }

    /// The whole tree as a re-parseable parameter file.
    pub fn to_ami_string(&self) -> String {
        serialize::serialize_tree(
            &self.root_name,
            self.description.as_deref(),
            &self.reserved,
            &self.model_specific,
        )
    }
}

/// Parse parameter-definition text with default options.
pub fn parse_ami_string(text: &str) -> Result<AmiFile> {
    parse_ami_string_with(text, &ParseConfig::default())
}

/// Parse parameter-definition text.
///
/// Syntax errors and missing required groups are returned as `Err`.
/// Problems confined to individual parameters are reported in
/// [`AmiFile::diagnostics`]; the affected entries are absent from the tree.
pub fn parse_ami_string_with(text: &str, config: &ParseConfig) -> Result<AmiFile> {
    let root = parser::parse_expr(text, config)?;
    debug!(root = %root.label, "parsed parameter tree");

    let mut diagnostics = Diagnostics::new();
    let (root_name, group) = match ParsedNode::classify(&root) {
        ParsedNode::Group { name, .. } => (name.to_string(), tree::build_group(&root, &mut diagnostics)),
        _ => {
            return Err(IbisAmiError::malformed_ami(format!(
                "Root '{}' must be a group of parameter groups",
                root.label
            )))
        }
    };

    let description = group.description.clone();
    let groups = validate::validate_root(group, &mut diagnostics)?;
    info!(
        root = %root_name,
        reserved = groups.reserved.len(),
        model_specific = groups.model_specific.len(),
        "parsed AMI parameters"
    );

    Ok(AmiFile {
        root_name,
        description,
        reserved: groups.reserved,
        model_specific: groups.model_specific,
        diagnostics,
    })
}

/// Read and parse a parameter-definition file.
pub fn parse_ami_file(path: impl AsRef<Path>, config: &ParseConfig) -> Result<AmiFile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| IbisAmiError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_ami_string_with(&text, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"(small
        (Description "Small model")
        (Reserved_Parameters
            (AMI_Version (Usage Info) (Type String) (Value "7.0"))
            (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
            (GetWave_Exists (Usage Info) (Type Boolean) (Value False))
            (Ts4file (Usage Info) (Type String) (Value "chan.s4p")))
        (Model_Specific
            (gain (Usage In) (Type Float) (Range 1.0 0.0 2.0))
            (status (Usage Out) (Type String))))"#;

    #[test]
    fn test_reserved_accessors() {
        let ami = parse_ami_string(SMALL).unwrap();
        assert_eq!(ami.message(), "");
        assert_eq!(ami.description.as_deref(), Some("Small model"));
        assert_eq!(ami.returns_impulse(), Some(true));
        assert_eq!(ami.getwave_exists(), Some(false));
        assert_eq!(ami.ts4file(), Some("chan.s4p"));
    }

    #[test]
    fn test_fetch_and_set() {
        let mut ami = parse_ami_string(SMALL).unwrap();
        assert_eq!(
            ami.fetch_param_value(&["Model_Specific", "gain"]).unwrap(),
            Some(&ParamValue::Float(1.0))
        );
        ami.set_param_value(&["Model_Specific", "gain"], ParamValue::Float(1.5))
            .unwrap();
        assert_eq!(
            ami.fetch_param(&["Model_Specific", "gain"]).unwrap().current_value,
            Some(ParamValue::Float(1.5))
        );

        assert!(matches!(
            ami.fetch_param(&["Model_Specific"]),
            Err(IbisAmiError::ParameterNotFound { .. })
        ));
        assert!(matches!(
            ami.fetch_param(&["Model_Specific", "nope"]),
            Err(IbisAmiError::ParameterNotFound { .. })
        ));
        assert!(matches!(
            ami.set_param_value(&["Model_Specific", "gain"], ParamValue::Str("x".into())),
            Err(IbisAmiError::ValueTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_input_params_skip_outputs() {
        let ami = parse_ami_string(SMALL).unwrap();
        let inputs = ami.input_params();
        assert!(inputs.get("gain").is_some());
        assert!(inputs.get("status").is_none());
        assert_eq!(ami.serialize_input_params(), "(small (gain 1.0))");
    }

    #[test]
    fn test_leaf_root_rejected() {
        let err = parse_ami_string("(p (Usage In) (Type Float))").unwrap_err();
        assert!(matches!(err, IbisAmiError::MalformedAmiFile { .. }));
    }

    #[test]
    fn test_group_is_not_a_parameter() {
        let text = r#"(m
            (Reserved_Parameters
                (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
                (GetWave_Exists (Usage Info) (Type Boolean) (Value True)))
            (Model_Specific (taps (0 (Usage In) (Type Tap) (Value 0.0)))))"#;
        let ami = parse_ami_string(text).unwrap();
        assert!(matches!(
            ami.fetch_param(&["Model_Specific", "taps"]),
            Err(IbisAmiError::NotAParameter { .. })
        ));
        assert!(ami.fetch_param(&["Model_Specific", "taps", "post0"]).is_ok());
    }
}
