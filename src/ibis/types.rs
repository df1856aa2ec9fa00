//! Data model for parsed IBIS files.

use std::fmt;

use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::value::TypMinMax;

/// Value of a generic `name value` or `name = value` line.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    TypMinMax(TypMinMax),
    Name(String),
    Text(String),
}

impl Value {
    /// Numeric view; a bare number counts as a typical-only triple.
    pub fn as_typminmax(&self) -> Option<TypMinMax> {
        match self {
            Value::Number(x) => Some(TypMinMax::typ_only(*x)),
            Value::TypMinMax(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_typminmax().map(|t| t.typ)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Name(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{}", x),
            Value::TypMinMax(t) => write!(f, "{}", t),
            Value::Name(s) | Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Buffer kind declared by `Model_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelType {
    Input,
    Output,
    InOut,
    /// Any other IBIS buffer type (`3-state`, `Open_drain`, ...)
    Other(String),
}

impl ModelType {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "input" => ModelType::Input,
            "output" => ModelType::Output,
            "i/o" => ModelType::InOut,
            _ => ModelType::Other(s.to_string()),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::Input => write!(f, "Input"),
            ModelType::Output => write!(f, "Output"),
            ModelType::InOut => write!(f, "I/O"),
            ModelType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One row of a voltage/current table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvRow {
    pub voltage: f64,
    pub current: TypMinMax,
}

/// Slew rate in V/s at the three corners; `None` where given as `NA`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlewRate {
    pub typ: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SlewRate {
    pub fn from_ratios(ratios: &[Option<f64>]) -> Self {
        let at = |i: usize| ratios.get(i).copied().flatten();
        Self {
            typ: at(0),
            min: at(1),
            max: at(2),
        }
    }
}

/// `[Ramp]` section contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    pub rising: SlewRate,
    pub falling: SlewRate,
    /// Test load for the ramp measurement, when given
    pub r_load: Option<f64>,
}

/// One `Executable` line of an `[Algorithmic Model]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    /// Lowercased operating system, e.g. `linux` or `windows`
    pub os: String,
    pub compiler: String,
    pub bits: u8,
    pub library: String,
    pub parameter_file: String,
}

/// A `[Model]` and everything inside it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub name: String,
    pub model_type: Option<ModelType>,
    pub c_comp: Option<TypMinMax>,
    pub voltage_range: Option<TypMinMax>,
    pub temperature_range: Option<TypMinMax>,
    pub pulldown: Option<Vec<IvRow>>,
    pub pullup: Option<Vec<IvRow>>,
    pub gnd_clamp: Option<Vec<IvRow>>,
    pub power_clamp: Option<Vec<IvRow>>,
    pub ramp: Option<Ramp>,
    pub algorithmic_model: Option<Vec<Executable>>,
    /// Generic parameters, keyed by lowercased name
    pub params: IndexMap<String, Value>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn cref(&self) -> Option<f64> {
        self.param("cref").and_then(Value::as_f64)
    }

    pub fn vref(&self) -> Option<f64> {
        self.param("vref").and_then(Value::as_f64)
    }

    pub fn vmeas(&self) -> Option<f64> {
        self.param("vmeas").and_then(Value::as_f64)
    }

    pub fn rref(&self) -> Option<f64> {
        self.param("rref").and_then(Value::as_f64)
    }
}

/// Package parasitics from `[Package]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Package {
    pub r_pkg: Option<TypMinMax>,
    pub l_pkg: Option<TypMinMax>,
    pub c_pkg: Option<TypMinMax>,
}

/// Per-pin parasitic override columns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinRlc {
    pub r_pin: Option<f64>,
    pub l_pin: Option<f64>,
    pub c_pin: Option<f64>,
}

/// A row of the `[Pin]` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub name: String,
    pub signal_name: String,
    pub model_name: String,
    pub rlc: Option<PinRlc>,
}

/// A `[Component]` and its package and pins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    pub name: String,
    pub manufacturer: Option<String>,
    pub package: Package,
    /// Keyed by pin name, in declaration order
    pub pins: IndexMap<String, Pin>,
    pub params: IndexMap<String, Value>,
}

/// One choice in a `[Model Selector]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    pub model_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    pub name: String,
    pub entries: Vec<SelectorEntry>,
}

/// A parsed model-format file.
#[derive(Debug, Clone, Default)]
pub struct IbisFile {
    pub ibis_ver: Option<f64>,
    pub file_name: Option<String>,
    pub file_rev: Option<String>,
    pub date: Option<String>,
    pub components: IndexMap<String, Component>,
    pub models: IndexMap<String, Model>,
    pub model_selectors: IndexMap<String, ModelSelector>,
    /// Top-level generic parameters
    pub params: IndexMap<String, Value>,
    /// Canonical names of keywords whose content was skipped
    pub skipped: Vec<String>,
    pub diagnostics: Diagnostics,
}
