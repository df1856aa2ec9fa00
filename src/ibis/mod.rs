//! IBIS model files (`.ibs`).
//!
//! An IBIS file is a sequence of bracketed keywords, each followed by the
//! lines that belong to it:
//!
//! ```text
//! [IBIS Ver]   5.1
//! [Component]  example_tx
//! [Package]
//! R_pkg  0.10  0.00  0.50
//! [Pin]  signal_name  model_name
//! 1p     Tx_P         example_tx
//! [Model]      example_tx
//! Model_type   Output
//! [Pulldown]
//! -1.0  -20m
//!  ...
//! [End]
//! ```
//!
//! Keyword names are case-insensitive and treat spaces and underscores
//! alike. Unknown keywords are skipped together with their content.
//! Parsing stops with a syntax error on anything that does not fit the
//! grammar of a known keyword; structural problems (a driver without a
//! `[Ramp]`, say) are caught afterwards by [`validate::validate_ibis`].

pub mod derived;
pub mod parser;
pub mod types;
pub mod validate;

use std::path::Path;

use tracing::info;

pub use derived::iv_impedance;
pub use parser::{canonical_keyword, IbisParser};
pub use types::{
    Component, Executable, IbisFile, IvRow, Model, ModelSelector, ModelType, Package, Pin, PinRlc,
    Ramp, SelectorEntry, SlewRate, Value,
};
pub use validate::validate_ibis;

use crate::config::ParseConfig;
use crate::error::{IbisAmiError, Result};

/// Parse and validate IBIS text with default options.
pub fn parse_ibis_string(text: &str) -> Result<IbisFile> {
    parse_ibis_string_with(text, &ParseConfig::default())
}

/// Parse and validate IBIS text.
///
/// Advisory findings are left in [`IbisFile::diagnostics`].
pub fn parse_ibis_string_with(text: &str, config: &ParseConfig) -> Result<IbisFile> {
    let mut file = IbisParser::new(text, config).parse()?;
    validate_ibis(&mut file)?;
    info!(
        components = file.components.len(),
        models = file.models.len(),
        skipped = file.skipped.len(),
        "parsed IBIS file"
    );
    Ok(file)
}

/// Read, parse and validate an IBIS file.
pub fn parse_ibis_file(path: impl AsRef<Path>, config: &ParseConfig) -> Result<IbisFile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| IbisAmiError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_ibis_string_with(&text, config)
}
