//! # IBIS-AMI
//!
//! Parsers for the two file formats that describe a SerDes channel model.
//!
//! This library provides:
//! - A parser for IBIS model files (`.ibs`): components, pins, packages and
//!   buffer models with their I-V tables, ramps and algorithmic-model links
//! - A parser for IBIS-AMI parameter-definition files (`.ami`): the
//!   parenthesized tree of reserved and model-specific parameters
//! - Semantic validation of both, with non-fatal findings reported as
//!   [`Diagnostics`] next to the parsed result
//!
//! ## Architecture
//!
//! - [`lexer`] - Character cursor, comments, numbers with engineering suffixes
//! - [`value`] - Typ/min/max triples, slew-rate ratios, tap labels
//! - [`ami`] - Expression-tree parser, parameter builder, validator, serializer
//! - [`ibis`] - Keyword-sectioned parser, validator, derived model quantities
//!
//! ## Usage
//!
//! ```no_run
//! use ibis_ami::{ami, ibis, ParseConfig};
//!
//! let config = ParseConfig::default();
//! let model = ibis::parse_ibis_file("example_tx.ibs", &config)?;
//! for (name, m) in &model.models {
//!     println!("{}: {:?} ohms", name, m.impedance());
//! }
//!
//! let params = ami::parse_ami_file("example_tx.ami", &config)?;
//! print!("{}", params.message());
//! println!("{}", params.serialize_input_params());
//! # Ok::<(), ibis_ami::IbisAmiError>(())
//! ```
//!
//! ## Numbers
//!
//! Both formats accept engineering suffixes on numbers:
//!
//! | Suffix | Multiplier |
//! |--------|------------|
//! | `T` | 1e12 |
//! | `G` | 1e9 |
//! | `M` | 1e6 |
//! | `k` | 1e3 |
//! | `m` | 1e-3 |
//! | `u` | 1e-6 |
//! | `n` | 1e-9 |
//! | `p` | 1e-12 |
//! | `f` | 1e-15 |

pub mod ami;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ibis;
pub mod lexer;
pub mod value;

// Re-export main types for convenience
pub use ami::{parse_ami_file, parse_ami_string, AmiFile};
pub use config::ParseConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{IbisAmiError, Result};
pub use ibis::{parse_ibis_file, parse_ibis_string, IbisFile};
pub use value::TypMinMax;
