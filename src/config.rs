//! Parser configuration.

/// Default line-comment marker for both file formats.
pub const DEFAULT_COMMENT_CHAR: char = '|';

/// Default limit on parenthesized nesting in parameter files.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options shared by the parameter-format and model-format parsers.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Character that starts a comment running to end of line.
    pub comment_char: char,
    /// Maximum expression nesting accepted before giving up.
    pub max_depth: usize,
    /// Drop pins bound to `POWER`, `GND` or `NC`.
    pub filter_supply_pins: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            comment_char: DEFAULT_COMMENT_CHAR,
            max_depth: DEFAULT_MAX_DEPTH,
            filter_supply_pins: true,
        }
    }
}

impl ParseConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comment marker.
    pub fn with_comment_char(mut self, comment_char: char) -> Self {
        self.comment_char = comment_char;
        self
    }

    /// Set the maximum expression nesting depth.
    ///
    /// Real parameter files nest three or four levels; the limit only
    /// matters for hostile or corrupted input.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Keep or drop supply and no-connect pins.
    pub fn with_filter_supply_pins(mut self, filter: bool) -> Self {
        self.filter_supply_pins = filter;
        self
    }
}
