//! Keyword-scoped parser for IBIS model files.
//!
//! A file is a sequence of `[Keyword]` sections and column-one
//! `name value` lines, closed by `[End]`. Sections nest by convention
//! rather than by delimiters: a `[Model]` runs until a keyword that belongs
//! to the top level shows up. Each scope therefore parses with two keyword
//! sets:
//!
//! - **valid** keywords are parsed by the scope itself;
//! - **stop** keywords end the scope without being consumed, so the
//!   enclosing scope sees them next;
//! - anything else is skipped up to the next keyword.
//!
//! `[End]` always stops a scope and is only consumed by the file itself.

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::types::{
    Component, Executable, IbisFile, IvRow, Model, ModelSelector, ModelType, Package, Pin, PinRlc,
    Ramp, SelectorEntry, SlewRate, Value,
};
use crate::config::ParseConfig;
use crate::error::{IbisAmiError, Result};
use crate::lexer::{parse_value, Cursor, Position};
use crate::value::{ratio, try_typminmax, typminmax, TypMinMax};

/// Top-level keywords, canonicalized. Every one of them closes a nested scope.
pub const IBIS_KEYWORDS: [&str; 19] = [
    "model",
    "end",
    "ibis_ver",
    "comment_char",
    "file_name",
    "file_rev",
    "date",
    "source",
    "notes",
    "disclaimer",
    "copyright",
    "component",
    "model_selector",
    "submodel",
    "external_circuit",
    "test_data",
    "test_load",
    "define_package_model",
    "interconnect_model_set",
];

/// Keywords parsed inside `[Model]`.
pub const MODEL_KEYWORDS: [&str; 8] = [
    "pulldown",
    "pullup",
    "ramp",
    "algorithmic_model",
    "voltage_range",
    "temperature_range",
    "gnd_clamp",
    "power_clamp",
];

/// Keywords parsed inside `[Component]`.
pub const COMPONENT_KEYWORDS: [&str; 4] = ["manufacturer", "package", "pin", "diff_pin"];

/// Pin models that carry no signal.
const SUPPLY_MODELS: [&str; 3] = ["POWER", "GND", "NC"];

/// Canonical form of a keyword: words joined by `_`, lowercased.
pub fn canonical_keyword(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// One item found by a scope.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    /// Header consumed; the scope parses the body
    Keyword(String),
    /// Header and body consumed
    Skipped(String),
    Param(String, Value),
}

/// Parser for IBIS model files.
pub struct IbisParser<'a> {
    cursor: Cursor<'a>,
    filter_supply_pins: bool,
}

impl<'a> IbisParser<'a> {
    pub fn new(input: &'a str, config: &ParseConfig) -> Self {
        Self {
            cursor: Cursor::with_comment_char(input, config.comment_char),
            filter_supply_pins: config.filter_supply_pins,
        }
    }

    /// Parse the whole file, up to and including `[End]`.
    pub fn parse(mut self) -> Result<IbisFile> {
        let mut file = IbisFile::default();
        while let Some(entry) = self.node(&IBIS_KEYWORDS, &[])? {
            match entry {
                Entry::Keyword(keyword) => self.top_keyword(&keyword, &mut file)?,
                Entry::Skipped(keyword) => file.skipped.push(keyword),
                Entry::Param(name, value) => {
                    file.params.insert(name, value);
                }
            }
        }

        self.expect_keyword("end", "[End]")?;
        self.cursor.skip_ignored();
        if !self.cursor.is_eof() {
            return Err(self.cursor.expected("end of input after [End]"));
        }
        Ok(file)
    }

    /// Next keyword or parameter in a scope, or `None` when the scope ends.
    fn node(&mut self, valid: &[&str], stop: &[&str]) -> Result<Option<Entry>> {
        self.cursor.skip_ignored();
        let mark = self.cursor.position();

        if let Some(keyword) = self.keyword()? {
            let name = keyword.as_str();
            if name == "end" || (!valid.contains(&name) && stop.contains(&name)) {
                self.cursor.reset(mark);
                return Ok(None);
            }
            if valid.contains(&name) {
                debug!(keyword = name, line = mark.line, "keyword");
                return Ok(Some(Entry::Keyword(keyword)));
            }
            debug!(keyword = name, line = mark.line, "skipping keyword");
            self.skip_body();
            return Ok(Some(Entry::Skipped(keyword)));
        }

        Ok(self
            .param()?
            .map(|(name, value)| Entry::Param(name, value)))
    }

    /// `[words]`, canonicalized. Fails without consuming if no `[` is next.
    fn keyword(&mut self) -> Result<Option<String>> {
        if !self.cursor.eat('[') {
            return Ok(None);
        }
        let text = self
            .cursor
            .take_while(|c| c != ']' && c != '\n' && c != '\r');
        self.cursor.expect_char(']')?;
        let keyword = canonical_keyword(text);
        if keyword.is_empty() {
            return Err(self.cursor.expected("keyword name"));
        }
        self.cursor.skip_inline_space();
        Ok(Some(keyword))
    }

    fn expect_keyword(&mut self, name: &str, display: &str) -> Result<()> {
        self.cursor.skip_ignored();
        let mark = self.cursor.position();
        match self.keyword()? {
            Some(keyword) if keyword == name => Ok(()),
            _ => {
                self.cursor.reset(mark);
                Err(self.cursor.expected(display))
            }
        }
    }

    /// A column-one `name value` or `name = value` line.
    fn param(&mut self) -> Result<Option<(String, Value)>> {
        if !self.cursor.at_line_start() {
            return Ok(None);
        }
        if !self.cursor.peek().map_or(false, |c| c.is_ascii_alphabetic()) {
            return Ok(None);
        }
        let name = self
            .cursor
            .take_while(|c| c.is_ascii_alphanumeric() || c == '_')
            .to_lowercase();
        self.cursor.skip_inline_space();

        let value = if self.cursor.eat('=') {
            self.cursor.skip_inline_space();
            self.assigned_value()
        } else {
            self.bare_value()
        };
        trace!(name = %name, value = %value, "parameter");
        Ok(Some((name, value)))
    }

    /// `= value`: a lone number, else the rest of the line.
    ///
    /// A leading number with an unknown suffix (`3rd party`) is text here.
    fn assigned_value(&mut self) -> Value {
        let mark = self.cursor.position();
        if let Ok(Some(x)) = self.cursor.try_number() {
            if self.at_value_end() {
                return Value::Number(x);
            }
        }
        self.cursor.reset(mark);
        Value::Text(self.cursor.rest_of_line().to_string())
    }

    /// Bare value: typ/min/max, else a single name, else the rest of the line.
    fn bare_value(&mut self) -> Value {
        let mark = self.cursor.position();
        if let Ok(Some(t)) = try_typminmax(&mut self.cursor) {
            if self.at_value_end() {
                return Value::TypMinMax(t);
            }
        }
        self.cursor.reset(mark);

        let name = self.cursor.take_while(is_name_char);
        if !name.is_empty() && self.at_value_end() {
            return Value::Name(name.to_string());
        }
        self.cursor.reset(mark);
        Value::Text(self.cursor.rest_of_line().to_string())
    }

    fn at_value_end(&mut self) -> bool {
        self.cursor.skip_inline_space();
        self.cursor.at_line_end()
    }

    /// Skip a keyword's remaining line and every following line up to the next keyword.
    fn skip_body(&mut self) {
        self.cursor.line_remainder();
        loop {
            self.cursor.skip_ignored();
            if self.at_section_end() {
                break;
            }
            self.cursor.line_remainder();
        }
    }

    fn at_section_end(&self) -> bool {
        matches!(self.cursor.peek(), None | Some('['))
    }

    /// First token on the rest of the keyword line.
    fn header_token(&mut self, what: &str) -> Result<String> {
        let pos = self.cursor.position();
        match self.cursor.rest_of_line().split_whitespace().next() {
            Some(token) => Ok(token.to_string()),
            None => Err(IbisAmiError::syntax(pos, what, "end of line")),
        }
    }

    fn top_keyword(&mut self, keyword: &str, file: &mut IbisFile) -> Result<()> {
        match keyword {
            "model" => {
                let model = self.model()?;
                if file.models.contains_key(&model.name) {
                    file.diagnostics
                        .warn(format!("Model '{}' defined more than once", model.name));
                }
                file.models.insert(model.name.clone(), model);
            }
            "component" => {
                let component = self.component()?;
                if file.components.contains_key(&component.name) {
                    file.diagnostics
                        .warn(format!("Component '{}' defined more than once", component.name));
                }
                file.components.insert(component.name.clone(), component);
            }
            "model_selector" => {
                let selector = self.model_selector()?;
                file.model_selectors.insert(selector.name.clone(), selector);
            }
            "ibis_ver" => {
                file.ibis_ver = Some(self.cursor.number()?);
                self.cursor.rest_of_line();
            }
            "file_name" => file.file_name = Some(self.header_token("file name")?),
            "file_rev" => file.file_rev = Some(self.header_token("file revision")?),
            "date" => file.date = Some(self.cursor.rest_of_line().to_string()),
            "comment_char" => {
                let line = self.cursor.line_remainder().trim();
                let mut chars = line.chars();
                match (chars.next(), chars.as_str()) {
                    (Some(c), "_char") if !c.is_alphanumeric() => {
                        debug!(comment_char = %c, "comment character changed");
                        self.cursor.set_comment_char(c);
                    }
                    _ => file
                        .diagnostics
                        .warn(format!("Ignoring malformed [Comment Char] '{}'", line)),
                }
            }
            other => {
                self.skip_body();
                file.skipped.push(other.to_string());
            }
        }
        Ok(())
    }

    fn model(&mut self) -> Result<Model> {
        let name = self.header_token("model name")?;
        let mut model = Model::new(name);

        while let Some(entry) = self.node(&MODEL_KEYWORDS, &IBIS_KEYWORDS)? {
            match entry {
                Entry::Keyword(keyword) => match keyword.as_str() {
                    "pulldown" => model.pulldown = Some(self.iv_table()?),
                    "pullup" => model.pullup = Some(self.iv_table()?),
                    "gnd_clamp" => model.gnd_clamp = Some(self.iv_table()?),
                    "power_clamp" => model.power_clamp = Some(self.iv_table()?),
                    "ramp" => model.ramp = Some(self.ramp()?),
                    "algorithmic_model" => model.algorithmic_model = Some(self.algorithmic_model()?),
                    "voltage_range" => model.voltage_range = Some(self.range_value()?),
                    "temperature_range" => model.temperature_range = Some(self.range_value()?),
                    _ => self.skip_body(),
                },
                Entry::Skipped(keyword) => trace!(model = %model.name, keyword = %keyword, "skipped"),
                Entry::Param(name, value) => {
                    model.params.insert(name, value);
                }
            }
        }

        model.model_type = model
            .param("model_type")
            .and_then(Value::as_str)
            .map(ModelType::from_name);
        model.c_comp = model.param("c_comp").and_then(Value::as_typminmax);
        Ok(model)
    }

    fn range_value(&mut self) -> Result<TypMinMax> {
        self.cursor.skip_ignored();
        let value = typminmax(&mut self.cursor)?;
        self.cursor.rest_of_line();
        Ok(value)
    }

    /// Rows of `voltage typ [min max]`.
    fn iv_table(&mut self) -> Result<Vec<IvRow>> {
        let mut rows = Vec::new();
        loop {
            self.cursor.skip_ignored();
            let Some(voltage) = self.cursor.try_number()? else {
                break;
            };
            self.cursor.skip_inline_space();
            let current = typminmax(&mut self.cursor)?;
            if !self.at_value_end() {
                return Err(self.cursor.expected("end of I-V row"));
            }
            rows.push(IvRow { voltage, current });
        }
        if rows.is_empty() {
            return Err(self.cursor.expected("I-V table row"));
        }
        Ok(rows)
    }

    fn ramp(&mut self) -> Result<Ramp> {
        let mut rising = None;
        let mut falling = None;
        let mut r_load = None;

        loop {
            self.cursor.skip_ignored();
            let mark = self.cursor.position();
            if self.cursor.eat_ignore_case("dV/dt_") {
                let slot = match self.cursor.advance() {
                    Some('r') | Some('R') => &mut rising,
                    Some('f') | Some('F') => &mut falling,
                    _ => {
                        self.cursor.reset(mark);
                        return Err(self.cursor.expected("dV/dt_r or dV/dt_f"));
                    }
                };
                if slot.is_some() {
                    self.cursor.reset(mark);
                    return Err(self.cursor.expected("one dV/dt row per edge"));
                }
                *slot = Some(SlewRate::from_ratios(&self.ratio_row()?));
                continue;
            }
            match self.param()? {
                Some((name, value)) if name == "r_load" => r_load = value.as_f64(),
                _ => {
                    self.cursor.reset(mark);
                    break;
                }
            }
        }

        match (rising, falling) {
            (Some(rising), Some(falling)) => Ok(Ramp {
                rising,
                falling,
                r_load,
            }),
            _ => Err(self.cursor.expected("dV/dt_r and dV/dt_f rows")),
        }
    }

    /// One to three ratios on the current line.
    fn ratio_row(&mut self) -> Result<Vec<Option<f64>>> {
        let mut rates = Vec::new();
        while !self.at_value_end() {
            if rates.len() == 3 {
                return Err(self.cursor.expected("end of dV/dt row"));
            }
            rates.push(ratio(&mut self.cursor)?);
        }
        if rates.is_empty() {
            return Err(self.cursor.expected("slew-rate ratio"));
        }
        Ok(rates)
    }

    fn algorithmic_model(&mut self) -> Result<Vec<Executable>> {
        let mut executables = Vec::new();
        loop {
            self.cursor.skip_ignored();
            if self.at_section_end() {
                break;
            }
            let pos = self.cursor.position();
            let line = self.cursor.rest_of_line();
            executables.push(executable(line, pos)?);
        }
        if executables.is_empty() {
            return Err(self.cursor.expected("Executable line"));
        }
        self.expect_keyword("end_algorithmic_model", "[End Algorithmic Model]")?;
        self.cursor.rest_of_line();
        Ok(executables)
    }

    fn component(&mut self) -> Result<Component> {
        let pos = self.cursor.position();
        let name = self.cursor.rest_of_line();
        if name.is_empty() {
            return Err(IbisAmiError::syntax(pos, "component name", "end of line"));
        }
        let mut component = Component {
            name: name.to_string(),
            ..Default::default()
        };

        while let Some(entry) = self.node(&COMPONENT_KEYWORDS, &IBIS_KEYWORDS)? {
            match entry {
                Entry::Keyword(keyword) => match keyword.as_str() {
                    "manufacturer" => {
                        component.manufacturer = Some(self.cursor.rest_of_line().to_string())
                    }
                    "package" => component.package = self.package()?,
                    "pin" => component.pins = self.pins()?,
                    _ => self.skip_body(),
                },
                Entry::Skipped(keyword) => {
                    trace!(component = %component.name, keyword = %keyword, "skipped")
                }
                Entry::Param(name, value) => {
                    component.params.insert(name, value);
                }
            }
        }
        Ok(component)
    }

    /// Rows of `R_pkg|L_pkg|C_pkg typ [min max]`.
    fn package(&mut self) -> Result<Package> {
        let mut package = Package::default();
        let mut seen = 0;
        loop {
            self.cursor.skip_ignored();
            if !self.cursor.peek().map_or(false, |c| c.is_ascii_alphabetic()) {
                break;
            }
            let name = self
                .cursor
                .take_while(|c| c.is_ascii_alphanumeric() || c == '_')
                .to_lowercase();
            self.cursor.skip_inline_space();
            seen += 1;

            let slot = match name.as_str() {
                "r_pkg" => &mut package.r_pkg,
                "l_pkg" => &mut package.l_pkg,
                "c_pkg" => &mut package.c_pkg,
                other => {
                    debug!(param = other, "ignoring package parameter");
                    self.cursor.rest_of_line();
                    continue;
                }
            };
            *slot = Some(typminmax(&mut self.cursor)?);
            if !self.at_value_end() {
                return Err(self.cursor.expected("end of package row"));
            }
        }
        if seen == 0 {
            return Err(self.cursor.expected("package parameter"));
        }
        Ok(package)
    }

    fn pins(&mut self) -> Result<IndexMap<String, Pin>> {
        let header_pos = self.cursor.position();
        let header: Vec<&str> = self.cursor.rest_of_line().split_whitespace().collect();
        let columns = pin_columns(&header)
            .ok_or_else(|| IbisAmiError::syntax(header_pos, "'signal_name model_name' headers", header.join(" ")))?;

        let mut pins = IndexMap::new();
        loop {
            self.cursor.skip_ignored();
            if self.at_section_end() {
                break;
            }
            let pos = self.cursor.position();
            let tokens: Vec<&str> = self.cursor.rest_of_line().split_whitespace().collect();
            let [name, signal, model, values @ ..] = tokens.as_slice() else {
                return Err(IbisAmiError::syntax(pos, "pin row 'pin signal model'", tokens.join(" ")));
            };
            if self.filter_supply_pins && SUPPLY_MODELS.iter().any(|s| s.eq_ignore_ascii_case(model)) {
                trace!(pin = %name, model = %model, "dropping supply pin");
                continue;
            }
            let rlc = pin_rlc(&columns, values, pos)?;
            pins.insert(
                name.to_string(),
                Pin {
                    name: name.to_string(),
                    signal_name: signal.to_string(),
                    model_name: model.to_string(),
                    rlc,
                },
            );
        }
        Ok(pins)
    }

    fn model_selector(&mut self) -> Result<ModelSelector> {
        let name = self.header_token("model selector name")?;
        let mut entries = Vec::new();
        loop {
            self.cursor.skip_ignored();
            if self.at_section_end() {
                break;
            }
            let line = self.cursor.rest_of_line();
            let (model, description) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            entries.push(SelectorEntry {
                model_name: model.to_string(),
                description: description.trim().to_string(),
            });
        }
        if entries.is_empty() {
            return Err(self.cursor.expected("model selector entry"));
        }
        Ok(ModelSelector { name, entries })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '(' | ')' | '#' | '-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RlcColumn {
    R,
    L,
    C,
}

/// Optional R/L/C columns after `signal_name model_name`.
fn pin_columns(header: &[&str]) -> Option<Vec<RlcColumn>> {
    let [signal, model, rest @ ..] = header else {
        return None;
    };
    if !signal.eq_ignore_ascii_case("signal_name") || !model.eq_ignore_ascii_case("model_name") {
        return None;
    }
    rest.iter()
        .map(|col| match col.to_ascii_lowercase().as_str() {
            "r_pin" => Some(RlcColumn::R),
            "l_pin" => Some(RlcColumn::L),
            "c_pin" => Some(RlcColumn::C),
            _ => None,
        })
        .collect()
}

fn pin_rlc(columns: &[RlcColumn], values: &[&str], pos: Position) -> Result<Option<PinRlc>> {
    if columns.is_empty() || values.is_empty() {
        return Ok(None);
    }
    let mut rlc = PinRlc::default();
    for (column, text) in columns.iter().zip(values) {
        let value = if text.eq_ignore_ascii_case("NA") {
            None
        } else {
            Some(parse_value(text).map_err(|_| IbisAmiError::syntax(pos, "pin R/L/C value", *text))?)
        };
        match column {
            RlcColumn::R => rlc.r_pin = value,
            RlcColumn::L => rlc.l_pin = value,
            RlcColumn::C => rlc.c_pin = value,
        }
    }
    Ok(Some(rlc))
}

/// `Executable <os>_<compiler>_<bits> <library> <parameter file>`
fn executable(line: &str, pos: Position) -> Result<Executable> {
    let bad = || {
        IbisAmiError::syntax(
            pos,
            "'Executable <os>_<compiler>_<32|64> <library> <parameter file>'",
            line,
        )
    };
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [keyword, platform, library, parameter_file] = parts.as_slice() else {
        return Err(bad());
    };
    if !keyword.eq_ignore_ascii_case("Executable") {
        return Err(bad());
    }
    let (os, rest) = platform.split_once('_').ok_or_else(bad)?;
    let (compiler, bits) = rest.rsplit_once('_').unwrap_or(("", rest));
    let bits = match bits {
        "32" => 32,
        "64" => 64,
        _ => return Err(bad()),
    };
    Ok(Executable {
        os: os.to_lowercase(),
        compiler: compiler.to_string(),
        bits,
        library: library.to_string(),
        parameter_file: parameter_file.to_string(),
    })
}
