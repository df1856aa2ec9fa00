//! Quantities computed from parsed model data.

use super::types::{Executable, IbisFile, IvRow, Model, ModelType};

/// Stand-in for an infinite impedance when an I-V segment is flat.
pub const FLAT_SEGMENT_IMPEDANCE: f64 = 1e7;

/// Small-signal impedance of an I-V table, using typical currents.
///
/// The slope is taken over the segment ending at the first row whose
/// voltage reaches `vmeas`, or half the table's largest voltage when no
/// measurement voltage is given. Returns `None` for tables with fewer than
/// two rows or when no row reaches the target voltage.
pub fn iv_impedance(rows: &[IvRow], vmeas: Option<f64>) -> Option<f64> {
    if rows.len() < 2 {
        return None;
    }
    let target = match vmeas {
        Some(v) => v,
        None => rows.iter().map(|r| r.voltage).fold(f64::NEG_INFINITY, f64::max) / 2.0,
    };
    let ix = rows.iter().position(|r| r.voltage >= target)?.max(1);

    let dv = rows[ix].voltage - rows[ix - 1].voltage;
    let di = rows[ix].current.typ - rows[ix - 1].current.typ;
    if di == 0.0 {
        Some(FLAT_SEGMENT_IMPEDANCE)
    } else {
        Some((dv / di).abs())
    }
}

impl Model {
    /// Output impedance for drivers, input impedance for receivers.
    ///
    /// Drivers average the pulldown and pullup impedances. Receivers use
    /// the parallel combination of whichever clamps are present.
    pub fn impedance(&self) -> Option<f64> {
        let vmeas = self.vmeas();
        let table = |rows: &Option<Vec<IvRow>>| rows.as_deref().and_then(|r| iv_impedance(r, vmeas));

        match self.model_type.as_ref()? {
            ModelType::Output | ModelType::InOut => {
                Some((table(&self.pulldown)? + table(&self.pullup)?) / 2.0)
            }
            ModelType::Input => match (table(&self.gnd_clamp), table(&self.power_clamp)) {
                (Some(gc), Some(pc)) => Some(gc * pc / (gc + pc)),
                (Some(z), None) | (None, Some(z)) => Some(z),
                (None, None) => None,
            },
            ModelType::Other(_) => None,
        }
    }

    /// Mean typical edge rate of a driver, in V/ns.
    pub fn slew(&self) -> Option<f64> {
        match self.model_type.as_ref()? {
            ModelType::Output | ModelType::InOut => {
                let ramp = self.ramp.as_ref()?;
                Some((ramp.rising.typ? + ramp.falling.typ?) / 2e9)
            }
            _ => None,
        }
    }

    /// The executable built for `os` (case-insensitive) at the given word size.
    pub fn executable_for(&self, os: &str, bits: u8) -> Option<&Executable> {
        self.algorithmic_model
            .as_ref()?
            .iter()
            .find(|exe| exe.os.eq_ignore_ascii_case(os) && exe.bits == bits)
    }

    /// The executable matching the platform this crate was built for.
    pub fn host_executable(&self) -> Option<&Executable> {
        let bits = if cfg!(target_pointer_width = "64") { 64 } else { 32 };
        self.executable_for(std::env::consts::OS, bits)
    }
}

impl IbisFile {
    /// Candidate model names for a pin's model column.
    ///
    /// A model selector expands to its entries; a plain model name yields
    /// itself. Unknown names yield nothing.
    pub fn models_for(&self, name: &str) -> Vec<&str> {
        if let Some(selector) = self.model_selectors.get(name) {
            selector.entries.iter().map(|e| e.model_name.as_str()).collect()
        } else if let Some((key, _)) = self.models.get_key_value(name) {
            vec![key.as_str()]
        } else {
            Vec::new()
        }
    }
}
