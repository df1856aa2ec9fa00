//! Structural checks on a parsed model-format file.

use tracing::warn;

use super::types::{IbisFile, Model, ModelType};
use crate::diagnostics::Diagnostics;
use crate::error::{IbisAmiError, Result};

/// Validate a parsed file in place.
///
/// Checks:
/// - At least one component and one model
/// - Every model declares `Model_type`
/// - Output and I/O models carry pulldown, pullup and ramp data
/// - Input models carry at least one clamp table
///
/// Missing voltage ranges and pins naming unknown models are reported as
/// warnings in `file.diagnostics`.
pub fn validate_ibis(file: &mut IbisFile) -> Result<()> {
    if file.components.is_empty() {
        return Err(IbisAmiError::malformed_ibis("This IBIS model has no components!"));
    }
    if file.models.is_empty() {
        return Err(IbisAmiError::malformed_ibis("This IBIS model has no models!"));
    }

    let mut diags = Diagnostics::new();
    for model in file.models.values() {
        check_model(model, &mut diags)?;
    }

    for component in file.components.values() {
        for pin in component.pins.values() {
            let known = file.models.contains_key(&pin.model_name)
                || file.model_selectors.contains_key(&pin.model_name);
            if !known {
                diags.warn(format!(
                    "Pin '{}' of component '{}' refers to unknown model '{}'",
                    pin.name, component.name, pin.model_name
                ));
            }
        }
    }

    for selector in file.model_selectors.values() {
        for entry in &selector.entries {
            if !file.models.contains_key(&entry.model_name) {
                diags.warn(format!(
                    "Model selector '{}' lists unknown model '{}'",
                    selector.name, entry.model_name
                ));
            }
        }
    }

    for d in diags.iter() {
        warn!("{}", d);
    }
    file.diagnostics.extend(diags);
    Ok(())
}

fn check_model(model: &Model, diags: &mut Diagnostics) -> Result<()> {
    let missing = |what: &str| {
        IbisAmiError::malformed_ibis(format!("Model '{}' has no {}!", model.name, what))
    };

    let model_type = model.model_type.as_ref().ok_or_else(|| missing("model type"))?;
    match model_type {
        ModelType::Output | ModelType::InOut => {
            if model.pulldown.is_none() || model.pullup.is_none() {
                return Err(missing("I-V curves"));
            }
            if model.ramp.is_none() {
                return Err(missing("ramp values"));
            }
        }
        ModelType::Input => {
            if model.gnd_clamp.is_none() && model.power_clamp.is_none() {
                return Err(missing("clamp values"));
            }
        }
        ModelType::Other(_) => {}
    }

    if model.voltage_range.is_none() {
        diags.warn(format!("Model '{}' has no voltage range", model.name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;
    use crate::ibis::parser::IbisParser;

    const COMPONENT: &str = "[Component] c\n[Manufacturer] acme\n[Package]\nR_pkg 0.1\n[Pin] signal_name model_name\n1 sig m\n";

    fn parse(models: &str) -> IbisFile {
        let text = format!("{}{}[End]\n", COMPONENT, models);
        IbisParser::new(&text, &ParseConfig::default()).parse().unwrap()
    }

    fn message(err: IbisAmiError) -> String {
        match err {
            IbisAmiError::MalformedIbisFile { message } => message,
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_no_components() {
        let text = "[Model] m\nModel_type Input\n[GND Clamp]\n0.0 0.0\n1.0 1.0m\n[End]\n";
        let mut file = IbisParser::new(text, &ParseConfig::default()).parse().unwrap();
        assert!(message(validate_ibis(&mut file).unwrap_err()).contains("no components"));
    }

    #[test]
    fn test_no_models() {
        let mut file = parse("");
        assert!(message(validate_ibis(&mut file).unwrap_err()).contains("no models"));
    }

    #[test]
    fn test_missing_model_type_reported_first() {
        let mut file = parse("[Model] m\nC_comp 1p\n");
        let msg = message(validate_ibis(&mut file).unwrap_err());
        assert!(msg.contains("model type"), "{}", msg);
    }

    #[test]
    fn test_output_requires_ramp() {
        let mut file = parse(
            "[Model] m\nModel_type Output\n[Voltage Range] 1.0\n[Pulldown]\n0.0 0.0\n1.0 20m\n[Pullup]\n0.0 0.0\n1.0 -20m\n",
        );
        assert!(message(validate_ibis(&mut file).unwrap_err()).contains("ramp"));
    }

    #[test]
    fn test_input_requires_clamp() {
        let mut file = parse("[Model] m\nModel_type Input\n");
        assert!(message(validate_ibis(&mut file).unwrap_err()).contains("clamp"));
    }

    #[test]
    fn test_advisory_findings() {
        let mut file = parse("[Model] m\nModel_type Input\n[Power Clamp]\n0.0 0.0\n1.0 1.0m\n[Model] other\nModel_type Terminator\n");
        file.components["c"].pins["1"].model_name = "missing".to_string();
        validate_ibis(&mut file).unwrap();

        let text = file.diagnostics.to_string();
        assert!(text.contains("Model 'm' has no voltage range"));
        assert!(text.contains("unknown model 'missing'"));
        assert!(!file.diagnostics.has_errors());
    }
}
