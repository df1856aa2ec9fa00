//! Semantic checks on a classified parameter tree.

use tracing::warn;

use super::param::{ParamType, Parameter, Usage};
use super::tree::{ParamGroup, ParamTree};
use crate::diagnostics::Diagnostics;
use crate::error::{IbisAmiError, Result};

/// Names defined by the IBIS-AMI standard for `Reserved_Parameters`.
pub const RESERVED_PARAM_NAMES: &[&str] = &[
    "AMI_Version",
    "Init_Returns_Impulse",
    "GetWave_Exists",
    "Use_Init_Output",
    "Max_Init_Aggressors",
    "Ignore_Bits",
    "Resolve_Exists",
    "Model_Name",
    "Special_Param_Names",
    "Component_Name",
    "Signal_Name",
    "Rx_Decision_Time",
    "DC_Offset",
    "Rx_Use_Clock_Input",
    "Supporting_Files",
    "DLL_Path",
    "DLL_ID",
    "Ts4file",
    "Tx_V",
    "Tx_R",
    "Rx_R",
    "Tx_Jitter",
    "Tx_DCD",
    "Tx_Rj",
    "Tx_Dj",
    "Tx_Sj",
    "Tx_Sj_Frequency",
    "Rx_DCD",
    "Rx_Rj",
    "Rx_Dj",
    "Rx_Sj",
    "Rx_Clock_PDF",
    "Rx_Clock_Recovery_Mean",
    "Rx_Clock_Recovery_Rj",
    "Rx_Clock_Recovery_Dj",
    "Rx_Clock_Recovery_Sj",
    "Rx_Clock_Recovery_DCD",
    "Rx_Receiver_Sensitivity",
    "Rx_Noise",
    "Rx_GaussianNoise",
    "Rx_UniformNoise",
    "Modulation",
    "Modulation_Levels",
    "PAM4_Mapping",
    "PAM4_UpperThreshold",
    "PAM4_CenterThreshold",
    "PAM4_LowerThreshold",
    "PAM4_UpperEyeOffset",
    "PAM4_CenterEyeOffset",
    "PAM4_LowerEyeOffset",
    "Repeater_Type",
    "BCI_Protocol",
    "BCI_ID",
    "BCI_State",
    "BCI_Message_Interval_UI",
    "BCI_Training_UI",
    "BCI_Training_Mode",
];

pub const RESERVED_GROUP: &str = "Reserved_Parameters";
pub const MODEL_SPECIFIC_GROUP: &str = "Model_Specific";

/// The two required top-level groups, after checking.
#[derive(Debug)]
pub struct ValidatedGroups {
    pub reserved: ParamGroup,
    pub model_specific: ParamGroup,
}

/// Check the root group of a parameter file.
///
/// Missing `Reserved_Parameters` or `Model_Specific` is fatal. Everything
/// else is reported through `diags`.
pub fn validate_root(mut root: ParamGroup, diags: &mut Diagnostics) -> Result<ValidatedGroups> {
    for name in root.entries.keys() {
        if name != RESERVED_GROUP && name != MODEL_SPECIFIC_GROUP {
            diags.warn(format!("Unrecognized group with label: '{}'", name));
        }
    }

    let reserved = take_group(&mut root, RESERVED_GROUP)?;
    let model_specific = take_group(&mut root, MODEL_SPECIFIC_GROUP)?;
    check_reserved(&reserved, diags);

    for d in diags.iter() {
        warn!("{}", d);
    }
    Ok(ValidatedGroups {
        reserved,
        model_specific,
    })
}

fn take_group(root: &mut ParamGroup, name: &str) -> Result<ParamGroup> {
    match root.entries.shift_remove(name) {
        Some(ParamTree::Group(group)) => Ok(group),
        Some(ParamTree::Param(_)) => Err(IbisAmiError::malformed_ami(format!(
            "'{}' must be a parameter group",
            name
        ))),
        None => Err(IbisAmiError::malformed_ami(format!(
            "Required group '{}' not found",
            name
        ))),
    }
}

fn check_reserved(reserved: &ParamGroup, diags: &mut Diagnostics) {
    for (name, entry) in reserved.iter() {
        if !RESERVED_PARAM_NAMES.contains(&name.as_str()) {
            diags.warn(format!(
                "Unrecognized reserved parameter name '{}', found in parameter definitions string",
                name
            ));
        }
        if matches!(entry, ParamTree::Group(_)) {
            diags.warn(format!("Reserved parameter '{}' is a group", name));
        }
    }

    match reserved.param("AMI_Version") {
        Some(p) if p.usage == Usage::Info && p.param_type == ParamType::String => {}
        Some(_) => diags.warn("Reserved parameter 'AMI_Version' should be of usage Info and type String"),
        None => diags.warn("Reserved parameter 'AMI_Version' not found"),
    }

    for required in ["Init_Returns_Impulse", "GetWave_Exists"] {
        match reserved.param(required) {
            Some(p) => check_boolean(p, diags),
            None => diags.error(format!("Reserved parameter '{}' not found", required)),
        }
    }
}

fn check_boolean(param: &Parameter, diags: &mut Diagnostics) {
    if param.param_type != ParamType::Boolean {
        diags.warn(format!(
            "Reserved parameter '{}' should be of type Boolean, found {}",
            param.name, param.param_type
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ami::parser::parse_expr;
    use crate::ami::tree::build_group;
    use crate::config::ParseConfig;

    fn root(text: &str) -> ParamGroup {
        let node = parse_expr(text, &ParseConfig::default()).unwrap();
        let mut diags = Diagnostics::new();
        let group = build_group(&node, &mut diags);
        assert!(diags.is_empty(), "{}", diags);
        group
    }

    #[test]
    fn test_missing_required_group() {
        let group = root("(m (Reserved_Parameters (AMI_Version (Usage Info) (Type String) (Value \"5.1\"))))");
        let mut diags = Diagnostics::new();
        let err = validate_root(group, &mut diags).unwrap_err();
        assert!(matches!(err, IbisAmiError::MalformedAmiFile { ref message } if message.contains("Model_Specific")));
    }

    #[test]
    fn test_reserved_findings() {
        let group = root(
            "(m
                (Reserved_Parameters
                    (Init_Returns_Impulse (Usage Info) (Type Integer) (Value 1))
                    (Frobnicate (Usage Info) (Type Boolean) (Value True)))
                (Model_Specific (x (Usage In) (Type Float) (Value 1)))
                (Extra (y (Usage In) (Type Float) (Value 1))))",
        );
        let mut diags = Diagnostics::new();
        let groups = validate_root(group, &mut diags).unwrap();
        assert_eq!(groups.model_specific.len(), 1);

        let text = diags.to_string();
        assert!(text.contains("WARNING: Unrecognized group with label: 'Extra'"));
        assert!(text.contains("'Frobnicate'"));
        assert!(text.contains("'AMI_Version' not found"));
        assert!(text.contains("'Init_Returns_Impulse' should be of type Boolean"));
        assert!(text.contains("ERROR: Reserved parameter 'GetWave_Exists' not found"));
        assert_eq!(diags.errors().count(), 1);
    }
}
