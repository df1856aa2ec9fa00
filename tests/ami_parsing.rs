//! End-to-end tests for parameter-definition files.

use ibis_ami::ami::{ParamFormat, ParamTree, ParamType, ParamValue, Usage};
use ibis_ami::{parse_ami_string, IbisAmiError, ParseConfig};

const EXAMPLE_TX: &str = r#"(example_tx

    (Description "Example Tx model from ibisami package.")

    (Reserved_Parameters
         (AMI_Version
             (Usage Info )
             (Type String )
             (Value "5.1" )
             (Description "Version of IBIS standard we comply with." )
         )
         (Init_Returns_Impulse
             (Usage Info )
             (Type Boolean )
             (Value True )
             (Description "In fact, this model is, currently, Init-only." )
         )
         (GetWave_Exists
             (Usage Info )
             (Type Boolean )
             (Value True )
             (Description "This model is dual-mode, with GetWave() mimicking Init()." )
         )
    )
    (Model_Specific
         (tx_tap_units
             (Usage In )
             (Type Integer )
             (Range 27 6 27 )
             (Description "Total current available to FIR filter." )
         )
         (tx_tap_np1
             (Usage In )
             (Type Integer )
             (Range 0 0 10 )
             (Description "First (and only) pre-tap." )
         )
         (tx_tap_nm1
             (Usage In )
             (Type Integer )
             (Range 0 0 10 )
             (Description "First post-tap." )
         )
         (tx_tap_nm2
             (Usage In )
             (Type Integer )
             (Range 0 0 10 )
             (Description "Second post-tap." )
         )
    )

)
"#;

#[test]
fn test_example_tx() {
    let ami = parse_ami_string(EXAMPLE_TX).unwrap();
    assert_eq!(ami.message(), "");
    assert_eq!(ami.root_name, "example_tx");
    assert_eq!(
        ami.description.as_deref(),
        Some("Example Tx model from ibisami package.")
    );

    let names: Vec<&String> = ami.model_specific.entries.keys().collect();
    assert_eq!(names, vec!["tx_tap_units", "tx_tap_np1", "tx_tap_nm1", "tx_tap_nm2"]);

    let units = ami.model_specific.param("tx_tap_units").unwrap();
    assert_eq!(units.usage, Usage::In);
    assert_eq!(units.param_type, ParamType::Integer);
    assert_eq!(units.default, Some(ParamValue::Int(27)));
    assert_eq!(
        units.format,
        Some(ParamFormat::Range {
            min: ParamValue::Int(6),
            max: ParamValue::Int(27),
        })
    );

    for tap in ["tx_tap_np1", "tx_tap_nm1", "tx_tap_nm2"] {
        let p = ami.model_specific.param(tap).unwrap();
        assert_eq!(p.current_value, Some(ParamValue::Int(0)));
        assert_eq!(
            p.format,
            Some(ParamFormat::Range {
                min: ParamValue::Int(0),
                max: ParamValue::Int(10),
            })
        );
    }

    let version = ami.reserved.param("AMI_Version").unwrap();
    assert_eq!(version.current_value, Some(ParamValue::Str("5.1".to_string())));
    assert_eq!(ami.returns_impulse(), Some(true));
    assert_eq!(ami.getwave_exists(), Some(true));
}

const EVERY_FORMAT: &str = r#"(example_rx
    (Description "Receiver with one parameter of each format.")
    (Reserved_Parameters
        (AMI_Version (Usage Info) (Type String) (Value "7.0"))
        (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
        (GetWave_Exists (Usage Info) (Type Boolean) (Value False)))
    (Model_Specific
        (gain (Usage In) (Type Float) (Value 1.0) (Default 2.0))
        (mode (Usage In) (Type Integer) (List 0 1 2) (List_Tip "off" "fixed" "adaptive") (Default 2))
        (vswing (Usage In) (Type Float) (Corner 0.8 0.7 0.9))
        (offset (Usage InOut) (Type Float) (Range -0.1 0.1) (Default 0.0))
        (levels (Usage In) (Type Integer) (Steps 4 2 8 2))
        (delay (Usage In) (Type UI) (Increment 0.0 0.5 0.125))
        (label (Usage Info) (Type String) (Value "rx v1"))
        (ctle
            (Description "Continuous-time equalizer")
            (enable (Usage In) (Type Boolean) (Value True))
            (stage1 (peaking (Usage In) (Type Float) (Range 3.0 0.0 12.0))))
        (dfe
            (-1 (Usage In) (Type Tap) (Range 0.0 -0.2 0.2))
            (0 (Usage In) (Type Tap) (Range 1.0 0.5 1.0))
            (1 (Usage In) (Type Tap) (Range -0.1 -0.5 0.5)))
        (status (Usage Out) (Type String))))"#;

fn assert_round_trips(text: &str) {
    let ami = parse_ami_string(text).unwrap();
    assert_eq!(ami.message(), "");
    let again = parse_ami_string(&ami.to_ami_string()).unwrap();

    assert_eq!(again.message(), "");
    assert_eq!(again.root_name, ami.root_name);
    assert_eq!(again.description, ami.description);
    assert_eq!(again.reserved, ami.reserved);
    assert_eq!(again.model_specific, ami.model_specific);
}

#[test]
fn test_round_trip() {
    assert_round_trips(EXAMPLE_TX);
}

#[test]
fn test_round_trip_every_format() {
    assert_round_trips(EVERY_FORMAT);

    let ami = parse_ami_string(EVERY_FORMAT).unwrap();
    let gain = ami.model_specific.param("gain").unwrap();
    assert_eq!(gain.default, Some(ParamValue::Float(2.0)));
    assert_eq!(
        ami.fetch_param_value(&["Model_Specific", "ctle", "stage1", "peaking"])
            .unwrap(),
        Some(&ParamValue::Float(3.0))
    );
    assert_eq!(
        ami.model_specific.group("ctle").unwrap().description.as_deref(),
        Some("Continuous-time equalizer")
    );
    let dfe: Vec<&String> = ami.model_specific.group("dfe").unwrap().entries.keys().collect();
    assert_eq!(dfe, vec!["pre1", "post0", "post1"]);
    assert_eq!(
        ami.model_specific.param("offset").unwrap().default,
        Some(ParamValue::Float(0.0))
    );
    match &ami.model_specific.param("mode").unwrap().format {
        Some(ParamFormat::List { options, tips }) => {
            assert_eq!(options.len(), 3);
            assert_eq!(tips, &vec!["off", "fixed", "adaptive"]);
        }
        other => panic!("expected a list format, got {:?}", other),
    }
}

#[test]
fn test_input_params_string() {
    let mut ami = parse_ami_string(EXAMPLE_TX).unwrap();
    ami.set_param_value(&["Model_Specific", "tx_tap_nm1"], ParamValue::Int(3))
        .unwrap();
    assert_eq!(
        ami.serialize_input_params(),
        "(example_tx (tx_tap_units 27) (tx_tap_np1 0) (tx_tap_nm1 3) (tx_tap_nm2 0))"
    );
}

#[test]
fn test_bad_branch_is_dropped_with_diagnostic() {
    let text = r#"(m
        (Reserved_Parameters
            (AMI_Version (Usage Info) (Type String) (Value "7.0"))
            (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
            (GetWave_Exists (Usage Info) (Type Boolean) (Value True)))
        (Model_Specific
            (good (Usage In) (Type Float) (Value 1.5))
            (bad (Usage Sideways) (Type Float) (Value 1.5))
            (taps
                (-1 (Usage In) (Type Tap) (Range 0.0 -0.5 0.5))
                (0 (Usage In) (Type Tap) (Range 1.0 0.5 1.0)))))"#;
    let ami = parse_ami_string(text).unwrap();

    assert!(ami.diagnostics.has_errors());
    assert!(ami.message().contains("bad"));
    assert!(ami.model_specific.get("bad").is_none());
    assert!(ami.model_specific.param("good").is_some());

    let taps = ami.model_specific.group("taps").unwrap();
    let labels: Vec<&String> = taps.entries.keys().collect();
    assert_eq!(labels, vec!["pre1", "post0"]);
    assert!(matches!(taps.get("post0"), Some(ParamTree::Param(_))));
}

#[test]
fn test_syntax_error_reports_position() {
    let err = parse_ami_string("(m\n  (Reserved_Parameters\n").unwrap_err();
    match err {
        IbisAmiError::Syntax { line, .. } => assert_eq!(line, 3),
        other => panic!("expected syntax error, got {}", other),
    }
}

#[test]
fn test_missing_model_specific_is_fatal() {
    let text = r#"(m (Reserved_Parameters
        (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
        (GetWave_Exists (Usage Info) (Type Boolean) (Value True))))"#;
    assert!(matches!(
        parse_ami_string(text),
        Err(IbisAmiError::MalformedAmiFile { .. })
    ));
}

#[test]
fn test_custom_comment_char() {
    let text = "(m # trailing note\n (Reserved_Parameters (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True)) (GetWave_Exists (Usage Info) (Type Boolean) (Value False)))\n (Model_Specific (gain (Usage In) (Type Float) (Value 2))))";
    let config = ParseConfig::new().with_comment_char('#');
    let ami = ibis_ami::ami::parse_ami_string_with(text, &config).unwrap();
    assert_eq!(ami.getwave_exists(), Some(false));
    assert_eq!(
        ami.fetch_param_value(&["Model_Specific", "gain"]).unwrap(),
        Some(&ParamValue::Float(2.0))
    );
}
