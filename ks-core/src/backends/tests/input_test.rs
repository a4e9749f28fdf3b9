use super::*;

#[rstest]
#[case::weight("prod=50", "prod", 50, false, false)]
#[case::percentage("prod=50%", "prod", 50, false, true)]
#[case::plus("canary=+10%", "canary", 10, true, true)]
#[case::minus("canary=-15", "canary", -15, true, false)]
#[case::dotted("web.v2=0", "web.v2", 0, false, false)]
fn test_parse(
    #[case] token: &str,
    #[case] name: &str,
    #[case] value: i32,
    #[case] relative: bool,
    #[case] percentage: bool,
) {
    assert_eq!(BackendInput::parse(token).unwrap(), BackendInput { name: name.into(), value, relative, percentage });
}

#[rstest]
#[case::no_weight("prod")]
#[case::no_name("=10")]
#[case::not_a_number("prod=ten")]
#[case::trailing("prod=10%%")]
#[case::overflow("prod=99999999999")]
fn test_parse_invalid(#[case] token: &str) {
    let err = BackendInput::parse(token).unwrap_err();
    assert!(err.to_string().starts_with("invalid argument"));
}

#[rstest]
#[case::zero_and_equal(
    BackendTransform { zero: true, equal: true, ..Default::default() },
    "you may specify at most one of --zero, --equal, or --adjust"
)]
#[case::zero_with_inputs(
    BackendTransform { zero: true, inputs: vec![BackendInput::parse("a=1").unwrap()], ..Default::default() },
    "--zero and --equal may not be combined with backend weights"
)]
#[case::adjust_two(
    BackendTransform {
        adjust: true,
        inputs: vec![BackendInput::parse("a=1").unwrap(), BackendInput::parse("b=1").unwrap()],
        ..Default::default()
    },
    "--adjust requires exactly one NAME=WEIGHT argument"
)]
#[case::adjust_none(
    BackendTransform { adjust: true, ..Default::default() },
    "--adjust requires exactly one NAME=WEIGHT argument"
)]
#[case::adjust_percentage_too_big(adjust("a=+150%"), "a: relative percentages must be between -100% and 100%")]
#[case::adjust_weight_too_big(adjust("a=300"), "a: weight must be between 0 and 256")]
#[case::set_relative(
    BackendTransform { inputs: vec![BackendInput::parse("a=+1").unwrap()], ..Default::default() },
    "a: relative weights may only be used with --adjust"
)]
#[case::set_duplicate(
    BackendTransform {
        inputs: vec![BackendInput::parse("a=1").unwrap(), BackendInput::parse("a=2").unwrap()],
        ..Default::default()
    },
    "a: backend specified more than once"
)]
#[case::set_percentage_too_big(
    BackendTransform { inputs: vec![BackendInput::parse("a=101%").unwrap()], ..Default::default() },
    "a: weight must be between 0% and 100%"
)]
#[case::set_mixed(
    BackendTransform {
        inputs: vec![BackendInput::parse("a=30").unwrap(), BackendInput::parse("b=70%").unwrap()],
        ..Default::default()
    },
    "cannot mix percentage weights with non-percentage weights"
)]
#[case::set_mixed_percentage_first(
    BackendTransform {
        inputs: vec![BackendInput::parse("a=30%").unwrap(), BackendInput::parse("b=70").unwrap()],
        ..Default::default()
    },
    "cannot mix percentage weights with non-percentage weights"
)]
fn test_validate_invalid(#[case] transform: BackendTransform, #[case] expected: &str) {
    let err = transform.validate().unwrap_err();
    assert_eq!(err.to_string(), expected);
}

#[rstest]
#[case::print(BackendTransform::default())]
#[case::zero(BackendTransform { zero: true, ..Default::default() })]
#[case::adjust(adjust("canary=-10%"))]
#[case::set(BackendTransform {
    inputs: vec![BackendInput::parse("a=256").unwrap(), BackendInput::parse("b=0").unwrap()],
    ..Default::default()
})]
#[case::set_percentages(BackendTransform {
    inputs: vec![BackendInput::parse("a=30%").unwrap(), BackendInput::parse("b=70%").unwrap()],
    ..Default::default()
})]
fn test_validate_ok(#[case] transform: BackendTransform) {
    assert_ok!(transform.validate());
}

#[rstest]
fn test_is_print_only() {
    assert!(BackendTransform::default().is_print_only());
    assert!(!adjust("a=1").is_print_only());
}
