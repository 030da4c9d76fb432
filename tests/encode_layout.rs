use dynyaml::{
    CodecContext, EmitError, EncodeOptions, Expression, LineBreak, Mapping, Value, Vector, encode,
    to_fmt_writer, to_io_writer, to_string, to_string_with_options,
};
use indoc::indoc;

fn map_of(pairs: Vec<(&str, Value)>) -> Value {
    Value::Map(pairs.into_iter().collect())
}

#[test]
fn scalars_at_the_root() {
    assert_eq!(to_string(&Value::Null).unwrap(), "~\n");
    assert_eq!(to_string(&Value::bool(true)).unwrap(), "yes\n");
    assert_eq!(to_string(&Value::bool(false)).unwrap(), "no\n");
    assert_eq!(to_string(&Value::Bool(None)).unwrap(), ".na\n");
    assert_eq!(to_string(&Value::int(-3)).unwrap(), "-3\n");
    assert_eq!(to_string(&Value::Int(None)).unwrap(), ".na.integer\n");
    assert_eq!(to_string(&Value::float(f64::INFINITY)).unwrap(), ".inf\n");
    assert_eq!(to_string(&Value::float(f64::NEG_INFINITY)).unwrap(), "-.inf\n");
    assert_eq!(to_string(&Value::Float(None)).unwrap(), ".na.real\n");
    assert_eq!(to_string(&Value::Str(None)).unwrap(), ".na.character\n");
    assert_eq!(to_string(&Value::float(2.0)).unwrap(), "2.0\n");
}

#[test]
fn strings_that_look_typed_are_single_quoted() {
    let value = Value::Seq(vec![
        Value::from("123"),
        Value::from("no"),
        Value::from("~"),
        Value::from(""),
        Value::from("0x1F"),
        Value::from("plain"),
    ]);
    assert_eq!(
        to_string(&value).unwrap(),
        "- '123'\n- 'no'\n- '~'\n- ''\n- '0x1F'\n- plain\n"
    );
}

#[test]
fn nested_document_layout() {
    let value = map_of(vec![
        ("name", Value::from("demo")),
        (
            "ports",
            Value::Vector(Vector::Int(vec![Some(8080), Some(8081)])),
        ),
        (
            "servers",
            Value::Seq(vec![
                map_of(vec![("host", Value::from("a")), ("up", Value::bool(true))]),
                map_of(vec![("host", Value::from("b")), ("up", Value::bool(false))]),
            ]),
        ),
        ("note", Value::from("line 1\nline 2\n")),
        ("empty", Value::Seq(vec![])),
    ]);
    let expected = indoc! {"
        name: demo
        ports:
        - 8080
        - 8081
        servers:
        - host: a
          up: yes
        - host: b
          up: no
        note: |
          line 1
          line 2
        empty: []
    "};
    assert_eq!(to_string(&value).unwrap(), expected);
}

#[test]
fn length_one_vectors_are_sequences() {
    let value = map_of(vec![("one", Value::Vector(Vector::Str(vec![Some("x".into())])))]);
    assert_eq!(to_string(&value).unwrap(), "one:\n- x\n");
}

#[test]
fn indentation_options() {
    let value = map_of(vec![
        ("list", Value::Vector(Vector::Int(vec![Some(1), Some(2)]))),
        ("map", map_of(vec![("k", Value::from("v"))])),
    ]);
    let options = dynyaml::encode_options! {
        indent: 4,
        indent_sequences_under_maps: true,
    };
    let expected = indoc! {"
        list:
            - 1
            - 2
        map:
            k: v
    "};
    assert_eq!(encode(&value, &options).unwrap(), expected);
}

#[test]
fn line_breaks() {
    let value = map_of(vec![("a", Value::int(1)), ("b", Value::from("x\ny"))]);
    let crlf = dynyaml::encode_options! { line_break: LineBreak::CrLf };
    assert_eq!(encode(&value, &crlf).unwrap(), "a: 1\r\nb: |-\r\n  x\r\n  y\r\n");
    let cr = dynyaml::encode_options! { line_break: LineBreak::Cr };
    assert_eq!(encode(&value, &cr).unwrap(), "a: 1\rb: |-\r  x\r  y\r");
}

#[test]
fn unicode_can_be_escaped() {
    let value = Value::from("café");
    assert_eq!(to_string(&value).unwrap(), "café\n");
    let ascii = dynyaml::encode_options! { allow_unicode: false };
    assert_eq!(encode(&value, &ascii).unwrap(), "\"caf\\xE9\"\n");
}

#[test]
fn float_precision() {
    let value = Value::Vector(Vector::Float(vec![Some(3.14159265), Some(1234567.0), Some(0.000012345)]));
    let options = dynyaml::encode_options! { precision: 3 };
    assert_eq!(encode(&value, &options).unwrap(), "- 3.14\n- 1.23e+06\n- 1.23e-05\n");
    assert_eq!(
        to_string(&value).unwrap(),
        "- 3.14159265\n- 1234567.0\n- 1.2345e-05\n"
    );
}

#[test]
fn invalid_options_are_rejected_before_output() {
    let value = Value::int(1);
    for options in [
        dynyaml::encode_options! { indent: 0 },
        dynyaml::encode_options! { precision: 0 },
        dynyaml::encode_options! { precision: 23 },
    ] {
        let err = encode(&value, &options).unwrap_err();
        assert!(matches!(err, EmitError::InvalidOptions(_)), "{err}");
    }
}

#[test]
fn omap_output() {
    let value = map_of(vec![("b", Value::int(1)), ("a", Value::int(2))]);
    let options = dynyaml::encode_options! { use_omap: true };
    assert_eq!(encode(&value, &options).unwrap(), "!omap\n- b: 1\n- a: 2\n");
}

#[test]
fn expressions_are_tagged_literals() {
    let value = map_of(vec![(
        "f",
        Value::Expr(Expression::new("function(x) {\n    x + 1\n}")),
    )]);
    assert_eq!(
        to_string(&value).unwrap(),
        "f: !expr |-\n  function(x) {\n  x + 1\n  }\n"
    );
}

#[test]
fn unsupported_values_leave_the_sink_untouched() {
    let value = Value::Seq(vec![Value::int(1), Value::BadAnchor]);
    let mut out = String::from("before\n");
    let err = to_fmt_writer(&mut out, &value, &EncodeOptions::default(), &CodecContext::default())
        .unwrap_err();
    assert!(matches!(err, EmitError::UnsupportedValue { .. }));
    assert_eq!(out, "before\n");

    let mut bytes = Vec::new();
    assert!(to_io_writer(&mut bytes, &value, &EncodeOptions::default(), &CodecContext::default()).is_err());
    assert!(bytes.is_empty());
}

#[test]
fn writers_receive_the_whole_document() {
    let value = map_of(vec![("k", Value::from("v"))]);
    let mut out = String::new();
    to_fmt_writer(&mut out, &value, &EncodeOptions::default(), &CodecContext::default()).unwrap();
    let mut bytes = Vec::new();
    to_io_writer(&mut bytes, &value, &EncodeOptions::default(), &CodecContext::default()).unwrap();
    assert_eq!(out, "k: v\n");
    assert_eq!(bytes, b"k: v\n");
}

#[test]
fn non_string_and_complex_keys() {
    let mut map = Mapping::new();
    map.insert(1, "one");
    map.insert(Value::Vector(Vector::Int(vec![Some(1), Some(2)])), "pair");
    let text = to_string_with_options(&Value::Map(map), &EncodeOptions::default(), &CodecContext::default())
        .unwrap();
    assert_eq!(text, "1: one\n? - 1\n  - 2\n: pair\n");
}
