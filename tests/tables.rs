use dynyaml::{EmitError, Factor, Table, Value, Vector, encode, from_str, to_string};
use indoc::indoc;

fn sample() -> Table {
    Table::new(vec![
        ("id".to_owned(), Value::Vector(Vector::Int(vec![Some(1), Some(2)]))),
        (
            "level".to_owned(),
            Value::Factor(Factor::new(
                vec!["low".into(), "yes".into()],
                vec![Some(0), Some(1)],
            )),
        ),
        (
            "score".to_owned(),
            Value::Vector(Vector::Float(vec![Some(0.5), None])),
        ),
    ])
}

#[test]
fn rows_by_default() {
    let expected = indoc! {"
        - id: 1
          level: low
          score: 0.5
        - id: 2
          level: 'yes'
          score: .na.real
    "};
    assert_eq!(to_string(&Value::Table(sample())).unwrap(), expected);
}

#[test]
fn columns_when_asked() {
    let options = dynyaml::encode_options! { column_major: true };
    let expected = indoc! {"
        id:
        - 1
        - 2
        level:
        - low
        - 'yes'
        score:
        - 0.5
        - .na.real
    "};
    assert_eq!(encode(&Value::Table(sample()), &options).unwrap(), expected);
}

#[test]
fn row_output_decodes_to_row_maps() {
    let text = to_string(&Value::Table(sample())).unwrap();
    let rows = from_str(&text).unwrap();
    let rows = rows.as_seq().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("level"), Some(&Value::from("yes")));
    assert_eq!(rows[1].get("score"), Some(&Value::Float(None)));
}

#[test]
fn empty_tables_are_written_as_columns() {
    let table = Table::new(vec![("id".to_owned(), Value::Vector(Vector::Int(vec![])))]);
    assert_eq!(to_string(&Value::Table(table)).unwrap(), "id: []\n");
}

#[test]
fn ragged_columns_are_rejected() {
    let table = Table::new(vec![
        ("a".to_owned(), Value::Vector(Vector::Int(vec![Some(1)]))),
        ("b".to_owned(), Value::Vector(Vector::Int(vec![Some(1), Some(2)]))),
    ]);
    let err = to_string(&Value::Table(table)).unwrap_err();
    assert!(matches!(err, EmitError::UnsupportedValue { .. }));
    assert!(err.to_string().contains("columns of unequal length"));
}

#[test]
fn factors_write_their_labels() {
    let factor = Factor::new(vec!["a b".into(), "123".into()], vec![Some(1), None, Some(0)]);
    assert_eq!(
        to_string(&Value::Factor(factor)).unwrap(),
        "- '123'\n- .na.character\n- a b\n"
    );
}
