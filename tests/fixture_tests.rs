#[cfg(test)]
mod tests {
    use koml::{load, load_str, Array, Symbol, Table, Value};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn read(path: &Path) -> Vec<u8> {
        fs::read(path).unwrap_or_else(|err| panic!("failed to read {}: {}", path.display(), err))
    }

    /// Every valid fixture loads, prints and reloads to the same table.
    #[rstest]
    fn valid_fixture_round_trips(#[files("tests/fixtures/*.koml")] path: PathBuf) {
        let table = load(&read(&path)).unwrap_or_else(|err| panic!("{}: {}", path.display(), err));
        assert!(!table.is_empty(), "{} declared nothing", path.display());

        let printed = table.to_string();
        let reloaded = load_str(&printed).unwrap_or_else(|err| panic!("reloading {}: {}", path.display(), err));
        assert_eq!(reloaded, table);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json.as_object().map(|o| o.len()), Some(table.len()));
    }

    /// Invalid fixtures open with `|expect <Kind> <line>:<column>|`.
    #[rstest]
    fn invalid_fixture_fails_where_expected(#[files("tests/fixtures/invalid/*.koml")] path: PathBuf) {
        let source = read(&path);
        let header = String::from_utf8_lossy(&source);
        let expected = header
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("|expect "))
            .and_then(|line| line.strip_suffix('|'))
            .unwrap_or_else(|| panic!("{} has no expectation header", path.display()));

        let err = load(&source).expect_err("fixture should not load");
        let actual = format!("{:?} {}:{}", err.kind(), err.line(), err.column());
        assert_eq!(actual, expected, "{}\n{}", path.display(), err);
    }

    #[test]
    fn server_fixture_contents() {
        let table = load(&read(Path::new("tests/fixtures/server.koml"))).unwrap();
        assert_eq!(table.get_string("server:host"), Some("localhost"));
        assert_eq!(
            table.get_array("server:fallback_ports"),
            Some(&Array::Integer(vec![8081, 8082, 8083]))
        );
        assert_eq!(table.get_float("limits:per_connection"), Some(8080.0));
        assert_eq!(table.get_integer("limits:timeout_floor"), Some(2));
    }

    #[test]
    fn arrays_fixture_contents() {
        let table = load(&read(Path::new("tests/fixtures/arrays.koml"))).unwrap();
        assert_eq!(
            table.get_array("copies:primes"),
            Some(&Array::Float(vec![2.0, 3.0, 5.0, 7.0, 11.0]))
        );
        assert_eq!(table.get_array("copies:weights"), Some(&Array::Integer(vec![0, -1, 3])));
        assert_eq!(table.get_array("copies:names"), table.get_array("names"));
        assert_eq!(table.get_array("nothing").map(Array::len), Some(0));
    }

    #[test]
    fn comments_fixture_contents() {
        let table = load(&read(Path::new("tests/fixtures/comments.koml"))).unwrap();
        assert_eq!(table.get_integer("answer"), Some(42));
        assert_eq!(table.get_string("quoted"), Some("beforeafter"));
        assert_eq!(table.get_boolean("done"), Some(true));
    }

    // ========================================================================
    // Properties
    // ========================================================================

    fn name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_.-]{0,10}"
    }

    fn text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _.,;:@=\\[\\]-]{0,16}"
    }

    fn float() -> impl Strategy<Value = f32> {
        -1.0e9f32..1.0e9f32
    }

    fn array() -> impl Strategy<Value = Array> {
        prop_oneof![
            prop::collection::vec(any::<i32>(), 0..6).prop_map(Array::Integer),
            prop::collection::vec(float(), 0..6).prop_map(Array::Float),
            prop::collection::vec(text(), 0..6).prop_map(Array::String),
            prop::collection::vec(any::<bool>(), 0..6).prop_map(Array::Boolean),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i32>().prop_map(Value::Integer),
            float().prop_map(Value::Float),
            text().prop_map(Value::String),
            any::<bool>().prop_map(Value::Boolean),
            array().prop_map(Value::Array),
        ]
    }

    fn table() -> impl Strategy<Value = Table> {
        prop::collection::btree_map(name(), value(), 0..12).prop_map(|symbols| {
            let mut table = Table::new();
            for (name, value) in symbols {
                table.insert(Symbol::new(name, value)).unwrap();
            }
            table
        })
    }

    proptest! {
        #[test]
        fn integer_literals_load_exactly(n in any::<i32>()) {
            let table = load_str(&format!("i n = {};", n)).unwrap();
            prop_assert_eq!(table.get_integer("n"), Some(n));
        }

        #[test]
        fn float_reference_truncates(x in float()) {
            let table = load_str(&format!("f x = {}; i y = @x;", Value::Float(x))).unwrap();
            prop_assert_eq!(table.get_integer("y"), Some(x as i32));
        }

        #[test]
        fn integer_reference_promotes(n in any::<i32>()) {
            let table = load_str(&format!("i n = {}; f y = @n;", n)).unwrap();
            prop_assert_eq!(table.get_float("y"), Some(n as f32));
        }

        #[test]
        fn printed_tables_reload_equal(table in table()) {
            let printed = table.to_string();
            let reloaded = load_str(&printed).unwrap();
            prop_assert_eq!(reloaded, table);
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = load(&bytes);
        }
    }
}
