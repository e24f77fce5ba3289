use serde_json::Value;

/// Resolve a dot-separated field path against a raw record.
///
/// Schema fallbacks elsewhere are expressed as ordered lists of these paths,
/// tried in order until one yields a value; each path lookup is pure and
/// independently testable.
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Resolve a path to a string value.
pub fn lookup_str<'a>(record: &'a Value, path: &str) -> Option<&'a str> {
    lookup(record, path).and_then(Value::as_str)
}

/// Try each path in order, returning the first string value found.
pub fn first_str_of<'a>(record: &'a Value, paths: &[&str]) -> Option<&'a str> {
    paths.iter().find_map(|path| lookup_str(record, path))
}

/// Try each path in order, returning the first non-empty array found.
pub fn first_array_of<'a>(record: &'a Value, paths: &[&str]) -> Option<&'a Vec<Value>> {
    paths.iter().find_map(|path| {
        lookup(record, path)
            .and_then(Value::as_array)
            .filter(|a| !a.is_empty())
    })
}
