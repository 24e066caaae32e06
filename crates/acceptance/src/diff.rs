//! Structural diff of JSON documents.

use serde_json::Value as Json;

/// Every difference between `expected` and `actual`, one line each, as
/// `path: description`. Empty when the documents are equal.
///
/// Objects are compared key by key in sorted order. Arrays are compared element by element,
/// so list order matters.
pub fn diff(expected: &Json, actual: &Json) -> Vec<String> {
    let mut out = Vec::new();
    walk("$", expected, actual, &mut out);
    out
}

fn walk(path: &str, expected: &Json, actual: &Json, out: &mut Vec<String>) {
    match (expected, actual) {
        (Json::Object(e), Json::Object(a)) => {
            let mut keys: Vec<&String> = e.keys().collect();
            keys.sort();
            for k in keys {
                let ev = &e[k.as_str()];
                let p = format!("{path}.{k}");
                match a.get(k) {
                    Some(av) => walk(&p, ev, av, out),
                    None => out.push(format!("{p}: missing, expected {ev}")),
                }
            }
            let mut extra: Vec<&String> = a.keys().filter(|k| !e.contains_key(*k)).collect();
            extra.sort();
            for k in extra {
                out.push(format!("{path}.{k}: unexpected {}", a[k.as_str()]));
            }
        }
        (Json::Array(e), Json::Array(a)) => {
            if e.len() != a.len() {
                out.push(format!(
                    "{path}: expected {} element(s), got {}: {actual}",
                    e.len(),
                    a.len()
                ));
                return;
            }
            for (i, (ev, av)) in e.iter().zip(a).enumerate() {
                walk(&format!("{path}[{i}]"), ev, av, out);
            }
        }
        (e, a) if e == a => {}
        (e, a) => out.push(format!("{path}: expected {e}, got {a}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_documents_have_no_diff() {
        let doc = json!({"A": [1, {"B": "x"}], "C": null});
        assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn reports_paths_of_every_difference() {
        let expected = json!({"Bucket": "b", "ACL": "private", "Tags": ["a", "b"]});
        let actual = json!({"Bucket": "c", "Tags": ["a", "x"], "Extra": 1});
        assert_eq!(
            diff(&expected, &actual),
            vec![
                "$.ACL: missing, expected \"private\"",
                "$.Bucket: expected \"b\", got \"c\"",
                "$.Tags[1]: expected \"b\", got \"x\"",
                "$.Extra: unexpected 1",
            ]
        );
    }

    #[test]
    fn list_length_mismatch_is_one_line() {
        let out = diff(&json!({"Ids": ["a"]}), &json!({"Ids": ["a", "b"]}));
        assert_eq!(out, vec!["$.Ids: expected 1 element(s), got 2: [\"a\",\"b\"]"]);
    }
}
