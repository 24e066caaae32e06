//! Compile-time content handling: reading file-typed parameters and
//! expanding `{{ .AWLESS.name }}` placeholders.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Error;

const VAR_PREFIX: &str = ".AWLESS.";

/// Replace every `{{ .AWLESS.name }}` in `text`. Other `{{ … }}` blocks
/// are left untouched; an unknown name is an error.
pub fn expand_variables(text: &str, vars: &BTreeMap<String, String>) -> Result<String, Error> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        let inner = rest[start + 2..start + len].trim();
        out.push_str(&rest[..start]);
        match inner.strip_prefix(VAR_PREFIX) {
            Some(name) => match vars.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(Error::Compile(format!(
                        "unknown template variable '{}'",
                        name
                    )))
                }
            },
            None => out.push_str(&rest[start..start + len + 2]),
        }
        rest = &rest[start + len + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Load a file-typed parameter.
///
/// Inline content (starting with `#` once trimmed, e.g. a shebang) is used
/// as is with `\n`, `\t` and `\r` escapes decoded. `http…` values are
/// fetched. Anything else is a local path.
pub fn read_file_param(value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.starts_with('#') {
        return Ok(decode_escapes(trimmed));
    }
    if trimmed.starts_with("http") {
        debug!(url = trimmed, "fetching file param");
        return fetch(trimmed);
    }
    std::fs::read_to_string(trimmed)
        .map_err(|e| Error::Io(format!("cannot read file '{}': {}", trimmed, e)))
}

fn fetch(url: &str) -> Result<String, Error> {
    let agent = ureq::Agent::new_with_defaults();
    let response = agent
        .get(url)
        .call()
        .map_err(|e| Error::Io(format!("cannot fetch '{}': {}", url, e)))?;
    response
        .into_body()
        .read_to_string()
        .map_err(|e| Error::Io(format!("cannot read body of '{}': {}", url, e)))
}

fn decode_escapes(s: &str) -> String {
    s.replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\r", "\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expands_known_variables() {
        let out = expand_variables(
            "#!/bin/sh\necho {{ .AWLESS.name }} > /tmp/{{.AWLESS.file}}",
            &vars(&[("name", "web"), ("file", "id")]),
        )
        .unwrap();
        assert_eq!(out, "#!/bin/sh\necho web > /tmp/id");
    }

    #[test]
    fn leaves_foreign_blocks_alone() {
        let src = "value={{ .Other }} {{ unterminated";
        assert_eq!(expand_variables(src, &vars(&[])).unwrap(), src);
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let err = expand_variables("{{ .AWLESS.nope }}", &vars(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "compile error: unknown template variable 'nope'"
        );
    }

    #[test]
    fn inline_content_decodes_escapes() {
        assert_eq!(
            read_file_param("  #!/bin/bash\\ntouch /tmp/x").unwrap(),
            "#!/bin/bash\ntouch /tmp/x"
        );
    }

    #[test]
    fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sh");
        std::fs::write(&path, "echo hi").unwrap();
        assert_eq!(read_file_param(path.to_str().unwrap()).unwrap(), "echo hi");
        let err = read_file_param("/no/such/userdata").unwrap_err();
        assert!(err.to_string().starts_with("io error: cannot read file"));
    }
}
