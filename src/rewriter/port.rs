//! Port declaration edits
//!
//! Line-level, format-preserving edits: only the port digits change, or a
//! single line is appended. Everything else in the file stays byte-for-byte.

use regex::Regex;
use std::ops::Range;

use crate::analyzer::manifest::NodeManifest;
use crate::analyzer::ports::port_span_in_script;
use crate::types::parse_port;

/// Result of editing a file's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub content: String,
    pub old_value: Option<String>,
}

/// Set `key` to `port` in an environment file, appending the key if absent.
///
/// `content` is `None` when the file does not exist yet. A file the env
/// parser rejects is an error: the scanner would never see the new value.
pub fn set_env_port(content: Option<&str>, key: &str, port: u16) -> Result<Edit, String> {
    let Some(content) = content else {
        return Ok(Edit {
            content: format!("{}={}\n", key, port),
            old_value: None,
        });
    };
    check_env_syntax(content)?;

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if let Some(span) = env_value_span(line, key) {
            let value = &line[span.clone()];
            if parse_port(value).is_none() {
                return Err(format!("{} has a non-port value '{}'", key, value));
            }

            let start = offset + span.start;
            let end = offset + span.end;
            let mut edited = String::with_capacity(content.len());
            edited.push_str(&content[..start]);
            edited.push_str(&port.to_string());
            edited.push_str(&content[end..]);

            return Ok(Edit {
                content: edited,
                old_value: Some(value.to_string()),
            });
        }
        offset += line.len();
    }

    let mut edited = content.to_string();
    if !edited.is_empty() && !edited.ends_with('\n') {
        edited.push('\n');
    }
    edited.push_str(&format!("{}={}\n", key, port));

    Ok(Edit {
        content: edited,
        old_value: None,
    })
}

/// Byte range of the (unquoted) value of `key` on an assignment line
fn env_value_span(line: &str, key: &str) -> Option<Range<usize>> {
    let indent = line.len() - line.trim_start().len();
    let mut pos = indent;
    let mut rest = &line[pos..];

    if let Some(after) = rest.strip_prefix("export")
        && after.starts_with([' ', '\t'])
    {
        let skipped = after.len() - after.trim_start().len();
        pos += "export".len() + skipped;
        rest = &line[pos..];
    }

    let after_key = rest.strip_prefix(key)?;
    let gap = after_key.len() - after_key.trim_start_matches([' ', '\t']).len();
    let after_gap = &after_key[gap..];
    let after_eq = after_gap.strip_prefix('=')?;
    pos += key.len() + gap + 1;

    let lead = after_eq.len() - after_eq.trim_start_matches([' ', '\t']).len();
    pos += lead;
    let value_part = &line[pos..];

    if let Some(quote) = value_part.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let inner = &value_part[1..];
        let len = inner.find(quote)?;
        return Some(pos + 1..pos + 1 + len);
    }

    let len = value_part
        .find(|c: char| c.is_whitespace() || c == '#')
        .unwrap_or(value_part.len());
    Some(pos..pos + len)
}

/// Replace the port flag inside a package.json script, e.g. `scripts.dev`
pub fn set_script_port(content: &str, key: &str, port: u16) -> Result<Edit, String> {
    let manifest = NodeManifest::parse(content).map_err(|e| format!("invalid JSON: {}", e))?;

    let name = key
        .strip_prefix("scripts.")
        .ok_or_else(|| format!("unsupported manifest key '{}'", key))?;
    let script = manifest
        .script(name)
        .ok_or_else(|| format!("script '{}' not found", name))?;
    let span = port_span_in_script(script)
        .ok_or_else(|| format!("script '{}' has no port flag", name))?;

    let old_value = script[span.clone()].to_string();
    let mut new_script = String::with_capacity(script.len());
    new_script.push_str(&script[..span.start]);
    new_script.push_str(&port.to_string());
    new_script.push_str(&script[span.end..]);

    let encode = |s: &str| serde_json::to_string(s).map_err(|e| e.to_string());
    let pattern = format!(
        r#""{}"\s*:\s*{}"#,
        regex::escape(name),
        regex::escape(&encode(script)?)
    );
    let re = Regex::new(&pattern).map_err(|e| e.to_string())?;
    let found = re
        .find(content)
        .ok_or_else(|| format!("script '{}' is not written in a form that can be edited", name))?;

    let old_literal = encode(script)?;
    let new_literal = encode(&new_script)?;
    let literal_start = found.end() - old_literal.len();

    let mut edited = String::with_capacity(content.len() + 2);
    edited.push_str(&content[..literal_start]);
    edited.push_str(&new_literal);
    edited.push_str(&content[found.end()..]);

    Ok(Edit {
        content: edited,
        old_value: Some(old_value),
    })
}

fn check_env_syntax(content: &str) -> Result<(), String> {
    for item in dotenvy::from_read_iter(content.as_bytes()) {
        item.map_err(|e| format!("invalid env file: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_preserves_surroundings() {
        let content = "# dev settings\nDEBUG=1\nexport PORT=\"3000\" # web\nSECRET=x\n";
        let edit = set_env_port(Some(content), "PORT", 3001).unwrap();
        assert_eq!(
            edit.content,
            "# dev settings\nDEBUG=1\nexport PORT=\"3001\" # web\nSECRET=x\n"
        );
        assert_eq!(edit.old_value.as_deref(), Some("3000"));
    }

    #[test]
    fn test_key_prefix_does_not_match() {
        let content = "PORTAL=1\nVITE_PORT = 5173\n";
        let edit = set_env_port(Some(content), "VITE_PORT", 5174).unwrap();
        assert_eq!(edit.content, "PORTAL=1\nVITE_PORT = 5174\n");

        let appended = set_env_port(Some(content), "PORT", 3001).unwrap();
        assert_eq!(appended.content, "PORTAL=1\nVITE_PORT = 5173\nPORT=3001\n");
        assert_eq!(appended.old_value, None);
    }

    #[test]
    fn test_append_without_trailing_newline() {
        let edit = set_env_port(Some("DEBUG=1"), "PORT", 8001).unwrap();
        assert_eq!(edit.content, "DEBUG=1\nPORT=8001\n");
    }

    #[test]
    fn test_create_missing_file() {
        let edit = set_env_port(None, "PORT", 3001).unwrap();
        assert_eq!(edit.content, "PORT=3001\n");
    }

    #[test]
    fn test_crlf_line() {
        let edit = set_env_port(Some("PORT=3000\r\nX=1\r\n"), "PORT", 3005).unwrap();
        assert_eq!(edit.content, "PORT=3005\r\nX=1\r\n");
    }

    #[test]
    fn test_unparseable_env_is_error() {
        let err = set_env_port(Some("SECRET='x\n"), "PORT", 8001).unwrap_err();
        assert!(err.starts_with("invalid env file"));
    }

    #[test]
    fn test_non_numeric_value_is_error() {
        let err = set_env_port(Some("PORT=${APP_PORT}\n"), "PORT", 3001).unwrap_err();
        assert!(err.contains("non-port"));
    }

    #[test]
    fn test_script_port_edit() {
        let content = "{\n  \"name\": \"web\",\n  \"scripts\": {\n    \"dev\": \"next dev -p 3000\",\n    \"build\": \"next build\"\n  }\n}\n";
        let edit = set_script_port(content, "scripts.dev", 3001).unwrap();
        assert_eq!(
            edit.content,
            "{\n  \"name\": \"web\",\n  \"scripts\": {\n    \"dev\": \"next dev -p 3001\",\n    \"build\": \"next build\"\n  }\n}\n"
        );
        assert_eq!(edit.old_value.as_deref(), Some("3000"));
    }

    #[test]
    fn test_script_port_edit_invalid_json() {
        let err = set_script_port("{ \"scripts\": ", "scripts.dev", 3001).unwrap_err();
        assert!(err.starts_with("invalid JSON"));
    }

    #[test]
    fn test_script_without_flag() {
        let err = set_script_port(r#"{"scripts": {"dev": "vite"}}"#, "scripts.dev", 5174).unwrap_err();
        assert!(err.contains("no port flag"));
    }
}
