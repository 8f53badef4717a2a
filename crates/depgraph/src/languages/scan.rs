//! Shared lexical scanning helpers for the line-based parsers.

use crate::error::{DepgraphError, Result};
use crate::path::AbsolutePath;
use crate::reader::ContentReader;

/// Read a source file through the content reader, mapping failures to the
/// build-fatal `ContentUnavailable` kind. Invalid UTF-8 is replaced rather
/// than rejected; the scanners only act on ASCII syntax.
pub(crate) fn read_source(reader: &dyn ContentReader, path: &AbsolutePath) -> Result<String> {
    let bytes = reader
        .read(path)
        .map_err(|source| DepgraphError::ContentUnavailable {
            path: path.clone(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Remove `//` and `/* */` comments from a single line, with `in_block`
/// carrying block-comment state between lines. Leading whitespace is
/// preserved; the result is right-trimmed. String literals are not
/// interpreted.
pub(crate) fn strip_c_comments_line(raw: &str, in_block: &mut bool) -> String {
    let mut line = raw.to_string();

    if *in_block {
        match line.find("*/") {
            Some(end) => {
                line = line[end + 2..].to_string();
                *in_block = false;
            }
            None => return String::new(),
        }
    }

    while let Some(start) = line.find("/*") {
        match line[start + 2..].find("*/") {
            Some(end) => {
                let rest = line[start + 2 + end + 2..].to_string();
                line = format!("{}{rest}", &line[..start]);
            }
            None => {
                line = line[..start].to_string();
                *in_block = true;
                break;
            }
        }
    }

    if let Some(idx) = line.find("//") {
        line = line[..idx].to_string();
    }

    line.trim_end().to_string()
}

/// Strip C-style comments from a whole source, one entry per input line.
pub(crate) fn strip_c_style_comments(source: &str) -> Vec<String> {
    let mut in_block = false;
    source
        .lines()
        .map(|raw| strip_c_comments_line(raw, &mut in_block))
        .collect()
}

/// Strip `#` line comments, one right-trimmed entry per input line.
pub(crate) fn strip_hash_comments(source: &str) -> Vec<String> {
    source
        .lines()
        .map(|raw| {
            let line = match raw.find('#') {
                Some(idx) => &raw[..idx],
                None => raw,
            };
            line.trim_end().to_string()
        })
        .collect()
}

/// Blank out quoted string literal contents (single, double, backtick),
/// honoring backslash escapes, so identifier scans skip literal text.
pub(crate) fn strip_string_literals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                    out.push(q);
                }
            }
            None => {
                if c == '"' || c == '\'' || c == '`' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }

    out
}

/// Identifier tokens in a line, paired with whether the token directly
/// follows a `.` (selector position).
pub(crate) fn identifier_tokens(line: &str) -> Vec<(String, bool)> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() {
                let c = bytes[i] as char;
                if c.is_ascii_alphanumeric() || c == '_' {
                    i += 1;
                } else {
                    break;
                }
            }
            let after_dot = start > 0 && bytes[start - 1] == b'.';
            tokens.push((line[start..i].to_string(), after_dot));
        } else {
            i += 1;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let source = "using A; // trailing\n/* block\nstill block\nend */ using B;\nusing C;";
        let lines = strip_c_style_comments(source);
        assert_eq!(lines, vec!["using A;", "", "", " using B;", "using C;"]);
    }

    #[test]
    fn strips_inline_block_comments() {
        let lines = strip_c_style_comments("import /* inline */ foo.Bar");
        assert_eq!(lines, vec!["import  foo.Bar"]);
    }

    #[test]
    fn preserves_indentation() {
        let lines = strip_c_style_comments("    indented // note");
        assert_eq!(lines, vec!["    indented"]);
    }

    #[test]
    fn strips_hash_comments_per_line() {
        let lines = strip_hash_comments("import os  # stdlib\nx = 1");
        assert_eq!(lines, vec!["import os", "x = 1"]);
    }

    #[test]
    fn blanks_string_literal_contents() {
        assert_eq!(
            strip_string_literals(r#"call("IgnoreMe", other)"#),
            r#"call("", other)"#
        );
        assert_eq!(strip_string_literals(r#"s := "a \" b"; x"#), r#"s := ""; x"#);
    }

    #[test]
    fn tokenizes_identifiers_with_selector_flags() {
        let tokens = identifier_tokens("fmt.Println(helper, x2)");
        assert_eq!(
            tokens,
            vec![
                ("fmt".to_string(), false),
                ("Println".to_string(), true),
                ("helper".to_string(), false),
                ("x2".to_string(), false),
            ]
        );
    }
}
