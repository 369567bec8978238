// src/sites/load.rs
// =============================================================================
// This module reads the site list: a small comma-separated file with one
// `name,url` pair per row.
//
//   # comment lines and blank lines are ignored
//   name,url                      <- optional header row
//   GitHub,https://github.com/$
//   "Acme, Inc.",https://acme.example/users/$
//
// Any problem here is fatal for the run: a bad list means no checks start.
// =============================================================================

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::Site;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The file is missing or unreadable
    #[error("could not read site list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row that is not a `name,url` pair
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

// Reads and parses the site list at `path`.
pub async fn load_sites(path: &Path) -> Result<Vec<Site>, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let sites = parse_sites(&content)?;
    let fixed = sites.iter().filter(|site| !site.has_placeholder()).count();
    debug!(
        path = %path.display(),
        count = sites.len(),
        without_placeholder = fixed,
        "loaded site list"
    );
    Ok(sites)
}

// Parses site-list text. Line numbers in errors are 1-based.
pub fn parse_sites(content: &str) -> Result<Vec<Site>, LoadError> {
    // Spreadsheet exports often start with a byte-order mark
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut sites = Vec::new();
    let mut seen_row = false;

    for (index, line) in content.lines().enumerate() {
        let line_num = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = split_row(trimmed).map_err(|reason| LoadError::MalformedRow {
            line: line_num,
            reason,
        })?;

        // The header is only recognised as the first real row
        let first_row = !seen_row;
        seen_row = true;
        if first_row && is_header(&fields) {
            continue;
        }

        let field_count = fields.len();
        let [name, url]: [String; 2] = fields.try_into().map_err(|_| LoadError::MalformedRow {
            line: line_num,
            reason: format!("expected 2 fields (name,url), found {}", field_count),
        })?;

        if name.is_empty() {
            return Err(LoadError::MalformedRow {
                line: line_num,
                reason: "site name is empty".to_string(),
            });
        }
        if url.is_empty() {
            return Err(LoadError::MalformedRow {
                line: line_num,
                reason: format!("URL for '{}' is empty", name),
            });
        }

        sites.push(Site::new(name, url));
    }

    Ok(sites)
}

fn is_header(fields: &[String]) -> bool {
    matches!(fields, [name, url]
        if name.eq_ignore_ascii_case("name") && url.eq_ignore_ascii_case("url"))
}

// Splits one row on commas. A field wrapped in double quotes may contain
// commas, and `""` inside it stands for a single quote character.
fn split_row(row: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() && !quoted => {
                field.clear();
                quoted = true;
                in_quotes = true;
            }
            '"' => return Err("unexpected quote inside a field".to_string()),
            ',' => {
                fields.push(finish_field(field, quoted));
                field = String::new();
                quoted = false;
            }
            c if quoted && c.is_whitespace() => {}
            _ if quoted => return Err("text after a closing quote".to_string()),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(finish_field(field, quoted));
    Ok(fields)
}

fn finish_field(field: String, quoted: bool) -> String {
    if quoted {
        field
    } else {
        field.trim().to_string()
    }
}
