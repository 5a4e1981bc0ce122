//! Template rendering with variable substitution

use crate::error::{MailerError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Placeholder key to substitution value
pub type ReplacementMap = HashMap<String, String>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Renders email templates by substituting variables
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Read a UTF-8 template from disk and render it
    ///
    /// # Errors
    /// Returns [`MailerError::TemplateRead`] if the file is missing, unreadable
    /// or not valid UTF-8. Unresolved placeholders are never an error.
    pub fn render_file<P: AsRef<Path>>(path: P, vars: &ReplacementMap) -> Result<String> {
        let path = path.as_ref();
        let template = std::fs::read_to_string(path)
            .map_err(|e| MailerError::TemplateRead(format!("{}: {}", path.display(), e)))?;

        Ok(Self::render(&template, vars))
    }

    /// Render a string with variable substitution
    ///
    /// Every `{{key}}` whose key is in `vars` is replaced, everywhere it
    /// appears. Placeholders without a value are left exactly as written.
    /// Substituted values are copied verbatim and never scanned again.
    pub fn render(template: &str, vars: &ReplacementMap) -> String {
        let longest_key = match vars.keys().map(String::len).max() {
            Some(len) => len,
            None => return template.to_string(),
        };

        let mut result = String::with_capacity(template.len());
        let mut pos = 0;
        // Position of the first "}}" at or after the current key start;
        // reused until the scan moves past it.
        let mut close: Option<usize> = None;

        while let Some(offset) = template[pos..].find(OPEN) {
            let start = pos + offset;
            let key_start = start + OPEN.len();
            result.push_str(&template[pos..start]);

            if close.map_or(true, |end| end < key_start) {
                close = template[key_start..]
                    .find(CLOSE)
                    .map(|end| key_start + end);
            }

            let Some(end) = close else {
                // No closing braces left, nothing more can match
                pos = start;
                break;
            };

            let value = if end - key_start <= longest_key {
                vars.get(&template[key_start..end])
            } else {
                None
            };

            match value {
                Some(value) => {
                    result.push_str(value);
                    pos = end + CLOSE.len();
                }
                None => {
                    // Not a known placeholder: keep one brace and rescan from
                    // the next character so "{{{name}}}" still matches.
                    result.push('{');
                    pos = start + 1;
                }
            }
        }

        result.push_str(&template[pos..]);
        result
    }

    /// Extract all variable names from a template string
    ///
    /// Returns a sorted list of variable names found (without {{ }} markers)
    pub fn extract_variables(template_str: &str) -> Vec<String> {
        let mut variables = Vec::new();
        let mut rest = template_str;

        while let Some(start) = rest.find(OPEN) {
            let candidate = &rest[start + OPEN.len()..];
            match candidate.find(CLOSE) {
                Some(end) => {
                    let name = candidate[..end].trim_start_matches('{');
                    if !name.is_empty() {
                        variables.push(name.to_string());
                    }
                    rest = &candidate[end + CLOSE.len()..];
                }
                None => break,
            }
        }

        variables.sort();
        variables.dedup();
        variables
    }

    /// Placeholders in `template_str` that `vars` does not resolve
    pub fn unresolved_variables(template_str: &str, vars: &ReplacementMap) -> Vec<String> {
        Self::extract_variables(template_str)
            .into_iter()
            .filter(|name| !vars.contains_key(name))
            .collect()
    }
}
