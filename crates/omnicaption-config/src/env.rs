use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Failure while expanding `{{ env.VAR }}` placeholders
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExpandError {
    /// Placeholder names a variable that is unset and has no default
    #[error("line {line}: environment variable not found: `{name}`")]
    MissingVar { line: usize, name: String },

    /// Placeholder is not scoped with `env.`
    #[error("line {line}: only variables scoped with 'env.' are supported: `{key}`")]
    UnsupportedScope { line: usize, key: String },
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `{{ env.NAME }}` or `{{ env.NAME | default("value") }}`
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// `{{ env.VAR | default("fallback") }}` substitutes the fallback when the
/// variable is unset. Comment lines are left untouched so a disabled setting
/// may reference variables that do not exist.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    let lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| expand_line(index + 1, line))
        .collect::<Result<Vec<_>, _>>()?;

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(line_no: usize, line: &str) -> Result<String, ExpandError> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_owned());
    }

    let mut failure = None;

    let expanded = placeholder().replace_all(line, |caps: &Captures<'_>| {
        match resolve(line_no, &caps[1], caps.get(2).map(|m| m.as_str())) {
            Ok(value) => value,
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                }
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(line: usize, key: &str, default: Option<&str>) -> Result<String, ExpandError> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(ExpandError::UnsupportedScope {
            line,
            key: key.to_owned(),
        });
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => Err(ExpandError::MissingVar {
            line,
            name: name.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[api]\nbase_url = \"http://localhost:8001\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_set_variable() {
        temp_env::with_var("CAPTION_HOST", Some("captions.internal"), || {
            let result = expand_env("base_url = \"https://{{ env.CAPTION_HOST }}\"").unwrap();
            assert_eq!(result, "base_url = \"https://captions.internal\"");
        });
    }

    #[test]
    fn substitutes_several_variables_on_several_lines() {
        let vars = [("CAPTION_SCHEME", Some("https")), ("CAPTION_FILTER", Some("debug"))];
        temp_env::with_vars(vars, || {
            let raw = "a = \"{{ env.CAPTION_SCHEME }}://x\"\nb = \"{{env.CAPTION_FILTER}}\"";
            let result = expand_env(raw).unwrap();
            assert_eq!(result, "a = \"https://x\"\nb = \"debug\"");
        });
    }

    #[test]
    fn missing_variable_reports_name_and_line() {
        temp_env::with_var_unset("CAPTION_MISSING", || {
            let err = expand_env("[api]\nbase_url = \"{{ env.CAPTION_MISSING }}\"").unwrap_err();
            assert_eq!(
                err,
                ExpandError::MissingVar {
                    line: 2,
                    name: "CAPTION_MISSING".to_owned()
                }
            );
        });
    }

    #[test]
    fn rejects_keys_outside_env_scope() {
        let err = expand_env("key = \"{{ secrets.TOKEN }}\"").unwrap_err();
        assert!(matches!(err, ExpandError::UnsupportedScope { .. }));
        assert!(err.to_string().contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("CAPTION_MISSING", || {
            let input = "  # base_url = \"{{ env.CAPTION_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    const OPTIONAL_WITH_DEFAULT: &str = "x = \"{{ env.CAPTION_OPTIONAL | default(\"warn\") }}\"";

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("CAPTION_OPTIONAL", || {
            let result = expand_env(OPTIONAL_WITH_DEFAULT).unwrap();
            assert_eq!(result, "x = \"warn\"");
        });

        temp_env::with_var("CAPTION_OPTIONAL", Some("trace"), || {
            let result = expand_env(OPTIONAL_WITH_DEFAULT).unwrap();
            assert_eq!(result, "x = \"trace\"");
        });
    }
}
