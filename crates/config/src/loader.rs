use std::path::Path;

use anyhow::{Context as _, bail};
use serde::Deserialize;
use toml::Value;

use crate::Config;

pub(crate) fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;

    let mut raw: Value = toml::from_str(&content)?;
    expand_env_references(&mut Vec::new(), &mut raw, &|name| std::env::var(name).ok())?;

    let config = Config::deserialize(raw)?;
    log::debug!("configuration loaded from {}", path.display());

    Ok(config)
}

/// Walk the raw TOML tree and expand `${VAR}` references in string values.
///
/// Expansion happens before deserialization so the configuration structs only
/// ever see resolved values.
fn expand_env_references(
    path: &mut Vec<String>,
    value: &mut Value,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    match value {
        Value::String(s) => {
            if s.contains("${") {
                *s = expand_string(&path.join("."), s, lookup)?;
            }
        }
        Value::Array(values) => {
            for (index, item) in values.iter_mut().enumerate() {
                path.push(index.to_string());
                expand_env_references(path, item, lookup)?;
                path.pop();
            }
        }
        Value::Table(table) => {
            for (key, item) in table.iter_mut() {
                path.push(key.to_string());
                expand_env_references(path, item, lookup)?;
                path.pop();
            }
        }
        _ => {}
    }

    Ok(())
}

fn expand_string(path: &str, input: &str, lookup: &dyn Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            bail!("unterminated environment variable reference at `{path}`");
        };

        let name = &after[..end];

        let Some(value) = lookup(name) else {
            bail!("environment variable `{name}` referenced at `{path}` is not set");
        };

        output.push_str(&value);
        rest = &after[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "TEST_KEY" => Some("sk-123".to_string()),
            "TEST_HOST" => Some("api.example.com".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_whole_value() {
        let expanded = expand_string("llm.cerebras.api_key", "${TEST_KEY}", &lookup).unwrap();
        assert_eq!(expanded, "sk-123");
    }

    #[test]
    fn expands_embedded_reference() {
        let expanded = expand_string("llm.cerebras.base_url", "https://${TEST_HOST}/v1", &lookup).unwrap();
        assert_eq!(expanded, "https://api.example.com/v1");
    }

    #[test]
    fn missing_variable_names_path() {
        let err = expand_string("llm.llama.api_key", "${NOT_SET}", &lookup).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("NOT_SET"));
        assert!(message.contains("llm.llama.api_key"));
    }

    #[test]
    fn unterminated_reference_is_an_error() {
        let err = expand_string("llm.cerebras.api_key", "${TEST_KEY", &lookup).unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn plain_strings_untouched() {
        let expanded = expand_string("llm.default_provider", "cerebras", &lookup).unwrap();
        assert_eq!(expanded, "cerebras");
    }

    #[test]
    fn expands_nested_tables() {
        let mut raw: Value = toml::from_str(
            r#"
            [llm.cerebras]
            api_key = "${TEST_KEY}"
            "#,
        )
        .unwrap();

        expand_env_references(&mut Vec::new(), &mut raw, &lookup).unwrap();

        let key = raw["llm"]["cerebras"]["api_key"].as_str().unwrap();
        assert_eq!(key, "sk-123");
    }
}
