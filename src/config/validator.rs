use std::collections::HashSet;

use thiserror::Error;

use super::parser::{Config, TableConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_tables(&config.export.tables)?;

    if config.status.port == 0 {
        return Err(ConfigError::InvalidConfig(
            "status.port must be between 1 and 65535".to_string(),
        ));
    }

    if config.status.db_file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "status.db_file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_tables(tables: &[TableConfig]) -> Result<(), ConfigError> {
    if tables.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "export.tables must list at least one table".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for table in tables {
        if !is_plain_identifier(&table.name) {
            return Err(ConfigError::InvalidConfig(format!(
                "export.tables: `{}` is not a plain table name",
                table.name
            )));
        }
        if !seen.insert(table.name.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "export.tables: `{}` is listed more than once",
                table.name
            )));
        }
        if matches!(&table.query, Some(query) if query.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(format!(
                "export.tables: query for `{}` cannot be empty",
                table.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::is_plain_identifier;

    #[test_case("users", true ; "lowercase")]
    #[test_case("exchange_rates", true ; "underscore")]
    #[test_case("_hidden2", true ; "leading underscore")]
    #[test_case("2fa_codes", false ; "leading digit")]
    #[test_case("users; DROP TABLE cards", false ; "injection")]
    #[test_case("public.users", false ; "qualified")]
    #[test_case("", false ; "empty")]
    fn plain_identifier_rules(name: &str, expected: bool) {
        assert_eq!(is_plain_identifier(name), expected);
    }
}
