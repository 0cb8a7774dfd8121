//! Identifier utilities for SchemaDelta
//!
//! Identifiers are quoted with MySQL backticks and never escaped. Callers that
//! cannot trust their input can check it first with [`validate_identifier`].

use crate::error::{Error, Result};
use crate::schema::types::SchemaModel;

/// MySQL limit for table and column names
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Wrap an identifier in backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name)
}

/// Check that an identifier can be backtick-quoted without escaping
pub fn validate_identifier(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("identifier is empty".to_string())
    } else if name.contains('`') {
        Some("identifier contains a backtick".to_string())
    } else if name.contains('\0') {
        Some("identifier contains a NUL character".to_string())
    } else if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        Some(format!(
            "identifier is longer than {} characters",
            MAX_IDENTIFIER_LENGTH
        ))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::IdentifierQuoting {
            identifier: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Validate every table and column name in a schema
pub fn validate_schema_identifiers(schema: &SchemaModel) -> Result<()> {
    for (table_name, table) in &schema.tables {
        validate_identifier(table_name)?;
        for column_name in table.columns.keys() {
            validate_identifier(column_name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::TableDescriptor;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("order items"), "`order items`");
    }

    #[test]
    fn test_quote_does_not_escape() {
        assert_eq!(quote_identifier("we`ird"), "`we`ird`");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("created_at").is_ok());
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());

        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("bad`name").is_err());
        assert!(validate_identifier("nul\0").is_err());
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_schema_identifiers() {
        let good = SchemaModel::new()
            .with_table("users", TableDescriptor::new().with_column("id", "INT"));
        assert!(validate_schema_identifiers(&good).is_ok());

        let bad = SchemaModel::new()
            .with_table("users", TableDescriptor::new().with_column("i`d", "INT"));
        match validate_schema_identifiers(&bad) {
            Err(Error::IdentifierQuoting { identifier, .. }) => assert_eq!(identifier, "i`d"),
            other => panic!("expected identifier error, got {:?}", other),
        }
    }
}
