//! Column definition translation
//!
//! Cached schemas abbreviate two modifiers: `AI` for `AUTO_INCREMENT` and `PK`
//! for `PRIMARY KEY`. This module expands them back into SQL.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const AUTO_INCREMENT: &str = "AUTO_INCREMENT";
const PRIMARY_KEY: &str = "PRIMARY KEY";

static AI_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bAI\b").unwrap());
static PK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bPK\b").unwrap());

/// How shorthand modifiers are located inside a column definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMode {
    /// Replace every `AI` / `PK` character sequence, wherever it appears.
    ///
    /// `CHAIN` becomes `CHAUTO_INCREMENTN`. Matches the cached-schema format
    /// this tool has always consumed.
    #[default]
    Substring,
    /// Replace `AI` / `PK` only when they stand alone as words.
    Token,
}

/// Expands shorthand modifiers in column definitions
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnDefinitionTranslator {
    mode: TranslationMode,
}

impl ColumnDefinitionTranslator {
    pub fn new(mode: TranslationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TranslationMode {
        self.mode
    }

    /// Translate a raw column definition into full SQL syntax
    pub fn translate(&self, definition: &str) -> String {
        match self.mode {
            TranslationMode::Substring => translate_column_definition(definition),
            TranslationMode::Token => {
                let expanded: Cow<'_, str> = AI_TOKEN.replace_all(definition, AUTO_INCREMENT);
                PK_TOKEN.replace_all(&expanded, PRIMARY_KEY).into_owned()
            }
        }
    }
}

/// Substring translation: `AI` first, then `PK`
pub fn translate_column_definition(definition: &str) -> String {
    definition
        .replace("AI", AUTO_INCREMENT)
        .replace("PK", PRIMARY_KEY)
}
