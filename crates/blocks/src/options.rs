//! Rendering rules for the block compiler.

use serde::{Deserialize, Serialize};

/// What to do with headings deeper than the three levels the service renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingOverflow {
    /// Render as a level 3 heading.
    #[default]
    Demote,
    /// Render as a paragraph.
    Paragraph,
    /// Leave out of the output.
    Drop,
}

/// What to do with table rows whose cell count differs from the first row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaggedRows {
    /// Pad short rows with empty cells and cut long rows to the table width.
    #[default]
    Normalize,
    /// Keep rows exactly as written.
    Keep,
}

/// Rendering options for the block compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Emoji placed on callout blocks.
    pub callout_icon: String,
    /// Prefix of a quote's first span that turns it into a callout.
    pub callout_marker: String,
    /// Language used for fences that declare none.
    pub default_code_language: String,
    /// Handling of heading levels 4 to 6.
    pub heading_overflow: HeadingOverflow,
    /// Handling of rows that do not match the table width.
    pub ragged_rows: RaggedRows,
    /// Deepest nesting of lists and quotes compiled as such. Deeper
    /// containers are flattened into the deepest allowed one.
    pub max_depth: usize,
}

impl Options {
    /// Loads options from a YAML document; missing keys keep their defaults.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            callout_icon: "💡".to_string(),
            callout_marker: "[!".to_string(),
            default_code_language: "plain text".to_string(),
            heading_overflow: HeadingOverflow::default(),
            ragged_rows: RaggedRows::default(),
            max_depth: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_conventions() {
        let options = Options::default();
        assert_eq!(options.callout_icon, "💡");
        assert_eq!(options.callout_marker, "[!");
        assert_eq!(options.default_code_language, "plain text");
        assert_eq!(options.heading_overflow, HeadingOverflow::Demote);
        assert_eq!(options.ragged_rows, RaggedRows::Normalize);
        assert_eq!(options.max_depth, 32);
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let options =
            Options::from_yaml("heading_overflow: drop\ncallout_icon: \"📌\"\nmax_depth: 4\n")
                .unwrap();
        assert_eq!(options.heading_overflow, HeadingOverflow::Drop);
        assert_eq!(options.callout_icon, "📌");
        assert_eq!(options.max_depth, 4);
        assert_eq!(options.default_code_language, "plain text");
        assert_eq!(options.ragged_rows, RaggedRows::Normalize);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        assert_eq!(Options::from_yaml("  \n").unwrap(), Options::default());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Options::from_yaml("ragged_rows: reject").is_err());
    }
}
