use serde_json::Value as JsonValue;
use thiserror::Error;

/// Metadata section and body offset of a page source.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Front matter as a JSON object (empty when the page has none).
    pub value: JsonValue,
    /// Byte offset inside the original document where the Markdown body begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    fn without_metadata() -> Self {
        Self {
            value: empty_object(),
            body_start: 0,
        }
    }
}

/// Errors emitted while splitting or parsing front matter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Opening `---` fence without a closing one.
    #[error("Unterminated YAML front matter: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Front matter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Front matter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Locates and parses the leading YAML section of a page source.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    let Some(block) = locate_block(input)? else {
        return Ok(FrontmatterExtraction::without_metadata());
    };

    Ok(FrontmatterExtraction {
        value: parse_yaml(block.yaml)?,
        body_start: block.body_start,
    })
}

/// Splits a page source into its metadata and its Markdown body.
///
/// ```
/// use docsync_core::split_frontmatter;
///
/// let (meta, body) = split_frontmatter("---\ntitle: Home\n---\n# Hello").unwrap();
/// assert_eq!(meta["title"], "Home");
/// assert_eq!(body, "# Hello");
/// ```
pub fn split_frontmatter(input: &str) -> Result<(JsonValue, &str), FrontmatterError> {
    let extraction = extract_frontmatter(input)?;
    let body = input.get(extraction.body_start..).unwrap_or_default();
    Ok((extraction.value, body))
}

struct YamlBlock<'a> {
    yaml: &'a str,
    body_start: usize,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Default::default())
}

fn parse_yaml(yaml: &str) -> Result<JsonValue, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(empty_object());
    }

    let parsed: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let value =
        serde_json::to_value(parsed).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match value {
        JsonValue::Null => Ok(empty_object()),
        JsonValue::Object(_) => Ok(value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn locate_block(input: &str) -> Result<Option<YamlBlock<'_>>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let mut lines = Lines {
        input,
        cursor: bom_len,
    };

    // Blank lines may precede the opening fence; anything else means no metadata.
    let opening = loop {
        match lines.next() {
            Some(line) if line.text.trim().is_empty() => continue,
            Some(line) => break line,
            None => return Ok(None),
        }
    };
    if !is_fence(opening.text) {
        return Ok(None);
    }

    let yaml_start = opening.end;
    for line in lines {
        if is_fence(line.text) {
            let yaml = input[yaml_start..line.start].trim_end_matches(['\r', '\n']);
            return Ok(Some(YamlBlock {
                yaml,
                body_start: line.end,
            }));
        }
    }

    Err(FrontmatterError::Unterminated)
}

struct Line<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

/// Line iterator that keeps byte offsets; `end` points past the newline.
struct Lines<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.cursor >= self.input.len() {
            return None;
        }

        let start = self.cursor;
        let rest = &self.input[start..];
        let (text, end) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], start + pos + 1),
            None => (rest, self.input.len()),
        };
        self.cursor = end;
        Some(Line { text, start, end })
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(input: &str) -> FrontmatterExtraction {
        extract_frontmatter(input).expect("front matter extraction should succeed")
    }

    #[test]
    fn missing_metadata_keeps_whole_body() {
        let (meta, body) = split_frontmatter("# Title\nBody").unwrap();
        assert_eq!(meta, empty_object());
        assert_eq!(body, "# Title\nBody");
    }

    #[test]
    fn splits_page_metadata_from_body() {
        let input = "---\ntitle: 'Test Page'\nparent_page_id: 'test_parent_id'\nicon: '📄'\n---\n# Hello\n\nThis is a test.";
        let (meta, body) = split_frontmatter(input).unwrap();
        assert_eq!(meta["title"], "Test Page");
        assert_eq!(meta["parent_page_id"], "test_parent_id");
        assert_eq!(meta["icon"], "📄");
        assert_eq!(body, "# Hello\n\nThis is a test.");
    }

    #[test]
    fn empty_block_yields_empty_object() {
        let input = "---\n---\n# Body";
        let result = extract(input);
        assert_eq!(result.value, empty_object());
        assert_eq!(result.body_start, input.find("# Body").unwrap());
    }

    #[test]
    fn tolerates_bom_crlf_and_leading_blank_lines() {
        let input = "\u{feff}\n   \r\n---\r\nfoo: bar\r\n---\r\nBody";
        let result = extract(input);
        assert_eq!(result.value["foo"], "bar");
        assert_eq!(result.body_start, input.find("Body").unwrap());
    }

    #[test]
    fn text_before_fence_is_not_metadata() {
        let input = "intro\n---\nfoo: bar\n---\n";
        let result = extract(input);
        assert_eq!(result.body_start, 0);
        assert_eq!(result.value, empty_object());
    }

    #[test]
    fn fence_at_end_of_input_leaves_empty_body() {
        let (meta, body) = split_frontmatter("---\ntitle: x\n---").unwrap();
        assert_eq!(meta["title"], "x");
        assert_eq!(body, "");
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let err = extract_frontmatter("---\ninvalid: [unterminated\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Parse(_)), "{err:?}");
    }

    #[test]
    fn errors_on_sequence_root() {
        let err = extract_frontmatter("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::InvalidRootType));
    }

    #[test]
    fn errors_on_unterminated_block() {
        let err = extract_frontmatter("---\ntitle: test").unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated));
    }
}
