//! Block tree produced by the compiler.

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Style flags carried by a span. `code` never combines with the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    /// Strong emphasis.
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Emphasis.
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Inline code.
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl Annotations {
    /// The exclusive inline-code style.
    pub const CODE: Self = Self {
        bold: false,
        italic: false,
        code: true,
    };

    /// Returns true when no flag is set.
    pub fn is_empty(&self) -> bool {
        !(self.bold || self.italic || self.code)
    }

    /// `None` for the empty set, so unstyled spans omit the field entirely.
    pub fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// A run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Text content.
    pub content: String,
    /// Active style flags; absent when unstyled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    /// Link target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Span {
    /// Unstyled text.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: None,
            link: None,
        }
    }

    /// Text with the given style flags.
    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            content: content.into(),
            annotations: annotations.non_empty(),
            link: None,
        }
    }

    /// Inline code span.
    pub fn code(content: impl Into<String>) -> Self {
        Self::styled(content, Annotations::CODE)
    }

    /// Attaches a link target.
    pub fn linked(mut self, href: impl Into<String>) -> Self {
        self.link = Some(href.into());
        self
    }

    /// Style flags, empty when unstyled.
    pub fn annotations(&self) -> Annotations {
        self.annotations.unwrap_or_default()
    }
}

/// Ordered spans forming the formatted text of one block or cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Span>);

impl RichText {
    /// Rich text made of one unstyled span.
    pub fn plain(content: impl Into<String>) -> Self {
        Self(vec![Span::plain(content)])
    }

    /// The spans in order.
    pub fn spans(&self) -> &[Span] {
        &self.0
    }

    /// First span, if any.
    pub fn first(&self) -> Option<&Span> {
        self.0.first()
    }

    /// Appends one span.
    pub fn push(&mut self, span: Span) {
        self.0.push(span);
    }

    /// Appends all spans of `other`.
    pub fn append(&mut self, other: RichText) {
        self.0.extend(other.0);
    }

    /// Returns true when there are no spans at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when no span holds non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|span| span.content.trim().is_empty())
    }

    /// Concatenated content of all spans.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(|span| span.content.as_str()).collect()
    }
}

impl From<Vec<Span>> for RichText {
    fn from(spans: Vec<Span>) -> Self {
        Self(spans)
    }
}

/// One row of a table block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells left to right.
    pub cells: Vec<RichText>,
}

/// One structural unit of compiled page content.
///
/// `children` holds nested block content of list items and quotes; it stays
/// empty for single-paragraph items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Heading of level 1 to 3.
    Heading {
        /// Level, always within 1..=3.
        level: u8,
        /// Heading text.
        text: RichText,
    },
    /// Paragraph.
    Paragraph {
        /// Paragraph text.
        text: RichText,
    },
    /// Image referenced by URL.
    Image {
        /// Image source.
        url: String,
    },
    /// Bulleted list item.
    BulletedItem {
        /// Item text.
        text: RichText,
        /// Nested blocks.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
    },
    /// Numbered list item.
    NumberedItem {
        /// Item text.
        text: RichText,
        /// Nested blocks.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
    },
    /// Code block.
    Code {
        /// Raw code.
        text: String,
        /// Language tag.
        language: String,
    },
    /// Block quote.
    Quote {
        /// Quote text.
        text: RichText,
        /// Nested blocks.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
    },
    /// Block quote opened by a `[!...]` marker.
    Callout {
        /// Callout text, marker included.
        text: RichText,
        /// Emoji icon.
        icon: String,
        /// Nested blocks.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
    },
    /// Horizontal rule.
    Divider,
    /// Table.
    Table {
        /// Column count, taken from the first row.
        width: usize,
        /// Whether the first row is a header row.
        has_column_header: bool,
        /// Rows top to bottom.
        rows: Vec<TableRow>,
    },
}

impl Block {
    /// Heading block.
    pub fn heading(level: u8, text: RichText) -> Self {
        Block::Heading { level, text }
    }

    /// Paragraph block.
    pub fn paragraph(text: RichText) -> Self {
        Block::Paragraph { text }
    }

    /// Bulleted item without nested content.
    pub fn bulleted(text: RichText) -> Self {
        Block::BulletedItem {
            text,
            children: Vec::new(),
        }
    }

    /// Numbered item without nested content.
    pub fn numbered(text: RichText) -> Self {
        Block::NumberedItem {
            text,
            children: Vec::new(),
        }
    }

    /// Block type name used by the document service.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { level: 1, .. } => "heading_1",
            Block::Heading { level: 2, .. } => "heading_2",
            Block::Heading { .. } => "heading_3",
            Block::Paragraph { .. } => "paragraph",
            Block::Image { .. } => "image",
            Block::BulletedItem { .. } => "bulleted_list_item",
            Block::NumberedItem { .. } => "numbered_list_item",
            Block::Code { .. } => "code",
            Block::Quote { .. } => "quote",
            Block::Callout { .. } => "callout",
            Block::Divider => "divider",
            Block::Table { .. } => "table",
        }
    }

    /// Rich text of text-bearing blocks.
    pub fn rich_text(&self) -> Option<&RichText> {
        match self {
            Block::Heading { text, .. }
            | Block::Paragraph { text }
            | Block::BulletedItem { text, .. }
            | Block::NumberedItem { text, .. }
            | Block::Quote { text, .. }
            | Block::Callout { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Nested blocks; empty for kinds that cannot nest.
    pub fn children(&self) -> &[Block] {
        match self {
            Block::BulletedItem { children, .. }
            | Block::NumberedItem { children, .. }
            | Block::Quote { children, .. }
            | Block::Callout { children, .. } => children,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unstyled_span_omits_optional_fields() {
        let span = Span::styled("plain", Annotations::default());
        assert_eq!(span.annotations, None);
        assert_eq!(serde_json::to_value(&span).unwrap(), json!({"content": "plain"}));
    }

    #[test]
    fn annotations_serialize_only_active_flags() {
        let span = Span::styled(
            "x",
            Annotations {
                bold: true,
                italic: true,
                code: false,
            },
        )
        .linked("https://example.com");
        assert_eq!(
            serde_json::to_value(&span).unwrap(),
            json!({
                "content": "x",
                "annotations": {"bold": true, "italic": true},
                "link": "https://example.com"
            })
        );
    }

    #[test]
    fn whitespace_only_text_is_blank() {
        let text = RichText::from(vec![Span::plain("  "), Span::code("\t")]);
        assert!(text.is_blank());
        assert!(!text.is_empty());
        assert!(!RichText::plain(" a ").is_blank());
    }

    #[test]
    fn plain_text_concatenates_spans() {
        let text = RichText::from(vec![Span::plain("Hello "), Span::code("world")]);
        assert_eq!(text.plain_text(), "Hello world");
    }

    #[test]
    fn blocks_are_tagged_by_type() {
        let block = Block::bulleted(RichText::plain("item"));
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "bulleted_item", "text": [{"content": "item"}]})
        );
        assert_eq!(
            serde_json::to_value(Block::Divider).unwrap(),
            json!({"type": "divider"})
        );
    }

    #[test]
    fn kind_names_follow_the_service() {
        assert_eq!(Block::heading(2, RichText::plain("h")).kind(), "heading_2");
        assert_eq!(Block::numbered(RichText::default()).kind(), "numbered_list_item");
        assert!(Block::Divider.rich_text().is_none());
        assert!(Block::Divider.children().is_empty());
    }
}
