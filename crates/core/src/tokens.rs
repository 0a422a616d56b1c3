//! Flat Markdown token stream.
//!
//! Block structure is expressed by open/close pairs in document order, the
//! way markdown-it style tokenizers emit it. Inline content of a heading,
//! paragraph or table cell travels as one [`Token::Inline`] whose children
//! are again a flat open/close sequence.

/// One block-level token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start of an ATX or setext heading.
    HeadingOpen {
        /// Heading depth as written (1-6).
        level: u8,
    },
    /// End of a heading.
    HeadingClose,
    /// Start of a paragraph.
    ParagraphOpen,
    /// End of a paragraph.
    ParagraphClose,
    /// Inline payload of the enclosing heading, paragraph or table cell.
    Inline(Vec<InlineToken>),
    /// Start of an unordered list.
    BulletListOpen,
    /// End of an unordered list.
    BulletListClose,
    /// Start of an ordered list.
    OrderedListOpen,
    /// End of an ordered list.
    OrderedListClose,
    /// Start of a list item.
    ListItemOpen,
    /// End of a list item.
    ListItemClose,
    /// Fenced (or indented) code block; self-contained.
    Fence {
        /// Declared language, empty when the fence has none.
        info: String,
        /// Raw code body.
        content: String,
    },
    /// Start of a block quote.
    BlockquoteOpen,
    /// End of a block quote.
    BlockquoteClose,
    /// Thematic break.
    Hr,
    /// Start of a GFM table.
    TableOpen,
    /// End of a GFM table.
    TableClose,
    /// Start of the header section.
    TheadOpen,
    /// End of the header section.
    TheadClose,
    /// Start of the body section.
    TbodyOpen,
    /// End of the body section.
    TbodyClose,
    /// Start of a table row.
    TrOpen,
    /// End of a table row.
    TrClose,
    /// Start of a header cell.
    ThOpen,
    /// End of a header cell.
    ThClose,
    /// Start of a data cell.
    TdOpen,
    /// End of a data cell.
    TdClose,
    /// Any construct the block compiler does not read, by name.
    Other(String),
}

impl Token {
    /// Returns the token that closes this one, if it opens a container.
    pub fn closing(&self) -> Option<Token> {
        let close = match self {
            Token::HeadingOpen { .. } => Token::HeadingClose,
            Token::ParagraphOpen => Token::ParagraphClose,
            Token::BulletListOpen => Token::BulletListClose,
            Token::OrderedListOpen => Token::OrderedListClose,
            Token::ListItemOpen => Token::ListItemClose,
            Token::BlockquoteOpen => Token::BlockquoteClose,
            Token::TableOpen => Token::TableClose,
            Token::TheadOpen => Token::TheadClose,
            Token::TbodyOpen => Token::TbodyClose,
            Token::TrOpen => Token::TrClose,
            Token::ThOpen => Token::ThClose,
            Token::TdOpen => Token::TdClose,
            _ => return None,
        };
        Some(close)
    }

    /// Whether this token opens a container that a later token closes.
    pub fn is_open(&self) -> bool {
        self.closing().is_some()
    }

    /// Whether two tokens are the same kind, ignoring attributes.
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Short snake_case name of the token kind, used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Token::HeadingOpen { .. } => "heading_open",
            Token::HeadingClose => "heading_close",
            Token::ParagraphOpen => "paragraph_open",
            Token::ParagraphClose => "paragraph_close",
            Token::Inline(_) => "inline",
            Token::BulletListOpen => "bullet_list_open",
            Token::BulletListClose => "bullet_list_close",
            Token::OrderedListOpen => "ordered_list_open",
            Token::OrderedListClose => "ordered_list_close",
            Token::ListItemOpen => "list_item_open",
            Token::ListItemClose => "list_item_close",
            Token::Fence { .. } => "fence",
            Token::BlockquoteOpen => "blockquote_open",
            Token::BlockquoteClose => "blockquote_close",
            Token::Hr => "hr",
            Token::TableOpen => "table_open",
            Token::TableClose => "table_close",
            Token::TheadOpen => "thead_open",
            Token::TheadClose => "thead_close",
            Token::TbodyOpen => "tbody_open",
            Token::TbodyClose => "tbody_close",
            Token::TrOpen => "tr_open",
            Token::TrClose => "tr_close",
            Token::ThOpen => "th_open",
            Token::ThClose => "th_close",
            Token::TdOpen => "td_open",
            Token::TdClose => "td_close",
            Token::Other(name) => name,
        }
    }
}

/// One child of an inline payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineToken {
    /// Plain text run.
    Text(String),
    /// `**` / `__` opener.
    StrongOpen,
    /// `**` / `__` closer.
    StrongClose,
    /// `*` / `_` opener.
    EmOpen,
    /// `*` / `_` closer.
    EmClose,
    /// Start of a link.
    LinkOpen {
        /// Link destination.
        href: String,
    },
    /// End of a link.
    LinkClose,
    /// Backtick code span.
    CodeInline(String),
    /// Image reference.
    Image {
        /// Image source URL.
        src: String,
        /// Alternative text.
        alt: String,
    },
    /// Any inline construct the formatter does not read, by name.
    Other(String),
}

impl InlineToken {
    /// Whether this child carries content; only empty text runs do not.
    pub fn is_significant(&self) -> bool {
        !matches!(self, InlineToken::Text(text) if text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_pair_with_their_close() {
        assert_eq!(
            Token::HeadingOpen { level: 2 }.closing(),
            Some(Token::HeadingClose)
        );
        assert_eq!(Token::TdOpen.closing(), Some(Token::TdClose));
        assert!(Token::BlockquoteOpen.is_open());
        assert!(!Token::Hr.is_open());
        assert!(!Token::BlockquoteClose.is_open());
    }

    #[test]
    fn same_kind_ignores_attributes() {
        let h1 = Token::HeadingOpen { level: 1 };
        let h3 = Token::HeadingOpen { level: 3 };
        assert!(h1.same_kind(&h3));
        assert!(!h1.same_kind(&Token::ParagraphOpen));
    }

    #[test]
    fn other_tokens_report_their_own_name() {
        assert_eq!(Token::Other("html_block".into()).name(), "html_block");
        assert_eq!(Token::Fence { info: String::new(), content: String::new() }.name(), "fence");
    }

    #[test]
    fn empty_text_is_insignificant() {
        assert!(!InlineToken::Text(String::new()).is_significant());
        assert!(InlineToken::Text(" ".into()).is_significant());
        assert!(
            InlineToken::Image {
                src: "a.png".into(),
                alt: String::new()
            }
            .is_significant()
        );
    }
}
