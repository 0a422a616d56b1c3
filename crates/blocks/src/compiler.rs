//! Block compiler: flat token stream to an ordered block tree.
//!
//! Containers (lists, items, quotes, tables, rows, cells) are matched by
//! their open/close pairs and their bodies compiled recursively, up to
//! [`Options::max_depth`] nested lists and quotes. A list item or quote is
//! labelled with its leading paragraphs; the rest of its content becomes its
//! `children`. All look-ahead is bounded by the enclosing container, so
//! truncated streams compile what is present.

use crate::inline::format_inline_checked;
use crate::options::{HeadingOverflow, Options, RaggedRows};
use crate::types::{Block, RichText, Span, TableRow};
use docsync_core::{InlineToken, ParseOptions, SyncError, Token, tokenize};
use serde::Serialize;

/// Known limitation hit while compiling. Output is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Limitation {
    /// Heading deeper than level 3.
    HeadingLevel {
        /// Level as written.
        level: u8,
        /// How it was rendered.
        handling: HeadingOverflow,
    },
    /// Table row whose cell count differs from the first row.
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Table width.
        expected: usize,
        /// Cells in the row.
        found: usize,
    },
    /// Several paragraphs joined into one list item or quote.
    MergedParagraphs {
        /// Number of paragraphs joined.
        count: usize,
    },
    /// Token kind the compiler does not render.
    Unsupported {
        /// Construct name.
        construct: String,
    },
    /// Style or link markers that did not pair up.
    UnbalancedMarkers,
    /// Container whose close token is missing.
    Unclosed {
        /// Token name of the opener.
        construct: String,
    },
    /// Lists or quotes nested deeper than allowed; their content was
    /// flattened into the deepest allowed container.
    NestingDepth {
        /// Deepest nesting kept.
        max_depth: usize,
    },
}

impl std::fmt::Display for Limitation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limitation::HeadingLevel { level, handling } => {
                write!(f, "heading level {} rendered as {:?}", level, handling)
            }
            Limitation::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "table row {} has {} cells, table width is {}",
                row, found, expected
            ),
            Limitation::MergedParagraphs { count } => {
                write!(f, "{} paragraphs merged into one block", count)
            }
            Limitation::Unsupported { construct } => write!(f, "unsupported {}", construct),
            Limitation::UnbalancedMarkers => write!(f, "unbalanced inline markers"),
            Limitation::Unclosed { construct } => write!(f, "unclosed {}", construct),
            Limitation::NestingDepth { max_depth } => {
                write!(f, "nesting deeper than {} levels flattened", max_depth)
            }
        }
    }
}

/// Compiled blocks plus the limitations hit on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    /// Blocks in document order.
    pub blocks: Vec<Block>,
    /// Limitations in the order they were hit.
    pub notes: Vec<Limitation>,
}

impl Compilation {
    /// Returns true when nothing was degraded.
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Compiles a token stream into blocks, recovering silently from anything
/// it cannot render.
pub fn compile(tokens: &[Token], options: &Options) -> Vec<Block> {
    compile_with_report(tokens, options).blocks
}

/// Compiles a token stream into blocks and reports every limitation hit.
pub fn compile_with_report(tokens: &[Token], options: &Options) -> Compilation {
    let mut compiler = Compiler {
        tokens,
        options,
        notes: Vec::new(),
        depth: 0,
        flattened: false,
    };
    let blocks = compiler.blocks(0, tokens.len());
    Compilation {
        blocks,
        notes: compiler.notes,
    }
}

/// Tokenizes a Markdown body and compiles it.
///
/// ```
/// use docsync_blocks::{Block, Options, markdown_to_blocks};
///
/// let blocks = markdown_to_blocks("# Title\n\n---", &Options::default()).unwrap();
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[1], Block::Divider);
/// ```
pub fn markdown_to_blocks(body: &str, options: &Options) -> Result<Vec<Block>, SyncError> {
    let tokens = tokenize(body, &ParseOptions::markdown())?;
    Ok(compile(&tokens, options))
}

struct Compiler<'a> {
    tokens: &'a [Token],
    options: &'a Options,
    notes: Vec<Limitation>,
    /// Lists and quotes currently open.
    depth: usize,
    flattened: bool,
}

impl Compiler<'_> {
    /// Compiles every block in `start..end`.
    fn blocks(&mut self, start: usize, end: usize) -> Vec<Block> {
        let mut out = Vec::new();
        let mut cursor = start;
        while cursor < end {
            cursor = self.block(cursor, end, &mut out);
        }
        out
    }

    /// Compiles the construct at `at`, returning the cursor past it.
    fn block(&mut self, at: usize, end: usize, out: &mut Vec<Block>) -> usize {
        let tokens = self.tokens;
        match &tokens[at] {
            Token::HeadingOpen { level } => {
                let close = self.close_of(at, end);
                let text = self.rich_text(at + 1, close);
                if let Some(block) = self.heading(*level, text) {
                    out.push(block);
                }
                close + 1
            }
            Token::ParagraphOpen => {
                let close = self.close_of(at, end);
                out.extend(self.paragraph(at + 1, close));
                close + 1
            }
            Token::BulletListOpen | Token::OrderedListOpen | Token::BlockquoteOpen
                if self.depth >= self.options.max_depth =>
            {
                // Skip the opener; its content joins the enclosing container
                // and its closer is ignored as stray.
                self.flatten();
                at + 1
            }
            Token::BulletListOpen | Token::OrderedListOpen => {
                let close = self.close_of(at, end);
                self.depth += 1;
                self.list(at, close, out);
                self.depth -= 1;
                close + 1
            }
            Token::Fence { info, content } => {
                let language = info
                    .split_whitespace()
                    .next()
                    .unwrap_or(self.options.default_code_language.as_str());
                out.push(Block::Code {
                    text: content.clone(),
                    language: language.to_string(),
                });
                at + 1
            }
            Token::BlockquoteOpen => {
                let close = self.close_of(at, end);
                self.depth += 1;
                self.blockquote(at + 1, close, out);
                self.depth -= 1;
                close + 1
            }
            Token::Hr => {
                out.push(Block::Divider);
                at + 1
            }
            Token::TableOpen => {
                let close = self.close_of(at, end);
                out.extend(self.table(at + 1, close));
                close + 1
            }
            Token::Other(construct) => {
                log::debug!("Skipping unsupported construct: {}", construct);
                self.notes.push(Limitation::Unsupported {
                    construct: construct.clone(),
                });
                at + 1
            }
            // Stray closers and tokens that only make sense inside a container.
            _ => at + 1,
        }
    }

    fn flatten(&mut self) {
        if !self.flattened {
            let max_depth = self.options.max_depth;
            log::warn!("Nesting deeper than {} levels flattened", max_depth);
            self.notes.push(Limitation::NestingDepth { max_depth });
            self.flattened = true;
        }
    }

    /// Index of the token closing the container opened at `open`, or `end`
    /// when it is missing before `end`.
    fn close_of(&mut self, open: usize, end: usize) -> usize {
        let tokens = self.tokens;
        let opener = &tokens[open];
        let Some(closer) = opener.closing() else {
            return open;
        };

        let mut depth = 0usize;
        for (index, token) in tokens[open..end].iter().enumerate() {
            if token.same_kind(opener) {
                depth += 1;
            } else if token.same_kind(&closer) {
                depth -= 1;
                if depth == 0 {
                    return open + index;
                }
            }
        }

        self.notes.push(Limitation::Unclosed {
            construct: opener.name().to_string(),
        });
        end
    }

    /// Formats and joins every inline payload in `start..end`.
    fn rich_text(&mut self, start: usize, end: usize) -> RichText {
        let tokens = self.tokens;
        let mut text = RichText::default();
        for token in &tokens[start..end] {
            if let Token::Inline(children) = token {
                text.append(self.format(children));
            }
        }
        text
    }

    fn format(&mut self, children: &[InlineToken]) -> RichText {
        for child in children {
            match child {
                // Paired constructs are reported once, at their opener.
                InlineToken::Other(construct) if !construct.ends_with("_close") => {
                    self.notes.push(Limitation::Unsupported {
                        construct: construct.clone(),
                    });
                }
                // Only a paragraph's lone image becomes a block.
                InlineToken::Image { .. } => self.notes.push(Limitation::Unsupported {
                    construct: "image_inline".to_string(),
                }),
                _ => {}
            }
        }

        let formatted = format_inline_checked(children);
        if !formatted.balanced {
            self.notes.push(Limitation::UnbalancedMarkers);
        }
        formatted.text
    }

    fn heading(&mut self, level: u8, text: RichText) -> Option<Block> {
        if text.is_blank() {
            return None;
        }
        if (1..=3).contains(&level) {
            return Some(Block::heading(level, text));
        }

        let handling = self.options.heading_overflow;
        log::warn!("Heading level {} rendered as {:?}", level, handling);
        self.notes.push(Limitation::HeadingLevel { level, handling });
        match handling {
            HeadingOverflow::Demote => Some(Block::heading(3, text)),
            HeadingOverflow::Paragraph => Some(Block::paragraph(text)),
            HeadingOverflow::Drop => None,
        }
    }

    /// Paragraph body `start..end`: an image block when a lone image is its
    /// only content, otherwise a paragraph unless blank.
    fn paragraph(&mut self, start: usize, end: usize) -> Option<Block> {
        let tokens = self.tokens;
        let inline = tokens[start..end].iter().find_map(|token| match token {
            Token::Inline(children) => Some(children),
            _ => None,
        });

        if let Some(children) = inline {
            let mut significant = children.iter().filter(|child| child.is_significant());
            if let (Some(InlineToken::Image { src, .. }), None) =
                (significant.next(), significant.next())
            {
                return Some(Block::Image { url: src.clone() });
            }
        }

        let text = self.rich_text(start, end);
        (!text.is_blank()).then(|| Block::paragraph(text))
    }

    fn list(&mut self, open: usize, close: usize, out: &mut Vec<Block>) {
        let numbered = matches!(self.tokens[open], Token::OrderedListOpen);
        let mut cursor = open + 1;
        while cursor < close {
            if !matches!(self.tokens[cursor], Token::ListItemOpen) {
                cursor += 1;
                continue;
            }

            let item_close = self.close_of(cursor, close);
            let (text, children) = self.container(cursor + 1, item_close);
            cursor = item_close + 1;

            if text.is_blank() {
                // Nothing to label the item with; keep its nested content.
                out.extend(children);
            } else if numbered {
                out.push(Block::NumberedItem { text, children });
            } else {
                out.push(Block::BulletedItem { text, children });
            }
        }
    }

    fn blockquote(&mut self, start: usize, end: usize, out: &mut Vec<Block>) {
        let (text, children) = self.container(start, end);
        if text.is_blank() {
            out.extend(children);
            return;
        }

        let marker = self.options.callout_marker.as_str();
        let is_callout = text
            .first()
            .is_some_and(|span| span.content.trim().starts_with(marker));

        if is_callout {
            out.push(Block::Callout {
                text,
                icon: self.options.callout_icon.clone(),
                children,
            });
        } else {
            out.push(Block::Quote { text, children });
        }
    }

    /// Splits a list item or quote body into its label and its children.
    ///
    /// Paragraphs before the first nested block are joined into the label;
    /// everything from that block on stays a child, in order.
    fn container(&mut self, start: usize, end: usize) -> (RichText, Vec<Block>) {
        let mut text = RichText::default();
        let mut children = Vec::new();
        let mut paragraphs = 0usize;

        let mut cursor = start;
        while cursor < end {
            if !matches!(self.tokens[cursor], Token::ParagraphOpen) {
                cursor = self.block(cursor, end, &mut children);
                continue;
            }

            let close = self.close_of(cursor, end);
            match self.paragraph(cursor + 1, close) {
                Some(Block::Paragraph { text: paragraph }) if children.is_empty() => {
                    if !text.is_empty() {
                        text.push(Span::plain("\n"));
                    }
                    text.append(paragraph);
                    paragraphs += 1;
                }
                Some(block) => children.push(block),
                None => {}
            }
            cursor = close + 1;
        }

        if paragraphs > 1 {
            self.notes
                .push(Limitation::MergedParagraphs { count: paragraphs });
        }
        (text, children)
    }

    fn table(&mut self, start: usize, end: usize) -> Option<Block> {
        let mut has_column_header = false;
        let mut rows = Vec::new();

        let mut cursor = start;
        while cursor < end {
            match self.tokens[cursor] {
                Token::TheadOpen => {
                    has_column_header = true;
                    cursor += 1;
                }
                Token::TrOpen => {
                    let close = self.close_of(cursor, end);
                    rows.push(TableRow {
                        cells: self.cells(cursor + 1, close),
                    });
                    cursor = close + 1;
                }
                _ => cursor += 1,
            }
        }

        let width = rows.first()?.cells.len();
        for (index, row) in rows.iter_mut().enumerate() {
            let found = row.cells.len();
            if found == width {
                continue;
            }
            log::warn!(
                "Table row {} has {} cells, table width is {}",
                index,
                found,
                width
            );
            self.notes.push(Limitation::RaggedRow {
                row: index,
                expected: width,
                found,
            });
            if self.options.ragged_rows == RaggedRows::Normalize {
                row.cells.resize_with(width, RichText::default);
            }
        }

        Some(Block::Table {
            width,
            has_column_header,
            rows,
        })
    }

    fn cells(&mut self, start: usize, end: usize) -> Vec<RichText> {
        let mut cells = Vec::new();
        let mut cursor = start;
        while cursor < end {
            if matches!(self.tokens[cursor], Token::ThOpen | Token::TdOpen) {
                let close = self.close_of(cursor, end);
                cells.push(self.rich_text(cursor + 1, close));
                cursor = close + 1;
            } else {
                cursor += 1;
            }
        }
        cells
    }
}
