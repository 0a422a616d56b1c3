//! Markdown parsing and linearization into the flat token stream.

use crate::tokens::{InlineToken, Token};
use crate::{SourceLocation, SyncError};
use markdown::mdast::{self, Node};
use markdown::message::{Message, Place};
use std::collections::HashMap;

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs (tables, strikethrough, autolinks).
    pub gfm: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Parse raw HTML as HTML nodes instead of text.
    pub raw_html: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
}

impl ParseOptions {
    /// GFM defaults used for page bodies.
    pub const fn markdown() -> Self {
        Self {
            gfm: true,
            code_indented: true,
            raw_html: false,
            math: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// Front matter is never enabled: page bodies are split from their
    /// metadata before they reach the parser.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: false,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Parse markdown into an MDAST tree.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, SyncError> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| {
        SyncError::MarkdownAdapter {
            message: err.to_string(),
            location: message_location(&err),
        }
    })
}

/// Tokenize a Markdown body into the flat block token stream.
///
/// ```
/// use docsync_core::{InlineToken, ParseOptions, Token, tokenize};
///
/// let tokens = tokenize("# Hi", &ParseOptions::default()).unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::HeadingOpen { level: 1 },
///         Token::Inline(vec![InlineToken::Text("Hi".into())]),
///         Token::HeadingClose,
///     ]
/// );
/// ```
pub fn tokenize(input: &str, options: &ParseOptions) -> Result<Vec<Token>, SyncError> {
    let root = parse_mdast(input, options)?;
    let tokens = tokens_from_mdast(&root);
    dismantle(root);
    Ok(tokens)
}

/// Linearize an already parsed MDAST tree into block tokens.
///
/// The walk keeps its own stack, so nesting depth is bounded only by memory.
pub fn tokens_from_mdast(root: &Node) -> Vec<Token> {
    let mut linearizer = Linearizer {
        definitions: collect_definitions(root),
        tokens: Vec::new(),
    };
    linearizer.blocks(root);
    linearizer.tokens
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::default(),
    }
}

/// Drops a tree one node at a time; the derived drop recurses per level.
fn dismantle(root: Node) {
    let mut pending = vec![root];
    while let Some(mut node) = pending.pop() {
        if let Some(children) = node.children_mut() {
            pending.append(children);
        }
    }
}

/// Reference labels match case-insensitively with collapsed whitespace.
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn collect_definitions(root: &Node) -> HashMap<String, String> {
    let mut definitions = HashMap::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if let Node::Definition(definition) = node {
            // First definition of a label wins.
            definitions
                .entry(normalize_label(&definition.identifier))
                .or_insert_with(|| definition.url.clone());
        }
        if let Some(children) = node.children() {
            pending.extend(children.iter().rev());
        }
    }
    definitions
}

fn construct_name(node: &Node) -> &'static str {
    match node {
        Node::FootnoteDefinition(_) => "footnote_definition",
        Node::FootnoteReference(_) => "footnote_reference",
        Node::Math(_) => "math_block",
        Node::InlineMath(_) => "math_inline",
        Node::Yaml(_) | Node::Toml(_) => "front_matter",
        Node::MdxJsxFlowElement(_) | Node::MdxJsxTextElement(_) => "jsx",
        Node::MdxjsEsm(_) | Node::MdxFlowExpression(_) | Node::MdxTextExpression(_) => {
            "expression"
        }
        _ => "unsupported",
    }
}

/// Pending work of a tree walk: a node to visit or a closer to emit once
/// its children are done.
enum Step<'a, T> {
    Visit(&'a Node),
    Emit(T),
}

fn visit_children<'a, T>(stack: &mut Vec<Step<'a, T>>, children: &'a [Node]) {
    stack.extend(children.iter().rev().map(Step::Visit));
}

struct Linearizer {
    definitions: HashMap<String, String>,
    tokens: Vec<Token>,
}

impl Linearizer {
    fn blocks(&mut self, root: &Node) {
        let mut stack = vec![Step::Visit(root)];
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Visit(node) => node,
                Step::Emit(token) => {
                    self.tokens.push(token);
                    continue;
                }
            };

            match node {
                Node::Root(root) => visit_children(&mut stack, &root.children),
                Node::Heading(heading) => {
                    self.tokens.push(Token::HeadingOpen {
                        level: heading.depth,
                    });
                    self.inline(&heading.children);
                    self.tokens.push(Token::HeadingClose);
                }
                Node::Paragraph(paragraph) => {
                    self.tokens.push(Token::ParagraphOpen);
                    self.inline(&paragraph.children);
                    self.tokens.push(Token::ParagraphClose);
                }
                Node::List(list) => {
                    let (open, close) = if list.ordered {
                        (Token::OrderedListOpen, Token::OrderedListClose)
                    } else {
                        (Token::BulletListOpen, Token::BulletListClose)
                    };
                    self.tokens.push(open);
                    stack.push(Step::Emit(close));
                    visit_children(&mut stack, &list.children);
                }
                Node::ListItem(item) => {
                    self.tokens.push(Token::ListItemOpen);
                    stack.push(Step::Emit(Token::ListItemClose));
                    visit_children(&mut stack, &item.children);
                }
                Node::Code(code) => self.tokens.push(Token::Fence {
                    info: code.lang.clone().unwrap_or_default(),
                    content: code.value.clone(),
                }),
                Node::Blockquote(quote) => {
                    self.tokens.push(Token::BlockquoteOpen);
                    stack.push(Step::Emit(Token::BlockquoteClose));
                    visit_children(&mut stack, &quote.children);
                }
                Node::ThematicBreak(_) => self.tokens.push(Token::Hr),
                Node::Table(table) => self.table(table),
                // Definitions only feed reference resolution.
                Node::Definition(_) => {}
                Node::Html(_) => self.tokens.push(Token::Other("html_block".into())),
                other => {
                    let name = construct_name(other);
                    log::debug!("Linearizing unsupported block node: {}", name);
                    self.tokens.push(Token::Other(name.into()));
                }
            }
        }
    }

    fn table(&mut self, table: &mdast::Table) {
        self.tokens.push(Token::TableOpen);

        let mut rows = table.children.iter().filter_map(|node| match node {
            Node::TableRow(row) => Some(row),
            _ => None,
        });

        if let Some(header) = rows.next() {
            self.tokens.push(Token::TheadOpen);
            self.table_row(header, &Token::ThOpen, &Token::ThClose);
            self.tokens.push(Token::TheadClose);
        }

        let body: Vec<&mdast::TableRow> = rows.collect();
        if !body.is_empty() {
            self.tokens.push(Token::TbodyOpen);
            for row in body {
                self.table_row(row, &Token::TdOpen, &Token::TdClose);
            }
            self.tokens.push(Token::TbodyClose);
        }

        self.tokens.push(Token::TableClose);
    }

    fn table_row(&mut self, row: &mdast::TableRow, open: &Token, close: &Token) {
        self.tokens.push(Token::TrOpen);
        for node in &row.children {
            if let Node::TableCell(cell) = node {
                self.tokens.push(open.clone());
                self.inline(&cell.children);
                self.tokens.push(close.clone());
            }
        }
        self.tokens.push(Token::TrClose);
    }

    fn inline(&mut self, nodes: &[Node]) {
        let children = self.inline_tokens(nodes);
        self.tokens.push(Token::Inline(children));
    }

    fn inline_tokens(&self, nodes: &[Node]) -> Vec<InlineToken> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        visit_children(&mut stack, nodes);

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Visit(node) => node,
                Step::Emit(token) => {
                    out.push(token);
                    continue;
                }
            };

            match node {
                Node::Text(text) => push_text(&mut out, &text.value),
                // Hard breaks survive as line endings, like soft ones do in text.
                Node::Break(_) => push_text(&mut out, "\n"),
                Node::Strong(strong) => {
                    out.push(InlineToken::StrongOpen);
                    stack.push(Step::Emit(InlineToken::StrongClose));
                    visit_children(&mut stack, &strong.children);
                }
                Node::Emphasis(emphasis) => {
                    out.push(InlineToken::EmOpen);
                    stack.push(Step::Emit(InlineToken::EmClose));
                    visit_children(&mut stack, &emphasis.children);
                }
                Node::Link(link) => {
                    out.push(InlineToken::LinkOpen {
                        href: link.url.clone(),
                    });
                    stack.push(Step::Emit(InlineToken::LinkClose));
                    visit_children(&mut stack, &link.children);
                }
                Node::LinkReference(reference) => {
                    let target = self.definitions.get(&normalize_label(&reference.identifier));
                    // Unresolved references degrade to their text.
                    if let Some(url) = target {
                        out.push(InlineToken::LinkOpen { href: url.clone() });
                        stack.push(Step::Emit(InlineToken::LinkClose));
                    }
                    visit_children(&mut stack, &reference.children);
                }
                Node::InlineCode(code) => out.push(InlineToken::CodeInline(code.value.clone())),
                Node::Image(image) => out.push(InlineToken::Image {
                    src: image.url.clone(),
                    alt: image.alt.clone(),
                }),
                Node::ImageReference(reference) => {
                    match self.definitions.get(&normalize_label(&reference.identifier)) {
                        Some(url) => out.push(InlineToken::Image {
                            src: url.clone(),
                            alt: reference.alt.clone(),
                        }),
                        None => push_text(&mut out, &reference.alt),
                    }
                }
                Node::Delete(delete) => {
                    out.push(InlineToken::Other("s_open".into()));
                    stack.push(Step::Emit(InlineToken::Other("s_close".into())));
                    visit_children(&mut stack, &delete.children);
                }
                Node::Html(_) => out.push(InlineToken::Other("html_inline".into())),
                other => out.push(InlineToken::Other(construct_name(other).into())),
            }
        }
        out
    }
}

/// Appends text, merging it into a directly preceding text run.
fn push_text(out: &mut Vec<InlineToken>, text: &str) {
    if let Some(InlineToken::Text(previous)) = out.last_mut() {
        previous.push_str(text);
    } else {
        out.push(InlineToken::Text(text.to_string()));
    }
}
