//! Inline formatter: one inline payload to styled spans.

use crate::types::{Annotations, RichText, Span};
use docsync_core::InlineToken;

/// Spans of one inline payload, plus whether its markers paired up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    /// Styled spans in order.
    pub text: RichText,
    /// False when a closer had no opener or an opener was never closed.
    pub balanced: bool,
}

/// Formats inline children into styled spans.
///
/// ```
/// use docsync_blocks::format_inline;
/// use docsync_core::InlineToken;
///
/// let text = format_inline(&[
///     InlineToken::Text("Hello ".into()),
///     InlineToken::StrongOpen,
///     InlineToken::Text("world".into()),
///     InlineToken::StrongClose,
/// ]);
/// assert_eq!(text.plain_text(), "Hello world");
/// assert!(text.spans()[1].annotations().bold);
/// ```
pub fn format_inline(children: &[InlineToken]) -> RichText {
    format_inline_checked(children).text
}

/// Formats inline children and reports marker balance.
///
/// Bold and italic are a set of active flags toggled by their markers; only
/// one link is active at a time. Unmatched markers have no effect beyond
/// clearing `balanced`.
pub fn format_inline_checked(children: &[InlineToken]) -> Formatted {
    let mut active = Annotations::default();
    let mut link: Option<&str> = None;
    let mut balanced = true;
    let mut spans = Vec::new();

    for child in children {
        match child {
            InlineToken::StrongOpen => active.bold = true,
            InlineToken::StrongClose => {
                balanced &= active.bold;
                active.bold = false;
            }
            InlineToken::EmOpen => active.italic = true,
            InlineToken::EmClose => {
                balanced &= active.italic;
                active.italic = false;
            }
            InlineToken::LinkOpen { href } => link = Some(href.as_str()),
            InlineToken::LinkClose => {
                balanced &= link.is_some();
                link = None;
            }
            InlineToken::Text(content) if !content.is_empty() => spans.push(Span {
                content: content.clone(),
                annotations: active.non_empty(),
                link: link.map(str::to_string),
            }),
            // Code is exclusive: no bold, italic or link.
            InlineToken::CodeInline(code) => spans.push(Span::code(code.as_str())),
            _ => {}
        }
    }

    balanced &= active.is_empty() && link.is_none();

    Formatted {
        text: RichText(spans),
        balanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> InlineToken {
        InlineToken::Text(value.to_string())
    }

    const BOLD: Annotations = Annotations {
        bold: true,
        italic: false,
        code: false,
    };
    const BOLD_ITALIC: Annotations = Annotations {
        bold: true,
        italic: true,
        code: false,
    };

    #[test]
    fn nested_italic_inside_bold() {
        // **bold and *nested italic***
        let formatted = format_inline_checked(&[
            InlineToken::StrongOpen,
            text("bold and "),
            InlineToken::EmOpen,
            text("nested italic"),
            InlineToken::EmClose,
            InlineToken::StrongClose,
            text(" after"),
        ]);

        assert!(formatted.balanced);
        assert_eq!(
            formatted.text.spans(),
            &[
                Span::styled("bold and ", BOLD),
                Span::styled("nested italic", BOLD_ITALIC),
                Span::plain(" after"),
            ]
        );
    }

    #[test]
    fn inline_code_never_combines_with_bold() {
        // **text `code` here**
        let spans = format_inline(&[
            InlineToken::StrongOpen,
            text("text "),
            InlineToken::CodeInline("code".into()),
            text(" here"),
            InlineToken::StrongClose,
        ]);

        assert_eq!(
            spans.spans(),
            &[
                Span::styled("text ", BOLD),
                Span::code("code"),
                Span::styled(" here", BOLD),
            ]
        );
        assert_eq!(spans.spans()[1].annotations, Some(Annotations::CODE));
    }

    #[test]
    fn inline_code_inside_link_drops_the_link() {
        let spans = format_inline(&[
            InlineToken::LinkOpen {
                href: "https://example.com".into(),
            },
            InlineToken::CodeInline("x".into()),
            InlineToken::LinkClose,
        ]);
        assert_eq!(spans.spans(), &[Span::code("x")]);
    }

    #[test]
    fn link_text_carries_target() {
        let spans = format_inline(&[
            InlineToken::LinkOpen {
                href: "https://example.com".into(),
            },
            text("Visit my website"),
            InlineToken::LinkClose,
        ]);
        assert_eq!(
            spans.spans(),
            &[Span::plain("Visit my website").linked("https://example.com")]
        );
    }

    #[test]
    fn bold_link_keeps_both() {
        let spans = format_inline(&[
            InlineToken::StrongOpen,
            InlineToken::LinkOpen { href: "/a".into() },
            text("a"),
            InlineToken::LinkClose,
            InlineToken::StrongClose,
        ]);
        assert_eq!(spans.spans(), &[Span::styled("a", BOLD).linked("/a")]);
    }

    #[test]
    fn unmatched_close_is_a_no_op() {
        let formatted = format_inline_checked(&[
            InlineToken::StrongClose,
            text("plain"),
            InlineToken::LinkClose,
        ]);
        assert!(!formatted.balanced);
        assert_eq!(formatted.text.spans(), &[Span::plain("plain")]);
    }

    #[test]
    fn unclosed_opener_is_reported() {
        let formatted = format_inline_checked(&[InlineToken::EmOpen, text("dangling")]);
        assert!(!formatted.balanced);
        assert!(formatted.text.spans()[0].annotations().italic);
    }

    #[test]
    fn empty_runs_and_unknown_children_are_skipped() {
        let spans = format_inline(&[
            text(""),
            InlineToken::Other("s_open".into()),
            text("kept"),
            InlineToken::Image {
                src: "a.png".into(),
                alt: "a".into(),
            },
        ]);
        assert_eq!(spans.spans(), &[Span::plain("kept")]);
    }

    #[test]
    fn no_children_no_spans() {
        let formatted = format_inline_checked(&[]);
        assert!(formatted.text.is_empty());
        assert!(formatted.balanced);
    }
}
