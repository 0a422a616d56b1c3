//! Page assembly: metadata plus compiled body of one Markdown page.

use crate::batch::request_batches;
use crate::compiler::{Compilation, Limitation, compile_with_report};
use crate::options::Options;
use crate::types::Block;
use crate::wire::{append_children_body, page_create_body};
use docsync_core::{FrontmatterError, ParseOptions, SyncError, split_frontmatter, tokenize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Page metadata read from front matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page title; pages are matched by title and parent.
    pub title: String,
    /// Parent page id.
    #[serde(default)]
    pub parent_page_id: Option<String>,
    /// Emoji icon.
    #[serde(default)]
    pub icon: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub cover: Option<String>,
}

/// Errors raised while assembling a page.
#[derive(Debug, Error)]
pub enum PageError {
    /// Front matter could not be split or parsed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// Front matter did not describe a page.
    #[error("Invalid page metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    /// Body could not be tokenized.
    #[error(transparent)]
    Markdown(#[from] SyncError),
}

/// A page ready to be handed to the publishing client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPage {
    /// Metadata from front matter.
    pub meta: PageMeta,
    /// Body blocks in document order.
    pub blocks: Vec<Block>,
    /// Limitations hit while compiling the body.
    pub notes: Vec<Limitation>,
}

impl CompiledPage {
    /// Request body creating the page with its first batch of blocks.
    pub fn create_body(&self) -> Value {
        let first = request_batches(&self.blocks).next().unwrap_or_default();
        page_create_body(&self.meta, first)
    }

    /// Append bodies for every block after the first batch.
    pub fn remaining_append_bodies(&self) -> Vec<Value> {
        request_batches(&self.blocks)
            .skip(1)
            .map(append_children_body)
            .collect()
    }

    /// Append bodies for the whole body, used when replacing the content of
    /// an existing page.
    pub fn replace_bodies(&self) -> Vec<Value> {
        request_batches(&self.blocks)
            .map(append_children_body)
            .collect()
    }
}

/// Splits, validates and compiles one page source.
pub fn compile_page(source: &str, options: &Options) -> Result<CompiledPage, PageError> {
    let (metadata, body) = split_frontmatter(source)?;
    let meta: PageMeta = serde_json::from_value(metadata)?;

    let tokens = tokenize(body, &ParseOptions::markdown())?;
    let Compilation { blocks, notes } = compile_with_report(&tokens, options);
    log::debug!(
        "Compiled page '{}': {} blocks, {} limitations",
        meta.title,
        blocks.len(),
        notes.len()
    );

    Ok(CompiledPage {
        meta,
        blocks,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RichText;

    const PAGE: &str = "---\ntitle: 'Test Page'\nparent_page_id: 'test_parent_id'\nicon: '📄'\n---\n# Hello\n\nThis is a test.";

    #[test]
    fn compiles_metadata_and_body() {
        let page = compile_page(PAGE, &Options::default()).unwrap();
        assert_eq!(
            page.meta,
            PageMeta {
                title: "Test Page".into(),
                parent_page_id: Some("test_parent_id".into()),
                icon: Some("📄".into()),
                cover: None,
            }
        );
        assert_eq!(
            page.blocks,
            vec![
                Block::heading(1, RichText::plain("Hello")),
                Block::paragraph(RichText::plain("This is a test.")),
            ]
        );
        assert!(page.notes.is_empty());
    }

    #[test]
    fn create_body_matches_the_service_shape() {
        let body = compile_page(PAGE, &Options::default()).unwrap().create_body();
        assert_eq!(body["parent"]["page_id"], "test_parent_id");
        assert_eq!(body["properties"]["title"][0]["text"]["content"], "Test Page");
        assert_eq!(body["icon"]["emoji"], "📄");
        assert_eq!(body["children"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn long_pages_are_split_into_append_requests() {
        let mut source = String::from("---\ntitle: Long\n---\n");
        for n in 0..230 {
            source.push_str(&format!("Paragraph {}\n\n", n));
        }
        let page = compile_page(&source, &Options::default()).unwrap();
        assert_eq!(page.blocks.len(), 230);
        assert_eq!(page.create_body()["children"].as_array().map(Vec::len), Some(100));

        let appends = page.remaining_append_bodies();
        assert_eq!(appends.len(), 2);
        assert_eq!(appends[1]["children"].as_array().map(Vec::len), Some(30));
        assert_eq!(page.replace_bodies().len(), 3);
    }

    #[test]
    fn empty_body_creates_page_without_children() {
        let page = compile_page("---\ntitle: Empty\n---\n", &Options::default()).unwrap();
        assert!(page.blocks.is_empty());
        assert_eq!(page.create_body()["children"], serde_json::json!([]));
        assert!(page.replace_bodies().is_empty());
    }

    #[test]
    fn missing_title_is_a_metadata_error() {
        let err = compile_page("---\nicon: x\n---\nBody", &Options::default()).unwrap_err();
        assert!(matches!(err, PageError::Metadata(_)), "{err:?}");
    }

    #[test]
    fn page_without_front_matter_has_no_title() {
        let err = compile_page("# Just a body", &Options::default()).unwrap_err();
        assert!(matches!(err, PageError::Metadata(_)));
    }

    #[test]
    fn front_matter_errors_pass_through() {
        let err = compile_page("---\ntitle: x\n", &Options::default()).unwrap_err();
        assert!(matches!(
            err,
            PageError::Frontmatter(FrontmatterError::Unterminated)
        ));
    }
}
