#![deny(missing_docs)]
//! docsync core: front matter splitting, Markdown tokenization, and errors.

/// Core error types.
pub mod error;
/// YAML front matter splitting.
pub mod frontmatter;
/// Markdown parsing and linearization into tokens.
pub mod parse;
/// Flat block and inline token model.
pub mod tokens;

pub use error::{SourceLocation, SyncError};
pub use frontmatter::{FrontmatterError, FrontmatterExtraction, extract_frontmatter, split_frontmatter};
pub use parse::{ParseOptions, parse_mdast, tokenize, tokens_from_mdast};
pub use tokens::{InlineToken, Token};
