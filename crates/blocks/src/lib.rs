#![deny(missing_docs)]
//! docsync blocks: compiles Markdown pages into the block tree of a hosted
//! workspace-document service.

/// Request batching to the service's child limit.
pub mod batch;
/// Block compiler over the flat token stream.
pub mod compiler;
/// Inline formatter.
pub mod inline;
/// Rendering rules.
pub mod options;
/// Page metadata and assembly.
pub mod page;
/// Parallel compilation of many pages.
pub mod parallel;
/// Block tree types.
pub mod types;
/// Wire JSON for the service.
pub mod wire;

pub use batch::{MAX_CHILDREN_PER_REQUEST, request_batches};
pub use compiler::{Compilation, Limitation, compile, compile_with_report, markdown_to_blocks};
pub use inline::{Formatted, format_inline, format_inline_checked};
pub use options::{HeadingOverflow, Options, RaggedRows};
pub use page::{CompiledPage, PageError, PageMeta, compile_page};
pub use parallel::{BatchOptions, BatchOutcome, BatchStats, PageInput, PageResult, compile_pages};
pub use types::{Annotations, Block, RichText, Span, TableRow};
pub use wire::{
    MAX_TEXT_LENGTH, append_children_body, block_to_wire, blocks_to_wire, page_create_body,
    page_properties, rich_text_to_wire,
};
