//! Splitting block lists to the service's per-request child limit.

use crate::types::Block;

/// Most children the service accepts in one create or append request.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

/// Consecutive, order-preserving batches of at most
/// [`MAX_CHILDREN_PER_REQUEST`] blocks. No blocks, no batches.
pub fn request_batches(blocks: &[Block]) -> std::slice::Chunks<'_, Block> {
    blocks.chunks(MAX_CHILDREN_PER_REQUEST)
}
