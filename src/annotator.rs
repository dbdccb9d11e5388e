use crate::model::{AnnotatedBlock, Block};

/// Order blocks by time and attach each block's generation time.
///
/// The chronologically earliest block has no predecessor in the batch and is
/// dropped, so `n` blocks yield `n - 1` annotated ones. Equal timestamps keep
/// their input order.
pub fn annotate(mut blocks: Vec<Block>) -> Vec<AnnotatedBlock> {
    blocks.sort_by_key(|b| b.time);

    let mut annotated = Vec::with_capacity(blocks.len().saturating_sub(1));
    let mut blocks = blocks.into_iter();
    let Some(mut previous_time) = blocks.next().map(|b| b.time) else {
        return annotated;
    };

    for block in blocks {
        let generation_time = block.time - previous_time;
        previous_time = block.time;
        annotated.push(AnnotatedBlock {
            block,
            generation_time,
        });
    }

    annotated
}
