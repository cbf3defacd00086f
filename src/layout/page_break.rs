//! # Page Break Decisions
//!
//! Receipt blocks are unbreakable: a block either fits in the space left
//! above the page floor or moves whole to a fresh page.

/// What to do with the next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place the block on the current page.
    Place,
    /// Close the current page and place the block at the top of a new one.
    MoveToNextPage,
}

/// Decide where a block of `block_height` goes.
///
/// `remaining_height` is the space between the cursor and the page floor.
/// A block taller than a whole page is placed anyway when the page is still
/// empty, so an oversized block costs one overflowing page instead of an
/// endless run of blank ones.
pub fn decide_break(remaining_height: f64, block_height: f64, page_is_empty: bool) -> BreakDecision {
    if block_height <= remaining_height + f64::EPSILON {
        return BreakDecision::Place;
    }

    if page_is_empty {
        return BreakDecision::Place;
    }

    BreakDecision::MoveToNextPage
}
