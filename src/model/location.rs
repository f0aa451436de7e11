//! Sets of sequence positions expressed as inclusive ranges.
//!
//! A [`Location`] is kept in canonical form: its [`Block`]s are sorted, never overlap, and
//! never touch, so two locations covering the same positions compare equal regardless of
//! how they were assembled.

use std::fmt;

/// Inclusive range of 1-based positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    /// Creates a block, swapping the bounds if they arrive reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Union of disjoint position blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    blocks: Vec<Block>,
}

impl Location {
    /// Single inclusive range.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            blocks: vec![Block::new(start, end)],
        }
    }

    /// Single position.
    pub fn single(position: usize) -> Self {
        Self::new(position, position)
    }

    /// Builds a canonical location from arbitrary blocks.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut sorted: Vec<Block> = blocks.into_iter().collect();
        sorted.sort();

        let mut merged: Vec<Block> = Vec::with_capacity(sorted.len());
        for block in sorted {
            match merged.last_mut() {
                Some(last) if block.start <= last.end + 1 => {
                    last.end = last.end.max(block.end);
                }
                _ => merged.push(block),
            }
        }
        Self { blocks: merged }
    }

    /// Builds a canonical location from individual positions.
    pub fn from_positions(positions: impl IntoIterator<Item = usize>) -> Self {
        Self::from_blocks(positions.into_iter().map(|p| Block::new(p, p)))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }

    pub fn start(&self) -> Option<usize> {
        self.blocks.first().map(|b| b.start)
    }

    pub fn end(&self) -> Option<usize> {
        self.blocks.last().map(|b| b.end)
    }

    pub fn contains(&self, position: usize) -> bool {
        self.blocks.iter().any(|b| b.contains(position))
    }

    /// Whether every position of `other` lies inside this location.
    pub fn covers(&self, other: &Location) -> bool {
        other.positions().all(|p| self.contains(p))
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().flat_map(Block::positions)
    }

    /// Union of two locations.
    pub fn union(&self, other: &Location) -> Location {
        Self::from_blocks(self.blocks.iter().chain(other.blocks.iter()).copied())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.blocks.iter().map(Block::to_string).collect();
        write!(f, "{}", parts.join(":"))
    }
}
