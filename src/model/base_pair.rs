use super::location::Location;
use super::types::{Edge, Orientation};
use std::fmt;

/// Relation between two sequence positions.
///
/// Endpoints are normalized so that `start < end`; edges are swapped along with them so
/// `edge5` always describes the 5′ partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasePair {
    start: usize,
    end: usize,
    pub edge5: Edge,
    pub edge3: Edge,
    pub orientation: Orientation,
}

impl BasePair {
    /// Canonical Watson–Crick cis pair between two positions.
    pub fn new(a: usize, b: usize) -> Self {
        Self::with_geometry(a, b, Edge::default(), Edge::default(), Orientation::default())
    }

    /// Pair with explicit edges, given in the order of `a` and `b`.
    pub fn with_geometry(
        a: usize,
        b: usize,
        edge_a: Edge,
        edge_b: Edge,
        orientation: Orientation,
    ) -> Self {
        if a <= b {
            Self {
                start: a,
                end: b,
                edge5: edge_a,
                edge3: edge_b,
                orientation,
            }
        } else {
            Self {
                start: b,
                end: a,
                edge5: edge_b,
                edge3: edge_a,
                orientation,
            }
        }
    }

    /// 5′ position.
    pub fn start(&self) -> usize {
        self.start
    }

    /// 3′ position.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The two endpoints as a location.
    pub fn location(&self) -> Location {
        Location::from_positions([self.start, self.end])
    }

    /// Whether `position` is one of the two endpoints.
    pub fn involves(&self, position: usize) -> bool {
        self.start == position || self.end == position
    }

    /// Partner of `position` in this pair.
    pub fn partner_of(&self, position: usize) -> Option<usize> {
        if position == self.start {
            Some(self.end)
        } else if position == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    /// Whether the two pairs interleave (`i < k < j < l`), i.e. cannot both be nested.
    pub fn crosses(&self, other: &BasePair) -> bool {
        (self.start < other.start && other.start < self.end && self.end < other.end)
            || (other.start < self.start && self.start < other.end && other.end < self.end)
    }

    /// Whether `other` stacks directly inside this pair.
    pub fn stacks_on(&self, other: &BasePair) -> bool {
        other.start == self.start + 1 && other.end + 1 == self.end
    }

    /// Whether this pair uses a canonical Watson–Crick cis geometry.
    pub fn is_canonical(&self) -> bool {
        self.edge5 == Edge::WatsonCrick
            && self.edge3 == Edge::WatsonCrick
            && self.orientation == Orientation::Cis
    }
}

impl fmt::Display for BasePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({}{}, {})",
            self.start, self.end, self.edge5, self.edge3, self.orientation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_endpoints_and_defaults_to_canonical() {
        let pair = BasePair::new(9, 2);
        assert_eq!((pair.start(), pair.end()), (2, 9));
        assert!(pair.is_canonical());
        assert_eq!(pair.partner_of(9), Some(2));
        assert_eq!(pair.partner_of(5), None);
    }

    #[test]
    fn with_geometry_swaps_edges_with_endpoints() {
        let pair =
            BasePair::with_geometry(10, 3, Edge::Hoogsteen, Edge::Sugar, Orientation::Trans);
        assert_eq!(pair.start(), 3);
        assert_eq!(pair.edge5, Edge::Sugar);
        assert_eq!(pair.edge3, Edge::Hoogsteen);
        assert!(!pair.is_canonical());
        assert_eq!(pair.to_string(), "3-10 (SH, trans)");
    }

    #[test]
    fn crosses_detects_interleaving_only() {
        let outer = BasePair::new(1, 10);
        let inner = BasePair::new(2, 9);
        let knot = BasePair::new(5, 15);
        let after = BasePair::new(11, 20);

        assert!(!outer.crosses(&inner));
        assert!(outer.crosses(&knot));
        assert!(knot.crosses(&outer));
        assert!(!outer.crosses(&after));
        assert!(outer.stacks_on(&inner));
        assert!(!inner.stacks_on(&outer));
    }
}
