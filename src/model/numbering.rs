//! Bijective position maps between two coordinate spaces.
//!
//! A [`NumberingSystem`] relates 1-based sequence positions to a second index space: the
//! alignment column a residue came from, or the residue label printed in a coordinate file.
//! Only positions that exist in both spaces are stored, so lookups in either direction
//! return `None` for anything unmapped.

use std::collections::BTreeMap;

/// Bidirectional map from sequence positions to values of type `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingSystem<T: Ord + Clone> {
    forward: BTreeMap<usize, T>,
    backward: BTreeMap<T, usize>,
}

impl<T: Ord + Clone> Default for NumberingSystem<T> {
    fn default() -> Self {
        Self {
            forward: BTreeMap::new(),
            backward: BTreeMap::new(),
        }
    }
}

impl<T: Ord + Clone> NumberingSystem<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `position` to `value`, evicting any earlier mapping of either side.
    pub fn insert(&mut self, position: usize, value: T) {
        if let Some(old_value) = self.forward.remove(&position) {
            self.backward.remove(&old_value);
        }
        if let Some(old_position) = self.backward.remove(&value) {
            self.forward.remove(&old_position);
        }
        self.forward.insert(position, value.clone());
        self.backward.insert(value, position);
    }

    /// Value mapped to a sequence position.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.forward.get(&position)
    }

    /// Sequence position mapped to a value.
    pub fn position_of(&self, value: &T) -> Option<usize> {
        self.backward.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterates `(position, value)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.forward.iter().map(|(p, v)| (*p, v))
    }
}

impl<T: Ord + Clone> FromIterator<(usize, T)> for NumberingSystem<T> {
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        let mut numbering = Self::new();
        for (position, value) in iter {
            numbering.insert(position, value);
        }
        numbering
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_work_in_both_directions() {
        let numbering: NumberingSystem<usize> = [(1, 3), (2, 4), (3, 7)].into_iter().collect();

        assert_eq!(numbering.get(3), Some(&7));
        assert_eq!(numbering.position_of(&4), Some(2));
        assert_eq!(numbering.get(4), None);
        assert_eq!(numbering.position_of(&5), None);
        assert_eq!(numbering.len(), 3);
    }

    #[test]
    fn insert_keeps_the_map_bijective() {
        let mut numbering = NumberingSystem::new();
        numbering.insert(1, "10".to_string());
        numbering.insert(2, "10".to_string());

        assert_eq!(numbering.get(1), None);
        assert_eq!(numbering.position_of(&"10".to_string()), Some(2));

        numbering.insert(2, "11".to_string());
        assert_eq!(numbering.position_of(&"10".to_string()), None);
        assert_eq!(numbering.len(), 1);
    }

    #[test]
    fn iter_is_position_ordered() {
        let numbering: NumberingSystem<usize> = [(3, 9), (1, 2)].into_iter().collect();
        let pairs: Vec<_> = numbering.iter().map(|(p, v)| (p, *v)).collect();
        assert_eq!(pairs, vec![(1, 2), (3, 9)]);
    }
}
