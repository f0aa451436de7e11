//! Parallel iteration shim.
//!
//! With the `parallel` feature the rayon traits are re-exported; without it, serial
//! stand-ins with the same method names let call sites be written once.

#[cfg(feature = "parallel")]
pub use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

#[cfg(not(feature = "parallel"))]
pub use self::fallback::*;

#[cfg(not(feature = "parallel"))]
mod fallback {
    pub use std::iter::Iterator as ParallelIterator;
    pub use std::iter::Iterator as IndexedParallelIterator;

    /// Serial `par_iter()` for anything iterable by reference.
    pub trait IntoParallelRefIterator<'data> {
        type Item;
        type Iter: Iterator<Item = Self::Item>;
        fn par_iter(&'data self) -> Self::Iter;
    }

    impl<'data, I: 'data + ?Sized> IntoParallelRefIterator<'data> for I
    where
        &'data I: IntoIterator,
    {
        type Item = <&'data I as IntoIterator>::Item;
        type Iter = <&'data I as IntoIterator>::IntoIter;
        fn par_iter(&'data self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn par_iter_preserves_every_item() {
        let values = vec![1, 2, 3, 4];
        let mut doubled: Vec<i32> = values
            .par_iter()
            .enumerate()
            .flat_map(|(i, v)| vec![v * 2; i % 2 + 1])
            .collect();
        doubled.sort_unstable();
        assert_eq!(doubled, vec![2, 4, 4, 6, 8, 8]);
    }
}
