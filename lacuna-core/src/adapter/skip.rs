//! Lazy filtering over the non-missing elements of any slot sequence.

use std::iter::FusedIterator;

use crate::slot::Slot;

/// Yields the present values of the wrapped slot iterator, in order.
///
/// The adapter is as capable as its source: double-ended when the source is,
/// and restartable through `Clone`. Its length is unknown without a full
/// scan, so `size_hint` reports a lower bound of zero.
#[derive(Debug, Clone)]
pub struct SkipMissing<I> {
    inner: I,
}

pub fn skip_missing<I, T>(source: I) -> SkipMissing<I::IntoIter>
where
    I: IntoIterator<Item = Slot<T>>,
{
    SkipMissing {
        inner: source.into_iter(),
    }
}

impl<I, T> Iterator for SkipMissing<I>
where
    I: Iterator<Item = Slot<T>>,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        loop {
            match self.inner.next()? {
                Slot::Value(v) => return Some(v),
                Slot::Missing => continue,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<I, T> DoubleEndedIterator for SkipMissing<I>
where
    I: DoubleEndedIterator<Item = Slot<T>>,
{
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        loop {
            match self.inner.next_back()? {
                Slot::Value(v) => return Some(v),
                Slot::Missing => continue,
            }
        }
    }
}

impl<I, T> FusedIterator for SkipMissing<I> where I: FusedIterator<Item = Slot<T>> {}
