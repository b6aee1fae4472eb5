//! Selection by boolean mask or by integer positions.
//!
//! A selector containing Missing is refused outright: "select or skip" cannot
//! be decided for that position, and reading it as `false` would silently
//! drop data.

use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::DualArray;
use crate::traits::Bits;

/// Keeps `items[i]` where `mask[i]` is true.
///
/// # Errors
/// * `LengthMismatch` when `mask` is not as long as `items`.
/// * `IndeterminateIndex` at the first Missing mask entry.
pub fn select_mask<T, M>(items: &[T], mask: M) -> Result<Vec<T>>
where
    T: Clone,
    M: IntoIterator<Item = Slot<bool>>,
{
    let keep = resolve_mask("select_mask", mask, items.len())?;
    Ok(items
        .iter()
        .zip(keep)
        .filter_map(|(item, k)| k.then(|| item.clone()))
        .collect())
}

/// Gathers `items` at each position in `indices`, in selector order.
///
/// # Errors
/// * `IndeterminateIndex` at the first Missing index.
/// * `OutOfRange` for a position outside `items`.
pub fn select_indices<T, I>(items: &[T], indices: I) -> Result<Vec<T>>
where
    T: Clone,
    I: IntoIterator<Item = Slot<usize>>,
{
    let positions = resolve_indices("select_indices", indices, items.len())?;
    Ok(positions.into_iter().map(|i| items[i].clone()).collect())
}

/// Mask selection over a dual array; the selected slots keep their Missing
/// state.
pub fn select_mask_dual<T: Bits>(
    items: &DualArray<T>,
    mask: &DualArray<bool>,
) -> Result<DualArray<T>> {
    let keep = resolve_mask("select_mask", mask, items.len())?;
    Ok(items
        .iter()
        .zip(keep)
        .filter_map(|(slot, k)| k.then_some(slot))
        .collect())
}

pub fn select_indices_dual<T: Bits>(
    items: &DualArray<T>,
    indices: &DualArray<u64>,
) -> Result<DualArray<T>> {
    // An index too wide for usize saturates, which is always out of range.
    let indices = indices
        .iter()
        .map(|s| s.map(|i| usize::try_from(i).unwrap_or(usize::MAX)));
    let positions = resolve_indices("select_indices", indices, items.len())?;
    let mut out = DualArray::with_capacity(positions.len());
    for i in positions {
        out.push(items.get(i)?);
    }
    Ok(out)
}

// The whole selector is resolved before anything is gathered, so a failure
// never leaves a partial result behind.
fn resolve_mask<M>(op: &'static str, mask: M, len: usize) -> Result<Vec<bool>>
where
    M: IntoIterator<Item = Slot<bool>>,
{
    let keep = mask
        .into_iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            Slot::Value(b) => Ok(b),
            Slot::Missing => Err(LacunaError::indeterminate(op, position)),
        })
        .collect::<Result<Vec<_>>>()?;
    if keep.len() != len {
        return Err(LacunaError::length_mismatch(op, len, keep.len()));
    }
    Ok(keep)
}

fn resolve_indices<I>(op: &'static str, indices: I, len: usize) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = Slot<usize>>,
{
    indices
        .into_iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            Slot::Value(i) if i < len => Ok(i),
            Slot::Value(i) => Err(LacunaError::out_of_range(op, i, len)),
            Slot::Missing => Err(LacunaError::indeterminate(op, position)),
        })
        .collect()
}
