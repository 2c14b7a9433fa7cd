//! Neighbor agreement over non-increasing slot sequences.
//!
//! Genre slots are listed strongest first, so a value agrees with its
//! position when it is no larger than what precedes it and no smaller than
//! what follows. Unreadable entries (`None`) are skipped.

/// Which way to search from a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Nearest readable value strictly to one side of `index`.
pub fn nearest_recognized<T: Copy>(seq: &[Option<T>], index: usize, side: Side) -> Option<T> {
    match side {
        Side::Left => seq[..index.min(seq.len())].iter().rev().find_map(|v| *v),
        Side::Right => seq
            .get(index + 1..)
            .and_then(|rest| rest.iter().find_map(|v| *v)),
    }
}

/// Whether `value` placed at `index` keeps `seq` non-increasing.
///
/// The first and last slots look only at their immediate neighbor and agree
/// when it is unreadable. Interior slots compare against the nearest readable
/// value on each side; a side with none agrees.
pub fn agrees<T: Copy + Ord>(value: T, index: usize, seq: &[Option<T>]) -> bool {
    let n = seq.len();
    if n <= 1 || index >= n {
        return true;
    }
    if index == 0 {
        return seq[1].is_none_or(|right| value >= right);
    }
    if index == n - 1 {
        return seq[n - 2].is_none_or(|left| left >= value);
    }

    let left_ok = nearest_recognized(seq, index, Side::Left).is_none_or(|left| left >= value);
    let right_ok = nearest_recognized(seq, index, Side::Right).is_none_or(|right| value >= right);
    left_ok && right_ok
}

/// Lifts a fully known sequence into the form [`agrees`] takes.
pub fn known<T: Copy>(values: &[T]) -> Vec<Option<T>> {
    values.iter().copied().map(Some).collect()
}
