//! Ordering helpers for tolerance-based comparators.

use std::cmp::Ordering;

/// Stable merge sort over a comparator that need not be a total order.
///
/// Tolerance comparators ("same row if within 3 units") are not
/// transitive. `slice::sort_by` may panic on such comparators, so runs are
/// ordered with this merge sort, which only ever asks "is right strictly
/// before left".
pub fn stable_sort_by<T, F>(items: Vec<T>, compare: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = stable_sort_by(left, compare);
    let right = stable_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let next = if compare(r, l) == Ordering::Less {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);

    merged
}

/// Compare two floats, treating NaN as equal.
pub fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
