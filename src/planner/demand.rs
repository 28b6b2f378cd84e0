//! Spreads a committee count over the available slots.

/// Round-robin distribution of `required` committees over `slots` slots.
///
/// The result has one entry per slot, sums to `required`, and no two entries
/// differ by more than one; the remainder lands on the earliest slots.
/// With zero slots nothing can be placed and the result is empty.
///
/// ```
/// # use tribunal::planner::distribute;
/// assert_eq!(distribute(7, 3), vec![3, 2, 2]);
/// ```
pub fn distribute(required: usize, slots: usize) -> Vec<usize> {
    if slots == 0 {
        return Vec::new();
    }
    let base = required / slots;
    let remainder = required % slots;
    (0..slots)
        .map(|slot| base + usize::from(slot < remainder))
        .collect()
}

/// Committees needed to seat `cases` at `capacity` cases per committee.
pub fn committees_needed(cases: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    cases.div_ceil(capacity)
}
