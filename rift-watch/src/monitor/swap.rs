//! Overtake detection between two orderings.

/// Find which elements moved up past which others between `old` and `new`.
///
/// Returns `(index, overtaken, overtaker)` tuples. For every element `y` that
/// sits at a lower index in `new` than in `old`, each element met while
/// scanning `old` forward from `y`'s new index up to `y` is reported as
/// overtaken by `y`, at its index in `old`. Tuples for one `y` are emitted in
/// reverse scan order.
///
/// This is an approximation tuned for orderings that differ by a few moves.
/// Under large simultaneous reorderings it may miss overtakes that a minimal
/// transposition analysis would report.
///
/// Elements of `new` that are absent from `old` are ignored; restrict both
/// sides to their intersection first for meaningful output.
pub fn detect_swaps<T>(old: &[T], new: &[T]) -> Vec<(usize, T, T)>
where
    T: PartialEq + Clone,
{
    let mut swaps = Vec::new();

    for (i, y) in new.iter().enumerate() {
        let Some(old_index) = old.iter().position(|x| x == y) else {
            continue;
        };
        if old_index <= i {
            continue;
        }

        let mut found: Vec<(usize, T, T)> = old[i..old_index]
            .iter()
            .enumerate()
            .map(|(offset, x)| (i + offset, x.clone(), y.clone()))
            .collect();
        found.reverse();
        swaps.extend(found);
    }

    swaps
}
