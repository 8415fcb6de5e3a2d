//! # Retention Policy
//!
//! Decides how much of the chunk store survives a reset.

/// Outcome of the retention walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Retention {
    /// Drop every chunk and start over with one base-sized chunk.
    Fresh,
    /// Keep the first `n` chunks, drop the rest.
    Keep(usize),
}

/// Plans a reset for chunks with the given capacities, in store order.
///
/// - Empty store: `Fresh`.
/// - First chunk alone over budget: `Fresh`. This is not the same as the
///   walk below, which would keep that chunk.
/// - Otherwise keep every chunk up to and including the first one at which
///   the running total exceeds the budget.
///
/// Retained capacity therefore never exceeds `budget` by more than one chunk.
pub(crate) fn plan<I>(capacities: I, budget: usize) -> Retention
where
    I: IntoIterator<Item = usize>,
{
    let mut total = 0usize;
    let mut seen = 0usize;

    for capacity in capacities {
        if seen == 0 && capacity > budget {
            return Retention::Fresh;
        }
        seen += 1;
        total = total.saturating_add(capacity);
        if total > budget {
            return Retention::Keep(seen);
        }
    }

    if seen == 0 {
        Retention::Fresh
    } else {
        Retention::Keep(seen)
    }
}
