use std::sync::atomic::{AtomicU64, Ordering};

/// Row limit of the next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchLimit {
    /// No `LIMIT` clause.
    Unbounded,
    /// `LIMIT n`, n > 0.
    Rows(u64),
    /// A budget reached zero; no further query.
    Exhausted,
}

impl BatchLimit {
    /// Value for the `LIMIT` clause, 0 meaning none.
    pub fn rows(self) -> u64 {
        match self {
            BatchLimit::Rows(n) => n,
            BatchLimit::Unbounded | BatchLimit::Exhausted => 0,
        }
    }
}

/// Combines the bounds on the next batch: the smallest of the batch size (if
/// positive) and the remaining global and per-table budgets (if any).
pub fn effective_limit(
    batch_size: u64,
    global_remaining: Option<u64>,
    table_remaining: Option<u64>,
) -> BatchLimit {
    let bounds = [global_remaining, table_remaining];
    if bounds.iter().any(|b| *b == Some(0)) {
        return BatchLimit::Exhausted;
    }
    let positive_batch = (batch_size > 0).then_some(batch_size);
    bounds
        .into_iter()
        .chain(std::iter::once(positive_batch))
        .flatten()
        .min()
        .map_or(BatchLimit::Unbounded, BatchLimit::Rows)
}

/// Row budget shared by every table of a run.
///
/// Rows are taken one at a time with a compare-and-swap, so concurrent workers
/// never write more than the budget in total.
#[derive(Debug, Default)]
pub struct RowBudget {
    remaining: Option<AtomicU64>,
}

impl RowBudget {
    /// A budget of `limit` rows; 0 means unlimited.
    pub fn new(limit: u64) -> Self {
        Self {
            remaining: (limit > 0).then(|| AtomicU64::new(limit)),
        }
    }

    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    /// Rows left, `None` when unlimited.
    pub fn remaining(&self) -> Option<u64> {
        self.remaining.as_ref().map(|r| r.load(Ordering::Acquire))
    }

    /// Takes one row from the budget. Returns false once it is used up.
    pub fn try_take(&self) -> bool {
        match &self.remaining {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok(),
        }
    }

    /// Whether no rows are left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }
}
