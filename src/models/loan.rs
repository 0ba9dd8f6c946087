//! Loan model and lifecycle helpers

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Loan period granted at creation, in days.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Maximum simultaneously active loans per reader.
pub const ACTIVE_LOAN_CAP: usize = 3;

/// A record of one book held by one reader for a bounded period.
///
/// States are `Active` and `Returned`; the single transition happens in
/// [`Loan::mark_returned`] and is terminal. `returned` is the canonical
/// state flag; `returned_at` is non-null iff `returned` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: u32,
    pub book_id: u32,
    pub reader_id: u32,
    pub borrowed_at: DateTime<Utc>,
    /// Fixed at creation, never recomputed.
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub returned: bool,
}

impl Loan {
    /// Open a new active loan due `LOAN_PERIOD_DAYS` after `borrowed_at`.
    pub fn new(id: u32, book_id: u32, reader_id: u32, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            book_id,
            reader_id,
            borrowed_at,
            due_at: borrowed_at + Duration::days(LOAN_PERIOD_DAYS),
            returned_at: None,
            returned: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.returned
    }

    /// Terminal transition; the caller checks the current state first.
    pub(crate) fn mark_returned(&mut self, now: DateTime<Utc>) {
        self.returned_at = Some(now);
        self.returned = true;
    }

    /// Overdue check: against `now` while active, against the actual
    /// return date once returned.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.returned {
            matches!(self.returned_at, Some(d) if d > self.due_at)
        } else {
            now > self.due_at
        }
    }

    /// Whole days late, floored at zero.
    pub fn overdue_days(&self, now: DateTime<Utc>) -> i64 {
        let reference = if self.returned {
            self.returned_at.unwrap_or(now)
        } else {
            now
        };
        (reference - self.due_at).num_days().max(0)
    }
}
