//! Loan ledger: loan records and the per-reader index.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::{LibraryError, LibraryResult};
use crate::models::Loan;

/// Owns the loan records, in insertion order, plus an index from reader
/// id to every loan id of that reader (returned loans included, kept
/// for history listing).
#[derive(Debug)]
pub struct LoanLedger {
    loans: IndexMap<u32, Loan>,
    by_reader: IndexMap<u32, HashSet<u32>>,
    next_id: u32,
}

impl Default for LoanLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanLedger {
    pub fn new() -> Self {
        Self {
            loans: IndexMap::new(),
            by_reader: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Record a new active loan and return its id. Validation happens
    /// in the aggregate beforehand.
    pub(crate) fn open(&mut self, book_id: u32, reader_id: u32, now: DateTime<Utc>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.loans.insert(id, Loan::new(id, book_id, reader_id, now));
        self.by_reader
            .entry(reader_id)
            .or_insert_with(HashSet::new)
            .insert(id);
        id
    }

    /// Transition a loan to `Returned`.
    pub(crate) fn close(&mut self, loan_id: u32, now: DateTime<Utc>) -> LibraryResult<&Loan> {
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or_else(|| LibraryError::NotFound(format!("loan {} not found", loan_id)))?;
        if loan.returned {
            return Err(LibraryError::AlreadyReturned(format!(
                "loan {} was already returned",
                loan_id
            )));
        }
        loan.mark_returned(now);
        Ok(&*loan)
    }

    pub fn get(&self, loan_id: u32) -> Option<&Loan> {
        self.loans.get(&loan_id)
    }

    /// Unreturned loans in insertion order.
    pub fn active_loans(&self) -> Vec<&Loan> {
        self.loans.values().filter(|l| l.is_active()).collect()
    }

    /// Every loan of a reader, returned ones included, via the
    /// per-reader index (the index is a set, order undefined).
    pub fn loans_for_reader(&self, reader_id: u32) -> Vec<&Loan> {
        self.by_reader
            .get(&reader_id)
            .map(|ids| ids.iter().filter_map(|id| self.loans.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn active_count_for_reader(&self, reader_id: u32) -> usize {
        self.by_reader
            .get(&reader_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.loans.get(id))
                    .filter(|l| l.is_active())
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn book_has_active_loan(&self, book_id: u32) -> bool {
        self.loans
            .values()
            .any(|l| l.book_id == book_id && l.is_active())
    }

    pub fn count_active(&self) -> usize {
        self.loans.values().filter(|l| l.is_active()).count()
    }

    /// Active loans past their due date as of `now`.
    pub fn count_overdue(&self, now: DateTime<Utc>) -> usize {
        self.loans
            .values()
            .filter(|l| l.is_active() && l.is_overdue(now))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Replace ledger contents with loaded records, rebuilding the
    /// per-reader index and advancing the id counter past the maximum
    /// loaded id.
    pub(crate) fn load_records(&mut self, loans: Vec<Loan>) {
        self.loans.clear();
        self.by_reader.clear();
        self.next_id = loans.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        for loan in loans {
            self.by_reader
                .entry(loan.reader_id)
                .or_insert_with(HashSet::new)
                .insert(loan.id);
            self.loans.insert(loan.id, loan);
        }
    }
}
