//! Library aggregate: the sole entry point for mutating operations.
//!
//! Borrowing and returning touch the catalog, the directory and the
//! loan ledger together, so every mutation goes through [`Library`];
//! the components are not independently reachable by callers. Mutating
//! operations take `&mut self`, so validation and the state change are
//! observed as a single unit.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Catalog, NewBook, SearchField, UpdateBook};
use crate::directory::Directory;
use crate::error::{LibraryError, LibraryResult};
use crate::ledger::LoanLedger;
use crate::models::{Book, Loan, User, ACTIVE_LOAN_CAP};

/// Read-only counters over the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_books: usize,
    pub total_readers: usize,
    pub total_librarians: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
}

/// Outcome of a successful return. A late return is an advisory, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub loan_id: u32,
    pub book_id: u32,
    pub overdue_days: i64,
}

impl ReturnReceipt {
    pub fn was_overdue(&self) -> bool {
        self.overdue_days > 0
    }
}

/// The catalog, user directory and loan ledger behind one facade.
#[derive(Debug)]
pub struct Library {
    pub name: String,
    pub address: String,
    catalog: Catalog,
    directory: Directory,
    ledger: LoanLedger,
}

impl Library {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            catalog: Catalog::new(),
            directory: Directory::new(),
            ledger: LoanLedger::new(),
        }
    }

    // --- Catalog surface ---

    /// Add a book; the actor must resolve to a librarian.
    pub fn add_book(&mut self, book: NewBook, actor_id: u32) -> LibraryResult<u32> {
        let actor = Self::resolve_librarian(&self.directory, actor_id)?;
        self.catalog.add(book, actor)
    }

    pub fn update_book(
        &mut self,
        book_id: u32,
        actor_id: u32,
        fields: UpdateBook,
    ) -> LibraryResult<()> {
        let actor = Self::resolve_librarian(&self.directory, actor_id)?;
        self.catalog.update(book_id, actor, fields)
    }

    /// Remove a book. Destructive once validation passes; any
    /// confirmation prompt is the caller's concern.
    pub fn remove_book(&mut self, book_id: u32, actor_id: u32) -> LibraryResult<Book> {
        Self::resolve_librarian(&self.directory, actor_id)?;
        if self.catalog.find(book_id).is_none() {
            return Err(LibraryError::NotFound(format!("book {} not found", book_id)));
        }
        if self.ledger.book_has_active_loan(book_id) {
            return Err(LibraryError::Conflict(format!(
                "book {} still has an active loan",
                book_id
            )));
        }
        self.catalog.remove(book_id)
    }

    pub fn find_book(&self, book_id: u32) -> Option<&Book> {
        self.catalog.find(book_id)
    }

    pub fn list_books(&self) -> Vec<&Book> {
        self.catalog.list()
    }

    pub fn search_books(&self, field: SearchField, value: &str) -> Vec<&Book> {
        self.catalog.search(field, value)
    }

    // --- Directory surface ---

    pub fn add_user(&mut self, user: User) -> LibraryResult<()> {
        self.directory.add(user)
    }

    pub fn find_user(&self, user_id: u32) -> Option<&User> {
        self.directory.find_by_id(user_id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.directory.find_by_email(email)
    }

    pub fn list_users(&self) -> Vec<&User> {
        self.directory.list().collect()
    }

    // --- Loans ---

    /// Borrow a book for a reader and return the new loan's id.
    pub fn borrow(&mut self, book_id: u32, reader_id: u32) -> LibraryResult<u32> {
        self.borrow_at(book_id, reader_id, Utc::now())
    }

    /// `borrow` with an explicit clock, for callers that control time.
    ///
    /// Checks run in order and the first failure wins: the user must be
    /// a reader, the book must exist, stock must be positive, the
    /// reader must not already hold this book, and the reader must be
    /// under the active-loan cap.
    pub fn borrow_at(
        &mut self,
        book_id: u32,
        reader_id: u32,
        now: DateTime<Utc>,
    ) -> LibraryResult<u32> {
        let reader = match self.directory.find_by_id(reader_id) {
            Some(user @ User::Reader { .. }) => user,
            _ => {
                return Err(LibraryError::InvalidActor(format!(
                    "user {} is not a registered reader",
                    reader_id
                )))
            }
        };
        let book = self
            .catalog
            .find(book_id)
            .ok_or_else(|| LibraryError::NotFound(format!("book {} not found", book_id)))?;
        if book.copies == 0 {
            return Err(LibraryError::OutOfStock(format!(
                "no copy of '{}' is available",
                book.title
            )));
        }
        if reader.holds_book(book_id) {
            return Err(LibraryError::DuplicateLoan(format!(
                "reader {} already holds book {}",
                reader_id, book_id
            )));
        }
        if self.ledger.active_count_for_reader(reader_id) >= ACTIVE_LOAN_CAP {
            return Err(LibraryError::LoanLimitExceeded(format!(
                "reader {} already has {} active loans",
                reader_id, ACTIVE_LOAN_CAP
            )));
        }

        let loan_id = self.ledger.open(book_id, reader_id, now);
        if let Some(reader) = self.directory.find_by_id_mut(reader_id) {
            reader.record_borrow(book_id);
        }
        if let Some(book) = self.catalog.find_mut(book_id) {
            book.copies -= 1;
            book.refresh_status();
        }
        tracing::info!("Loan {} opened: book {} to reader {}", loan_id, book_id, reader_id);
        Ok(loan_id)
    }

    /// Return a loaned book. Lateness is surfaced in the receipt.
    pub fn return_loan(&mut self, loan_id: u32) -> LibraryResult<ReturnReceipt> {
        self.return_loan_at(loan_id, Utc::now())
    }

    /// `return_loan` with an explicit clock.
    pub fn return_loan_at(
        &mut self,
        loan_id: u32,
        now: DateTime<Utc>,
    ) -> LibraryResult<ReturnReceipt> {
        let loan = self.ledger.close(loan_id, now)?;
        let (book_id, reader_id) = (loan.book_id, loan.reader_id);
        let overdue_days = loan.overdue_days(now);

        if let Some(book) = self.catalog.find_mut(book_id) {
            book.copies += 1;
            book.refresh_status();
        }
        if let Some(user) = self.directory.find_by_id_mut(reader_id) {
            user.record_return(book_id);
        }

        if overdue_days > 0 {
            tracing::warn!("Loan {} returned {} day(s) late", loan_id, overdue_days);
        } else {
            tracing::info!("Loan {} returned", loan_id);
        }
        Ok(ReturnReceipt {
            loan_id,
            book_id,
            overdue_days,
        })
    }

    pub fn find_loan(&self, loan_id: u32) -> Option<&Loan> {
        self.ledger.get(loan_id)
    }

    pub fn list_active_loans(&self) -> Vec<&Loan> {
        self.ledger.active_loans()
    }

    pub fn loans_for_reader(&self, reader_id: u32) -> Vec<&Loan> {
        self.ledger.loans_for_reader(reader_id)
    }

    // --- Statistics ---

    pub fn statistics(&self) -> Statistics {
        self.statistics_at(Utc::now())
    }

    pub fn statistics_at(&self, now: DateTime<Utc>) -> Statistics {
        Statistics {
            total_books: self.catalog.len(),
            total_readers: self.directory.reader_count(),
            total_librarians: self.directory.librarian_count(),
            active_loans: self.ledger.count_active(),
            overdue_loans: self.ledger.count_overdue(now),
        }
    }

    // --- Internal plumbing ---

    /// Borrows only the directory so callers can go on to mutate the
    /// catalog.
    fn resolve_librarian(directory: &Directory, actor_id: u32) -> LibraryResult<&User> {
        match directory.find_by_id(actor_id) {
            Some(user) if user.is_librarian() => Ok(user),
            _ => Err(LibraryError::PermissionDenied(format!(
                "user {} is not a librarian",
                actor_id
            ))),
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn directory(&self) -> &Directory {
        &self.directory
    }

    pub(crate) fn ledger(&self) -> &LoanLedger {
        &self.ledger
    }

    /// Replace the whole aggregate state with loaded records. Book
    /// statuses and id counters are restored by the components; each
    /// reader's held-book set is rebuilt from the unreturned loans.
    pub(crate) fn restore(&mut self, books: Vec<Book>, users: Vec<User>, loans: Vec<Loan>) {
        self.catalog.load_records(books);
        self.directory.load_records(users);
        self.ledger.load_records(loans);

        let active: Vec<(u32, u32)> = self
            .ledger
            .iter()
            .filter(|l| l.is_active())
            .map(|l| (l.reader_id, l.book_id))
            .collect();
        for (reader_id, book_id) in active {
            if let Some(reader) = self.directory.find_by_id_mut(reader_id) {
                reader.record_borrow(book_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookStatus;
    use chrono::Duration;

    fn origin() -> DateTime<Utc> {
        "2025-03-01T10:00:00Z".parse().unwrap()
    }

    /// One librarian (id 1), two readers (ids 2, 3), one book "X" with
    /// a single copy.
    fn seeded() -> (Library, u32) {
        let mut library = Library::new("Bibliothèque Beb bhar", "Rue de Marseille");
        library.add_user(User::librarian(1, "F. Saibi", "fs@biblio.com")).unwrap();
        library.add_user(User::reader(2, "A. Benmokhtar", "ab@email.com")).unwrap();
        library.add_user(User::reader(3, "E. Benjilali", "eb@email.com")).unwrap();
        let book_id = library
            .add_book(
                NewBook {
                    title: "X".to_string(),
                    author: "Y".to_string(),
                    category: "Roman".to_string(),
                    copies: 1,
                },
                1,
            )
            .unwrap();
        (library, book_id)
    }

    fn add_book(library: &mut Library, title: &str, copies: i64) -> u32 {
        library
            .add_book(
                NewBook {
                    title: title.to_string(),
                    author: "Z".to_string(),
                    category: "Roman".to_string(),
                    copies,
                },
                1,
            )
            .unwrap()
    }

    #[test]
    fn test_borrow_decrements_stock_and_flips_status() {
        let (mut library, book_id) = seeded();
        library.borrow(book_id, 2).unwrap();
        let book = library.find_book(book_id).unwrap();
        assert_eq!(book.copies, 0);
        assert_eq!(book.status, BookStatus::OnLoan);
        assert!(library.find_user(2).unwrap().holds_book(book_id));
    }

    #[test]
    fn test_borrow_same_book_twice_is_duplicate_loan() {
        let (mut library, book_id) = seeded();
        // Two copies so the stock check cannot mask the duplicate check.
        library.update_book(book_id, 1, UpdateBook { copies: Some(2), ..Default::default() })
            .unwrap();
        library.borrow(book_id, 2).unwrap();
        let err = library.borrow(book_id, 2);
        assert!(matches!(err, Err(LibraryError::DuplicateLoan(_))));
    }

    #[test]
    fn test_exhausted_stock_is_out_of_stock_for_other_reader() {
        let (mut library, book_id) = seeded();
        library.borrow(book_id, 2).unwrap();
        let err = library.borrow(book_id, 3);
        assert!(matches!(err, Err(LibraryError::OutOfStock(_))));
    }

    #[test]
    fn test_borrow_requires_reader() {
        let (mut library, book_id) = seeded();
        // A librarian cannot borrow, nor can an unknown user.
        assert!(matches!(
            library.borrow(book_id, 1),
            Err(LibraryError::InvalidActor(_))
        ));
        assert!(matches!(
            library.borrow(book_id, 99),
            Err(LibraryError::InvalidActor(_))
        ));
    }

    #[test]
    fn test_borrow_unknown_book() {
        let (mut library, _) = seeded();
        assert!(matches!(
            library.borrow(77, 2),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_active_loan_cap() {
        let (mut library, _) = seeded();
        for title in ["A", "B", "C"] {
            let id = add_book(&mut library, title, 1);
            library.borrow(id, 2).unwrap();
        }
        let fourth = add_book(&mut library, "D", 1);
        let err = library.borrow(fourth, 2);
        assert!(matches!(err, Err(LibraryError::LoanLimitExceeded(_))));
        // Returning one loan frees a slot.
        let loans = library.loans_for_reader(2);
        let loan_id = loans[0].id;
        library.return_loan(loan_id).unwrap();
        assert!(library.borrow(fourth, 2).is_ok());
    }

    #[test]
    fn test_borrow_then_return_is_idempotent_on_stock() {
        let (mut library, book_id) = seeded();
        let before = library.find_book(book_id).unwrap().copies;
        let loan_id = library.borrow(book_id, 2).unwrap();
        library.return_loan(loan_id).unwrap();
        let book = library.find_book(book_id).unwrap();
        assert_eq!(book.copies, before);
        assert_eq!(book.status, BookStatus::Available);
        assert!(!library.find_user(2).unwrap().holds_book(book_id));
    }

    #[test]
    fn test_double_return_rejected_and_state_unchanged() {
        let (mut library, book_id) = seeded();
        let loan_id = library.borrow(book_id, 2).unwrap();
        library.return_loan(loan_id).unwrap();
        let copies_after_first = library.find_book(book_id).unwrap().copies;
        let err = library.return_loan(loan_id);
        assert!(matches!(err, Err(LibraryError::AlreadyReturned(_))));
        assert_eq!(library.find_book(book_id).unwrap().copies, copies_after_first);
    }

    #[test]
    fn test_return_unknown_loan() {
        let (mut library, _) = seeded();
        assert!(matches!(
            library.return_loan(42),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_late_return_advisory() {
        let (mut library, book_id) = seeded();
        let loan_id = library.borrow_at(book_id, 2, origin()).unwrap();
        let receipt = library
            .return_loan_at(loan_id, origin() + Duration::days(20))
            .unwrap();
        assert!(receipt.was_overdue());
        assert_eq!(receipt.overdue_days, 6);
        let loan = library.find_loan(loan_id).unwrap();
        assert!(loan.is_overdue(origin() + Duration::days(20)));
    }

    #[test]
    fn test_on_time_return_advisory() {
        let (mut library, book_id) = seeded();
        let loan_id = library.borrow_at(book_id, 2, origin()).unwrap();
        let receipt = library
            .return_loan_at(loan_id, origin() + Duration::days(3))
            .unwrap();
        assert!(!receipt.was_overdue());
    }

    #[test]
    fn test_reader_cannot_mutate_catalog() {
        let (mut library, book_id) = seeded();
        let err = library.add_book(
            NewBook {
                title: "Forbidden".to_string(),
                author: "Anyone".to_string(),
                category: "Roman".to_string(),
                copies: 1,
            },
            2,
        );
        assert!(matches!(err, Err(LibraryError::PermissionDenied(_))));
        assert_eq!(library.list_books().len(), 1);

        let err = library.remove_book(book_id, 2);
        assert!(matches!(err, Err(LibraryError::PermissionDenied(_))));
    }

    #[test]
    fn test_remove_book_with_active_loan_is_conflict() {
        let (mut library, book_id) = seeded();
        let loan_id = library.borrow(book_id, 2).unwrap();
        let err = library.remove_book(book_id, 1);
        assert!(matches!(err, Err(LibraryError::Conflict(_))));
        assert!(library.find_book(book_id).is_some());
        // Once returned, removal succeeds.
        library.return_loan(loan_id).unwrap();
        assert!(library.remove_book(book_id, 1).is_ok());
        assert!(library.find_book(book_id).is_none());
    }

    #[test]
    fn test_remove_unknown_book() {
        let (mut library, _) = seeded();
        assert!(matches!(
            library.remove_book(42, 1),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_statistics() {
        let (mut library, book_id) = seeded();
        let second = add_book(&mut library, "Phantasia", 2);
        library.borrow_at(book_id, 2, origin()).unwrap();
        library.borrow_at(second, 3, origin()).unwrap();

        let now = origin() + Duration::days(16);
        let stats = library.statistics_at(now);
        assert_eq!(
            stats,
            Statistics {
                total_books: 2,
                total_readers: 2,
                total_librarians: 1,
                active_loans: 2,
                overdue_loans: 2,
            }
        );
    }

    #[test]
    fn test_active_loans_listing() {
        let (mut library, book_id) = seeded();
        let second = add_book(&mut library, "Phantasia", 1);
        let a = library.borrow(book_id, 2).unwrap();
        let b = library.borrow(second, 3).unwrap();
        library.return_loan(a).unwrap();
        let active: Vec<u32> = library.list_active_loans().iter().map(|l| l.id).collect();
        assert_eq!(active, vec![b]);
    }
}
