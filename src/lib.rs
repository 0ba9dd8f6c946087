//! Mediatheque - library catalog, user directory and loan ledger
//!
//! Core domain crate for a small library: the [`Library`] aggregate
//! owns the book catalog, the registered users and the loan ledger,
//! and is the sole entry point for borrowing, returning and catalog
//! mutation. [`Store`] round-trips the aggregate state to one of two
//! interchangeable file encodings (CSV tables or JSON documents).
//!
//! The interactive menu front end and the report/chart generation are
//! external collaborators; they drive this crate through the public
//! surface re-exported below.

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod library;
pub mod models;
pub mod persistence;

pub use catalog::{Catalog, NewBook, SearchField, UpdateBook};
pub use config::{AppConfig, StorageFormat};
pub use directory::Directory;
pub use error::{LibraryError, LibraryResult};
pub use ledger::LoanLedger;
pub use library::{Library, ReturnReceipt, Statistics};
pub use models::{Book, BookStatus, Loan, User, UserKind, ACTIVE_LOAN_CAP, LOAN_PERIOD_DAYS};
pub use persistence::Store;
