//! Data models for the mediatheque

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookStatus};
pub use loan::{Loan, ACTIVE_LOAN_CAP, LOAN_PERIOD_DAYS};
pub use user::{User, UserKind};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case- and diacritic-insensitive key used for duplicate checks and
/// substring search (trimmed, NFKD-decomposed, combining marks stripped,
/// lowercased).
pub(crate) fn normalize_key(s: &str) -> String {
    s.trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
