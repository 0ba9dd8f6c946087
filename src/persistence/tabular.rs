//! Tabular encoding: three CSV tables with header rows.
//!
//! Header names follow the historical files (`categorie`,
//! `exemplaires`, `statut`, `nom`, `livre_id`, ...); the `retourne`
//! column tolerates the boolean spellings found in them.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LibraryError, LibraryResult};
use crate::library::Library;
use crate::models::{Book, BookStatus, Loan, User, UserKind};

use super::Records;

const BOOKS_FILE: &str = "books.csv";
const USERS_FILE: &str = "users.csv";
const LOANS_FILE: &str = "loans.csv";

#[derive(Debug, Serialize, Deserialize)]
struct BookRow {
    id: u32,
    title: String,
    author: String,
    #[serde(rename = "categorie")]
    category: String,
    #[serde(rename = "exemplaires")]
    copies: u32,
    #[serde(rename = "statut", deserialize_with = "status_label")]
    status: BookStatus,
}

/// Historical files label this column `disponible`/`emprunté`;
/// `BookStatus::from_str` accepts those alongside the canonical labels.
fn status_label<'de, D>(deserializer: D) -> Result<BookStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            copies: book.copies,
            status: book.status,
        }
    }
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            category: row.category,
            copies: row.copies,
            // Stored status is advisory; the aggregate re-derives it.
            status: row.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    id: u32,
    #[serde(rename = "nom")]
    name: String,
    email: String,
    #[serde(rename = "type")]
    kind: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            kind: user.kind().tabular_label().to_string(),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        // Unrecognized kinds fall back to librarian, as the historical
        // loader did.
        match row.kind.parse().unwrap_or(UserKind::Librarian) {
            UserKind::Reader => User::reader(row.id, row.name, row.email),
            UserKind::Librarian => User::librarian(row.id, row.name, row.email),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LoanRow {
    id: u32,
    #[serde(rename = "livre_id")]
    book_id: u32,
    #[serde(rename = "lecteur_id")]
    reader_id: u32,
    #[serde(rename = "retourne", deserialize_with = "flexible_bool")]
    returned: bool,
    #[serde(rename = "date_emprunt")]
    borrowed_at: DateTime<Utc>,
    #[serde(rename = "date_retour_prevue")]
    due_at: DateTime<Utc>,
    #[serde(rename = "date_retour_effective")]
    returned_at: Option<DateTime<Utc>>,
}

impl From<&Loan> for LoanRow {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id,
            book_id: loan.book_id,
            reader_id: loan.reader_id,
            returned: loan.returned,
            borrowed_at: loan.borrowed_at,
            due_at: loan.due_at,
            returned_at: loan.returned_at,
        }
    }
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan {
            id: row.id,
            book_id: row.book_id,
            reader_id: row.reader_id,
            borrowed_at: row.borrowed_at,
            due_at: row.due_at,
            returned_at: row.returned_at,
            returned: row.returned,
        }
    }
}

/// Historical files spell booleans as true/1/vrai/yes/y/oui and their
/// negations; anything else is logged and read as not returned.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "vrai" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "faux" | "no" | "n" | "non" | "" => Ok(false),
        other => {
            tracing::warn!("Unrecognized boolean '{}' in retourne column, assuming false", other);
            Ok(false)
        }
    }
}

pub(super) fn save(dir: &Path, library: &Library) -> LibraryResult<()> {
    write_rows(
        dir.join(BOOKS_FILE),
        library.catalog().iter().map(BookRow::from),
    )?;
    write_rows(
        dir.join(USERS_FILE),
        library.directory().list().map(UserRow::from),
    )?;
    write_rows(
        dir.join(LOANS_FILE),
        library.ledger().iter().map(LoanRow::from),
    )?;
    Ok(())
}

pub(super) fn load(dir: &Path) -> LibraryResult<Records> {
    let books = super::missing_as_empty(read_rows::<BookRow>(&dir.join(BOOKS_FILE)), "book")?;
    let users = super::missing_as_empty(read_rows::<UserRow>(&dir.join(USERS_FILE)), "user")?;
    let loans = super::missing_as_empty(read_rows::<LoanRow>(&dir.join(LOANS_FILE)), "loan")?;
    Ok((
        books.into_iter().map(Book::from).collect(),
        users.into_iter().map(User::from).collect(),
        loans.into_iter().map(Loan::from).collect(),
    ))
}

fn write_rows<T, I>(path: std::path::PathBuf, rows: I) -> LibraryResult<()>
where
    T: Serialize,
    I: Iterator<Item = T>,
{
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> LibraryResult<Vec<T>> {
    if !path.is_file() {
        return Err(LibraryError::PersistenceMissing(format!(
            "file {} does not exist",
            path.display()
        )));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}
