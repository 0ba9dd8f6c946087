//! Structured encoding: one JSON array of records per entity, camelCase
//! attribute names, ISO-8601 timestamps, `null` for an absent return
//! date.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, LibraryResult};
use crate::library::Library;
use crate::models::{Book, Loan, User};

use super::Records;

const BOOKS_FILE: &str = "books.json";
const USERS_FILE: &str = "users.json";
const LOANS_FILE: &str = "loans.json";

// Book attributes are single words; the model serializes as-is.

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum UserRecord {
    Reader {
        id: u32,
        name: String,
        email: String,
        #[serde(rename = "activeBookIds")]
        active_book_ids: Vec<u32>,
    },
    Librarian {
        id: u32,
        name: String,
        email: String,
    },
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        match user {
            User::Reader {
                id,
                name,
                email,
                active_book_ids,
            } => {
                let mut ids: Vec<u32> = active_book_ids.iter().copied().collect();
                ids.sort_unstable();
                UserRecord::Reader {
                    id: *id,
                    name: name.clone(),
                    email: email.clone(),
                    active_book_ids: ids,
                }
            }
            User::Librarian { id, name, email } => UserRecord::Librarian {
                id: *id,
                name: name.clone(),
                email: email.clone(),
            },
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        match record {
            // Holdings are rebuilt from the loans on load.
            UserRecord::Reader {
                id, name, email, ..
            } => User::reader(id, name, email),
            UserRecord::Librarian { id, name, email } => User::librarian(id, name, email),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanRecord {
    id: u32,
    book_id: u32,
    reader_id: u32,
    borrowed_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
    returned: bool,
}

impl From<&Loan> for LoanRecord {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id,
            book_id: loan.book_id,
            reader_id: loan.reader_id,
            borrowed_at: loan.borrowed_at,
            due_at: loan.due_at,
            returned_at: loan.returned_at,
            returned: loan.returned,
        }
    }
}

impl From<LoanRecord> for Loan {
    fn from(record: LoanRecord) -> Self {
        Loan {
            id: record.id,
            book_id: record.book_id,
            reader_id: record.reader_id,
            borrowed_at: record.borrowed_at,
            due_at: record.due_at,
            returned_at: record.returned_at,
            returned: record.returned,
        }
    }
}

pub(super) fn save(dir: &Path, library: &Library) -> LibraryResult<()> {
    let books: Vec<&Book> = library.catalog().iter().collect();
    write_records(dir.join(BOOKS_FILE), &books)?;

    let users: Vec<UserRecord> = library.directory().list().map(UserRecord::from).collect();
    write_records(dir.join(USERS_FILE), &users)?;

    let loans: Vec<LoanRecord> = library.ledger().iter().map(LoanRecord::from).collect();
    write_records(dir.join(LOANS_FILE), &loans)?;
    Ok(())
}

pub(super) fn load(dir: &Path) -> LibraryResult<Records> {
    let books = super::missing_as_empty(read_records::<Book>(&dir.join(BOOKS_FILE)), "book")?;
    let users =
        super::missing_as_empty(read_records::<UserRecord>(&dir.join(USERS_FILE)), "user")?;
    let loans =
        super::missing_as_empty(read_records::<LoanRecord>(&dir.join(LOANS_FILE)), "loan")?;
    Ok((
        books,
        users.into_iter().map(User::from).collect(),
        loans.into_iter().map(Loan::from).collect(),
    ))
}

fn write_records<T: Serialize>(path: std::path::PathBuf, records: &[T]) -> LibraryResult<()> {
    let body = serde_json::to_string_pretty(records)?;
    fs::write(path, body)?;
    Ok(())
}

fn read_records<T: DeserializeOwned>(path: &Path) -> LibraryResult<Vec<T>> {
    if !path.is_file() {
        return Err(LibraryError::PersistenceMissing(format!(
            "file {} does not exist",
            path.display()
        )));
    }
    let body = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loan_record_field_names() {
        let mut loan = Loan::new(1, 2, 3, "2025-03-01T10:00:00Z".parse().unwrap());
        loan.mark_returned("2025-03-05T10:00:00Z".parse().unwrap());
        let value = serde_json::to_value(LoanRecord::from(&loan)).unwrap();
        assert_eq!(value["bookId"], 2);
        assert_eq!(value["readerId"], 3);
        assert!(value["borrowedAt"].is_string());
        assert!(value["dueAt"].is_string());
        assert_eq!(value["returned"], true);
    }

    #[test]
    fn test_null_returned_at() {
        let loan = Loan::new(1, 2, 3, "2025-03-01T10:00:00Z".parse().unwrap());
        let value = serde_json::to_value(LoanRecord::from(&loan)).unwrap();
        assert!(value["returnedAt"].is_null());
    }

    #[test]
    fn test_user_record_tagged_by_type() {
        let record: UserRecord = serde_json::from_value(json!({
            "type": "Reader",
            "id": 2,
            "name": "A. Benmokhtar",
            "email": "ab@email.com",
            "activeBookIds": [4, 7]
        }))
        .unwrap();
        let user = User::from(record);
        assert_eq!(user.id(), 2);
        // Holdings come back from the loan ledger, not the file.
        assert!(!user.holds_book(4));
    }
}
