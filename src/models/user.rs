//! User model: readers and librarians

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// User account kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    Reader,
    Librarian,
}

impl UserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserKind::Reader => "reader",
            UserKind::Librarian => "librarian",
        }
    }

    /// Label used by the tabular encoding (`type` column).
    pub fn tabular_label(&self) -> &'static str {
        match self {
            UserKind::Reader => "Lecteur",
            UserKind::Librarian => "Bibliothecaire",
        }
    }
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reader" | "lecteur" => Ok(UserKind::Reader),
            "librarian" | "bibliothecaire" => Ok(UserKind::Librarian),
            other => Err(format!("Invalid user kind: {}", other)),
        }
    }
}

/// A registered user. Readers carry the set of book ids they currently
/// hold; librarian identity grants catalog-mutation capability and
/// nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum User {
    Reader {
        id: u32,
        name: String,
        email: String,
        active_book_ids: HashSet<u32>,
    },
    Librarian {
        id: u32,
        name: String,
        email: String,
    },
}

impl User {
    pub fn reader(id: u32, name: impl Into<String>, email: impl Into<String>) -> Self {
        User::Reader {
            id,
            name: name.into(),
            email: email.into(),
            active_book_ids: HashSet::new(),
        }
    }

    pub fn librarian(id: u32, name: impl Into<String>, email: impl Into<String>) -> Self {
        User::Librarian {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            User::Reader { id, .. } | User::Librarian { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            User::Reader { name, .. } | User::Librarian { name, .. } => name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            User::Reader { email, .. } | User::Librarian { email, .. } => email,
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            User::Reader { .. } => UserKind::Reader,
            User::Librarian { .. } => UserKind::Librarian,
        }
    }

    /// Capability predicate for catalog mutation.
    pub fn is_librarian(&self) -> bool {
        matches!(self, User::Librarian { .. })
    }

    /// Whether this user currently holds the given book. Always false
    /// for librarians.
    pub fn holds_book(&self, book_id: u32) -> bool {
        match self {
            User::Reader { active_book_ids, .. } => active_book_ids.contains(&book_id),
            User::Librarian { .. } => false,
        }
    }

    /// Ids of books currently held, unordered.
    pub fn active_book_ids(&self) -> Option<&HashSet<u32>> {
        match self {
            User::Reader { active_book_ids, .. } => Some(active_book_ids),
            User::Librarian { .. } => None,
        }
    }

    pub(crate) fn record_borrow(&mut self, book_id: u32) {
        if let User::Reader { active_book_ids, .. } = self {
            active_book_ids.insert(book_id);
        }
    }

    /// Absent entries are ignored.
    pub(crate) fn record_return(&mut self, book_id: u32) {
        if let User::Reader { active_book_ids, .. } = self {
            active_book_ids.remove(&book_id);
        }
    }

    pub(crate) fn clear_holdings(&mut self) {
        if let User::Reader { active_book_ids, .. } = self {
            active_book_ids.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("Lecteur".parse(), Ok(UserKind::Reader));
        assert_eq!("reader".parse(), Ok(UserKind::Reader));
        assert_eq!("Bibliothecaire".parse(), Ok(UserKind::Librarian));
        assert!("guest".parse::<UserKind>().is_err());
    }

    #[test]
    fn test_capability() {
        assert!(User::librarian(1, "F. Saibi", "fs@biblio.com").is_librarian());
        assert!(!User::reader(2, "A. Benmokhtar", "ab@email.com").is_librarian());
    }

    #[test]
    fn test_holdings() {
        let mut reader = User::reader(2, "A. Benmokhtar", "ab@email.com");
        reader.record_borrow(7);
        assert!(reader.holds_book(7));
        reader.record_return(7);
        reader.record_return(7); // absent, ignored
        assert!(!reader.holds_book(7));
    }
}
