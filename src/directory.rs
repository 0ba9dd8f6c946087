//! Directory component: the registered users.

use indexmap::IndexMap;

use crate::error::{LibraryError, LibraryResult};
use crate::models::{User, UserKind};

/// The set of registered users, keyed by caller-assigned id, kept in
/// insertion order. Users are never mutated or deleted once added.
#[derive(Debug, Default)]
pub struct Directory {
    users: IndexMap<u32, User>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user; ids are unique and emails are unique
    /// case-insensitively.
    pub fn add(&mut self, user: User) -> LibraryResult<()> {
        if self.users.contains_key(&user.id()) {
            return Err(LibraryError::DuplicateEntry(format!(
                "user id {} is already taken",
                user.id()
            )));
        }
        if self.find_by_email(user.email()).is_some() {
            return Err(LibraryError::DuplicateEntry(format!(
                "email '{}' is already registered",
                user.email()
            )));
        }
        tracing::info!("Directory: registered user id={} '{}'", user.id(), user.name());
        self.users.insert(user.id(), user);
        Ok(())
    }

    pub fn find_by_id(&self, id: u32) -> Option<&User> {
        self.users.get(&id)
    }

    pub(crate) fn find_by_id_mut(&mut self, id: u32) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let needle = email.to_lowercase();
        self.users
            .values()
            .find(|u| u.email().to_lowercase() == needle)
    }

    /// Capability check by id; unknown ids are not librarians.
    pub fn is_librarian(&self, id: u32) -> bool {
        self.find_by_id(id).map(User::is_librarian).unwrap_or(false)
    }

    /// Registered users in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn reader_count(&self) -> usize {
        self.count_kind(UserKind::Reader)
    }

    pub fn librarian_count(&self) -> usize {
        self.count_kind(UserKind::Librarian)
    }

    fn count_kind(&self, kind: UserKind) -> usize {
        self.users.values().filter(|u| u.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Replace directory contents with loaded records. Holdings of
    /// loaded readers are cleared; the aggregate rebuilds them from the
    /// unreturned loans.
    pub(crate) fn load_records(&mut self, users: Vec<User>) {
        self.users.clear();
        for mut user in users {
            user.clear_holdings();
            self.users.insert(user.id(), user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_rejected() {
        let mut directory = Directory::new();
        directory.add(User::reader(2, "A.", "a@email.com")).unwrap();
        let err = directory.add(User::librarian(2, "B.", "b@email.com"));
        assert!(matches!(err, Err(LibraryError::DuplicateEntry(_))));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_duplicate_email_case_insensitive() {
        let mut directory = Directory::new();
        directory
            .add(User::reader(2, "A.", "ABenmokhtar@email.com"))
            .unwrap();
        let err = directory.add(User::reader(3, "B.", "abenmokhtar@EMAIL.com"));
        assert!(matches!(err, Err(LibraryError::DuplicateEntry(_))));
    }

    #[test]
    fn test_find_by_email_case_insensitive() {
        let mut directory = Directory::new();
        directory.add(User::reader(2, "A.", "ABenmokhtar@email.com")).unwrap();
        let found = directory.find_by_email("abenmokhtar@email.COM").unwrap();
        assert_eq!(found.id(), 2);
    }

    #[test]
    fn test_counts_and_capability() {
        let mut directory = Directory::new();
        directory.add(User::librarian(1, "F.", "f@biblio.com")).unwrap();
        directory.add(User::reader(2, "A.", "a@email.com")).unwrap();
        directory.add(User::reader(3, "E.", "e@email.com")).unwrap();
        assert_eq!(directory.reader_count(), 2);
        assert_eq!(directory.librarian_count(), 1);
        assert!(directory.is_librarian(1));
        assert!(!directory.is_librarian(2));
        assert!(!directory.is_librarian(99));
    }
}
