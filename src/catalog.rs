//! Catalog component: book records, stock rules and search.

use crate::error::{LibraryError, LibraryResult};
use crate::models::{normalize_key, Book, BookStatus, User};

/// Fields for creating a book; the id is assigned by the catalog.
/// Negative stock counts are clamped to zero.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub category: String,
    pub copies: i64,
}

/// Partial book update; only the supplied fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub copies: Option<i64>,
}

/// Search criteria for catalog queries. The first three match by
/// case/diacritic-insensitive substring, availability by exact status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Category,
    Availability,
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "title" | "titre" => Ok(SearchField::Title),
            "author" | "auteur" => Ok(SearchField::Author),
            "category" | "categorie" => Ok(SearchField::Category),
            "availability" | "disponibilite" => Ok(SearchField::Availability),
            other => Err(format!("Invalid search field: {}", other)),
        }
    }
}

/// The set of book records and their stock counts.
///
/// Only librarians may mutate the catalog; duplicate detection compares
/// normalized `(title, author)` pairs.
#[derive(Debug)]
pub struct Catalog {
    books: Vec<Book>,
    next_id: u32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            next_id: 1,
        }
    }

    fn has_duplicate(&self, title: &str, author: &str) -> bool {
        let key = (normalize_key(title), normalize_key(author));
        self.books
            .iter()
            .any(|b| (normalize_key(&b.title), normalize_key(&b.author)) == key)
    }

    /// Add a book and return its assigned id.
    pub fn add(&mut self, book: NewBook, actor: &User) -> LibraryResult<u32> {
        if !actor.is_librarian() {
            return Err(LibraryError::PermissionDenied(
                "only a librarian can add books".to_string(),
            ));
        }
        if self.has_duplicate(&book.title, &book.author) {
            return Err(LibraryError::DuplicateEntry(format!(
                "a book titled '{}' by '{}' already exists",
                book.title, book.author
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        let copies = book.copies.max(0) as u32;
        let record = Book {
            id,
            title: book.title,
            author: book.author,
            category: book.category,
            copies,
            status: BookStatus::from_copies(copies),
        };
        tracing::info!("Catalog: added book id={} '{}'", id, record.title);
        self.books.push(record);
        Ok(id)
    }

    /// Apply a partial update; `status` is re-derived after any change
    /// to `copies`.
    pub fn update(&mut self, book_id: u32, actor: &User, fields: UpdateBook) -> LibraryResult<()> {
        if !actor.is_librarian() {
            return Err(LibraryError::PermissionDenied(
                "only a librarian can modify books".to_string(),
            ));
        }
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| LibraryError::NotFound(format!("book {} not found", book_id)))?;

        if let Some(title) = fields.title {
            book.title = title;
        }
        if let Some(author) = fields.author {
            book.author = author;
        }
        if let Some(category) = fields.category {
            book.category = category;
        }
        if let Some(copies) = fields.copies {
            book.copies = copies.max(0) as u32;
            book.refresh_status();
        }
        tracing::info!("Catalog: updated book id={}", book_id);
        Ok(())
    }

    /// Removal itself; the aggregate enforces the no-active-loan rule
    /// before calling this.
    pub(crate) fn remove(&mut self, book_id: u32) -> LibraryResult<Book> {
        let pos = self
            .books
            .iter()
            .position(|b| b.id == book_id)
            .ok_or_else(|| LibraryError::NotFound(format!("book {} not found", book_id)))?;
        let book = self.books.remove(pos);
        tracing::info!("Catalog: removed book id={} '{}'", book.id, book.title);
        Ok(book)
    }

    pub fn find(&self, book_id: u32) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    pub(crate) fn find_mut(&mut self, book_id: u32) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id == book_id)
    }

    /// All books ordered by case-insensitive title.
    pub fn list(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.iter().collect();
        books.sort_by_key(|b| b.title.to_lowercase());
        books
    }

    /// Search ordered like `list`; unknown availability values match
    /// nothing.
    pub fn search(&self, field: SearchField, value: &str) -> Vec<&Book> {
        let needle = normalize_key(value);
        let mut matches: Vec<&Book> = match field {
            SearchField::Title => self
                .books
                .iter()
                .filter(|b| normalize_key(&b.title).contains(&needle))
                .collect(),
            SearchField::Author => self
                .books
                .iter()
                .filter(|b| normalize_key(&b.author).contains(&needle))
                .collect(),
            SearchField::Category => self
                .books
                .iter()
                .filter(|b| normalize_key(&b.category).contains(&needle))
                .collect(),
            SearchField::Availability => match value.parse::<BookStatus>() {
                Ok(status) => self.books.iter().filter(|b| b.status == status).collect(),
                Err(_) => Vec::new(),
            },
        };
        matches.sort_by_key(|b| b.title.to_lowercase());
        matches
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Replace catalog contents with loaded records: `status` is
    /// re-derived from `copies` and the id counter is advanced past the
    /// maximum loaded id.
    pub(crate) fn load_records(&mut self, mut books: Vec<Book>) {
        for book in &mut books {
            book.refresh_status();
        }
        self.next_id = books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        self.books = books;
    }
}
