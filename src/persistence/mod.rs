//! Persistence adapter: dumps aggregate state to interchangeable file
//! encodings and rebuilds it on load.
//!
//! Load contract: book statuses are re-derived from stock, reader
//! holdings are rebuilt from unreturned loans, and each id counter is
//! advanced past the maximum loaded id. A missing individual file is
//! reported and treated as empty; loading never aborts the process.

mod structured;
mod tabular;

use std::fs;
use std::path::PathBuf;

use crate::config::{AppConfig, StorageFormat};
use crate::error::{LibraryError, LibraryResult};
use crate::library::Library;
use crate::models::{Book, Loan, User};

/// File-backed store for one aggregate, bound to an encoding and a
/// directory. Writes are last-write-wins whole-file dumps.
#[derive(Debug, Clone)]
pub struct Store {
    format: StorageFormat,
    dir: PathBuf,
}

impl Store {
    pub fn new(format: StorageFormat, dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            dir: dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.storage.format, config.storage.path.clone())
    }

    pub fn format(&self) -> StorageFormat {
        self.format
    }

    /// Dump the aggregate state, creating the directory if needed.
    pub fn save(&self, library: &Library) -> LibraryResult<()> {
        fs::create_dir_all(&self.dir)?;
        match self.format {
            StorageFormat::Csv => tabular::save(&self.dir, library)?,
            StorageFormat::Json => structured::save(&self.dir, library)?,
        }
        tracing::info!("Saved library state ({}) to {}", self.format, self.dir.display());
        Ok(())
    }

    /// Rebuild the aggregate from the data files. A missing directory
    /// is `PersistenceMissing` and leaves the aggregate untouched;
    /// callers treat it as non-fatal and continue with current state.
    pub fn load(&self, library: &mut Library) -> LibraryResult<()> {
        if !self.dir.is_dir() {
            return Err(LibraryError::PersistenceMissing(format!(
                "data directory {} does not exist",
                self.dir.display()
            )));
        }
        let (books, users, loans) = match self.format {
            StorageFormat::Csv => tabular::load(&self.dir)?,
            StorageFormat::Json => structured::load(&self.dir)?,
        };
        tracing::info!(
            "Loaded {} book(s), {} user(s), {} loan(s) ({}) from {}",
            books.len(),
            users.len(),
            loans.len(),
            self.format,
            self.dir.display()
        );
        library.restore(books, users, loans);
        Ok(())
    }
}

/// Downgrade a missing file to an empty record set, with a warning.
fn missing_as_empty<T>(
    result: LibraryResult<Vec<T>>,
    entity: &str,
) -> LibraryResult<Vec<T>> {
    match result {
        Err(LibraryError::PersistenceMissing(reason)) => {
            tracing::warn!("No {} data: {}", entity, reason);
            Ok(Vec::new())
        }
        other => other,
    }
}

type Records = (Vec<Book>, Vec<User>, Vec<Loan>);
