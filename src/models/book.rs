//! Book (catalog entry) model

use serde::{Deserialize, Serialize};

use super::normalize_key;

/// Availability status, always derived from the stock count and never
/// stored independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Available,
    OnLoan,
}

impl BookStatus {
    /// Derive the status from a stock count.
    pub fn from_copies(copies: u32) -> Self {
        if copies > 0 {
            BookStatus::Available
        } else {
            BookStatus::OnLoan
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::OnLoan => "on_loan",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    /// Accepts the canonical labels and the French ones found in the
    /// historical data files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "available" | "disponible" => Ok(BookStatus::Available),
            "on_loan" | "emprunte" => Ok(BookStatus::OnLoan),
            other => Err(format!("Invalid book status: {}", other)),
        }
    }
}

/// A catalog entry with its stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub copies: u32,
    pub status: BookStatus,
}

impl Book {
    /// Re-derive `status` after any change to `copies`.
    pub fn refresh_status(&mut self) {
        self.status = BookStatus::from_copies(self.copies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_copies() {
        assert_eq!(BookStatus::from_copies(0), BookStatus::OnLoan);
        assert_eq!(BookStatus::from_copies(1), BookStatus::Available);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("available".parse(), Ok(BookStatus::Available));
        assert_eq!("Disponible".parse(), Ok(BookStatus::Available));
        assert_eq!("emprunté".parse(), Ok(BookStatus::OnLoan));
        assert!("borrowed".parse::<BookStatus>().is_err());
    }
}
