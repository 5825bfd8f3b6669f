use std::fmt;

use chrono::NaiveDate;
use sqlx::FromRow;

pub type BookId = i64;
pub type UserId = i64;
pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
	pub id: BookId,
	pub title: String,
	pub author: String,
	pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
	Available,
	Borrowed,
}

impl Book {
	pub fn status(&self) -> BookStatus {
		if self.is_available {
			BookStatus::Available
		} else {
			BookStatus::Borrowed
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
	pub id: UserId,
	pub name: String,
}

/// One loan. `return_date` stays NULL while the book is out.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BorrowRecord {
	pub id: RecordId,
	pub user_id: UserId,
	pub book_id: BookId,
	pub borrow_date: NaiveDate,
	pub return_date: Option<NaiveDate>,
}

impl BorrowRecord {
	pub fn is_open(&self) -> bool {
		self.return_date.is_none()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AvailableBook {
	pub id: BookId,
	pub title: String,
	pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct HistoryEntry {
	pub title: String,
	pub borrow_date: NaiveDate,
	pub return_date: Option<NaiveDate>,
}

#[derive(Debug)]
pub enum LedgerError {
	BookNotFound(BookId),
	UserNotFound(UserId),
	Unavailable(BookId),
	NoActiveBorrow { user: UserId, book: BookId },
	Storage(sqlx::Error),
}

impl LedgerError {
	/// Store faults abort the current operation; every other kind is an
	/// expected rejection.
	pub fn is_storage_fault(&self) -> bool {
		matches!(self, LedgerError::Storage(_))
	}
}

impl fmt::Display for LedgerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LedgerError::BookNotFound(bid) => write!(f, "book {bid} not found"),
			LedgerError::UserNotFound(uid) => write!(f, "user {uid} not found"),
			LedgerError::Unavailable(bid) => write!(f, "book {bid} is currently unavailable"),
			LedgerError::NoActiveBorrow { user, book } => {
				write!(f, "no active borrow of book {book} by user {user}")
			}
			LedgerError::Storage(e) => write!(f, "storage error: {e}"),
		}
	}
}

impl std::error::Error for LedgerError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			LedgerError::Storage(e) => Some(e),
			_ => None,
		}
	}
}

impl From<sqlx::Error> for LedgerError {
	fn from(e: sqlx::Error) -> Self {
		LedgerError::Storage(e)
	}
}
