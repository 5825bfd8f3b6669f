use chrono::NaiveDate;
use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info, warn};

use crate::sql;
use crate::time::today;
use crate::types::*;

/// Handle on one library store. Owns a single long-lived connection; the
/// two mutating loan operations each run in their own transaction.
#[derive(Debug)]
pub struct Ledger {
	conn: SqliteConnection,
}

impl Ledger {
	pub async fn open(path: &str) -> Result<Ledger, LedgerError> {
		debug!(path, "opening ledger");
		let conn = sql::open(path).await?;
		Ok(Ledger { conn })
	}

	pub async fn in_memory() -> Result<Ledger, LedgerError> {
		Ledger::open(sql::MEMORY).await
	}

	pub async fn close(self) -> Result<(), LedgerError> {
		self.conn.close().await?;
		Ok(())
	}

	pub async fn add_book(&mut self, title: &str, author: &str) -> Result<BookId, LedgerError> {
		let bid = sqlx::query("INSERT INTO books (title, author) VALUES (?, ?)")
			.bind(title)
			.bind(author)
			.execute(&mut self.conn)
			.await?
			.last_insert_rowid();
		info!(book_id = bid, title, author, "book added");
		Ok(bid)
	}

	pub async fn register_user(&mut self, name: &str) -> Result<UserId, LedgerError> {
		let uid = sqlx::query("INSERT INTO users (name) VALUES (?)")
			.bind(name)
			.execute(&mut self.conn)
			.await?
			.last_insert_rowid();
		info!(user_id = uid, name, "user registered");
		Ok(uid)
	}

	pub async fn book(&mut self, bid: BookId) -> Result<Option<Book>, LedgerError> {
		let book = sqlx::query_as::<_, Book>("SELECT id, title, author, is_available FROM books WHERE id = ?")
			.bind(bid)
			.fetch_optional(&mut self.conn)
			.await?;
		Ok(book)
	}

	pub async fn user(&mut self, uid: UserId) -> Result<Option<User>, LedgerError> {
		let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = ?")
			.bind(uid)
			.fetch_optional(&mut self.conn)
			.await?;
		Ok(user)
	}

	pub async fn borrow_book(&mut self, uid: UserId, bid: BookId) -> Result<RecordId, LedgerError> {
		self.borrow_book_on(uid, bid, today()).await
	}

	pub(crate) async fn borrow_book_on(
		&mut self,
		uid: UserId,
		bid: BookId,
		date: NaiveDate,
	) -> Result<RecordId, LedgerError> {
		let mut tx = self.conn.begin().await?;

		let available: Option<bool> = sqlx::query_scalar("SELECT is_available FROM books WHERE id = ?")
			.bind(bid)
			.fetch_optional(&mut *tx)
			.await?;
		match available {
			None => {
				warn!(user_id = uid, book_id = bid, "borrow rejected: no such book");
				return Err(LedgerError::BookNotFound(bid));
			}
			Some(false) => {
				warn!(user_id = uid, book_id = bid, "borrow rejected: book is out");
				return Err(LedgerError::Unavailable(bid));
			}
			Some(true) => {}
		}

		let user: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
			.bind(uid)
			.fetch_optional(&mut *tx)
			.await?;
		if user.is_none() {
			warn!(user_id = uid, book_id = bid, "borrow rejected: no such user");
			return Err(LedgerError::UserNotFound(uid));
		}

		let flipped = sqlx::query("UPDATE books SET is_available = 0 WHERE id = ? AND is_available = 1")
			.bind(bid)
			.execute(&mut *tx)
			.await?
			.rows_affected();
		if flipped != 1 {
			warn!(user_id = uid, book_id = bid, "borrow rejected: book is out");
			return Err(LedgerError::Unavailable(bid));
		}

		// the open-loan index refuses a second open record even if the flag drifted
		let inserted = sqlx::query("INSERT INTO borrow_records (user_id, book_id, borrow_date) VALUES (?, ?, ?)")
			.bind(uid)
			.bind(bid)
			.bind(date)
			.execute(&mut *tx)
			.await;
		let rid = match inserted {
			Ok(res) => res.last_insert_rowid(),
			Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
				warn!(user_id = uid, book_id = bid, "borrow rejected: book already has an open loan");
				return Err(LedgerError::Unavailable(bid));
			}
			Err(e) => return Err(e.into()),
		};

		tx.commit().await?;
		info!(user_id = uid, book_id = bid, record_id = rid, %date, "book borrowed");
		Ok(rid)
	}

	pub async fn return_book(&mut self, uid: UserId, bid: BookId) -> Result<(), LedgerError> {
		self.return_book_on(uid, bid, today()).await
	}

	pub(crate) async fn return_book_on(
		&mut self,
		uid: UserId,
		bid: BookId,
		date: NaiveDate,
	) -> Result<(), LedgerError> {
		let mut tx = self.conn.begin().await?;

		// lowest id wins should more than one open record ever match
		let rid: Option<RecordId> = sqlx::query_scalar(r#"
SELECT id FROM borrow_records
WHERE user_id = ? AND book_id = ? AND return_date IS NULL
ORDER BY id
LIMIT 1
		"#)
			.bind(uid)
			.bind(bid)
			.fetch_optional(&mut *tx)
			.await?;
		let Some(rid) = rid else {
			warn!(user_id = uid, book_id = bid, "return rejected: no active borrow");
			return Err(LedgerError::NoActiveBorrow { user: uid, book: bid });
		};

		sqlx::query("UPDATE books SET is_available = 1 WHERE id = ?")
			.bind(bid)
			.execute(&mut *tx)
			.await?;
		sqlx::query("UPDATE borrow_records SET return_date = ? WHERE id = ? AND return_date IS NULL")
			.bind(date)
			.bind(rid)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		info!(user_id = uid, book_id = bid, record_id = rid, %date, "book returned");
		Ok(())
	}

	pub async fn list_available_books(&mut self) -> Result<Vec<AvailableBook>, LedgerError> {
		let books = sqlx::query_as::<_, AvailableBook>(
			"SELECT id, title, author FROM books WHERE is_available = 1 ORDER BY id",
		)
			.fetch_all(&mut self.conn)
			.await?;
		Ok(books)
	}

	/// Every loan the user ever made, oldest first. Unknown users simply
	/// have no history.
	pub async fn user_history(&mut self, uid: UserId) -> Result<Vec<HistoryEntry>, LedgerError> {
		let history = sqlx::query_as::<_, HistoryEntry>(r#"
SELECT b.title AS title, br.borrow_date AS borrow_date, br.return_date AS return_date
FROM borrow_records br
JOIN books b ON br.book_id = b.id
WHERE br.user_id = ?
ORDER BY br.id
		"#)
			.bind(uid)
			.fetch_all(&mut self.conn)
			.await?;
		Ok(history)
	}

	/// All loans of one book, open or closed, in the order they were made.
	pub async fn book_records(&mut self, bid: BookId) -> Result<Vec<BorrowRecord>, LedgerError> {
		let records = sqlx::query_as::<_, BorrowRecord>(
			"SELECT id, user_id, book_id, borrow_date, return_date FROM borrow_records WHERE book_id = ? ORDER BY id",
		)
			.bind(bid)
			.fetch_all(&mut self.conn)
			.await?;
		Ok(records)
	}

	/// Books whose availability flag disagrees with their open loans: marked
	/// available while a loan is open, or out with no loan open.
	pub async fn integrity_violations(&mut self) -> Result<Vec<BookId>, LedgerError> {
		let ids = sqlx::query_scalar::<_, BookId>(r#"
SELECT b.id FROM books b
WHERE b.is_available = EXISTS (
	SELECT 1 FROM borrow_records br
	WHERE br.book_id = b.id AND br.return_date IS NULL
)
ORDER BY b.id
		"#)
			.fetch_all(&mut self.conn)
			.await?;
		Ok(ids)
	}

	#[cfg(test)]
	pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
		&mut self.conn
	}
}
