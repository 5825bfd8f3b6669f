use std::str::FromStr;

use sqlx::{
	sqlite::SqliteConnectOptions,
	ConnectOptions, Executor, SqliteConnection,
};

pub const MEMORY: &str = ":memory:";

fn connect_options(path: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
	let options = if path == MEMORY {
		SqliteConnectOptions::from_str("sqlite::memory:")?
	} else {
		SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
	};
	Ok(options.foreign_keys(true))
}

/// Opens the store at `path` (or a private in-memory store for `:memory:`)
/// and makes sure every table exists.
pub async fn open(path: &str) -> Result<SqliteConnection, sqlx::Error> {
	let mut conn = connect_options(path)?.connect().await?;
	conn.execute(TABLE_SCHEMA).await?;
	Ok(conn)
}

pub const TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS books (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL,
	author TEXT NOT NULL,
	is_available BOOLEAN NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS users (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS borrow_records (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL,
	book_id INTEGER NOT NULL,
	borrow_date TEXT NOT NULL,
	return_date TEXT,
	CHECK(return_date IS NULL OR return_date >= borrow_date),
	FOREIGN KEY(user_id) REFERENCES users(id),
	FOREIGN KEY(book_id) REFERENCES books(id)
);

-- at most one open loan per book
CREATE UNIQUE INDEX IF NOT EXISTS borrow_records_open_book
	ON borrow_records(book_id) WHERE return_date IS NULL;
"#;
