use std::io::{self, Write};
use std::str::FromStr;

use tracing::error;

use crate::ledger::Ledger;
use crate::prompt::Prompt;
use crate::table;
use crate::time::{format_date, format_return};
use crate::types::LedgerError;

const BANNER: &str = "\
Library Management System
1. Add Book
2. Register User
3. Borrow Book
4. Return Book
5. View Available Books
6. View User Borrowing History
7. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
	AddBook,
	RegisterUser,
	Borrow,
	Return,
	ListAvailable,
	History,
	Exit,
}

impl FromStr for Choice {
	type Err = ();
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim() {
			"1" => Choice::AddBook,
			"2" => Choice::RegisterUser,
			"3" => Choice::Borrow,
			"4" => Choice::Return,
			"5" => Choice::ListAvailable,
			"6" => Choice::History,
			"7" => Choice::Exit,
			_ => return Err(()),
		})
	}
}

fn failure_message(e: &LedgerError) -> String {
	match e {
		LedgerError::BookNotFound(_) => "Book not found.".to_string(),
		LedgerError::UserNotFound(_) => "User not found.".to_string(),
		LedgerError::Unavailable(_) => "Book is currently unavailable.".to_string(),
		LedgerError::NoActiveBorrow { .. } => {
			"No active borrow record found for this user and book.".to_string()
		}
		LedgerError::Storage(e) => format!("Storage error: {e}"),
	}
}

/// The interactive front end. Reads choices and fields through `fields`;
/// every ledger failure is reported on `out` and the loop goes on.
pub struct Menu<'l, P, W> {
	ledger: &'l mut Ledger,
	fields: P,
	out: W,
}

impl<'l, P: Prompt, W: Write> Menu<'l, P, W> {
	pub fn new(ledger: &'l mut Ledger, fields: P, out: W) -> Self {
		Menu { ledger, fields, out }
	}

	// None once input is exhausted
	fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
		self.fields.text(&mut self.out, label)
	}

	fn prompt_id(&mut self, label: &str) -> io::Result<Option<i64>> {
		self.fields.id(&mut self.out, label)
	}

	fn report(&mut self, e: &LedgerError) -> io::Result<()> {
		if e.is_storage_fault() {
			error!(error = %e, "ledger operation failed");
		}
		writeln!(self.out, "{}", failure_message(e))
	}

	pub async fn run(mut self) -> io::Result<()> {
		loop {
			writeln!(self.out, "\n{BANNER}")?;
			let Some(line) = self.prompt("Enter your choice: ")? else {
				break;
			};
			let Ok(choice) = line.parse::<Choice>() else {
				writeln!(self.out, "Invalid choice. Please try again.")?;
				continue;
			};
			if choice == Choice::Exit {
				writeln!(self.out, "Goodbye!")?;
				return Ok(());
			}
			if !self.dispatch(choice).await? {
				break;
			}
		}
		writeln!(self.out)?;
		Ok(())
	}

	// false when input ran out mid-prompt
	async fn dispatch(&mut self, choice: Choice) -> io::Result<bool> {
		match choice {
			Choice::AddBook => {
				let Some(title) = self.prompt("Enter book title: ")? else { return Ok(false) };
				let Some(author) = self.prompt("Enter book author: ")? else { return Ok(false) };
				match self.ledger.add_book(&title, &author).await {
					Ok(_) => writeln!(self.out, "Book '{title}' by {author} added to the library.")?,
					Err(e) => self.report(&e)?,
				}
			}
			Choice::RegisterUser => {
				let Some(name) = self.prompt("Enter user name: ")? else { return Ok(false) };
				match self.ledger.register_user(&name).await {
					Ok(_) => writeln!(self.out, "User '{name}' registered successfully.")?,
					Err(e) => self.report(&e)?,
				}
			}
			Choice::Borrow => {
				let Some(uid) = self.prompt_id("Enter user ID: ")? else { return Ok(false) };
				let Some(bid) = self.prompt_id("Enter book ID: ")? else { return Ok(false) };
				match self.ledger.borrow_book(uid, bid).await {
					Ok(_) => writeln!(self.out, "Book ID {bid} borrowed by User ID {uid}.")?,
					Err(e) => self.report(&e)?,
				}
			}
			Choice::Return => {
				let Some(uid) = self.prompt_id("Enter user ID: ")? else { return Ok(false) };
				let Some(bid) = self.prompt_id("Enter book ID: ")? else { return Ok(false) };
				match self.ledger.return_book(uid, bid).await {
					Ok(()) => writeln!(self.out, "Book ID {bid} returned by User ID {uid}.")?,
					Err(e) => self.report(&e)?,
				}
			}
			Choice::ListAvailable => match self.ledger.list_available_books().await {
				Ok(books) => {
					let rows: Vec<Vec<String>> = books
						.into_iter()
						.map(|b| vec![b.id.to_string(), b.title, b.author])
						.collect();
					writeln!(self.out, "{}", table::render(&["ID", "Title", "Author"], &rows))?;
				}
				Err(e) => self.report(&e)?,
			},
			Choice::History => {
				let Some(uid) = self.prompt_id("Enter user ID: ")? else { return Ok(false) };
				match self.ledger.user_history(uid).await {
					Ok(history) => {
						let rows: Vec<Vec<String>> = history
							.into_iter()
							.map(|h| vec![h.title, format_date(h.borrow_date), format_return(h.return_date)])
							.collect();
						let headers = ["Title", "Borrow Date", "Return Date"];
						writeln!(self.out, "{}", table::render(&headers, &rows))?;
					}
					Err(e) => self.report(&e)?,
				}
			}
			Choice::Exit => return Ok(false),
		}
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::prompt::{Lines, NOT_A_NUMBER};
	use crate::time::today;
	use crate::types::BookStatus;

	async fn session(ledger: &mut Ledger, script: &str) -> String {
		let mut out = Vec::new();
		Menu::new(ledger, Lines::new(script.as_bytes()), &mut out).run().await.unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn choices_parse() {
		assert_eq!(" 3 ".parse::<Choice>(), Ok(Choice::Borrow));
		assert_eq!("7".parse::<Choice>(), Ok(Choice::Exit));
		assert!("8".parse::<Choice>().is_err());
		assert!("borrow".parse::<Choice>().is_err());
	}

	#[tokio::test]
	async fn full_session() {
		let mut ledger = Ledger::in_memory().await.unwrap();
		let script = "1\nDune\nHerbert\n2\nAlice\n3\n1\n1\n3\n1\n1\n5\n4\n1\n1\n6\n1\n7\n";
		let out = session(&mut ledger, script).await;

		assert!(out.contains("Book 'Dune' by Herbert added to the library."));
		assert!(out.contains("User 'Alice' registered successfully."));
		assert!(out.contains("Book ID 1 borrowed by User ID 1."));
		assert!(out.contains("Book is currently unavailable."));
		assert!(out.contains("| ID | Title | Author |"));
		assert!(out.contains("Book ID 1 returned by User ID 1."));
		let day = format_date(today());
		assert!(out.contains(&format!("| Dune  | {day}  | {day}  |")));
		assert!(out.ends_with("Goodbye!\n"));

		assert_eq!(ledger.book(1).await.unwrap().unwrap().status(), BookStatus::Available);
	}

	#[tokio::test]
	async fn rejections_keep_the_loop_running() {
		let mut ledger = Ledger::in_memory().await.unwrap();
		let out = session(&mut ledger, "3\n1\n999\n4\n1\n1\n9\n7\n").await;
		assert!(out.contains("Book not found."));
		assert!(out.contains("No active borrow record found for this user and book."));
		assert!(out.contains("Invalid choice. Please try again."));
		assert_eq!(out.matches("Library Management System").count(), 4);
		assert!(out.ends_with("Goodbye!\n"));
	}

	#[tokio::test]
	async fn non_numeric_id_reprompts() {
		let mut ledger = Ledger::in_memory().await.unwrap();
		ledger.add_book("Dune", "Herbert").await.unwrap();
		ledger.register_user("Alice").await.unwrap();

		let out = session(&mut ledger, "3\nabc\n1\n1\n7\n").await;
		assert_eq!(out.matches(NOT_A_NUMBER).count(), 1);
		assert!(out.contains("Book ID 1 borrowed by User ID 1."));
	}

	#[tokio::test]
	async fn end_of_input_exits_quietly() {
		let mut ledger = Ledger::in_memory().await.unwrap();
		let out = session(&mut ledger, "1\nDune\n").await;
		assert!(!out.contains("added to the library"));
		assert!(!out.contains("Goodbye!"));
		assert!(ledger.list_available_books().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn unknown_user_history_is_empty_table() {
		let mut ledger = Ledger::in_memory().await.unwrap();
		let out = session(&mut ledger, "6\n5\n7\n").await;
		assert!(out.contains("| Title | Borrow Date | Return Date |"));
	}

	#[tokio::test]
	async fn storage_fault_is_reported_and_loop_continues() {
		let mut ledger = Ledger::in_memory().await.unwrap();
		sqlx::query("DROP TABLE borrow_records")
			.execute(ledger.conn())
			.await
			.unwrap();

		let out = session(&mut ledger, "6\n1\n1\nDune\nHerbert\n7\n").await;
		let fault = out.find("Storage error").unwrap();
		let added = out.find("Book 'Dune' by Herbert added to the library.").unwrap();
		assert!(fault < added);
		assert!(out.contains("no such table"));
		assert!(out.ends_with("Goodbye!\n"));
		assert_eq!(ledger.list_available_books().await.unwrap().len(), 1);
	}
}
