//! Field input for the menu: a dialoguer-backed terminal prompt and a
//! line reader for piped or scripted input.

use std::io::{self, BufRead, Write};

use console::Term;
use dialoguer::{theme::ColorfulTheme, Input};

pub const NOT_A_NUMBER: &str = "Please enter a number.";

/// Reads menu fields. Both methods return `None` once input is exhausted.
pub trait Prompt {
	fn text(&mut self, out: &mut dyn Write, label: &str) -> io::Result<Option<String>>;
	fn id(&mut self, out: &mut dyn Write, label: &str) -> io::Result<Option<i64>>;
}

fn parse_id(s: &str) -> Option<i64> {
	s.trim().parse().ok()
}

/// Prompts on an interactive terminal. Ids are re-asked until they parse.
pub struct Terminal {
	term: Term,
	theme: ColorfulTheme,
}

impl Terminal {
	pub fn new() -> Self {
		Terminal { term: Term::stdout(), theme: ColorfulTheme::default() }
	}
}

impl Default for Terminal {
	fn default() -> Self {
		Terminal::new()
	}
}

// Ctrl-D / Ctrl-C end the session like a closed pipe
fn end_of_input<T>(e: dialoguer::Error) -> io::Result<Option<T>> {
	let dialoguer::Error::IO(e) = e;
	match e.kind() {
		io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted => Ok(None),
		_ => Err(e),
	}
}

impl Prompt for Terminal {
	fn text(&mut self, _out: &mut dyn Write, label: &str) -> io::Result<Option<String>> {
		let res = Input::<String>::with_theme(&self.theme)
			.with_prompt(label.trim_end_matches([':', ' ']))
			.allow_empty(true)
			.interact_text_on(&self.term);
		match res {
			Ok(s) => Ok(Some(s)),
			Err(e) => end_of_input(e),
		}
	}

	fn id(&mut self, _out: &mut dyn Write, label: &str) -> io::Result<Option<i64>> {
		let res = Input::<String>::with_theme(&self.theme)
			.with_prompt(label.trim_end_matches([':', ' ']))
			.validate_with(|s: &String| -> Result<(), &'static str> {
				parse_id(s).map(|_| ()).ok_or(NOT_A_NUMBER)
			})
			.interact_text_on(&self.term);
		match res {
			Ok(s) => Ok(parse_id(&s)),
			Err(e) => end_of_input(e),
		}
	}
}

/// Reads one field per line, echoing labels to the output.
#[derive(Debug)]
pub struct Lines<R> {
	input: R,
}

impl<R: BufRead> Lines<R> {
	pub fn new(input: R) -> Self {
		Lines { input }
	}

	fn read(&mut self) -> io::Result<Option<String>> {
		let mut line = String::new();
		if self.input.read_line(&mut line)? == 0 {
			return Ok(None);
		}
		Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
	}
}

impl<R: BufRead> Prompt for Lines<R> {
	fn text(&mut self, out: &mut dyn Write, label: &str) -> io::Result<Option<String>> {
		write!(out, "{label}")?;
		out.flush()?;
		self.read()
	}

	fn id(&mut self, out: &mut dyn Write, label: &str) -> io::Result<Option<i64>> {
		loop {
			let Some(line) = self.text(out, label)? else {
				return Ok(None);
			};
			match parse_id(&line) {
				Some(id) => return Ok(Some(id)),
				None => writeln!(out, "{NOT_A_NUMBER}")?,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lines_keep_inner_spaces_and_strip_newlines() {
		let mut out = Vec::new();
		let mut lines = Lines::new("The Left Hand of Darkness\r\n".as_bytes());
		let title = lines.text(&mut out, "Enter book title: ").unwrap();
		assert_eq!(title.as_deref(), Some("The Left Hand of Darkness"));
		assert_eq!(String::from_utf8(out).unwrap(), "Enter book title: ");
	}

	#[test]
	fn lines_reask_until_id_parses() {
		let mut out = Vec::new();
		let mut lines = Lines::new("x\n\n 12 \n".as_bytes());
		assert_eq!(lines.id(&mut out, "Enter user ID: ").unwrap(), Some(12));
		let out = String::from_utf8(out).unwrap();
		assert_eq!(out.matches(NOT_A_NUMBER).count(), 2);
	}

	#[test]
	fn lines_end_of_input_is_none() {
		let mut out = Vec::new();
		let mut lines = Lines::new("abc\n".as_bytes());
		assert_eq!(lines.id(&mut out, "Enter book ID: ").unwrap(), None);
		assert_eq!(lines.text(&mut out, "Enter user name: ").unwrap(), None);
	}
}
