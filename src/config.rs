use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
	name = "libledger",
	about = "Track books, users and loans in a local SQLite ledger",
	version
)]
pub struct Cli {
	/// SQLite file to use; `:memory:` keeps everything in RAM.
	#[arg(long, env = "DATABASE_URL", value_name = "PATH", default_value = "library.db")]
	pub database: String,
}

impl Cli {
	/// Accepts both a bare path and a `sqlite:` url.
	pub fn database_path(&self) -> &str {
		let db = self.database.as_str();
		db.strip_prefix("sqlite://")
			.or_else(|| db.strip_prefix("sqlite:"))
			.unwrap_or(db)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn database_path_strips_url_scheme() {
		let cli = Cli::parse_from(["libledger", "--database", "sqlite://books.db"]);
		assert_eq!(cli.database_path(), "books.db");

		let cli = Cli::parse_from(["libledger", "--database", "sqlite::memory:"]);
		assert_eq!(cli.database_path(), ":memory:");

		let cli = Cli::parse_from(["libledger", "--database", "/tmp/lib.db"]);
		assert_eq!(cli.database_path(), "/tmp/lib.db");
	}
}
