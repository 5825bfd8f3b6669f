// library ledger

use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use libledger::{
	config::Cli,
	menu::Menu,
	prompt::{Lines, Terminal},
	Ledger,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();
	init_tracing();

	let cli = Cli::parse();
	let path = cli.database_path();
	let mut ledger = Ledger::open(path)
		.await
		.with_context(|| format!("can't open ledger at {path}"))?;

	let stdin = std::io::stdin();
	if stdin.is_terminal() {
		Menu::new(&mut ledger, Terminal::new(), std::io::stdout())
			.run()
			.await?;
	} else {
		Menu::new(&mut ledger, Lines::new(stdin.lock()), std::io::stdout())
			.run()
			.await?;
	}

	ledger.close().await?;
	Ok(())
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.compact()
		.init();
}
