//! Plain-text tables for the terminal.

use console::measure_text_width;

fn rule(widths: &[usize]) -> String {
	let mut line = String::from("+");
	for w in widths {
		line.push_str(&"-".repeat(w + 2));
		line.push('+');
	}
	line
}

fn row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
	let mut line = String::from("|");
	for (cell, w) in cells.iter().zip(widths) {
		let cell = cell.as_ref();
		let pad = w - measure_text_width(cell);
		line.push(' ');
		line.push_str(cell);
		line.push_str(&" ".repeat(pad + 1));
		line.push('|');
	}
	line
}

/// Renders `rows` under `headers` as a boxed table, one column per header.
/// Rows shorter than the header are padded with empty cells.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
	let rows: Vec<Vec<&str>> = rows
		.iter()
		.map(|r| (0..headers.len()).map(|i| r.get(i).map_or("", String::as_str)).collect())
		.collect();

	let widths: Vec<usize> = headers
		.iter()
		.enumerate()
		.map(|(i, h)| {
			rows.iter()
				.map(|r| measure_text_width(r[i]))
				.chain(std::iter::once(measure_text_width(h)))
				.max()
				.unwrap_or(0)
		})
		.collect();

	let sep = rule(&widths);
	let mut out = vec![sep.clone(), row(headers, &widths), sep.clone()];
	out.extend(rows.iter().map(|r| row(r, &widths)));
	if !rows.is_empty() {
		out.push(sep);
	}
	out.join("\n")
}
