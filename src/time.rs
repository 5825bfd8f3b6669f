use chrono::{NaiveDate, Utc};

/// Current calendar date in UTC, the same day SQLite's `DATE('now')` reports.
pub fn today() -> NaiveDate {
	Utc::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

// open loans have no return date yet
pub fn format_return(date: Option<NaiveDate>) -> String {
	date.map(format_date).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dates_render_iso() {
		let d = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
		assert_eq!(format_date(d), "2024-02-09");
		assert_eq!(format_return(Some(d)), "2024-02-09");
		assert_eq!(format_return(None), "-");
	}
}
