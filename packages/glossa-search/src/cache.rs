use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use glossa_domain::Entry;

use crate::tokenize::deburr;

/// Search-optimized projection of one [`Entry`]: the entry snapshot plus
/// token sequences and a pre-parsed numeric date.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedEntry {
	pub entry: Entry,
	pub head: Vec<String>,
	pub body: Vec<String>,
	pub notes: Vec<String>,
	/// head + body + notes, in that order.
	pub content: Vec<String>,
	/// Epoch milliseconds; `None` when the entry date fails to parse.
	/// Undated entries match neither `before` nor `since`.
	pub date_ms: Option<i64>,
	pub score: i64,
}

pub(crate) fn try_parse_instant_ms(s: &str) -> Option<i64> {
	let parsed = OffsetDateTime::parse(s, &Rfc3339).ok()?;

	Some((parsed.unix_timestamp_nanos() / 1_000_000) as i64)
}

/// Derive the cached projection. Must accept any entry text; a
/// malformed date leaves the entry undated rather than failing the
/// derivation.
pub fn cacheify(entry: &Entry) -> CachedEntry {
	let head = deburr(&entry.head);
	let body = deburr(&entry.body);
	let notes: Vec<String> = entry.notes.iter().flat_map(|note| deburr(&note.content)).collect();
	let content: Vec<String> =
		head.iter().chain(body.iter()).chain(notes.iter()).cloned().collect();

	CachedEntry {
		date_ms: try_parse_instant_ms(&entry.date),
		score: entry.score,
		entry: entry.clone(),
		head,
		body,
		notes,
		content,
	}
}
