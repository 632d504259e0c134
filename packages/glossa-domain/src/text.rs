use unicode_normalization::UnicodeNormalization;

/// Glyph marking an argument slot in a definition body.
pub const PLACEHOLDER: char = '▯';

/// Canonicalize user-submitted free text: unify the placeholder spellings
/// (`___` and `◌`) to the one glyph, strip trailing whitespace, NFC.
pub fn replacements(s: &str) -> String {
	let unified = s.replace("___", "\u{25af}").replace('\u{25cc}', "\u{25af}");

	unified.trim_end().nfc().collect()
}

/// Normalize a headword for storage: NFC plus whitespace cleanup. The
/// search side applies its own, lossier normalization on top of this.
pub fn normalize_head(s: &str) -> String {
	let collapsed: Vec<&str> = s.split_whitespace().collect();

	collapsed.join(" ").nfc().collect()
}

/// Current instant as the RFC3339 string every `Entry.date` carries.
pub fn now_rfc3339() -> String {
	time::OffsetDateTime::now_utc()
		.format(&time::format_description::well_known::Rfc3339)
		.unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
