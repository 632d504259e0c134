use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Fixed substitution table for dialectal spelling variants, applied
/// character-wise after diacritic stripping.
const SUBSTITUTIONS: &[(char, char)] = &[('\u{2019}', '\''), ('\u{131}', 'i')];

/// Normalize a string into comparable lowercase tokens: NFD, strip
/// combining marks, substitute dialectal variants, split on runs of
/// non-letter characters (apostrophes stay inside tokens).
///
/// Accepts any input; an empty token list is a valid result.
pub fn deburr(s: &str) -> Vec<String> {
	let mut stripped = String::with_capacity(s.len());

	for ch in s.nfd() {
		if is_combining_mark(ch) {
			continue;
		}

		let ch = SUBSTITUTIONS
			.iter()
			.find_map(|&(from, to)| (from == ch).then_some(to))
			.unwrap_or(ch);

		stripped.push(ch);
	}

	stripped
		.split(|c: char| !c.is_alphabetic() && c != '\'')
		.filter(|token| !token.is_empty())
		.map(|token| token.to_lowercase().replace('\u{131}', "i"))
		.collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
	/// A token of `haystack` contains the probed token as a substring.
	Containing,
	/// The probed token contains a token of `haystack` as a substring.
	Contained,
	Exact,
}

/// Count how many tokens of `what` are matched somewhere in `haystack`
/// under the given mode.
pub fn deburr_match(what: &[String], haystack: &[String], mode: MatchMode) -> usize {
	what.iter()
		.filter(|w| {
			haystack.iter().any(|y| match mode {
				MatchMode::Containing => y.contains(w.as_str()),
				MatchMode::Contained => w.contains(y.as_str()),
				MatchMode::Exact => *w == y,
			})
		})
		.count()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn toks(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn strips_diacritics_and_case() {
		assert_eq!(deburr("Dúa PAI"), toks(&["dua", "pai"]));
	}

	#[test]
	fn keeps_apostrophes_inside_tokens() {
		assert_eq!(deburr("ru'o jado!"), toks(&["ru'o", "jado"]));
	}

	#[test]
	fn substitutes_dialectal_variants() {
		assert_eq!(deburr("m\u{131}u"), toks(&["miu"]));
		assert_eq!(deburr("do\u{2019}a"), toks(&["do'a"]));
	}

	#[test]
	fn digits_split_tokens() {
		assert_eq!(deburr("bu2"), toks(&["bu"]));
	}

	#[test]
	fn empty_and_junk_are_tokenizable() {
		assert!(deburr("").is_empty());
		assert!(deburr("  \u{300}\u{301} 123 ").is_empty());
	}

	#[test]
	fn match_modes() {
		let what = toks(&["dua"]);
		let hay = toks(&["duashi", "pai"]);

		assert_eq!(deburr_match(&what, &hay, MatchMode::Containing), 1);
		assert_eq!(deburr_match(&what, &hay, MatchMode::Contained), 0);
		assert_eq!(deburr_match(&what, &hay, MatchMode::Exact), 0);
		assert_eq!(deburr_match(&toks(&["duashipai"]), &hay, MatchMode::Contained), 1);
		assert_eq!(deburr_match(&toks(&["pai"]), &hay, MatchMode::Exact), 1);
	}
}
