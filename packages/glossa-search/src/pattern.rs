use std::{borrow::Cow, collections::HashMap, sync::Arc};

use regex::Regex;

use glossa_domain::Entry;

/// Entry fields addressable by trait matchers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraitKind {
	Id,
	User,
	Scope,
	Head,
	Body,
	Date,
	Score,
}
impl TraitKind {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"id" => Some(Self::Id),
			"user" => Some(Self::User),
			"scope" => Some(Self::Scope),
			"head" => Some(Self::Head),
			"body" => Some(Self::Body),
			"date" => Some(Self::Date),
			"score" => Some(Self::Score),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::User => "user",
			Self::Scope => "scope",
			Self::Head => "head",
			Self::Body => "body",
			Self::Date => "date",
			Self::Score => "score",
		}
	}

	/// Head and body patterns additionally understand the linguistic
	/// `C`/`V` placeholder classes.
	fn is_morphological(self) -> bool {
		matches!(self, Self::Head | Self::Body)
	}

	pub fn value_of(self, entry: &Entry) -> Cow<'_, str> {
		match self {
			Self::Id => Cow::Borrowed(entry.id.as_str()),
			Self::User => Cow::Borrowed(entry.user.as_str()),
			Self::Scope => Cow::Borrowed(entry.scope.as_str()),
			Self::Head => Cow::Borrowed(entry.head.as_str()),
			Self::Body => Cow::Borrowed(entry.body.as_str()),
			Self::Date => Cow::Borrowed(entry.date.as_str()),
			Self::Score => Cow::Owned(entry.score.to_string()),
		}
	}
}

/// A compiled trait matcher: either an anchored case-insensitive pattern,
/// or plain string equality when the argument carries no wildcard markers
/// (or its pattern failed to compile — the lenient fallback).
#[derive(Debug)]
pub(crate) enum TraitMatcher {
	Pattern(Regex),
	Literal(String),
}
impl TraitMatcher {
	pub(crate) fn matches(&self, value: &str) -> bool {
		match self {
			Self::Pattern(re) => re.is_match(value),
			Self::Literal(lit) => lit == value,
		}
	}
}

const CONSONANT_CLASS: &str = "(?:[bcdfghjklnprstz']|ch|sh|nh)";
const VOWEL_CLASS: &str = "[ae\u{131}iouy]";

pub(crate) fn compile(kind: TraitKind, literal: &str) -> TraitMatcher {
	let markers: &[char] =
		if kind.is_morphological() { &['?', '*', 'C', 'V'] } else { &['?', '*'] };

	if !literal.contains(markers) {
		return TraitMatcher::Literal(literal.to_string());
	}

	let mut src = String::with_capacity(literal.len() * 2);
	let mut last_star = false;

	for ch in literal.chars() {
		if ch == '*' {
			// collapse runs of stars into one wildcard
			if !last_star {
				src.push_str(".*");
			}
			last_star = true;

			continue;
		}
		last_star = false;

		match ch {
			'[' | ']' | '{' | '}' | '(' | ')' | '+' | '.' | '\\' | '^' | '$' | '|' => {
				src.push('\\');
				src.push(ch);
			},
			'?' => src.push('.'),
			'i' => src.push_str("[\u{131}i]"),
			_ => src.push(ch),
		}
	}

	if kind.is_morphological() {
		src = src.replace('C', CONSONANT_CLASS);
		// `V+` survives as a quantified class; the plus was escaped above
		src = src.replace("V\\+", "V+").replace('V', VOWEL_CLASS);
	}

	match Regex::new(&format!("(?i)^{src}$")) {
		Ok(re) => TraitMatcher::Pattern(re),
		Err(_) => TraitMatcher::Literal(literal.to_string()),
	}
}

/// Memo table for compiled trait matchers, keyed by (trait, literal).
/// One generation lives exactly as long as one cache generation: `recache`
/// clears it wholesale.
#[derive(Debug, Default)]
pub(crate) struct PatternCache {
	compiled: HashMap<(TraitKind, String), Arc<TraitMatcher>>,
}
impl PatternCache {
	pub(crate) fn get(&mut self, kind: TraitKind, literal: &str) -> Arc<TraitMatcher> {
		if let Some(matcher) = self.compiled.get(&(kind, literal.to_string())) {
			return Arc::clone(matcher);
		}

		let matcher = Arc::new(compile(kind, literal));

		self.compiled.insert((kind, literal.to_string()), Arc::clone(&matcher));

		matcher
	}

	pub(crate) fn clear(&mut self) {
		self.compiled.clear();
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.compiled.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_literal_is_exact_and_case_sensitive() {
		let m = compile(TraitKind::User, "Alice");

		assert!(m.matches("Alice"));
		assert!(!m.matches("alice"));
	}

	#[test]
	fn question_mark_matches_one_char() {
		let m = compile(TraitKind::Head, "?a*");

		assert!(m.matches("kato"));
		assert!(m.matches("ra"));
		assert!(!m.matches("abc"));
	}

	#[test]
	fn star_matches_any_run() {
		let m = compile(TraitKind::Scope, "to*");

		assert!(m.matches("toa"));
		assert!(m.matches("to"));
		assert!(!m.matches("en"));
	}

	#[test]
	fn star_runs_collapse() {
		let m = compile(TraitKind::Scope, "a**b");

		assert!(m.matches("ab"));
		assert!(m.matches("axxxb"));
	}

	#[test]
	fn patterns_are_case_insensitive() {
		let m = compile(TraitKind::Head, "KA*");

		assert!(m.matches("kato"));
	}

	#[test]
	fn consonant_class_understands_digraphs() {
		let m = compile(TraitKind::Head, "Cua");

		assert!(m.matches("dua"));
		assert!(m.matches("chua"));
		assert!(!m.matches("aua"));
	}

	#[test]
	fn vowel_run_quantifier() {
		let m = compile(TraitKind::Head, "bV+");

		assert!(m.matches("bai"));
		assert!(m.matches("bo"));
		assert!(!m.matches("b"));
	}

	#[test]
	fn dotted_and_dotless_i_are_interchangeable() {
		let m = compile(TraitKind::Head, "m?u*");

		assert!(m.matches("m\u{131}u"));
		assert!(m.matches("miu"));
	}

	#[test]
	fn cv_is_literal_outside_morphological_traits() {
		let m = compile(TraitKind::User, "CV");

		assert!(m.matches("CV"));
		assert!(!m.matches("ba"));
	}

	#[test]
	fn regex_specials_are_escaped() {
		let m = compile(TraitKind::Body, "a(b)*");

		assert!(m.matches("a(b)c"));
		assert!(!m.matches("ab"));
	}

	#[test]
	fn memo_reuses_compilations() {
		let mut cache = PatternCache::default();
		let first = cache.get(TraitKind::Head, "?a*");
		let again = cache.get(TraitKind::Head, "?a*");

		assert!(Arc::ptr_eq(&first, &again));
		assert_eq!(cache.len(), 1);

		cache.clear();

		assert_eq!(cache.len(), 0);
	}
}
