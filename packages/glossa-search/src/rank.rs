use std::cmp;

use crate::{
	cache::CachedEntry,
	tokenize::{MatchMode, deburr_match},
};

/// Requested result ordering. Unrecognized names fall back to relevance,
/// matching the lenient behavior of the query surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
	Relevance,
	Newest,
	Oldest,
	Highest,
	Lowest,
	Random,
	Alphabetical,
}
impl SortOrder {
	pub fn from_name(name: Option<&str>) -> Self {
		match name {
			Some("newest" | "new") => Self::Newest,
			Some("oldest" | "old") => Self::Oldest,
			Some("highest" | "high") => Self::Highest,
			Some("lowest" | "low") => Self::Lowest,
			Some("random") => Self::Random,
			Some("alpha" | "alphabetic" | "alphabetical") => Self::Alphabetical,
			_ => Self::Relevance,
		}
	}
}

/// Match-point table for the default relevance formula. The values are
/// empirically tuned policy, kept in one place so retuning never touches
/// the scoring code itself.
#[derive(Clone, Debug)]
pub struct ScorePolicy {
	/// Non-zero floor so the vote multiplier never collapses a tie to 0.
	pub base: f64,
	/// Any query token appears in the notes.
	pub note_token: f64,
	/// A body token is a substring of a query token.
	pub body_in_term: f64,
	/// A head token is a substring of a query token.
	pub head_in_term: f64,
	/// A query token is a substring of a body token.
	pub term_in_body: f64,
	/// A query token is a substring of a head token.
	pub term_in_head: f64,
	/// A query token equals a body token.
	pub body_exact: f64,
	/// Every head token is matched exactly; dominates everything else.
	pub head_exact: f64,
	/// A literal (non-deburred) bare term equals the raw head verbatim.
	pub verbatim_head: f64,
}
impl Default for ScorePolicy {
	fn default() -> Self {
		Self {
			base: 0.1,
			note_token: 1.0,
			body_in_term: 3.0,
			head_in_term: 6.0,
			term_in_body: 10.0,
			term_in_head: 15.0,
			body_exact: 30.0,
			head_exact: 69.420_133_7,
			verbatim_head: 30.0,
		}
	}
}

/// Default multi-factor relevance: a sublinear vote multiplier times
/// additive match points. Higher is better.
pub(crate) fn relevance(
	entry: &CachedEntry,
	terms: &[String],
	bares: &[String],
	official_user: &str,
	policy: &ScorePolicy,
) -> f64 {
	let official = if entry.entry.user == official_user { 1.0 } else { 0.0 };
	let upvotes = entry.score.max(0) as f64;
	let downvotes = (-entry.score).max(0) as f64;
	let vote_multiplier = ((1.0 + upvotes + official) / (1.0 + downvotes)).sqrt();
	let mut points = policy.base;

	if deburr_match(terms, &entry.notes, MatchMode::Containing) > 0 {
		points += policy.note_token;
	}
	if deburr_match(terms, &entry.body, MatchMode::Contained) > 0 {
		points += policy.body_in_term;
	}
	if deburr_match(terms, &entry.head, MatchMode::Contained) > 0 {
		points += policy.head_in_term;
	}
	if deburr_match(terms, &entry.body, MatchMode::Containing) > 0 {
		points += policy.term_in_body;
	}
	if deburr_match(terms, &entry.head, MatchMode::Containing) > 0 {
		points += policy.term_in_head;
	}
	if deburr_match(terms, &entry.body, MatchMode::Exact) > 0 {
		points += policy.body_exact;
	}
	if !entry.head.is_empty()
		&& deburr_match(terms, &entry.head, MatchMode::Exact) == entry.head.len()
	{
		points += policy.head_exact;
	}
	if bares.iter().any(|bare| bare == &entry.entry.head) {
		points += policy.verbatim_head;
	}

	vote_multiplier * points
}

/// Ordering key for one entry under one search. `score` carries the
/// numeric key (relevance, date, votes, a random draw, or just the scope
/// bias); `head` is set only for alphabetical ordering, where it takes
/// over as the tie-wise comparison within equal scores.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RankKey {
	pub(crate) score: f64,
	pub(crate) head: Option<String>,
}
impl RankKey {
	/// Total order, best-ranked first. Callers add their own final
	/// tie-break on cache position to keep selection deterministic.
	pub(crate) fn compare(&self, other: &Self) -> cmp::Ordering {
		other
			.score
			.total_cmp(&self.score)
			.then_with(|| match (&self.head, &other.head) {
				(Some(a), Some(b)) => a.cmp(b),
				_ => cmp::Ordering::Equal,
			})
	}
}

pub(crate) struct RankContext<'a> {
	pub(crate) order: SortOrder,
	pub(crate) terms: &'a [String],
	pub(crate) bares: &'a [String],
	pub(crate) preferred_scope: Option<&'a str>,
	pub(crate) preferred_scope_bias: f64,
	pub(crate) official_user: &'a str,
	pub(crate) policy: &'a ScorePolicy,
}
impl RankContext<'_> {
	pub(crate) fn key_for(&self, entry: &CachedEntry) -> RankKey {
		let base = match self.order {
			SortOrder::Relevance =>
				relevance(entry, self.terms, self.bares, self.official_user, self.policy),
			// undated entries sort as the epoch
			SortOrder::Newest => entry.date_ms.unwrap_or(0) as f64,
			SortOrder::Oldest => -(entry.date_ms.unwrap_or(0) as f64),
			SortOrder::Highest => entry.score as f64,
			SortOrder::Lowest => -(entry.score as f64),
			SortOrder::Random => rand::random::<f64>(),
			SortOrder::Alphabetical => 0.0,
		};
		let bias = match self.preferred_scope {
			Some(scope) if scope == entry.entry.scope => self.preferred_scope_bias,
			_ => 0.0,
		};
		let head =
			(self.order == SortOrder::Alphabetical).then(|| entry.entry.head.clone());

		RankKey { score: base + bias, head }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cache::cacheify;
	use glossa_domain::Entry;

	fn entry(head: &str, body: &str, user: &str, score: i64) -> CachedEntry {
		cacheify(&Entry {
			id: format!("id-{head}"),
			date: "2024-01-01T00:00:00Z".to_string(),
			head: head.to_string(),
			body: body.to_string(),
			user: user.to_string(),
			scope: "en".to_string(),
			notes: Vec::new(),
			votes: Default::default(),
			score,
			pronominal_class: None,
			frame: None,
			distribution: None,
			subject: None,
		})
	}

	fn toks(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn exact_head_match_dominates_substring() {
		let policy = ScorePolicy::default();
		let exact = entry("bu", "negation", "alice", 0);
		let substring = entry("bubu", "doubled negation", "alice", 0);
		let terms = toks(&["bu"]);
		let bares = toks(&["bu"]);
		let exact_score = relevance(&exact, &terms, &bares, "official", &policy);
		let substring_score = relevance(&substring, &terms, &bares, "official", &policy);

		assert!(exact_score > substring_score);
	}

	#[test]
	fn official_author_gets_vote_bonus() {
		let policy = ScorePolicy::default();
		let ours = entry("rai", "▯ is a thing", "official", 0);
		let theirs = entry("rai", "▯ is a thing", "alice", 0);
		let terms = toks(&["rai"]);
		let ours_score = relevance(&ours, &terms, &[], "official", &policy);
		let theirs_score = relevance(&theirs, &terms, &[], "official", &policy);

		assert!(ours_score > theirs_score);
	}

	#[test]
	fn downvotes_shrink_but_never_zero() {
		let policy = ScorePolicy::default();
		let sunk = entry("rai", "▯ is a thing", "alice", -50);
		let score = relevance(&sunk, &toks(&["rai"]), &[], "official", &policy);

		assert!(score > 0.0);
	}

	#[test]
	fn scope_bias_applies_to_named_orderings() {
		let e = entry("rai", "▯ is a thing", "alice", 5);
		let ctx = RankContext {
			order: SortOrder::Highest,
			terms: &[],
			bares: &[],
			preferred_scope: Some("en"),
			preferred_scope_bias: 2.5,
			official_user: "official",
			policy: &ScorePolicy::default(),
		};

		assert_eq!(ctx.key_for(&e).score, 7.5);
	}

	#[test]
	fn alphabetical_orders_by_head() {
		let ctx = RankContext {
			order: SortOrder::Alphabetical,
			terms: &[],
			bares: &[],
			preferred_scope: None,
			preferred_scope_bias: 0.0,
			official_user: "official",
			policy: &ScorePolicy::default(),
		};
		let a = ctx.key_for(&entry("aka", "x", "alice", 0));
		let b = ctx.key_for(&entry("zuo", "x", "alice", 0));

		assert_eq!(a.compare(&b), std::cmp::Ordering::Less);
	}

	#[test]
	fn ordering_aliases() {
		assert_eq!(SortOrder::from_name(Some("new")), SortOrder::Newest);
		assert_eq!(SortOrder::from_name(Some("alphabetic")), SortOrder::Alphabetical);
		assert_eq!(SortOrder::from_name(Some("nonsense")), SortOrder::Relevance);
		assert_eq!(SortOrder::from_name(None), SortOrder::Relevance);
	}
}
