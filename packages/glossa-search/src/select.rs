use std::{cmp, collections::BinaryHeap};

use serde::Serialize;

use glossa_domain::Note;

use crate::{cache::CachedEntry, query::Predicate, rank::RankContext};

/// Presentation form of a matched entry: the vote map is redacted down to
/// the requesting user's own vote, and the ordering key is attached as
/// `relevance`.
#[derive(Clone, Debug, Serialize)]
pub struct PresentedEntry {
	pub id: String,
	pub date: String,
	pub head: String,
	pub body: String,
	pub user: String,
	pub scope: String,
	pub notes: Vec<Note>,
	pub score: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vote: Option<i8>,
	pub relevance: f64,
	/// Deburred token sequence; the reader UI highlights against it.
	pub content: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pronominal_class: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub frame: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distribution: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
}

pub(crate) fn present(cached: &CachedEntry, user: Option<&str>, relevance: f64) -> PresentedEntry {
	let entry = &cached.entry;

	PresentedEntry {
		id: entry.id.clone(),
		date: entry.date.clone(),
		head: entry.head.clone(),
		body: entry.body.clone(),
		user: entry.user.clone(),
		scope: entry.scope.clone(),
		notes: entry.notes.clone(),
		score: entry.score,
		vote: user.map(|name| entry.vote_of(name)),
		relevance,
		content: cached.content.clone(),
		pronominal_class: entry.pronominal_class.clone(),
		frame: entry.frame.clone(),
		distribution: entry.distribution.clone(),
		subject: entry.subject.clone(),
	}
}

struct Candidate<'a> {
	key: crate::rank::RankKey,
	index: usize,
	entry: &'a CachedEntry,
}
impl PartialEq for Candidate<'_> {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == cmp::Ordering::Equal
	}
}
impl Eq for Candidate<'_> {}
impl PartialOrd for Candidate<'_> {
	fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for Candidate<'_> {
	fn cmp(&self, other: &Self) -> cmp::Ordering {
		// inverted so the max-heap surfaces the best-ranked candidate;
		// lower cache position wins ties to match the stable sort
		other.key.compare(&self.key).then_with(|| other.index.cmp(&self.index))
	}
}

/// Filter the whole cache and order it, fully sorted.
pub(crate) fn select_all(
	cache: &[CachedEntry],
	predicate: &Predicate,
	ctx: &RankContext<'_>,
	user: Option<&str>,
) -> Vec<PresentedEntry> {
	let mut hits: Vec<Candidate<'_>> = cache
		.iter()
		.enumerate()
		.filter(|(_, entry)| predicate.matches(entry, user))
		.map(|(index, entry)| Candidate { key: ctx.key_for(entry), index, entry })
		.collect();

	hits.sort_by(|a, b| a.key.compare(&b.key).then_with(|| a.index.cmp(&b.index)));

	hits.into_iter().map(|hit| present(hit.entry, user, hit.key.score)).collect()
}

/// Bounded top-K: heap the *entire* cache by ordering key, pop best-first
/// and test the predicate lazily, stopping at `limit` accepted entries.
/// Popping in ranked order makes this equal to filter-sort-take, while
/// skipping the full sort when `limit` is small.
pub(crate) fn select_top(
	cache: &[CachedEntry],
	predicate: &Predicate,
	ctx: &RankContext<'_>,
	user: Option<&str>,
	limit: usize,
) -> Vec<PresentedEntry> {
	let mut results = Vec::with_capacity(limit.min(cache.len()));

	if limit == 0 {
		return results;
	}

	let mut heap: BinaryHeap<Candidate<'_>> = cache
		.iter()
		.enumerate()
		.map(|(index, entry)| Candidate { key: ctx.key_for(entry), index, entry })
		.collect();

	while let Some(candidate) = heap.pop() {
		if !predicate.matches(candidate.entry, user) {
			continue;
		}

		results.push(present(candidate.entry, user, candidate.key.score));

		if results.len() == limit {
			break;
		}
	}

	results
}
