//! Query compiler and ranked search engine over an in-memory entry cache.
//!
//! The engine keeps a flat, search-optimized projection of the entry
//! collection, synchronized through explicit per-mutation sink methods.
//! Searches compile a nested-array query into a predicate, harvest its
//! bare terms for relevance, and select results either fully sorted or
//! through a bounded heap-based top-K pass.

mod cache;
mod pattern;
mod query;
mod rank;
mod select;
mod tokenize;

pub use cache::{CachedEntry, cacheify};
pub use pattern::TraitKind;
pub use query::{QueryError, QueryExpr};
pub use rank::{ScorePolicy, SortOrder};
pub use select::PresentedEntry;
pub use tokenize::{MatchMode, deburr, deburr_match};

use std::sync::Mutex;

use serde_json::Value;

use glossa_domain::Entry;

use crate::{
	pattern::{PatternCache, TraitMatcher},
	query::Predicate,
	rank::RankContext,
};

/// One search call's options. `query` is the nested-array expression;
/// everything else is optional tuning.
#[derive(Clone, Debug, Default)]
pub struct SearchParams {
	pub query: Value,
	pub ordering: Option<String>,
	pub limit: Option<usize>,
	pub preferred_scope: Option<String>,
	pub preferred_scope_bias: f64,
}
impl SearchParams {
	pub fn new(query: Value) -> Self {
		Self { query, ..Self::default() }
	}
}

pub struct SearchEngine {
	entries: Vec<CachedEntry>,
	/// Compiled trait patterns, one generation per cache generation.
	patterns: Mutex<PatternCache>,
	official_user: String,
	policy: ScorePolicy,
}
impl SearchEngine {
	pub fn new(official_user: impl Into<String>) -> Self {
		Self {
			entries: Vec::new(),
			patterns: Mutex::new(PatternCache::default()),
			official_user: official_user.into(),
			policy: ScorePolicy::default(),
		}
	}

	pub fn set_score_policy(&mut self, policy: ScorePolicy) {
		self.policy = policy;
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Rebuild the whole cache from an entry snapshot. The only recovery
	/// path if incremental synchronization is ever suspected to have
	/// drifted; also invalidates the pattern memo generation.
	pub fn recache(&mut self, entries: &[Entry]) {
		self.entries = entries.iter().map(cacheify).collect();
		self.lock_patterns(PatternCache::clear);
		tracing::debug!(entries = self.entries.len(), "rebuilt search cache.");
	}

	pub fn on_create(&mut self, entry: &Entry) {
		self.entries.push(cacheify(entry));
	}

	/// Removing an id the cache never held is a no-op, not an error.
	pub fn on_remove(&mut self, entry: &Entry) {
		if let Some(index) = self.index_of(&entry.id) {
			self.entries.remove(index);
		}
	}

	pub fn on_vote(&mut self, entry: &Entry) {
		self.replace(entry);
	}

	pub fn on_note(&mut self, entry: &Entry) {
		self.replace(entry);
	}

	pub fn on_remove_note(&mut self, entry: &Entry) {
		self.replace(entry);
	}

	pub fn on_edit(&mut self, entry: &Entry) {
		self.replace(entry);
	}

	pub fn on_move(&mut self, entry: &Entry) {
		self.replace(entry);
	}

	/// Whole-entry rederivation on any other mutation: simpler than
	/// field-wise patching, and the cost scales with the entry text, not
	/// the collection.
	fn replace(&mut self, entry: &Entry) {
		match self.index_of(&entry.id) {
			Some(index) => self.entries[index] = cacheify(entry),
			None => self.entries.push(cacheify(entry)),
		}
	}

	fn index_of(&self, id: &str) -> Option<usize> {
		self.entries.iter().position(|cached| cached.entry.id == id)
	}

	#[doc(hidden)]
	pub fn cached_snapshot(&self) -> &[CachedEntry] {
		&self.entries
	}

	/// Compile, rank and select in one pass. Errors are descriptive
	/// compile diagnostics meant for the end user; nothing here panics.
	pub fn search(
		&self,
		params: &SearchParams,
		user: Option<&str>,
	) -> Result<Vec<PresentedEntry>, QueryError> {
		let expr = QueryExpr::parse(&params.query)?;
		let predicate = self.compile(&expr);
		let bares = expr.bare_terms();
		let terms: Vec<String> = bares.iter().flat_map(|bare| deburr(bare)).collect();
		let ctx = RankContext {
			order: SortOrder::from_name(params.ordering.as_deref()),
			terms: &terms,
			bares: &bares,
			preferred_scope: params.preferred_scope.as_deref(),
			preferred_scope_bias: params.preferred_scope_bias,
			official_user: &self.official_user,
			policy: &self.policy,
		};

		Ok(match params.limit {
			Some(limit) => select::select_top(&self.entries, &predicate, &ctx, user, limit),
			None => select::select_all(&self.entries, &predicate, &ctx, user),
		})
	}

	fn compile(&self, expr: &QueryExpr) -> Predicate {
		match expr {
			QueryExpr::And(nodes) =>
				Predicate::And(nodes.iter().map(|node| self.compile(node)).collect()),
			QueryExpr::Or(nodes) =>
				Predicate::Or(nodes.iter().map(|node| self.compile(node)).collect()),
			QueryExpr::Not(node) => Predicate::Not(Box::new(self.compile(node))),
			QueryExpr::Term(s) => Predicate::Term(deburr(s)),
			QueryExpr::Arity(n) => Predicate::Arity(*n),
			QueryExpr::MyVote(vote) => Predicate::MyVote(*vote),
			QueryExpr::Before(ms) => Predicate::Before(*ms),
			QueryExpr::Since(ms) => Predicate::Since(*ms),
			QueryExpr::Trait { kind, literal, raw: true } =>
				Predicate::TraitRaw(*kind, literal.clone()),
			QueryExpr::Trait { kind, literal, raw: false } => {
				let matcher: std::sync::Arc<TraitMatcher> =
					self.lock_patterns(|patterns| patterns.get(*kind, literal));

				Predicate::TraitPattern(*kind, matcher)
			},
		}
	}

	fn lock_patterns<T>(&self, f: impl FnOnce(&mut PatternCache) -> T) -> T {
		match self.patterns.lock() {
			Ok(mut guard) => f(&mut guard),
			// a poisoned memo only ever holds compiled regexes; keep going
			Err(poisoned) => f(&mut poisoned.into_inner()),
		}
	}
}
