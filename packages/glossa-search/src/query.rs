use std::sync::Arc;

use serde_json::Value;

use glossa_domain::PLACEHOLDER;

use crate::{
	cache::{CachedEntry, try_parse_instant_ms},
	pattern::{TraitKind, TraitMatcher},
	tokenize::{MatchMode, deburr, deburr_match},
};

/// A query failed to compile. The message is meant to be shown verbatim
/// to the end user who wrote the query.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed query: {0}")]
pub struct QueryError(pub String);

fn err<T>(message: impl Into<String>) -> Result<T, QueryError> {
	Err(QueryError(message.into()))
}

/// Parsed query tree. The wire form is a nested JSON array — a small
/// Lisp: `["and", ["term", "hi"], ["not", ["scope", "en"]]]`.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryExpr {
	And(Vec<QueryExpr>),
	Or(Vec<QueryExpr>),
	Not(Box<QueryExpr>),
	Term(String),
	Arity(i64),
	MyVote(i8),
	/// Strict `date <` comparison, milliseconds.
	Before(i64),
	/// Strict `date >` comparison, milliseconds.
	Since(i64),
	Trait { kind: TraitKind, literal: String, raw: bool },
}
impl QueryExpr {
	/// Compile one node. The first error found wins; nested errors
	/// propagate unchanged.
	pub fn parse(value: &Value) -> Result<Self, QueryError> {
		let Some(node) = value.as_array() else {
			return err("found non-array branch");
		};

		if node.is_empty() {
			return err("found empty array node");
		}

		let op = match &node[0] {
			Value::String(op) => op.as_str(),
			other => return err(format!("unknown operation {other}")),
		};
		let args = &node[1..];

		match op {
			"and" => Ok(Self::And(Self::parse_predicates(op, args)?)),
			"or" => Ok(Self::Or(Self::parse_predicates(op, args)?)),
			"not" => {
				let [arg] = args else {
					return err("operation not expects exactly one predicate argument");
				};

				Ok(Self::Not(Box::new(Self::parse(arg)?)))
			},
			"term" => Ok(Self::Term(one_string(op, args)?)),
			"arity" => {
				let [arg] = args else {
					return err("operation arity expects one numeric argument");
				};
				let Some(n) = arg.as_i64() else {
					return err("operation arity expects one numeric argument");
				};

				Ok(Self::Arity(n))
			},
			"myvote" => {
				let vote = match args {
					[arg] => arg.as_i64(),
					_ => None,
				};

				match vote {
					Some(v @ (-1 | 0 | 1)) => Ok(Self::MyVote(v as i8)),
					_ => err("operation myvote expects one vote value (-1, 0 or 1)"),
				}
			},
			"before" | "until" => Ok(Self::Before(one_instant(op, args)?)),
			"since" | "after" => Ok(Self::Since(one_instant(op, args)?)),
			_ => {
				let (name, raw) = match op.strip_suffix("_raw") {
					Some(name) => (name, true),
					None => (op, false),
				};

				match TraitKind::from_name(name) {
					Some(kind) =>
						Ok(Self::Trait { kind, literal: one_string(op, args)?, raw }),
					None => err(format!("unknown operation {op}")),
				}
			},
		}
	}

	fn parse_predicates(op: &str, args: &[Value]) -> Result<Vec<Self>, QueryError> {
		args.iter()
			.map(|arg| {
				if arg.is_array() {
					Self::parse(arg)
				} else {
					err(format!("operation {op} expects predicate arguments"))
				}
			})
			.collect()
	}

	/// Literal arguments of the textual leaves, in tree order. These seed
	/// relevance scoring and must come from the same tree the predicate
	/// was compiled from.
	pub fn bare_terms(&self) -> Vec<String> {
		match self {
			Self::Term(s) => vec![s.clone()],
			Self::And(nodes) | Self::Or(nodes) =>
				nodes.iter().flat_map(Self::bare_terms).collect(),
			Self::Not(node) => node.bare_terms(),
			_ => Vec::new(),
		}
	}
}

fn one_string(op: &str, args: &[Value]) -> Result<String, QueryError> {
	match args {
		[Value::String(s)] => Ok(s.clone()),
		_ => err(format!("operation {op} expects one string argument")),
	}
}

fn one_instant(op: &str, args: &[Value]) -> Result<i64, QueryError> {
	let [Value::String(s)] = args else {
		return err(format!("operation {op} expects one date argument"));
	};

	match try_parse_instant_ms(s) {
		Some(ms) => Ok(ms),
		None => err(format!("operation {op} expects an RFC3339 date, got '{s}'")),
	}
}

/// Evaluatable form of a query: textual leaves pre-deburred, trait
/// patterns resolved through the per-generation memo table.
#[derive(Debug)]
pub(crate) enum Predicate {
	And(Vec<Predicate>),
	Or(Vec<Predicate>),
	Not(Box<Predicate>),
	Term(Vec<String>),
	Arity(i64),
	MyVote(i8),
	Before(i64),
	Since(i64),
	TraitRaw(TraitKind, String),
	TraitPattern(TraitKind, Arc<TraitMatcher>),
}
impl Predicate {
	/// Pure in `(self, entry, user)`: no interior state, no I/O.
	pub(crate) fn matches(&self, entry: &CachedEntry, user: Option<&str>) -> bool {
		match self {
			Self::And(nodes) => nodes.iter().all(|node| node.matches(entry, user)),
			Self::Or(nodes) => nodes.iter().any(|node| node.matches(entry, user)),
			Self::Not(node) => !node.matches(entry, user),
			Self::Term(tokens) =>
				deburr_match(tokens, &entry.content, MatchMode::Containing) == tokens.len(),
			Self::Arity(n) => arity_of(&entry.entry.body) == *n,
			Self::MyVote(vote) =>
				user.is_some_and(|name| entry.entry.vote_of(name) == *vote),
			Self::Before(ms) => entry.date_ms.is_some_and(|date| date < *ms),
			Self::Since(ms) => entry.date_ms.is_some_and(|date| date > *ms),
			Self::TraitRaw(kind, literal) => literal == kind.value_of(&entry.entry).as_ref(),
			Self::TraitPattern(kind, matcher) =>
				matcher.matches(kind.value_of(&entry.entry).as_ref()),
		}
	}
}

/// Highest per-clause placeholder count, clauses split on sentence
/// terminators. A clause without any placeholder counts as -1, so a body
/// with no slots at all has arity -1, not 0.
fn arity_of(body: &str) -> i64 {
	body.split([';', '.'])
		.map(|clause| {
			let count = clause.chars().filter(|&ch| ch == PLACEHOLDER).count() as i64;

			if count == 0 { -1 } else { count }
		})
		.fold(-1, i64::max)
}
