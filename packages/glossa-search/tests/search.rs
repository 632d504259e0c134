use std::collections::BTreeMap;

use serde_json::{Value, json};

use glossa_domain::{Entry, Note};
use glossa_search::{SearchEngine, SearchParams, cacheify};

fn entry(id: &str, head: &str, body: &str, user: &str, scope: &str, score: i64) -> Entry {
	Entry {
		id: id.to_string(),
		date: format!("2024-01-0{}T00:00:00Z", (id.len() % 9) + 1),
		head: head.to_string(),
		body: body.to_string(),
		user: user.to_string(),
		scope: scope.to_string(),
		notes: Vec::new(),
		votes: BTreeMap::new(),
		score,
		pronominal_class: None,
		frame: None,
		distribution: None,
		subject: None,
	}
}

fn corpus() -> Vec<Entry> {
	vec![
		entry("a1", "kato", "▯ is a cat", "alice", "en", 2),
		entry("b22", "rato", "▯ is a rat; ▯ gnaws ▯", "bob", "en", 0),
		entry("c333", "katofano", "▯ is a big cat", "alice", "toa", -1),
		entry("d4444", "dúa", "▯ knows ▯", "official", "en", 5),
		entry("e55555", "mıu", "▯ opines ▯", "carol", "toa", 1),
	]
}

fn engine_with(entries: Vec<Entry>) -> SearchEngine {
	let mut engine = SearchEngine::new("official");

	engine.recache(&entries);

	engine
}

fn ids(results: &[glossa_search::PresentedEntry]) -> Vec<String> {
	results.iter().map(|r| r.id.clone()).collect()
}

fn search(engine: &SearchEngine, query: Value) -> Vec<glossa_search::PresentedEntry> {
	engine.search(&SearchParams::new(query), None).unwrap()
}

#[test]
fn repeated_evaluation_is_pure() {
	let engine = engine_with(corpus());
	let query = json!(["or", ["term", "kato"], ["scope", "toa"]]);

	assert_eq!(ids(&search(&engine, query.clone())), ids(&search(&engine, query)));
}

#[test]
fn and_is_argument_order_invariant() {
	let engine = engine_with(corpus());
	let ab = json!(["and", ["term", "cat"], ["scope", "en"]]);
	let ba = json!(["and", ["scope", "en"], ["term", "cat"]]);
	let mut left = ids(&search(&engine, ab));
	let mut right = ids(&search(&engine, ba));

	left.sort();
	right.sort();

	assert_eq!(left, right);
	assert!(!left.is_empty());
}

#[test]
fn or_is_argument_order_invariant() {
	let engine = engine_with(corpus());
	let ab = json!(["or", ["user", "alice"], ["user", "bob"]]);
	let ba = json!(["or", ["user", "bob"], ["user", "alice"]]);
	let mut left = ids(&search(&engine, ab));
	let mut right = ids(&search(&engine, ba));

	left.sort();
	right.sort();

	assert_eq!(left, right);
	assert_eq!(left.len(), 3);
}

#[test]
fn bounded_equals_unbounded_prefix_for_every_n() {
	let engine = engine_with(corpus());

	for ordering in [None, Some("newest"), Some("oldest"), Some("highest"), Some("alpha")] {
		let unbounded = engine
			.search(
				&SearchParams {
					query: json!(["scope", "*"]),
					ordering: ordering.map(str::to_string),
					..SearchParams::default()
				},
				None,
			)
			.unwrap();

		for n in 0..=engine.len() + 1 {
			let bounded = engine
				.search(
					&SearchParams {
						query: json!(["scope", "*"]),
						ordering: ordering.map(str::to_string),
						limit: Some(n),
						..SearchParams::default()
					},
					None,
				)
				.unwrap();
			let expected: Vec<String> =
				ids(&unbounded).into_iter().take(n).collect();

			assert_eq!(ids(&bounded), expected, "ordering {ordering:?}, limit {n}");
		}
	}
}

#[test]
fn bounded_skips_rejected_candidates() {
	let engine = engine_with(corpus());
	// only two entries pass, so a larger limit must not pad the results
	let results = engine
		.search(
			&SearchParams {
				query: json!(["user", "alice"]),
				limit: Some(4),
				..SearchParams::default()
			},
			None,
		)
		.unwrap();

	assert_eq!(results.len(), 2);
}

#[test]
fn edit_with_unchanged_entry_reproduces_recache_state() {
	let entries = corpus();
	let mut engine = engine_with(entries.clone());

	engine.on_edit(&entries[2]);

	let mut fresh = SearchEngine::new("official");

	fresh.recache(&entries);

	assert_eq!(engine.cached_snapshot(), fresh.cached_snapshot());
	assert_eq!(engine.cached_snapshot()[2], cacheify(&entries[2]));
}

#[test]
fn term_matching_is_full_containment() {
	let engine = engine_with(corpus());

	// every token of the argument must be found; "cat rat" spans two entries
	assert!(ids(&search(&engine, json!(["term", "cat rat"]))).is_empty());
	assert_eq!(ids(&search(&engine, json!(["term", "rat gnaws"]))), vec!["b22"]);
}

#[test]
fn term_equal_to_head_matches_and_outranks_substring() {
	let engine = engine_with(vec![
		entry("x1", "kato", "▯ is a cat", "alice", "en", 0),
		entry("x2", "katofano", "▯ is a big cat", "alice", "en", 0),
	]);
	let results = search(&engine, json!(["term", "kato"]));

	assert_eq!(ids(&results), vec!["x1", "x2"]);
	assert!(results[0].relevance > results[1].relevance);
}

#[test]
fn myvote_without_user_matches_nothing() {
	let mut e = entry("v1", "kato", "▯ is a cat", "alice", "en", 1);

	e.votes.insert("bob".to_string(), 1);

	let engine = engine_with(vec![e]);

	assert!(search(&engine, json!(["myvote", 1])).is_empty());
}

#[test]
fn myvote_matches_own_vote_including_implicit_zero() {
	let mut voted = entry("v1", "kato", "▯ is a cat", "alice", "en", 1);

	voted.votes.insert("bob".to_string(), 1);

	let engine = engine_with(vec![voted, entry("v2", "rato", "▯ is a rat", "alice", "en", 0)]);
	let up = engine.search(&SearchParams::new(json!(["myvote", 1])), Some("bob")).unwrap();
	let zero = engine.search(&SearchParams::new(json!(["myvote", 0])), Some("bob")).unwrap();

	assert_eq!(ids(&up), vec!["v1"]);
	assert_eq!(ids(&zero), vec!["v2"]);
}

#[test]
fn head_pattern_versus_raw_literal() {
	let engine = engine_with(vec![
		entry("p1", "kato", "x", "alice", "en", 0),
		entry("p2", "rato", "x", "alice", "en", 0),
		entry("p3", "atom", "x", "alice", "en", 0),
		entry("p4", "?a*", "x", "alice", "en", 0),
	]);
	let mut patterned = ids(&search(&engine, json!(["head", "?a*"])));

	patterned.sort();

	// any head whose second character is `a`
	assert_eq!(patterned, vec!["p1", "p2", "p4"]);
	assert_eq!(ids(&search(&engine, json!(["head_raw", "?a*"]))), vec!["p4"]);
}

#[test]
fn exact_head_match_beats_official_bonus() {
	let engine = engine_with(vec![
		entry("s1", "bu", "negation", "alice", "en", 2),
		entry("s2", "bu2", "also negation", "official", "en", -1),
	]);
	let results = search(&engine, json!(["term", "bu"]));

	assert_eq!(ids(&results)[0], "s1");
	assert_eq!(results.len(), 2);
}

#[test]
fn remove_of_unknown_id_is_a_noop() {
	let mut engine = engine_with(corpus());
	let ghost = entry("zz", "ghost", "▯ haunts", "alice", "en", 0);

	engine.on_remove(&ghost);

	assert_eq!(engine.len(), 5);
}

#[test]
fn mutation_sinks_keep_cache_in_step() {
	let mut engine = engine_with(corpus());
	let created = entry("f6", "nuo", "▯ sleeps", "dan", "en", 0);

	engine.on_create(&created);

	assert_eq!(ids(&search(&engine, json!(["id", "f6"]))), vec!["f6"]);

	let mut voted = created.clone();

	voted.votes.insert("alice".to_string(), 1);
	voted.score = 1;
	engine.on_vote(&voted);

	assert_eq!(search(&engine, json!(["id", "f6"]))[0].score, 1);

	let mut noted = voted.clone();

	noted.notes.push(Note {
		date: "2024-02-01T00:00:00Z".to_string(),
		user: "alice".to_string(),
		content: "sweet dreams".to_string(),
	});
	engine.on_note(&noted);

	assert_eq!(ids(&search(&engine, json!(["term", "dreams"]))), vec!["f6"]);

	engine.on_remove_note(&voted);

	assert!(search(&engine, json!(["term", "dreams"])).is_empty());

	let mut moved = voted.clone();

	moved.scope = "toa".to_string();
	engine.on_move(&moved);

	assert_eq!(search(&engine, json!(["id", "f6"]))[0].scope, "toa");

	engine.on_remove(&moved);

	assert!(search(&engine, json!(["id", "f6"])).is_empty());
}

#[test]
fn date_comparisons_are_strict() {
	let mut early = entry("t1", "kato", "x", "alice", "en", 0);
	let mut cut = entry("t2", "rato", "x", "alice", "en", 0);
	let mut late = entry("t3", "nuo", "x", "alice", "en", 0);

	early.date = "2024-01-01T00:00:00Z".to_string();
	cut.date = "2024-06-01T00:00:00Z".to_string();
	late.date = "2024-12-01T00:00:00Z".to_string();

	let engine = engine_with(vec![early, cut, late]);

	assert_eq!(ids(&search(&engine, json!(["before", "2024-06-01T00:00:00Z"]))), vec!["t1"]);
	assert_eq!(ids(&search(&engine, json!(["since", "2024-06-01T00:00:00Z"]))), vec!["t3"]);
}

#[test]
fn undated_entries_match_no_date_comparison() {
	let mut undated = entry("u1", "kato", "x", "alice", "en", 0);

	undated.date = "not a date".to_string();

	let engine = engine_with(vec![undated]);

	// an unparseable date is neither before nor since anything
	assert!(search(&engine, json!(["before", "2999-01-01T00:00:00Z"])).is_empty());
	assert!(search(&engine, json!(["since", "1970-01-02T00:00:00Z"])).is_empty());
	assert_eq!(ids(&search(&engine, json!(["term", "kato"]))), vec!["u1"]);
}

#[test]
fn arity_matches_max_placeholder_clause() {
	let engine = engine_with(corpus());

	// "▯ is a rat; ▯ gnaws ▯" splits into a 1-slot and a 2-slot clause
	let binary = ids(&search(&engine, json!(["arity", 2])));

	assert!(binary.contains(&"b22".to_string()));
	assert!(binary.contains(&"d4444".to_string()));

	let unary = ids(&search(&engine, json!(["arity", 1])));

	assert!(unary.contains(&"a1".to_string()));
	assert!(!unary.contains(&"b22".to_string()));
}

#[test]
fn votes_are_redacted_to_the_callers_own() {
	let mut e = entry("r1", "kato", "x", "alice", "en", 1);

	e.votes.insert("bob".to_string(), 1);
	e.votes.insert("carol".to_string(), -1);

	let engine = engine_with(vec![e]);
	let anonymous = search(&engine, json!(["id", "r1"]));
	let as_bob =
		engine.search(&SearchParams::new(json!(["id", "r1"])), Some("bob")).unwrap();
	let as_dan =
		engine.search(&SearchParams::new(json!(["id", "r1"])), Some("dan")).unwrap();

	assert_eq!(anonymous[0].vote, None);
	assert_eq!(as_bob[0].vote, Some(1));
	assert_eq!(as_dan[0].vote, Some(0));

	let json = serde_json::to_value(&anonymous[0]).unwrap();

	assert!(json.get("votes").is_none());
	assert!(json.get("vote").is_none());
}

#[test]
fn preferred_scope_bias_reorders() {
	let engine = engine_with(vec![
		entry("m1", "kato", "▯ is a cat", "alice", "en", 0),
		entry("m2", "katomi", "▯ is a kitten", "alice", "toa", 0),
	]);
	let plain = search(&engine, json!(["term", "kato"]));

	assert_eq!(ids(&plain), vec!["m1", "m2"]);

	let biased = engine
		.search(
			&SearchParams {
				query: json!(["term", "kato"]),
				preferred_scope: Some("toa".to_string()),
				preferred_scope_bias: 1_000.0,
				..SearchParams::default()
			},
			None,
		)
		.unwrap();

	assert_eq!(ids(&biased), vec!["m2", "m1"]);
}

#[test]
fn compile_errors_are_returned_not_thrown() {
	let engine = engine_with(corpus());
	let err = engine.search(&SearchParams::new(json!(42)), None).unwrap_err();

	assert_eq!(err.to_string(), "malformed query: found non-array branch");
}

#[test]
fn recache_resets_incremental_state() {
	let mut engine = engine_with(corpus());

	engine.on_create(&entry("g7", "extra", "x", "alice", "en", 0));
	assert_eq!(engine.len(), 6);

	engine.recache(&corpus());

	assert_eq!(engine.len(), 5);
	assert!(search(&engine, json!(["id", "g7"])).is_empty());
}
