use std::collections::BTreeMap;

use glossa_domain::{Entry, Note};

fn entry() -> Entry {
	Entry {
		id: "E1".to_string(),
		date: "2024-01-01T00:00:00Z".to_string(),
		head: "kato".to_string(),
		body: "▯ is a cat".to_string(),
		user: "alice".to_string(),
		scope: "en".to_string(),
		notes: vec![Note {
			date: "2024-01-02T00:00:00Z".to_string(),
			user: "bob".to_string(),
			content: "see also ▯".to_string(),
		}],
		votes: BTreeMap::from([("bob".to_string(), 1), ("carol".to_string(), -1)]),
		score: 0,
		pronominal_class: None,
		frame: None,
		distribution: None,
		subject: None,
	}
}

#[test]
fn vote_lookup_defaults_to_zero() {
	let e = entry();

	assert_eq!(e.vote_of("bob"), 1);
	assert_eq!(e.vote_of("nobody"), 0);
}

#[test]
fn tallied_score_sums_votes() {
	assert_eq!(entry().tallied_score(), 0);
}

#[test]
fn absent_metadata_is_not_serialized() {
	let json = serde_json::to_value(entry()).unwrap();

	assert!(json.get("frame").is_none());
	assert!(json.get("head").is_some());
}

#[test]
fn snapshot_round_trip() {
	let e = entry();
	let json = serde_json::to_string(&e).unwrap();
	let back: Entry = serde_json::from_str(&json).unwrap();

	assert_eq!(back, e);
}

#[test]
fn missing_collections_default() {
	let raw = r#"{
		"id": "E2",
		"date": "2024-01-01T00:00:00Z",
		"head": "mia",
		"body": "▯ laughs",
		"user": "alice",
		"scope": "en"
	}"#;
	let e: Entry = serde_json::from_str(raw).unwrap();

	assert!(e.notes.is_empty());
	assert!(e.votes.is_empty());
	assert_eq!(e.score, 0);
}
