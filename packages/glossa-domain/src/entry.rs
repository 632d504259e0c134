use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One dictionary headword/definition record.
///
/// `date` stays an RFC3339 string: it is what the wire and the snapshot
/// files carry, and the raw-trait matchers compare against it verbatim.
/// `score` is the running sum of `votes` values and is maintained
/// incrementally by the vote mutation, never recomputed at search time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
	pub id: String,
	pub date: String,
	pub head: String,
	pub body: String,
	pub user: String,
	pub scope: String,
	#[serde(default)]
	pub notes: Vec<Note>,
	#[serde(default)]
	pub votes: BTreeMap<String, i8>,
	#[serde(default)]
	pub score: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pronominal_class: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub distribution: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
}
impl Entry {
	pub fn vote_of(&self, user: &str) -> i8 {
		self.votes.get(user).copied().unwrap_or(0)
	}

	/// Recomputed sum of votes; used by startup housekeeping to detect drift.
	pub fn tallied_score(&self) -> i64 {
		self.votes.values().map(|vote| i64::from(*vote)).sum()
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
	pub date: String,
	pub user: String,
	pub content: String,
}
