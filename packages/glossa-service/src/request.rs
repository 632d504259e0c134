use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use glossa_domain::{Entry, Note};
use glossa_search::PresentedEntry;

use crate::{Error, Result};

/// One decoded API call. The wire form is a JSON object whose `action`
/// field selects the variant; `token` rides along on anything that can
/// be authenticated.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ApiRequest {
	Welcome {
		#[serde(default)]
		token: Option<String>,
	},
	Search {
		query: Value,
		#[serde(default)]
		ordering: Option<String>,
		#[serde(default)]
		limit: Option<usize>,
		#[serde(default)]
		preferred_scope: Option<String>,
		#[serde(default)]
		preferred_scope_bias: Option<f64>,
		#[serde(default)]
		token: Option<String>,
	},
	Create {
		head: String,
		body: String,
		scope: String,
		#[serde(default)]
		token: Option<String>,
	},
	Remove {
		id: String,
		#[serde(default)]
		token: Option<String>,
	},
	Vote {
		id: String,
		vote: i64,
		#[serde(default)]
		token: Option<String>,
	},
	Note {
		id: String,
		content: String,
		#[serde(default)]
		token: Option<String>,
	},
	RemoveNote {
		id: String,
		/// Creation timestamp of the note to drop; notes have no ids.
		date: String,
		#[serde(default)]
		token: Option<String>,
	},
	Edit {
		id: String,
		body: String,
		#[serde(default)]
		token: Option<String>,
	},
	Move {
		id: String,
		scope: String,
		#[serde(default)]
		token: Option<String>,
	},
	Register {
		name: String,
		pass: String,
	},
	Login {
		name: String,
		pass: String,
	},
	Logout {
		#[serde(default)]
		token: Option<String>,
	},
}
impl ApiRequest {
	const ACTIONS: &[&str] = &[
		"welcome",
		"search",
		"create",
		"remove",
		"vote",
		"note",
		"removenote",
		"edit",
		"move",
		"register",
		"login",
		"logout",
	];

	/// Decode a raw request body, distinguishing an unknown action from
	/// a known action with bad arguments.
	pub fn parse(value: Value) -> Result<Self> {
		let Some(action) = value.get("action").and_then(Value::as_str) else {
			return Err(Error::UnknownAction);
		};

		if !Self::ACTIONS.contains(&action) {
			return Err(Error::UnknownAction);
		}

		serde_json::from_value(value).map_err(|e| Error::MalformedRequest(e.to_string()))
	}

	pub fn action_name(&self) -> &'static str {
		match self {
			Self::Welcome { .. } => "welcome",
			Self::Search { .. } => "search",
			Self::Create { .. } => "create",
			Self::Remove { .. } => "remove",
			Self::Vote { .. } => "vote",
			Self::Note { .. } => "note",
			Self::RemoveNote { .. } => "removenote",
			Self::Edit { .. } => "edit",
			Self::Move { .. } => "move",
			Self::Register { .. } => "register",
			Self::Login { .. } => "login",
			Self::Logout { .. } => "logout",
		}
	}
}

/// Mutation-reply form of an entry: the vote map is redacted down to
/// the caller's own vote.
#[derive(Clone, Debug, Serialize)]
pub struct EntryView {
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
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pronominal_class: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub frame: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distribution: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
}
impl EntryView {
	pub fn of(entry: &Entry, user: Option<&str>) -> Self {
		Self {
			id: entry.id.clone(),
			date: entry.date.clone(),
			head: entry.head.clone(),
			body: entry.body.clone(),
			user: entry.user.clone(),
			scope: entry.scope.clone(),
			notes: entry.notes.clone(),
			score: entry.score,
			vote: user.map(|name| entry.vote_of(name)),
			pronominal_class: entry.pronominal_class.clone(),
			frame: entry.frame.clone(),
			distribution: entry.distribution.clone(),
			subject: entry.subject.clone(),
		}
	}
}

/// Successful action payload; `into_envelope` adds the uniform
/// `success` flag.
#[derive(Debug)]
pub enum Reply {
	Welcome { name: Option<String> },
	Results(Vec<PresentedEntry>),
	Entry(Box<EntryView>),
	Token(String),
	Empty,
}
impl Reply {
	pub fn into_envelope(self) -> Value {
		match self {
			Self::Welcome { name } => json!({ "success": true, "name": name }),
			Self::Results(results) => json!({ "success": true, "results": results }),
			Self::Entry(entry) => json!({ "success": true, "entry": entry }),
			Self::Token(token) => json!({ "success": true, "token": token }),
			Self::Empty => json!({ "success": true }),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn action_tag_selects_the_variant() {
		let request =
			ApiRequest::parse(json!({ "action": "vote", "id": "x", "vote": 1 })).unwrap();

		assert!(matches!(request, ApiRequest::Vote { vote: 1, .. }));
	}

	#[test]
	fn unknown_action_is_its_own_error() {
		let e = ApiRequest::parse(json!({ "action": "frobnicate" })).unwrap_err();

		assert_eq!(e.to_string(), "unknown action");

		let e = ApiRequest::parse(json!({ "no": "action" })).unwrap_err();

		assert_eq!(e.to_string(), "unknown action");
	}

	#[test]
	fn known_action_with_missing_fields_is_malformed() {
		let e = ApiRequest::parse(json!({ "action": "vote" })).unwrap_err();

		assert!(e.to_string().starts_with("malformed request"));
	}

	#[test]
	fn removenote_is_a_single_word_tag() {
		let request = ApiRequest::parse(
			json!({ "action": "removenote", "id": "x", "date": "2024-01-01T00:00:00Z" }),
		)
		.unwrap();

		assert_eq!(request.action_name(), "removenote");
	}

	#[test]
	fn envelope_carries_the_success_flag() {
		assert_eq!(Reply::Empty.into_envelope(), json!({ "success": true }));
		assert_eq!(
			Reply::Token("t".to_string()).into_envelope(),
			json!({ "success": true, "token": "t" })
		);
	}
}
