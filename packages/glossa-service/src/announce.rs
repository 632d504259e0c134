use serde_json::{Value, json};

use glossa_domain::{Entry, Note};

const MAX_TITLE: usize = 256;
const MAX_FIELD: usize = 1024;
const MAX_DESCRIPTION: usize = 4096;

/// Which mutation an announcement reports.
#[derive(Clone, Copy, Debug)]
pub enum EntryEvent {
	Created,
	Noted,
	Removed,
}

/// Fire-and-forget Discord-style webhook announcements. Delivery happens
/// on a spawned task; failures are logged and never surface to the
/// mutation that triggered them.
#[derive(Clone, Debug)]
pub struct Announcer {
	client: reqwest::Client,
	webhook_url: String,
	entry_point: Option<String>,
	/// Scope left unnamed in titles because everything defaults to it.
	primary_scope: String,
}
impl Announcer {
	pub fn new(
		webhook_url: impl Into<String>,
		entry_point: Option<String>,
		primary_scope: impl Into<String>,
	) -> Self {
		Self {
			client: reqwest::Client::new(),
			webhook_url: webhook_url.into(),
			entry_point,
			primary_scope: primary_scope.into(),
		}
	}

	pub fn entry_event(&self, event: EntryEvent, entry: &Entry, note: Option<&Note>) {
		self.send(build_embed(event, entry, note, self.entry_point.as_deref(), &self.primary_scope));
	}

	fn send(&self, embed: Value) {
		let client = self.client.clone();
		let url = self.webhook_url.clone();

		tokio::spawn(async move {
			let title = embed["title"].as_str().unwrap_or_default().to_owned();

			match client.post(&url).json(&json!({ "embeds": [embed] })).send().await {
				Ok(response) if response.status().is_success() =>
					tracing::debug!(title, "announcement delivered."),
				Ok(response) => tracing::warn!(
					title,
					status = %response.status(),
					"webhook rejected announcement.",
				),
				Err(e) => tracing::warn!(title, error = %e, "failed to deliver announcement."),
			}
		});
	}
}

fn build_embed(
	event: EntryEvent,
	entry: &Entry,
	note: Option<&Note>,
	entry_point: Option<&str>,
	primary_scope: &str,
) -> Value {
	let verb = match event {
		EntryEvent::Created => "created",
		EntryEvent::Noted => "noted on",
		EntryEvent::Removed => "removed",
	};
	let actor = note.map_or(entry.user.as_str(), |n| n.user.as_str());
	let scope_suffix = if entry.scope == primary_scope || matches!(event, EntryEvent::Noted) {
		String::new()
	} else {
		format!(" in scope __{}__", entry.scope)
	};
	let description = note.map_or(entry.body.as_str(), |n| n.content.as_str());
	let mut embed = json!({
		"color": color_for(actor),
		"title": trim(MAX_TITLE, &format!("*{actor}* {verb} **{}**{scope_suffix}", entry.head)),
		"description": trim(MAX_DESCRIPTION, description),
	});

	if let Some(n) = note
		&& n.user != entry.user
	{
		embed["fields"] = json!([{
			"name": trim(MAX_TITLE, &format!("(definition by *{}*)", entry.user)),
			"value": trim(MAX_FIELD, &entry.body),
		}]);
	}
	// removed entries have nothing left to link to
	if !matches!(event, EntryEvent::Removed)
		&& let Some(base) = entry_point
	{
		embed["url"] = json!(format!("{base}#%23{}", entry.id));
	}

	embed
}

/// Truncate to a character budget, marking the cut with an ellipsis.
fn trim(max: usize, s: &str) -> String {
	if s.chars().count() <= max {
		return s.to_string();
	}

	let mut out: String = s.chars().take(max - 1).collect();

	out.push('…');

	out
}

/// Stable per-user embed color derived from the name.
fn color_for(user: &str) -> u32 {
	user.bytes().fold(5_381_u32, |acc, b| acc.wrapping_mul(33).wrapping_add(b as u32)) & 0xff_ff_ff
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;

	fn entry() -> Entry {
		Entry {
			id: "abc".to_string(),
			date: "2024-01-01T00:00:00Z".to_string(),
			head: "kato".to_string(),
			body: "▯ is a cat".to_string(),
			user: "alice".to_string(),
			scope: "toa".to_string(),
			notes: Vec::new(),
			votes: BTreeMap::new(),
			score: 0,
			pronominal_class: None,
			frame: None,
			distribution: None,
			subject: None,
		}
	}

	#[test]
	fn trim_is_character_based() {
		assert_eq!(trim(5, "short"), "short");
		assert_eq!(trim(5, "délicieux"), "déli…");
		assert_eq!(trim(5, "délicieux").chars().count(), 5);
	}

	#[test]
	fn create_embed_links_and_names_the_scope() {
		let embed = build_embed(EntryEvent::Created, &entry(), None, Some("https://x.example"), "en");

		assert_eq!(embed["title"], "*alice* created **kato** in scope __toa__");
		assert_eq!(embed["url"], "https://x.example#%23abc");
		assert_eq!(embed["description"], "▯ is a cat");
	}

	#[test]
	fn remove_embed_has_no_link() {
		let embed = build_embed(EntryEvent::Removed, &entry(), None, Some("https://x.example"), "en");

		assert!(embed.get("url").is_none());
	}

	#[test]
	fn note_embed_quotes_the_definition() {
		let note = Note {
			date: "2024-01-02T00:00:00Z".to_string(),
			user: "bob".to_string(),
			content: "nice word".to_string(),
		};
		let embed = build_embed(EntryEvent::Noted, &entry(), Some(&note), None, "en");

		assert_eq!(embed["title"], "*bob* noted on **kato**");
		assert_eq!(embed["description"], "nice word");
		assert_eq!(embed["fields"][0]["value"], "▯ is a cat");
	}

	#[test]
	fn color_fits_in_24_bits() {
		assert!(color_for("alice") <= 0xff_ff_ff);
		assert_eq!(color_for("alice"), color_for("alice"));
	}
}
