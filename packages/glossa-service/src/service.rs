use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;
use uuid::Uuid;

use glossa_config::Config;
use glossa_domain::{
	Entry, Note, check_name, check_scope, check_text, check_vote, normalize_head, now_rfc3339,
	replacements,
};
use glossa_search::{SearchEngine, SearchParams};
use glossa_storage::{ACCOUNTS_FILE, DICTIONARY_FILE, SnapshotStore};

use crate::{
	Error, Result,
	accounts::{AccountStore, MAX_PASSWORD_CHARS, Resolution},
	announce::{Announcer, EntryEvent},
	housekeep,
	request::{ApiRequest, EntryView, Reply},
};

/// The persisted entry collection. Everything else about the dictionary
/// is derived from it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dictionary {
	#[serde(default)]
	pub entries: Vec<Entry>,
}

#[derive(Serialize)]
struct FullBackup<'a> {
	db: &'a Dictionary,
	pass: &'a AccountStore,
}

/// The whole collaborative dictionary behind one dispatch surface. The
/// HTTP layer owns it behind a `tokio::sync::RwLock`: mutations take the
/// write half, searches the read half, so every search sees a
/// point-in-time collection.
pub struct Service {
	config: Config,
	store: SnapshotStore,
	dictionary: Dictionary,
	accounts: AccountStore,
	engine: SearchEngine,
	announcer: Option<Announcer>,
	dirty: bool,
}
impl Service {
	/// Load snapshots, reform legacy data, prune lapsed sessions and
	/// build the search cache.
	pub fn load(config: Config) -> Result<Self> {
		let store = SnapshotStore::new(&config.storage.data_dir, &config.storage.backup_dir);
		let mut dictionary: Dictionary = store.read_or_default(DICTIONARY_FILE)?;
		let mut accounts: AccountStore = store.read_or_default(ACCOUNTS_FILE)?;
		let reformed = housekeep::reform_entries(&mut dictionary.entries);
		let pruned = accounts.prune(token_expiry_ms(&config), now_ms());

		if reformed > 0 || pruned > 0 {
			tracing::info!(reformed, pruned, "startup housekeeping changed persisted state.");
		}

		let mut engine = SearchEngine::new(&config.dictionary.official_user);

		engine.recache(&dictionary.entries);

		let announcer = (config.announce.enabled && !config.announce.webhook_url.is_empty())
			.then(|| {
				Announcer::new(
					&config.announce.webhook_url,
					(!config.service.entry_point.is_empty())
						.then(|| config.service.entry_point.clone()),
					&config.dictionary.primary_scope,
				)
			});
		let dirty = reformed > 0 || pruned > 0;

		Ok(Self { config, store, dictionary, accounts, engine, announcer, dirty })
	}

	/// In-memory service over an empty collection; used by tests and by
	/// tooling that never persists.
	pub fn ephemeral(config: Config) -> Self {
		let store = SnapshotStore::new(&config.storage.data_dir, &config.storage.backup_dir);
		let engine = SearchEngine::new(&config.dictionary.official_user);

		Self {
			config,
			store,
			dictionary: Dictionary::default(),
			accounts: AccountStore::default(),
			engine,
			announcer: None,
			dirty: false,
		}
	}

	pub fn entry_count(&self) -> usize {
		self.dictionary.entries.len()
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// Decode and dispatch a raw request body; the outcome is always an
	/// envelope, never an error.
	pub fn handle_value(&mut self, raw: Value) -> Value {
		match ApiRequest::parse(raw) {
			Ok(request) => self.handle(request),
			Err(e) => json!({ "success": false, "error": e.to_string() }),
		}
	}

	pub fn handle(&mut self, request: ApiRequest) -> Value {
		let action = request.action_name();
		let started = std::time::Instant::now();
		let outcome = self.dispatch(request);
		let elapsed = started.elapsed();

		match outcome {
			Ok(reply) => {
				tracing::debug!(action, ?elapsed, "action handled.");

				reply.into_envelope()
			},
			Err(e) => {
				tracing::debug!(action, error = %e, ?elapsed, "action refused.");

				json!({ "success": false, "error": e.to_string() })
			},
		}
	}

	fn dispatch(&mut self, request: ApiRequest) -> Result<Reply> {
		match request {
			ApiRequest::Welcome { token } =>
				Ok(Reply::Welcome { name: self.resolve(token.as_deref())? }),
			ApiRequest::Search {
				query,
				ordering,
				limit,
				preferred_scope,
				preferred_scope_bias,
				token,
			} => {
				let user = self.resolve(token.as_deref())?;

				self.run_search(
					query,
					ordering,
					limit,
					preferred_scope,
					preferred_scope_bias,
					user.as_deref(),
				)
			},
			ApiRequest::Create { head, body, scope, token } => {
				let user = self.require_user(token.as_deref())?;

				check_text(&head).map_err(|reason| Error::invalid("head", reason))?;
				check_text(&body).map_err(|reason| Error::invalid("body", reason))?;
				check_scope(&scope).map_err(|reason| Error::invalid("scope", reason))?;

				let entry = Entry {
					id: Uuid::new_v4().to_string(),
					date: now_rfc3339(),
					head: normalize_head(&head),
					body: replacements(&body),
					user: user.clone(),
					scope,
					notes: Vec::new(),
					votes: Default::default(),
					score: 0,
					pronominal_class: None,
					frame: None,
					distribution: None,
					subject: None,
				};

				self.dictionary.entries.push(entry.clone());
				self.engine.on_create(&entry);
				self.dirty = true;

				if let Some(announcer) = &self.announcer {
					announcer.entry_event(EntryEvent::Created, &entry, None);
				}

				Ok(Reply::Entry(Box::new(EntryView::of(&entry, Some(&user)))))
			},
			ApiRequest::Remove { id, token } => {
				let user = self.require_user(token.as_deref())?;
				let index = self.index_of(&id)?;

				if self.dictionary.entries[index].user != user {
					return Err(Error::NotOwner);
				}

				let entry = self.dictionary.entries.remove(index);

				self.engine.on_remove(&entry);
				self.dirty = true;

				if let Some(announcer) = &self.announcer {
					announcer.entry_event(EntryEvent::Removed, &entry, None);
				}

				Ok(Reply::Empty)
			},
			ApiRequest::Vote { id, vote, token } => {
				let user = self.require_user(token.as_deref())?;
				let vote = i8::try_from(vote)
					.map_err(|_| Error::invalid("vote", "vote must be -1, 0 or 1"))?;

				check_vote(vote).map_err(|reason| Error::invalid("vote", reason))?;

				let index = self.index_of(&id)?;
				let entry = &mut self.dictionary.entries[index];
				let old = entry.vote_of(&user);

				entry.votes.insert(user.clone(), vote);
				entry.score += (vote - old) as i64;

				let entry = entry.clone();

				self.engine.on_vote(&entry);
				self.dirty = true;

				Ok(Reply::Entry(Box::new(EntryView::of(&entry, Some(&user)))))
			},
			ApiRequest::Note { id, content, token } => {
				let user = self.require_user(token.as_deref())?;

				check_text(&content).map_err(|reason| Error::invalid("content", reason))?;

				let index = self.index_of(&id)?;
				let note = Note {
					date: now_rfc3339(),
					user: user.clone(),
					content: replacements(&content),
				};

				self.dictionary.entries[index].notes.push(note.clone());

				let entry = self.dictionary.entries[index].clone();

				self.engine.on_note(&entry);
				self.dirty = true;

				if let Some(announcer) = &self.announcer {
					announcer.entry_event(EntryEvent::Noted, &entry, Some(&note));
				}

				Ok(Reply::Entry(Box::new(EntryView::of(&entry, Some(&user)))))
			},
			ApiRequest::RemoveNote { id, date, token } => {
				let user = self.require_user(token.as_deref())?;
				let index = self.index_of(&id)?;
				let entry = &mut self.dictionary.entries[index];
				let position = entry
					.notes
					.iter()
					.position(|note| note.date == date)
					.ok_or(Error::NoSuchNote)?;

				// only the note's author may retract it
				if entry.notes[position].user != user {
					return Err(Error::NotOwner);
				}

				entry.notes.remove(position);

				let entry = entry.clone();

				self.engine.on_remove_note(&entry);
				self.dirty = true;

				Ok(Reply::Entry(Box::new(EntryView::of(&entry, Some(&user)))))
			},
			ApiRequest::Edit { id, body, token } => {
				let user = self.require_user(token.as_deref())?;

				check_text(&body).map_err(|reason| Error::invalid("body", reason))?;

				let index = self.index_of(&id)?;
				let entry = &mut self.dictionary.entries[index];

				if entry.user != user {
					return Err(Error::NotOwner);
				}

				entry.body = replacements(&body);

				let entry = entry.clone();

				self.engine.on_edit(&entry);
				self.dirty = true;

				Ok(Reply::Entry(Box::new(EntryView::of(&entry, Some(&user)))))
			},
			ApiRequest::Move { id, scope, token } => {
				let user = self.require_user(token.as_deref())?;

				check_scope(&scope).map_err(|reason| Error::invalid("scope", reason))?;

				let index = self.index_of(&id)?;
				let entry = &mut self.dictionary.entries[index];

				if entry.user != user {
					return Err(Error::NotOwner);
				}

				entry.scope = scope;

				let entry = entry.clone();

				self.engine.on_move(&entry);
				self.dirty = true;

				Ok(Reply::Entry(Box::new(EntryView::of(&entry, Some(&user)))))
			},
			ApiRequest::Register { name, pass } => {
				check_name(&name).map_err(|reason| Error::invalid("name", reason))?;
				check_password(&pass)?;

				self.accounts.register(&name, &pass)?;
				self.dirty = true;

				let token = self.accounts.login(&name, &pass, now_ms())?;

				Ok(Reply::Token(token))
			},
			ApiRequest::Login { name, pass } => {
				let token = self.accounts.login(&name, &pass, now_ms())?;

				self.dirty = true;
				tracing::info!(user = %name, "logged in.");

				Ok(Reply::Token(token))
			},
			ApiRequest::Logout { token } => {
				let token = token.ok_or(Error::MustBeLoggedIn)?;

				self.accounts.logout(&token);
				self.dirty = true;

				Ok(Reply::Empty)
			},
		}
	}

	/// Handle what never mutates: anonymous welcomes and anonymous
	/// searches. Authenticated calls are given back, because even a
	/// token lookup refreshes the session's sliding window. The HTTP
	/// layer runs this under the shared half of its lock.
	pub fn try_handle_shared(
		&self,
		request: ApiRequest,
	) -> std::result::Result<Value, ApiRequest> {
		match request {
			ApiRequest::Welcome { token: None } =>
				Ok(Reply::Welcome { name: None }.into_envelope()),
			ApiRequest::Search {
				query,
				ordering,
				limit,
				preferred_scope,
				preferred_scope_bias,
				token: None,
			} => Ok(
				match self.run_search(
					query,
					ordering,
					limit,
					preferred_scope,
					preferred_scope_bias,
					None,
				) {
					Ok(reply) => reply.into_envelope(),
					Err(e) => json!({ "success": false, "error": e.to_string() }),
				},
			),
			other => Err(other),
		}
	}

	fn run_search(
		&self,
		query: Value,
		ordering: Option<String>,
		limit: Option<usize>,
		preferred_scope: Option<String>,
		preferred_scope_bias: Option<f64>,
		user: Option<&str>,
	) -> Result<Reply> {
		if let Some(scope) = preferred_scope.as_deref() {
			check_scope(scope).map_err(|reason| Error::invalid("preferred_scope", reason))?;
		}

		let params = SearchParams {
			query,
			ordering,
			limit,
			preferred_scope,
			preferred_scope_bias: preferred_scope_bias.unwrap_or(0.0),
		};

		Ok(Reply::Results(self.engine.search(&params, user)?))
	}

	/// Persist both snapshots and clear the dirty flag.
	pub fn save(&mut self) -> Result<()> {
		self.store.write(DICTIONARY_FILE, &self.dictionary)?;
		self.store.write(ACCOUNTS_FILE, &self.accounts)?;
		self.dirty = false;

		Ok(())
	}

	/// Write an hour-stamped combined backup.
	pub fn backup(&self) -> Result<()> {
		self.store.backup(&FullBackup { db: &self.dictionary, pass: &self.accounts })?;

		Ok(())
	}

	fn resolve(&mut self, token: Option<&str>) -> Result<Option<String>> {
		let Some(token) = token else {
			return Ok(None);
		};

		match self.accounts.resolve(token, token_expiry_ms(&self.config), now_ms()) {
			Resolution::User(name) => Ok(Some(name)),
			Resolution::Expired => Err(Error::TokenExpired),
			Resolution::Unknown => Ok(None),
		}
	}

	fn require_user(&mut self, token: Option<&str>) -> Result<String> {
		self.resolve(token)?.ok_or(Error::MustBeLoggedIn)
	}

	fn index_of(&self, id: &str) -> Result<usize> {
		self.dictionary
			.entries
			.iter()
			.position(|entry| entry.id == id)
			.ok_or(Error::NotFound)
	}
}

fn check_password(pass: &str) -> Result<()> {
	if pass.is_empty() {
		return Err(Error::invalid("pass", "absent"));
	}
	if pass.chars().count() > MAX_PASSWORD_CHARS {
		return Err(Error::invalid(
			"pass",
			format!("too long (max. {MAX_PASSWORD_CHARS} characters)"),
		));
	}

	Ok(())
}

fn now_ms() -> i64 {
	(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn token_expiry_ms(config: &Config) -> i64 {
	config.security.token_expiry_secs.saturating_mul(1_000) as i64
}
