use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub storage: Storage,
	#[serde(default)]
	pub security: Security,
	#[serde(default)]
	pub dictionary: Dictionary,
	#[serde(default)]
	pub announce: Announce,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
	#[serde(default = "default_http_bind")]
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Public URL of the reader UI; announcement embeds link into it.
	#[serde(default)]
	pub entry_point: String,
	#[serde(default = "default_autosave_secs")]
	pub autosave_secs: u64,
	#[serde(default = "default_backup_secs")]
	pub backup_secs: u64,
}
impl Default for Service {
	fn default() -> Self {
		Self {
			http_bind: default_http_bind(),
			log_level: default_log_level(),
			entry_point: String::new(),
			autosave_secs: default_autosave_secs(),
			backup_secs: default_backup_secs(),
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Storage {
	#[serde(default = "default_data_dir")]
	pub data_dir: String,
	#[serde(default = "default_backup_dir")]
	pub backup_dir: String,
}
impl Default for Storage {
	fn default() -> Self {
		Self { data_dir: default_data_dir(), backup_dir: default_backup_dir() }
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Security {
	#[serde(default = "default_token_expiry_secs")]
	pub token_expiry_secs: u64,
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { token_expiry_secs: default_token_expiry_secs(), bind_localhost_only: true }
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dictionary {
	/// Author name whose entries receive the official vote bonus.
	#[serde(default = "default_official_user")]
	pub official_user: String,
	/// Scope omitted from announcement titles because it is the default one.
	#[serde(default = "default_primary_scope")]
	pub primary_scope: String,
}
impl Default for Dictionary {
	fn default() -> Self {
		Self {
			official_user: default_official_user(),
			primary_scope: default_primary_scope(),
		}
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Announce {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default)]
	pub webhook_url: String,
}

fn default_http_bind() -> String {
	"127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_autosave_secs() -> u64 {
	300
}

fn default_backup_secs() -> u64 {
	3_600
}

fn default_data_dir() -> String {
	"data".to_string()
}

fn default_backup_dir() -> String {
	"backup".to_string()
}

fn default_token_expiry_secs() -> u64 {
	// two weeks of sliding inactivity
	1_209_600
}

fn default_official_user() -> String {
	"official".to_string()
}

fn default_primary_scope() -> String {
	"en".to_string()
}

fn default_true() -> bool {
	true
}
