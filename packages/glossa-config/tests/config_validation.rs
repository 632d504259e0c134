use std::io::Write;

use glossa_config::{load, validate, Config};

#[test]
fn minimal_toml_parses_with_defaults() {
	let mut file = tempfile::NamedTempFile::new().unwrap();

	write!(file, "[service]\nhttp_bind = \"127.0.0.1:9000\"\n").unwrap();

	let cfg = load(file.path()).unwrap();

	assert_eq!(cfg.service.http_bind, "127.0.0.1:9000");
	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.dictionary.official_user, "official");
	assert!(!cfg.announce.enabled);
}

#[test]
fn rejects_empty_bind() {
	let mut cfg = Config::default();

	cfg.service.http_bind = "  ".to_string();

	assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_announce_without_url() {
	let mut cfg = Config::default();

	cfg.announce.enabled = true;

	assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_zero_token_expiry() {
	let mut cfg = Config::default();

	cfg.security.token_expiry_secs = 0;

	assert!(validate(&cfg).is_err());
}

#[test]
fn missing_file_is_a_read_error() {
	let err = load(std::path::Path::new("/nonexistent/glossa.toml")).unwrap_err();

	assert!(err.to_string().contains("failed to read config"));
}
