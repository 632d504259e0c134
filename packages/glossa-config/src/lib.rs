mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Announce, Config, Dictionary, Security, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation { message: "service.http_bind must be non-empty.".to_string() });
	}
	if cfg.service.autosave_secs == 0 {
		return Err(Error::Validation {
			message: "service.autosave_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.data_dir.trim().is_empty() {
		return Err(Error::Validation { message: "storage.data_dir must be non-empty.".to_string() });
	}
	if cfg.security.token_expiry_secs == 0 {
		return Err(Error::Validation {
			message: "security.token_expiry_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.dictionary.official_user.trim().is_empty() {
		return Err(Error::Validation {
			message: "dictionary.official_user must be non-empty.".to_string(),
		});
	}
	if cfg.announce.enabled && cfg.announce.webhook_url.trim().is_empty() {
		return Err(Error::Validation {
			message: "announce.webhook_url must be set when announce.enabled is true.".to_string(),
		});
	}

	Ok(())
}
