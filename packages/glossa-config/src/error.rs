use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to read config {path}: {source}")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("failed to parse config {path}: {source}")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("invalid config: {message}")]
	Validation { message: String },
}
