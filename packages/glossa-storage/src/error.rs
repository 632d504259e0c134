use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to read snapshot {path}")]
	Read {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to write snapshot {path}")]
	Write {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to encode snapshot")]
	Encode(#[from] serde_json::Error),
	#[error("snapshot {path} is not valid JSON")]
	Decode {
		path: PathBuf,
		source: serde_json::Error,
	},
	#[error("failed to format backup timestamp")]
	Timestamp(#[from] time::error::Format),
}
