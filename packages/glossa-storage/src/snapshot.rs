use std::{
	fs,
	io::Read as _,
	path::{Path, PathBuf},
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Serialize, de::DeserializeOwned};
use time::{OffsetDateTime, macros::format_description};

use crate::{Error, Result};

/// Gzip-compressed JSON snapshots under a data directory, with hourly
/// backups going to a sibling backup directory.
///
/// Writes go through a `~`-suffixed sibling first and are renamed into
/// place, so a crash mid-write never truncates the live file. A write
/// that would shrink the live file below half its previous size is
/// treated as suspect: it lands in the `~` sibling and stays there.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
	data_dir: PathBuf,
	backup_dir: PathBuf,
}

/// Where a guarded write actually landed.
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
	Replaced { path: PathBuf, bytes: u64 },
	/// The shrink guard fired; the live file is untouched.
	Guarded { backup: PathBuf },
}

impl SnapshotStore {
	pub fn new(data_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
		Self { data_dir: data_dir.into(), backup_dir: backup_dir.into() }
	}

	/// Read and decode `name`, or seed it with the default value when the
	/// file cannot be read at all.
	pub fn read_or_default<T>(&self, name: &str) -> Result<T>
	where
		T: DeserializeOwned + Serialize + Default,
	{
		let path = self.data_dir.join(name);
		let compressed = match fs::read(&path) {
			Ok(bytes) => bytes,
			Err(e) => {
				tracing::warn!(
					path = %path.display(),
					error = %e,
					"seeding default snapshot after read failure.",
				);
				let value = T::default();

				self.write(name, &value)?;

				return Ok(value);
			},
		};
		let mut json = Vec::new();

		GzDecoder::new(compressed.as_slice())
			.read_to_end(&mut json)
			.map_err(|source| Error::Read { path: path.clone(), source })?;

		let value =
			serde_json::from_slice(&json).map_err(|source| Error::Decode { path: path.clone(), source })?;

		tracing::info!(path = %path.display(), bytes = json.len(), "read snapshot.");

		Ok(value)
	}

	/// Encode and write `name` under the data directory, shrink-guarded.
	pub fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<WriteOutcome> {
		fs::create_dir_all(&self.data_dir)
			.map_err(|source| Error::Write { path: self.data_dir.clone(), source })?;

		self.write_compressed(self.data_dir.join(name), value)
	}

	/// Write an hour-stamped backup snapshot, e.g. `2024-05-01-12.json.gz`.
	/// Repeated calls within the hour overwrite the same file.
	pub fn backup<T: Serialize>(&self, value: &T) -> Result<PathBuf> {
		fs::create_dir_all(&self.backup_dir)
			.map_err(|source| Error::Write { path: self.backup_dir.clone(), source })?;

		let stamp = OffsetDateTime::now_utc()
			.format(format_description!("[year]-[month]-[day]-[hour]"))?;
		let path = self.backup_dir.join(format!("{stamp}.json.gz"));

		self.write_compressed(path.clone(), value)?;

		Ok(path)
	}

	fn write_compressed<T: Serialize>(&self, path: PathBuf, value: &T) -> Result<WriteOutcome> {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());

		serde_json::to_writer(&mut encoder, value)?;

		let compressed =
			encoder.finish().map_err(|source| Error::Write { path: path.clone(), source })?;
		let staging = tilde_sibling(&path);

		fs::write(&staging, &compressed)
			.map_err(|source| Error::Write { path: staging.clone(), source })?;

		if let Ok(meta) = fs::metadata(&path) {
			let old_size = meta.len().max(1);

			if (compressed.len() as f64) / (old_size as f64) < 0.5 {
				tracing::warn!(
					path = %path.display(),
					old_bytes = old_size,
					new_bytes = compressed.len(),
					"refusing destructive shrink; keeping write in the staging sibling.",
				);

				return Ok(WriteOutcome::Guarded { backup: staging });
			}
		}

		fs::rename(&staging, &path).map_err(|source| Error::Write { path: path.clone(), source })?;
		tracing::info!(path = %path.display(), bytes = compressed.len(), "wrote snapshot.");

		Ok(WriteOutcome::Replaced { path, bytes: compressed.len() as u64 })
	}
}

fn tilde_sibling(path: &Path) -> PathBuf {
	let mut os = path.as_os_str().to_os_string();

	os.push("~");

	PathBuf::from(os)
}
