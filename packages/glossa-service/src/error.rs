pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Dispatcher failures. Every message here is shown verbatim to the
/// client inside the `{success: false, error}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown action")]
	UnknownAction,
	#[error("malformed request: {0}")]
	MalformedRequest(String),
	#[error("invalid field '{field}': {reason}")]
	InvalidField { field: &'static str, reason: String },
	#[error("must be logged in")]
	MustBeLoggedIn,
	#[error("token has expired")]
	TokenExpired,
	#[error("not a recognised ID")]
	NotFound,
	#[error("you are not the owner of this entry")]
	NotOwner,
	#[error("no such note")]
	NoSuchNote,
	#[error("already registered")]
	AlreadyRegistered,
	#[error("user not registered")]
	NotRegistered,
	#[error("password doesn't match")]
	BadPassword,
	#[error(transparent)]
	Query(#[from] glossa_search::QueryError),
	#[error(transparent)]
	Storage(#[from] glossa_storage::Error),
	#[error("internal error")]
	Hash(#[source] argon2::password_hash::Error),
}
impl Error {
	pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidField { field, reason: reason.into() }
	}
}
