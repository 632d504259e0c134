//! Action dispatcher for the collaborative dictionary: accounts and
//! sliding-expiry sessions, entry mutations that keep the search cache
//! in step, snapshot persistence and webhook announcements.

pub mod accounts;
pub mod announce;
pub mod request;
pub mod service;

mod error;
mod housekeep;

pub use accounts::{AccountStore, Resolution};
pub use announce::{Announcer, EntryEvent};
pub use error::Error;
pub use request::{ApiRequest, EntryView, Reply};
pub use service::{Dictionary, Service};

pub type Result<T, E = Error> = std::result::Result<T, E>;
