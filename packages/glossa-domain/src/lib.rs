mod checks;
mod entry;
mod text;

pub use checks::{check_name, check_scope, check_text, check_vote, MAX_TEXT_CHARS};
pub use entry::{Entry, Note};
pub use text::{normalize_head, now_rfc3339, replacements, PLACEHOLDER};
