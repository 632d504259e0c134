use std::sync::OnceLock;

use regex::Regex;

/// Upper bound for any free-text field arriving over the wire.
pub const MAX_TEXT_CHARS: usize = 2_048;

fn scope_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();

	RE.get_or_init(|| Regex::new("^[a-z-]{1,24}$").expect("scope regex is valid"))
}

fn name_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();

	RE.get_or_init(|| Regex::new("^[a-zA-Z]{1,64}$").expect("name regex is valid"))
}

pub fn check_scope(scope: &str) -> Result<(), String> {
	if scope_re().is_match(scope) {
		Ok(())
	} else {
		Err("scope must match [a-z-]{1,24}".to_string())
	}
}

pub fn check_name(name: &str) -> Result<(), String> {
	if name_re().is_match(name) {
		Ok(())
	} else {
		Err("name must be 1-64 Latin characters".to_string())
	}
}

pub fn check_text(text: &str) -> Result<(), String> {
	if text.is_empty() {
		return Err("absent".to_string());
	}
	if text.chars().count() > MAX_TEXT_CHARS {
		return Err(format!("too long (max. {MAX_TEXT_CHARS} characters)"));
	}

	Ok(())
}

pub fn check_vote(vote: i8) -> Result<(), String> {
	if matches!(vote, -1 | 0 | 1) {
		Ok(())
	} else {
		Err("vote must be -1, 0 or 1".to_string())
	}
}
