use glossa_domain::{Entry, normalize_head, replacements};

/// One-shot startup normalization: heads are whitespace-collapsed and
/// NFC-composed, bodies and note contents get the placeholder-glyph
/// replacements, and scores are recounted from the vote maps. Returns
/// how many entries needed reforming.
pub(crate) fn reform_entries(entries: &mut [Entry]) -> usize {
	let mut reformed = 0;

	for entry in entries.iter_mut() {
		let mut changed = false;
		let head = normalize_head(&entry.head);

		if head != entry.head {
			entry.head = head;
			changed = true;
		}

		let body = replacements(&entry.body);

		if body != entry.body {
			entry.body = body;
			changed = true;
		}

		for note in &mut entry.notes {
			let content = replacements(&note.content);

			if content != note.content {
				note.content = content;
				changed = true;
			}
		}

		let score = entry.tallied_score();

		if score != entry.score {
			entry.score = score;
			changed = true;
		}

		if changed {
			reformed += 1;
		}
	}

	reformed
}
