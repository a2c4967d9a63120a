//! Outgoing message splitting
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// Discord message content limit, in bytes
pub const MESSAGE_LIMIT: usize = 2000;

/// Split text into pieces of at most `max_size` bytes
///
/// Pieces break at newlines where possible; a single line longer than the
/// limit is cut at character boundaries. Empty input yields one empty piece.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size || max_size == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let needed = if current.is_empty() {
            line.len()
        } else {
            current.len() + 1 + line.len()
        };
        if needed <= max_size {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if line.len() <= max_size {
            current.push_str(line);
        } else {
            let mut pieces = split_line(line, max_size);
            // The tail of a long line can still share a chunk with what follows
            if let Some(tail) = pieces.pop() {
                chunks.extend(pieces);
                current = tail;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_line(line: &str, max_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut end = 0;

    for (idx, ch) in line.char_indices() {
        let next = idx + ch.len_utf8();
        if next - start > max_size && end > start {
            pieces.push(line[start..end].to_string());
            start = end;
        }
        end = next;
    }
    if end > start {
        pieces.push(line[start..end].to_string());
    }
    pieces
}

/// Split text for a Discord message
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}
