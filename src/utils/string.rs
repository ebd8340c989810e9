//! String helpers for log previews and message chunking.

/// Truncates to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}

/// Length in UTF-16 code units, the unit Telegram measures messages in.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Splits `text` into chunks of at most `max_units` UTF-16 code units.
///
/// Breaks on line boundaries where possible. A single line longer than the
/// limit is cut at whitespace that leaves `*`, `_` and `` ` `` pairs closed,
/// failing that at the longest balanced prefix, failing that at the limit.
/// Chunks never start or end with a newline and empty input yields no chunks.
pub fn split_message(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(1);
    let text = text.trim_matches('\n');
    if text.is_empty() {
        return Vec::new();
    }
    if utf16_len(text) <= max_units {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = utf16_len(line);
        let needed = if current.is_empty() { line_len } else { current_len + 1 + line_len };

        if needed <= max_units {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let mut rest = line;
        while utf16_len(rest) > max_units {
            let cut = cut_point(rest, max_units);
            let piece = rest[..cut].trim_end();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }
            rest = rest[cut..].trim_start();
        }
        current.push_str(rest);
        current_len = utf16_len(rest);
    }

    let tail = current.trim_end_matches('\n');
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }
    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

fn markup_balanced(s: &str) -> bool {
    ['*', '_', '`'].iter().all(|m| s.matches(*m).count() % 2 == 0)
}

/// Byte offset ending the first piece of a line longer than `max_units`.
/// Always past the first character.
fn cut_point(line: &str, max_units: usize) -> usize {
    let mut units = 0;
    let mut limit = line.len();
    for (idx, ch) in line.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            limit = idx;
            break;
        }
    }
    if limit == 0 {
        return line.chars().next().map_or(line.len(), char::len_utf8);
    }

    let prefix = &line[..limit];
    let limit_is_space = line[limit..].starts_with(char::is_whitespace);
    let spaces = limit_is_space.then_some(limit).into_iter().chain(
        prefix
            .char_indices()
            .rev()
            .filter(|&(idx, ch)| idx > 0 && ch.is_whitespace())
            .map(|(idx, _)| idx),
    );
    let boundaries = prefix
        .char_indices()
        .map(|(idx, _)| idx)
        .filter(|&idx| idx > 0)
        .chain(std::iter::once(limit))
        .collect::<Vec<_>>();

    spaces
        .chain(boundaries.into_iter().rev())
        .find(|&idx| markup_balanced(&line[..idx]))
        .unwrap_or(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 5), "hello...");
        assert_eq!(truncate_str("☾☾☾☾", 2), "☾☾...");
    }

    #[test]
    fn test_short_message_is_one_chunk() {
        assert_eq!(split_message("Jupiter is up", 4096), vec!["Jupiter is up"]);
        assert!(split_message("", 4096).is_empty());
        assert!(split_message("\n\n", 4096).is_empty());
    }

    #[test]
    fn test_splits_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 9), vec!["aaaa\nbbbb", "cccc"]);
        assert_eq!(split_message(text, 4), vec!["aaaa", "bbbb", "cccc"]);
    }

    #[test]
    fn test_long_line_is_hard_cut() {
        let text = "abcdefghij\nxy";
        assert_eq!(split_message(text, 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(split_message(text, 5), vec!["abcde", "fghij", "xy"]);
    }

    #[test]
    fn test_limit_counts_utf16_units() {
        // Each planet emoji is a surrogate pair.
        let text = "🪐".repeat(10);
        assert_eq!(utf16_len(&text), 20);
        let chunks = split_message(&text, 8);
        assert_eq!(chunks, vec!["🪐🪐🪐🪐", "🪐🪐🪐🪐", "🪐🪐"]);
        assert!(chunks.iter().all(|c| utf16_len(c) <= 8));
    }

    #[test]
    fn test_emoji_report_fits_telegram_limit() {
        let line = "🌕 Moon ✨ up until 01:37 UTC 🔭 ".repeat(300);
        let chunks = split_message(&line, 4096);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| utf16_len(c) <= 4096));
    }

    #[test]
    fn test_hard_cut_keeps_markup_pairs() {
        assert_eq!(
            split_message("Look *Jupiter* now", 10),
            vec!["Look", "*Jupiter*", "now"]
        );
        let chunks = split_message("_Saturn_ and `Venus` are up tonight", 12);
        assert!(chunks.iter().all(|c| markup_balanced(c)), "{chunks:?}");
        assert!(chunks.iter().all(|c| utf16_len(c) <= 12));
    }

    #[test]
    fn test_chunks_respect_limit_and_keep_content() {
        let line = "Saturn ★ sets at 18:40 UTC";
        let text = vec![line; 400].join("\n");
        let chunks = split_message(&text, 4096);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| utf16_len(c) <= 4096));
        assert_eq!(chunks.join("\n"), text);
    }
}
