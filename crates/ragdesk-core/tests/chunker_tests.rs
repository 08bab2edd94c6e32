use ragdesk_core::chunker::{chunk_text, min_cut_offset, normalize_whitespace};

fn sample_texts() -> Vec<String> {
    vec![
        "The store opens at 9am and closes at 6pm on weekdays.".to_string(),
        "lorem ipsum dolor sit amet ".repeat(40),
        "x".repeat(1234),
        "árbol ñandú café ".repeat(30),
        "a\n\n\n\nb\tc  d\r\ne".to_string(),
        "supercalifragilistic ".repeat(7),
    ]
}

#[test]
fn empty_input_yields_nothing() {
    assert!(chunk_text("", 100, 10).is_empty());
    assert!(chunk_text("   \n\t  ", 100, 10).is_empty());
}

#[test]
fn fragments_are_never_empty_and_never_too_long() {
    for text in sample_texts() {
        for (max_len, overlap) in [(10, 0), (10, 3), (50, 10), (64, 63), (200, 120), (1, 0)] {
            let chunks = chunk_text(&text, max_len, overlap);
            assert!(!chunks.is_empty(), "non-empty text must produce chunks");
            for c in &chunks {
                assert!(!c.is_empty());
                assert!(c.chars().count() <= max_len, "chunk longer than {max_len}: {c:?}");
            }
        }
    }
}

#[test]
fn window_count_is_bounded_without_word_cuts() {
    // No whitespace, so every window is cut exactly at max_len.
    let text = "abcdefghij".repeat(97);
    let len = text.chars().count();
    for (max_len, overlap) in [(10, 0), (10, 9), (100, 25), (333, 300), (970, 10), (2000, 5)] {
        let chunks = chunk_text(&text, max_len, overlap);
        let step = max_len - overlap;
        let bound = len.div_ceil(step);
        assert!(chunks.len() <= bound, "{} windows > bound {bound} for ({max_len},{overlap})", chunks.len());
    }
}

#[test]
fn window_count_is_bounded_with_word_cuts() {
    // A cut may end a window at min_cut_offset, so that is the guaranteed advance.
    let mut texts = sample_texts();
    texts.push(vec!["abcdef"; 10].join(" "));
    texts.push("word ".repeat(200));
    for text in &texts {
        let len = normalize_whitespace(text).chars().count();
        for (max_len, overlap) in [(10, 0), (10, 3), (50, 10), (60, 20), (200, 120), (900, 150)] {
            let advance = min_cut_offset(max_len).saturating_sub(overlap).max(1);
            let chunks = chunk_text(text, max_len, overlap);
            assert!(chunks.len() <= len.div_ceil(advance), "{} windows for ({max_len},{overlap})", chunks.len());
        }
    }
}

#[test]
fn overlap_survives_a_word_cut() {
    let text = format!("{} {}", "x".repeat(600), "y".repeat(600));
    let chunks = chunk_text(&text, 900, 150);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "x".repeat(600));
    assert_eq!(chunks[1], format!("{} {}", "x".repeat(150), "y".repeat(600)));
}

#[test]
fn consecutive_chunks_share_text_after_cuts() {
    let chunks = chunk_text(&"lorem ipsum dolor sit amet ".repeat(40), 50, 10);
    assert!(chunks.len() > 2);
    for pair in chunks.windows(2) {
        let head: String = pair[1].chars().take(5).collect();
        assert!(pair[0].contains(&head), "{:?} does not overlap {:?}", pair[0], pair[1]);
    }
}

#[test]
fn huge_window_does_not_overflow() {
    assert_eq!(chunk_text("ab cd", usize::MAX, 0), vec!["ab cd".to_string()]);
    assert_eq!(chunk_text("ab cd", usize::MAX, usize::MAX), vec!["ab cd".to_string()]);
}

#[test]
fn overlap_not_smaller_than_window_still_terminates() {
    let text = "abcdefghijklmnopqrstuvwxyz".repeat(3);
    for (max_len, overlap) in [(5, 5), (5, 9), (1, 1), (8, usize::MAX)] {
        let chunks = chunk_text(&text, max_len, overlap);
        assert!(!chunks.is_empty());
        assert!(chunks.len() <= text.len(), "advances at least one char per window");
        assert!(chunks.last().unwrap().ends_with('z'));
    }
}

#[test]
fn consecutive_windows_overlap() {
    let text = "0123456789".repeat(5);
    let chunks = chunk_text(&text, 20, 5);
    assert_eq!(chunks[0], "01234567890123456789");
    assert!(chunks[1].starts_with("56789"));
}

#[test]
fn no_text_is_lost_between_chunks() {
    let text = "returns are accepted within thirty days of delivery when the item is unused ".repeat(12);
    let normalized = normalize_whitespace(&text);
    let chunks = chunk_text(&text, 60, 0);
    let rebuilt: String = chunks.concat().split_whitespace().collect();
    let expected: String = normalized.split_whitespace().collect();
    assert_eq!(rebuilt, expected);
}

#[test]
fn multibyte_text_is_split_on_char_boundaries() {
    let text = "ñ".repeat(25);
    let chunks = chunk_text(&text, 10, 2);
    assert!(chunks.iter().all(|c| c.chars().all(|ch| ch == 'ñ')));
    assert_eq!(chunks[0].chars().count(), 10);
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = chunk_text("  The store   opens at 9am  ", 900, 150);
    assert_eq!(chunks, vec!["The store opens at 9am".to_string()]);
}
