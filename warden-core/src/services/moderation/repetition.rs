// File: warden-core/src/services/moderation/repetition.rs

use std::collections::HashSet;

use warden_common::models::{HistoryRecord, RepetitionSignal};

/// Token-set similarity at or above which two texts count as the same.
pub const NEAR_DUPLICATE_JACCARD: f64 = 0.8;

/// Lowercases, strips punctuation and collapses whitespace.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn jaccard(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

pub fn is_near_duplicate(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || jaccard(&a, &b) >= NEAR_DUPLICATE_JACCARD
}

/// Counts the trailing run of history records (newest backwards) that repeat
/// `current`. `history` is oldest first and holds only the sender's messages.
pub fn detect(current: &str, history: &[HistoryRecord]) -> RepetitionSignal {
    let mut repeated: Vec<String> = history
        .iter()
        .rev()
        .take_while(|r| is_near_duplicate(current, &r.text))
        .map(|r| r.text.clone())
        .collect();
    repeated.reverse();

    RepetitionSignal {
        repeated_count: repeated.len() as u32,
        repeated_texts: repeated,
    }
}

/// Prompt-ready description of the signal.
pub fn describe(signal: &RepetitionSignal) -> String {
    if !signal.is_repetitive() {
        return "No repetition: the message does not repeat the sender's latest messages.".to_string();
    }
    let quoted = signal
        .repeated_texts
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "REPEATED: this message near-duplicates the sender's previous {} consecutive message(s): {}",
        signal.repeated_count, quoted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rec(text: &str) -> HistoryRecord {
        HistoryRecord {
            record_id: 0,
            user_id: 1,
            group_id: 1,
            message_id: None,
            sender_name: "Nima".to_string(),
            text: text.to_string(),
            message_created_at: Utc::now(),
            reply_to_id: None,
            reply_to_text: None,
            inserted_at: Utc::now(),
        }
    }

    #[test]
    fn normalization_ignores_case_and_punctuation() {
        assert_eq!(normalize("  Hello,   HELLO!! hello?"), "hello hello hello");
        assert!(is_near_duplicate("Buy now!!!", "buy now"));
        assert!(!is_near_duplicate("?!", "..."));
    }

    #[test]
    fn counts_only_the_trailing_run() {
        let history = vec![
            rec("hello hello hello"),
            rec("how is everyone"),
            rec("Hello hello hello"),
            rec("hello, hello, hello!"),
        ];
        let signal = detect("hello hello hello", &history);
        assert_eq!(signal.repeated_count, 2);
        assert_eq!(signal.repeated_texts, vec!["Hello hello hello", "hello, hello, hello!"]);
        assert!(describe(&signal).starts_with("REPEATED"));
    }

    #[test]
    fn different_message_breaks_the_run() {
        let history = vec![rec("cheap followers here"), rec("what time is the meetup")];
        let signal = detect("cheap followers here", &history);
        assert!(!signal.is_repetitive());
        assert!(describe(&signal).starts_with("No repetition"));
    }

    #[test]
    fn near_duplicates_need_high_overlap() {
        // 5 shared of 6 distinct tokens
        assert!(is_near_duplicate("join my channel for free crypto", "join my channel for crypto"));
        assert!(!is_near_duplicate("join my channel", "see my channel today"));
    }
}
