// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword classifier for incoming chat turns.
//!
//! Categories are assigned once at write time and are open-ended labels, not
//! a closed enum; the store accepts any string.

/// Words signalling the user is stating a taste or preference.
const PREFERENCE_KEYWORDS: &[&str] = &[
    "favorite",
    "favourite",
    "prefer",
    "like",
    "love",
    "enjoy",
    "hate",
    "dislike",
];

/// Categorize a chat turn for storage.
///
/// Questions win over preferences ("do you like tea?" is a question).
pub fn categorize(text: &str) -> &'static str {
    if text.contains('?') {
        return "question";
    }
    let lowered = text.to_lowercase();
    if PREFERENCE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return "preference";
    }
    "chat_interaction"
}
