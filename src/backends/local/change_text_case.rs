// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::config::TextCase;
use crate::errors::BoxError;
use crate::traits::ItemProcessor;

/// Words kept lower-case by title casing unless they open the text
const TITLE_SMALL_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Change Text Case processor - converts textual items to a configured case.
///
/// Only string payloads are converted; objects, arrays, numbers, booleans and null
/// pass through unchanged.
pub struct ChangeTextCaseProcessor {
    case: TextCase,
}

impl ChangeTextCaseProcessor {
    pub fn new(case: TextCase) -> Self {
        Self { case }
    }

    pub fn upper() -> Self {
        Self::new(TextCase::Upper)
    }

    pub fn lower() -> Self {
        Self::new(TextCase::Lower)
    }

    pub fn proper() -> Self {
        Self::new(TextCase::Proper)
    }

    pub fn title() -> Self {
        Self::new(TextCase::Title)
    }

    pub fn case(&self) -> TextCase {
        self.case
    }

    /// Apply the configured case to a piece of text.
    pub fn convert(&self, input: &str) -> String {
        match self.case {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower_word = word.to_lowercase();
                    if i == 0 || !TITLE_SMALL_WORDS.contains(&lower_word.as_str()) {
                        capitalize(word)
                    } else {
                        lower_word
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Default for ChangeTextCaseProcessor {
    fn default() -> Self {
        Self::upper()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

#[async_trait]
impl ItemProcessor for ChangeTextCaseProcessor {
    async fn process(&self, item: &Value) -> Result<Value, BoxError> {
        Ok(match item {
            Value::String(text) => Value::String(self.convert(text)),
            other => other.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "change_text_case"
    }
}
