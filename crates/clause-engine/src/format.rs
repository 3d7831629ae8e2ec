//! Cosmetic formatting tokens emitted by the text extractor
//!
//! Extracted text may carry `<<F:size=14,bold=1>>...<</F>>` spans and the older
//! `<<BOLD>>...<</BOLD>>` pair. They never describe a defect and are removed
//! before anything is shown to the operator.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref FORMAT_TOKEN: Regex = Regex::new(r"<<F:[^>]+>>|<</F>>|<<BOLD>>|<</BOLD>>").unwrap();
}

/// Remove all formatting tokens, borrowing when there are none
pub fn strip_formatting(text: &str) -> Cow<'_, str> {
    FORMAT_TOKEN.replace_all(text, "")
}

pub fn has_formatting(text: &str) -> bool {
    FORMAT_TOKEN.is_match(text)
}
