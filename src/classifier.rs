// src/classifier.rs

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::model::CommitRecord;

/// Commits mentioning any of these (case-insensitive) never reach the changelog
pub const SKIP_WORDS: &[&str] = &[
    "utd",
    "wip",
    "wtf",
    "formater",
    "set version",
    "App version",
    "new version",
    "init",
    "ver:",
];

/// Merge and pull commits open their date bucket but contribute no text
pub const VERSION_WORDS: &[&str] = &["merge branch", "merge tag", "pull", "merge"];

/// Informal prefixes and their canonical labels, applied top to bottom.
/// Every rule runs over the output of the previous one.
pub const REWRITE_RULES: &[(&str, &str)] = &[
    ("add ", "Add: "),
    ("add:", "Add:"),
    ("Add ", "Add: "),
    ("fea ", "Feature: "),
    ("fea:", "Feature:"),
    ("Fea ", "Feature: "),
    ("Fea:", "Feature:"),
    ("fea?", "Feature: "),
    ("feature ", "Feature: "),
    ("fix ", "Fix: "),
    ("fix:", "Fix:"),
    ("Fix ", "Fix: "),
    ("ref ", "Refactor: "),
    (" ref ", "Refactor: "),
    ("Ref:", "Refactor:"),
    ("refactor ", "Refactor: "),
    ("Refactor ", "Refactor: "),
    ("rfc ", "Refactor: "),
    ("rfc:", "Refactor:"),
    ("rft ", "Refactor: "),
    ("rft:", "Refactor:"),
    ("Rft:", "Refactor:"),
    ("enh ", "Enhancement: "),
    ("Enh ", "Enhancement: "),
    ("enh:", "Enhancement:"),
    ("Enh:", "Enhancement:"),
    ("enhancement ", "Enhancement:"),
    ("Enhancement ", "Enhancement:"),
];

/// Keyword a message must contain before the release pattern is tried
pub const RELEASE_KEYWORD: &str = "release";

lazy_static! {
    static ref SKIP_REGEX: Regex = any_word_regex(SKIP_WORDS);
    static ref VERSION_REGEX: Regex = any_word_regex(VERSION_WORDS);
    static ref ISSUE_REGEX: Regex = Regex::new(r"^.*(#\d+)").unwrap();
    // `.` stops at a newline, so the slash must sit on the first line
    static ref RELEASE_REGEX: Regex = Regex::new(r"^.*/v?([\d.]+)").unwrap();
}

fn any_word_regex(words: &[&str]) -> Regex {
    let pattern = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

/// Whether a commit stays out of the ledger entirely
pub fn should_skip(commit: &CommitRecord) -> bool {
    !commit.is_main_branch || SKIP_REGEX.is_match(&commit.message)
}

/// Whether a message is a merge/pull marker whose text is not recorded
pub fn is_version_marker(message: &str) -> bool {
    VERSION_REGEX.is_match(message)
}

/// The version a release commit switches to, if it is one
pub fn release_version(message: &str) -> Option<&str> {
    if !message.contains(RELEASE_KEYWORD) {
        return None;
    }
    RELEASE_REGEX
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Splits the last `#NNNN` token off a single line.
///
/// The token is dropped from the body together with one leading space, any
/// ` :` left behind is collapsed and trailing whitespace trimmed.
pub fn extract_issue(line: &str) -> (String, Option<String>) {
    let Some(m) = ISSUE_REGEX.captures(line).and_then(|caps| caps.get(1)) else {
        return (line.to_string(), None);
    };

    let head = &line[..m.start()];
    let head = head.strip_suffix(' ').unwrap_or(head);
    let body = format!("{head}{}", &line[m.end()..]).replace(" :", ":");
    (body.trim_end().to_string(), Some(m.as_str().to_string()))
}

/// Applies every rewrite rule in order
pub fn rewrite_categories(text: &str) -> String {
    REWRITE_RULES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Turns one message line into its changelog entry
pub fn normalize(line: &str) -> String {
    let (body, issue) = extract_issue(line);
    let mut entry = rewrite_categories(&body);
    if let Some(issue) = issue {
        entry.push_str(&format!(" (Related to issue: {issue})"));
    }
    entry
}
