use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Lowercased word tokens of at least two word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Splits prose into sentences.
///
/// A sentence ends at a run of `.`, `!` or `?` (optionally followed by closing
/// quotes or brackets) when whitespace or the end of input comes next, so
/// decimals like `3.14` stay intact. A lone period after a common abbreviation
/// such as `Dr.` or `e.g.` does not end a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        i += 1;

        if !is_terminal(c) {
            continue;
        }

        let run_start = i;
        while i < chars.len() && (is_terminal(chars[i]) || is_closer(chars[i])) {
            current.push(chars[i]);
            i += 1;
        }

        let lone_period = c == '.' && i == run_start;
        if lone_period && ends_with_abbreviation(&current) {
            continue;
        }
        if i == chars.len() || chars[i].is_whitespace() {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }

    push_sentence(&mut sentences, &current);
    sentences
}

/// Groups consecutive sentences into chunks of `size`, joined by one space.
pub fn sentence_chunks(text: &str, size: usize) -> Vec<String> {
    let sentences = split_sentences(text);
    sentences
        .chunks(size.max(1))
        .map(|group| group.join(" "))
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn push_sentence(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Abbreviations whose trailing period is not a sentence boundary.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "e.g", "i.e", "cf", "fig", "approx",
];

fn ends_with_abbreviation(current: &str) -> bool {
    let Some(stem) = current.strip_suffix('.') else {
        return false;
    };
    let word = stem.rsplit(char::is_whitespace).next().unwrap_or(stem);
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    ABBREVIATIONS.iter().any(|a| word.eq_ignore_ascii_case(a))
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}
