use super::builder::Specification;
use super::types::{FilterTerm, OperatorKind};
use regex::Regex;
use std::sync::OnceLock;

static CLAUSE_REGEX: OnceLock<Regex> = OnceLock::new();

// `\w` is restricted to ASCII so `é` or `ß` never form part of a field or value.
fn clause_regex() -> &'static Regex {
    CLAUSE_REGEX.get_or_init(|| Regex::new(r"([A-Za-z0-9_]+?)([:<>])([A-Za-z0-9_]+?),").unwrap())
}

/// Parses `field1:value1,field2<value2,field3>value3` into a specification.
///
/// A trailing comma is appended before scanning, then every non-overlapping
/// `field op value,` match becomes one term in order of appearance. Text that
/// does not match (unsupported operators, stray characters, whitespace) is
/// dropped without an error.
pub fn parse_filter(raw: &str) -> Specification {
    let input = format!("{},", raw);
    let mut terms = Vec::new();
    let mut cursor = 0;

    for caps in clause_regex().captures_iter(&input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            log_skipped(&input[cursor..whole.start()]);
        }
        cursor = whole.end();

        let operator = match OperatorKind::from_symbol(&caps[2]) {
            Some(op) => op,
            None => continue,
        };
        terms.push(FilterTerm::new(&caps[1], operator, &caps[3]));
    }
    if cursor < input.len() {
        log_skipped(&input[cursor..]);
    }

    Specification::from_terms(terms)
}

fn log_skipped(fragment: &str) {
    let fragment = fragment.trim_matches(',');
    if !fragment.is_empty() {
        tracing::debug!("Skipping unparsable filter fragment: {:?}", fragment);
    }
}
