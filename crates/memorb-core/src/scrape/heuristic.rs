//! Raw-HTML extraction heuristic.
//!
//! Best effort only. The longest inline `<script>` is taken to be the
//! client-rendering payload. Quoted literals in it of at least
//! `min_literal_len` characters that mention a topic keyword are turn
//! candidates: the first is the user turn, the second the assistant turn.
//! There is no structural parsing of the payload.

use std::sync::LazyLock;

use regex::Regex;

use memorb_types::error::ScrapeError;
use memorb_types::scrape::ConversationTurn;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("valid script regex")
});

static QUOTED_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("valid literal regex"));

/// Tuning for [`extract_turns`].
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    pub min_literal_len: usize,
    /// Lower-cased on construction; matching is case-insensitive.
    keywords: Vec<String>,
}

impl HeuristicConfig {
    pub fn new(min_literal_len: usize, keywords: &[String]) -> Self {
        Self {
            min_literal_len,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn matches(&self, literal: &str) -> bool {
        let lower = literal.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// Body of the longest `<script>` block, if any.
///
/// Ties go to the first block in document order.
pub fn longest_script(html: &str) -> Option<&str> {
    SCRIPT_BLOCK
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .fold(None, |best: Option<&str>, body| match best {
            Some(b) if b.len() >= body.len() => Some(b),
            _ => Some(body),
        })
}

/// Keyword-matching quoted literals of sufficient length, in source order.
pub fn candidate_literals(script: &str, config: &HeuristicConfig) -> Vec<String> {
    QUOTED_LITERAL
        .captures_iter(script)
        .filter_map(|c| c.get(1))
        .map(|m| unescape(m.as_str()))
        .filter(|lit| lit.chars().count() >= config.min_literal_len)
        .filter(|lit| config.matches(lit))
        .collect()
}

/// Run the heuristic over a fetched page.
pub fn extract_turns(
    html: &str,
    config: &HeuristicConfig,
) -> Result<Vec<ConversationTurn>, ScrapeError> {
    let script = longest_script(html).ok_or(ScrapeError::NoScriptTag)?;
    let mut literals = candidate_literals(script, config).into_iter();

    match (literals.next(), literals.next()) {
        (Some(user), Some(assistant)) => Ok(vec![
            ConversationTurn::user(user),
            ConversationTurn::assistant(assistant),
        ]),
        (first, _) => Err(ScrapeError::InsufficientMessages {
            found: usize::from(first.is_some()),
        }),
    }
}

/// Undo the common JS string escapes; unknown escapes keep the escaped char.
fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use memorb_types::config::ScraperConfig;
    use memorb_types::llm::MessageRole;

    fn config() -> HeuristicConfig {
        let defaults = ScraperConfig::default();
        HeuristicConfig::new(defaults.min_literal_len, &defaults.keywords)
    }

    const USER: &str = "I want to remodel my kitchen but I am not sure where to start with it";
    const ASSISTANT: &str = "Start your kitchen renovation by setting a budget and picking a layout";

    #[test]
    fn test_no_script_tag() {
        let html = "<html><body><p>nothing to see</p></body></html>";
        assert!(matches!(
            extract_turns(html, &config()),
            Err(ScrapeError::NoScriptTag)
        ));
    }

    #[test]
    fn test_too_few_literals() {
        let html = format!(
            r#"<html><script>var a = "{USER}"; var b = "short kitchen";</script></html>"#
        );
        match extract_turns(&html, &config()) {
            Err(ScrapeError::InsufficientMessages { found }) => assert_eq!(found, 1),
            other => panic!("expected InsufficientMessages, got {other:?}"),
        }
    }

    #[test]
    fn test_no_keyword_literals() {
        let html = r#"<script>x("This literal is long enough to count but mentions no topic words at all.")</script>"#;
        match extract_turns(html, &config()) {
            Err(e) => {
                assert!(e.is_extraction());
                assert!(matches!(e, ScrapeError::InsufficientMessages { found: 0 }));
            }
            Ok(turns) => panic!("expected failure, got {turns:?}"),
        }
    }

    #[test]
    fn test_extracts_first_two_from_longest_script() {
        let html = format!(
            r#"<html><head><script src="app.js"></script><script>var short = "{USER}";</script></head>
<body><script type="application/json">{{"a":"{USER}","b":"{ASSISTANT}","c":"Another kitchen sentence that is long enough to count here."}}</script></body></html>"#
        );
        let turns = extract_turns(&html, &config()).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, USER);
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, ASSISTANT);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let cfg = HeuristicConfig::new(10, &["Garden".to_string()]);
        let lits = candidate_literals(r#""my GARDEN needs work" "the garden is fine""#, &cfg);
        assert_eq!(lits, vec!["my GARDEN needs work", "the garden is fine"]);
        assert_eq!(cfg.keywords().to_vec(), vec!["garden".to_string()]);
    }

    #[test]
    fn test_literals_shorter_than_minimum_are_ignored() {
        let cfg = HeuristicConfig::new(50, &["tile".to_string()]);
        assert!(candidate_literals(r#""tile""#, &cfg).is_empty());
    }

    #[test]
    fn test_longest_script_picks_longest() {
        let html = "<script>a</script><SCRIPT type=x>abcdef</SCRIPT><script>abc</script>";
        assert_eq!(longest_script(html), Some("abcdef"));
        assert_eq!(longest_script("<p>none</p>"), None);
    }

    #[test]
    fn test_escaped_quotes_stay_inside_literal() {
        let cfg = HeuristicConfig::new(5, &["paint".to_string()]);
        let lits = candidate_literals(r#""which \"paint\" finish?\nthanks""#, &cfg);
        assert_eq!(lits, vec!["which \"paint\" finish?\nthanks"]);
    }

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(unescape(r"caf\u00e9"), "café");
        assert_eq!(unescape(r"bad \uzzzz"), r"bad \uzzzz");
    }
}
