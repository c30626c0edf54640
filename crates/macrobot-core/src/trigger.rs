//! Trigger-syntax parsing.
//!
//! Macros are defined and summoned by messages carrying `#name`, where
//! the token is anchored at message start or preceded by a space. A
//! link macro pairs the token with a single URL and nothing else after
//! it; any other use of the token either summons the macro or names an
//! attachment definition.

use std::sync::OnceLock;

use regex::Regex;

fn macro_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^| )#(\w+)").expect("macro token pattern"))
}

fn link_macro() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^| )#(\w+)\s+(http\S+)\s*$").expect("link macro pattern"))
}

/// True when `text` carries a macro token at all.
pub fn mentions_macro(text: &str) -> bool {
    macro_token().is_match(text)
}

/// Returns the macro name referenced by `text`, lowercased.
pub fn trigger_name(text: &str) -> Option<String> {
    macro_token()
        .captures(text)
        .map(|captures| captures[1].to_lowercase())
}

/// True when `text` is a link-macro definition.
pub fn is_link_macro(text: &str) -> bool {
    link_macro().is_match(text)
}

/// Returns the URL of a link-macro definition.
pub fn link_url(text: &str) -> Option<String> {
    link_macro()
        .captures(text)
        .map(|captures| captures[2].to_string())
}

#[cfg(test)]
mod tests {
    use super::{is_link_macro, link_url, mentions_macro, trigger_name};

    #[test]
    fn trigger_name_is_lowercased() {
        assert_eq!(trigger_name("#PartyParrot"), Some("partyparrot".to_string()));
    }

    #[test]
    fn trigger_token_must_be_anchored_or_space_separated() {
        assert_eq!(trigger_name("#foo and more"), Some("foo".to_string()));
        assert_eq!(trigger_name("summon #foo now"), Some("foo".to_string()));
        assert_eq!(trigger_name("nothing here"), None);
        assert_eq!(trigger_name("mid#word"), None);
    }

    #[test]
    fn first_token_wins_when_several_are_present() {
        assert_eq!(trigger_name("#first then #second"), Some("first".to_string()));
    }

    #[test]
    fn link_macro_requires_a_lone_url_tail() {
        assert!(is_link_macro("#foo https://example.com/a.gif"));
        assert!(is_link_macro("#foo http://example.com  "));
        assert!(!is_link_macro("#foo"));
        assert!(!is_link_macro("#foo https://example.com trailing words"));
        assert!(!is_link_macro("#foo see https://example.com https://other.example"));
    }

    #[test]
    fn link_url_extracts_the_url_token() {
        assert_eq!(
            link_url("#foo https://example.com/a.gif"),
            Some("https://example.com/a.gif".to_string())
        );
        assert_eq!(link_url("#foo just words"), None);
    }

    #[test]
    fn mentions_macro_matches_summons_and_definitions() {
        assert!(mentions_macro("#foo"));
        assert!(mentions_macro("please #foo"));
        assert!(!mentions_macro("no token"));
    }
}
