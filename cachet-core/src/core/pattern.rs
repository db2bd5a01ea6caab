//! Glob patterns for bulk key deletion.
//!
//! Supports the Redis `KEYS` dialect: `*` (any run), `?` (one char),
//! `[abc]`, `[a-z]`, `[^a]` / `[!a]` classes and `\` escapes.

use super::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    AnyRun,
    Class {
        negated: bool,
        ranges: Vec<(char, char)>,
    },
}

impl Token {
    fn matches(&self, c: char) -> bool {
        match self {
            Token::Literal(l) => *l == c,
            Token::AnyChar => true,
            Token::AnyRun => true,
            Token::Class { negated, ranges } => {
                let hit = ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
                hit != *negated
            }
        }
    }
}

/// Compiled glob pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    source: String,
    tokens: Vec<Token>,
}

impl GlobPattern {
    /// Compile a pattern, rejecting unterminated classes and dangling escapes
    pub fn compile(pattern: &str) -> StoreResult<Self> {
        let mut tokens = Vec::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    // Collapse runs of stars
                    if tokens.last() != Some(&Token::AnyRun) {
                        tokens.push(Token::AnyRun);
                    }
                }
                '?' => tokens.push(Token::AnyChar),
                '\\' => match chars.next() {
                    Some(escaped) => tokens.push(Token::Literal(escaped)),
                    None => {
                        return Err(StoreError::InvalidPattern(format!(
                            "dangling escape in '{}'",
                            pattern
                        )));
                    }
                },
                '[' => {
                    let negated = matches!(chars.peek(), Some('^') | Some('!'));
                    if negated {
                        chars.next();
                    }

                    let mut ranges = Vec::new();
                    let mut closed = false;
                    while let Some(c) = chars.next() {
                        let lo = match c {
                            ']' if !ranges.is_empty() => {
                                closed = true;
                                break;
                            }
                            '\\' => chars.next().ok_or_else(|| {
                                StoreError::InvalidPattern(format!(
                                    "dangling escape in '{}'",
                                    pattern
                                ))
                            })?,
                            other => other,
                        };

                        let mut lookahead = chars.clone();
                        let range_end = match (lookahead.next(), lookahead.next()) {
                            (Some('-'), Some(hi)) if hi != ']' => Some(hi),
                            _ => None,
                        };
                        match range_end {
                            Some(hi) => {
                                chars.next();
                                chars.next();
                                ranges.push((lo.min(hi), lo.max(hi)));
                            }
                            None => ranges.push((lo, lo)),
                        }
                    }

                    if !closed {
                        return Err(StoreError::InvalidPattern(format!(
                            "unterminated character class in '{}'",
                            pattern
                        )));
                    }
                    tokens.push(Token::Class { negated, ranges });
                }
                other => tokens.push(Token::Literal(other)),
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    /// Pattern text as given
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Literal text every matching key must start with
    pub fn literal_prefix(&self) -> String {
        self.tokens
            .iter()
            .map_while(|t| match t {
                Token::Literal(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// True when the pattern matches every key
    pub fn matches_all(&self) -> bool {
        self.tokens == [Token::AnyRun]
    }

    /// Test a key against the pattern
    pub fn matches(&self, key: &str) -> bool {
        let text: Vec<char> = key.chars().collect();
        let (mut t, mut p) = (0usize, 0usize);
        // Position of the last star and the text index it is currently absorbing up to
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(Token::AnyRun) => {
                    backtrack = Some((p, t));
                    p += 1;
                }
                Some(token) if token.matches(text[t]) => {
                    t += 1;
                    p += 1;
                }
                _ => match backtrack {
                    Some((star, absorbed)) => {
                        p = star + 1;
                        t = absorbed + 1;
                        backtrack = Some((star, absorbed + 1));
                    }
                    None => return false,
                },
            }
        }

        self.tokens[p..].iter().all(|t| *t == Token::AnyRun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, key: &str) -> bool {
        GlobPattern::compile(pattern).unwrap().matches(key)
    }

    #[test]
    fn test_prefix_star() {
        assert!(matches("photo_detail:*", "photo_detail:42"));
        assert!(matches("photo_detail:*", "photo_detail:"));
        assert!(!matches("photo_detail:*", "photo_detail_wt:42"));
        assert!(!matches("photo_detail:*", "hot:photo_detail:42"));
    }

    #[test]
    fn test_middle_and_suffix_star() {
        assert!(matches("*:42", "photo_detail:42"));
        assert!(matches("photo*:42", "photo_detail_smart:42"));
        assert!(!matches("photo*:42", "photo_detail_smart:420"));
        assert!(matches("a*b*c", "aXXbYYc"));
        assert!(!matches("a*b*c", "aXXbYY"));
    }

    #[test]
    fn test_question_mark() {
        assert!(matches("user:?", "user:1"));
        assert!(!matches("user:?", "user:12"));
    }

    #[test]
    fn test_classes() {
        assert!(matches("user:[12]", "user:1"));
        assert!(!matches("user:[12]", "user:3"));
        assert!(matches("user:[0-9]", "user:7"));
        assert!(matches("user:[^0-9]", "user:x"));
        assert!(!matches("user:[!0-9]", "user:5"));
    }

    #[test]
    fn test_escape() {
        assert!(matches(r"a\*b", "a*b"));
        assert!(!matches(r"a\*b", "axb"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(GlobPattern::compile("user:[12").is_err());
        assert!(GlobPattern::compile("user:\\").is_err());
    }

    #[test]
    fn test_literal_prefix() {
        let p = GlobPattern::compile("photo_detail:*").unwrap();
        assert_eq!(p.literal_prefix(), "photo_detail:");
        assert!(!p.matches_all());

        let all = GlobPattern::compile("**").unwrap();
        assert_eq!(all.literal_prefix(), "");
        assert!(all.matches_all());
    }
}
