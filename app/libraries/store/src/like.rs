//! In-process evaluation of SQL `ILIKE` patterns (`%`, `_`, backslash escape).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Any,
    One,
    Lit(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => tokens.push(Token::Lit(chars.next().unwrap_or('\\'))),
            '%' => tokens.push(Token::Any),
            '_' => tokens.push(Token::One),
            c => tokens.push(Token::Lit(c)),
        }
    }
    tokens
}

/// Case-insensitive LIKE match of `text` against `pattern`.
pub fn ilike(pattern: &str, text: &str) -> bool {
    let tokens = tokenize(&pattern.to_lowercase());
    let text: Vec<char> = text.to_lowercase().chars().collect();

    let (mut t, mut p) = (0usize, 0usize);
    // Position of the last `%` and the text offset it currently absorbs up to.
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(Token::One) => {
                p += 1;
                t += 1;
            }
            Some(Token::Lit(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            Some(Token::Any) => {
                backtrack = Some((p, t));
                p += 1;
            }
            _ => match backtrack {
                Some((bp, bt)) => {
                    p = bp + 1;
                    t = bt + 1;
                    backtrack = Some((bp, bt + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|tok| *tok == Token::Any)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn substring_patterns() {
        assert!(ilike("%tinnitus%", "Tinnitus and Hearing Loss Claims"));
        assert!(ilike("%HEARING loss%", "Tinnitus and Hearing Loss Claims"));
        assert!(!ilike("%tinnitus rating%", "Tinnitus and Hearing Loss Claims"));
        assert!(ilike("%%", ""));
    }

    #[test]
    fn underscore_matches_one_char() {
        assert!(ilike("dd_214", "DD-214"));
        assert!(!ilike("dd_214", "DD--214"));
    }

    #[test]
    fn escaped_wildcards_are_literal() {
        assert!(ilike(r"%100\%%", "Rated 100% P&T"));
        assert!(!ilike(r"%100\%%", "Rated 1000 P&T"));
        assert!(ilike(r"%c\_p%", "c_p exam"));
        assert!(!ilike(r"%c\_p%", "c&p exam"));
        assert!(ilike(r"%a\\b%", r"path a\b"));
    }

    #[test]
    fn anchors_without_percent() {
        assert!(ilike("gi bill", "GI Bill"));
        assert!(!ilike("gi bill", "Post-9/11 GI Bill"));
        assert!(ilike("%gi bill", "Post-9/11 GI Bill"));
    }
}
