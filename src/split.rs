//! Quote-aware splitting of composite values.
//!
//! A raw source value such as `foo='bar,buz',fiz=1` has to be cut on its
//! delimiters without cutting inside quoted regions. Any Unicode quotation
//! mark opens a region that lasts until the same character appears again.
//! Quotes that open a fresh token are stripped; quotes that appear in the
//! middle of a token are kept verbatim, which is what lets a map entry like
//! `foo='a=b'` survive the first split on `,` intact and lose its quotes on
//! the second split on `=`.

use crate::error::Error;

/// Split `input` on every unquoted occurrence of `delimiter`.
///
/// Runs of delimiters, a leading delimiter and a trailing delimiter never
/// produce empty tokens. An explicitly quoted empty token (`''`) does.
pub fn split(input: &str, delimiter: char) -> Result<Vec<String>, Error> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut open_quote: Option<char> = None;
    let mut keep_quote = false;
    let mut after_delimiter = false;

    for (i, c) in input.char_indices() {
        match open_quote {
            Some(quote) if c == quote => {
                open_quote = None;
                if keep_quote {
                    current.push(c);
                    keep_quote = false;
                }
            }
            Some(_) => current.push(c),
            None if is_quotation_mark(c) => {
                after_delimiter = false;
                open_quote = Some(c);
                if !current.is_empty() {
                    keep_quote = true;
                    current.push(c);
                }
            }
            None if c == delimiter => {
                if i == 0 || after_delimiter {
                    continue;
                }
                after_delimiter = true;
                parts.push(std::mem::take(&mut current));
            }
            None => {
                after_delimiter = false;
                current.push(c);
            }
        }
    }

    if open_quote.is_some() {
        return Err(Error::UnterminatedQuote {
            input: input.to_string(),
        });
    }

    if !current.is_empty() {
        parts.push(current);
    }

    Ok(parts)
}

/// Code points carrying the Unicode `Quotation_Mark` property.
fn is_quotation_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0022}'
            | '\u{0027}'
            | '\u{00AB}'
            | '\u{00BB}'
            | '\u{2018}'..='\u{201F}'
            | '\u{2039}'
            | '\u{203A}'
            | '\u{2E42}'
            | '\u{300C}'..='\u{300F}'
            | '\u{301D}'..='\u{301F}'
            | '\u{FE41}'..='\u{FE44}'
            | '\u{FF02}'
            | '\u{FF07}'
            | '\u{FF62}'
            | '\u{FF63}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str, delimiter: char) -> Vec<String> {
        split(input, delimiter).unwrap()
    }

    #[test]
    fn plain_split() {
        assert_eq!(tokens("foo,bar,buz", ','), vec!["foo", "bar", "buz"]);
    }

    #[test]
    fn quoted_delimiter_is_not_split() {
        assert_eq!(tokens("'foo,bar',buz", ','), vec!["foo,bar", "buz"]);
    }

    #[test]
    fn double_quotes_work_too() {
        assert_eq!(tokens("\"foo,bar\",buz", ','), vec!["foo,bar", "buz"]);
    }

    #[test]
    fn typographic_quotes_are_quotation_marks() {
        assert_eq!(tokens("«a,b«,c", ','), vec!["a,b", "c"]);
        assert_eq!(tokens("\u{201C}x,y\u{201C},z", ','), vec!["x,y", "z"]);
    }

    #[test]
    fn mismatched_quote_pair_is_unterminated() {
        for input in ["«a,b»,c", "\u{201C}x,y\u{201D},z"] {
            let err = split(input, ',').unwrap_err();
            assert!(matches!(err, Error::UnterminatedQuote { .. }), "{input}");
        }
    }

    #[test]
    fn mid_token_quotes_are_kept() {
        assert_eq!(
            tokens("foo='nested=k,v=z',bar=1", ','),
            vec!["foo='nested=k,v=z'", "bar=1"]
        );
    }

    #[test]
    fn second_pass_strips_quotes() {
        assert_eq!(
            tokens("foo='nested=k,v=z'", '='),
            vec!["foo", "nested=k,v=z"]
        );
    }

    #[test]
    fn nested_differing_quotes_pass_through() {
        assert_eq!(tokens("'say \"hi, there\"',x", ','), vec!["say \"hi, there\"", "x"]);
    }

    #[test]
    fn consecutive_delimiters_collapse() {
        assert_eq!(tokens("a,,b", ','), vec!["a", "b"]);
    }

    #[test]
    fn leading_and_trailing_delimiters_dropped() {
        assert_eq!(tokens(",a,b,", ','), vec!["a", "b"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokens("", ',').is_empty());
    }

    #[test]
    fn quoted_empty_token_is_kept() {
        assert_eq!(tokens("'',b", ','), vec!["", "b"]);
    }

    #[test]
    fn unterminated_quote_fails() {
        let err = split("'foo,bar", ',').unwrap_err();
        assert!(matches!(err, Error::UnterminatedQuote { .. }));
    }

    #[test]
    fn unterminated_mid_token_quote_fails() {
        assert!(split("a'b,c", ',').is_err());
    }
}
