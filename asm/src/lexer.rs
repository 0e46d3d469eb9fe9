use crate::error::Error;

/// Longest word accepted by the assembler. Label names share this limit; the
/// `:` of a label token is not counted.
pub const MAX_TOKEN_LEN: usize = 63;

/// Byte range of a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end()]
    }

    /// The part of the line before a `;` comment.
    pub fn code(&self, src: &str) -> Span {
        match self.text(src).find(';') {
            Some(len) => Span {
                start: self.start,
                len,
            },
            None => *self,
        }
    }
}

// ----------------------------------------------------------------------------
// Lines

/// Line spans of a source buffer, without the `\n` (or `\r\n`) delimiter.
/// Cloning restarts from the same position.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lines<'a> {
    pub fn new(src: &'a str) -> Self {
        Lines { src, pos: 0 }
    }
}

impl Iterator for Lines<'_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.pos >= self.src.len() {
            return None;
        }
        let rest = &self.src[self.pos..];
        let (len, next) = match rest.find('\n') {
            Some(idx) => (idx, idx + 1),
            None => (rest.len(), rest.len()),
        };
        let mut span = Span {
            start: self.pos,
            len,
        };
        if span.text(self.src).ends_with('\r') {
            span.len -= 1;
        }
        self.pos += next;
        Some(span)
    }
}

// ----------------------------------------------------------------------------
// Words

/// First whitespace-delimited word of `span`, and the span left after it.
pub fn next_word(src: &str, span: Span) -> Result<Option<(&str, Span)>, Error> {
    let text = span.text(src);
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let skip = text.len() - trimmed.len();
    let len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let word = &trimmed[..len];
    if word.trim_end_matches(':').len() > MAX_TOKEN_LEN {
        return Err(Error::TokenTooLong(word.to_string()));
    }
    let rest = Span {
        start: span.start + skip + len,
        len: span.len - skip - len,
    };
    Ok(Some((word, rest)))
}

/// All remaining words of `span`.
pub fn words(src: &str, mut span: Span) -> Result<Vec<&str>, Error> {
    let mut words = vec![];
    while let Some((word, rest)) = next_word(src, span)? {
        words.push(word);
        span = rest;
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<&str> {
        Lines::new(src).map(|span| span.text(src)).collect()
    }

    #[test]
    fn lines() {
        assert_eq!(texts("push 1\nout\nhlt"), vec!["push 1", "out", "hlt"]);
        assert_eq!(texts("push 1\r\nout\r\n"), vec!["push 1", "out"]);
        assert_eq!(texts("\n\nhlt\n"), vec!["", "", "hlt"]);
        assert!(texts("").is_empty());
    }

    #[test]
    fn first_line_starts_at_zero() {
        let src = "add\nsub\n";
        let spans: Vec<Span> = Lines::new(src).collect();
        assert_eq!(spans[0], Span { start: 0, len: 3 });
        assert_eq!(spans[1], Span { start: 4, len: 3 });
    }

    #[test]
    fn restartable() {
        let src = "a\nb\nc";
        let mut lines = Lines::new(src);
        lines.next();
        let again = lines.clone();
        assert_eq!(lines.count(), 2);
        assert_eq!(again.count(), 2);
    }

    #[test]
    fn next_word_consumes_one_word() {
        let src = "  push   [a + 2]  ";
        let span = Span { start: 0, len: src.len() };
        let (word, rest) = next_word(src, span).unwrap().unwrap();
        assert_eq!(word, "push");
        assert_eq!(rest.text(src), "   [a + 2]  ");
        assert_eq!(words(src, rest).unwrap(), vec!["[a", "+", "2]"]);
        assert!(next_word(src, Span { start: 0, len: 2 }).unwrap().is_none());
    }

    #[test]
    fn comment() {
        let src = "push 3 ; three";
        let span = Span { start: 0, len: src.len() };
        assert_eq!(span.code(src).text(src), "push 3 ");
    }

    #[test]
    fn token_too_long() {
        let long = "x".repeat(MAX_TOKEN_LEN + 1);
        let span = Span { start: 0, len: long.len() };
        assert!(matches!(next_word(&long, span), Err(Error::TokenTooLong(_))));

        let fits = "x".repeat(MAX_TOKEN_LEN);
        let span = Span { start: 0, len: fits.len() };
        assert!(next_word(&fits, span).unwrap().is_some());

        let label = format!("{}:", "x".repeat(MAX_TOKEN_LEN));
        let span = Span { start: 0, len: label.len() };
        assert_eq!(next_word(&label, span).unwrap().unwrap().0, label);
    }
}
