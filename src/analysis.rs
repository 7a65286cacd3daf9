//! Text analysis for indexing.
//!
//! Documents are tokenized twice, with different token definitions:
//!
//! 1. The length pass counts maximal runs of ASCII alphabetic bytes.
//!    That count is the document length used for BM25 length
//!    normalization.
//! 2. The posting pass splits on spaces and newlines only, so
//!    punctuation stays attached to its token. Tokens are lowercased
//!    and tagged with the 1-based line number they appear on.
//!
//! Tokenization is byte-oriented and ASCII-driven; multi-byte input is
//! carried through opaquely.

/// Count the maximal ASCII-alphabetic runs in `text`.
///
/// This is the document-length token count: `"a b,c"` contains three
/// tokens, `"don't"` contains two.
pub fn alphabetic_token_count(text: &[u8]) -> i64 {
    let mut count = 0;
    let mut in_token = false;

    for &byte in text {
        if byte.is_ascii_alphabetic() {
            in_token = true;
        } else {
            if in_token {
                count += 1;
            }
            in_token = false;
        }
    }
    if in_token {
        count += 1;
    }

    count
}

/// Iterator over posting tokens: maximal runs of bytes that are neither
/// space nor newline, lowercased, each paired with its 1-based line
/// number.
#[derive(Debug)]
pub struct LineTokens<'a> {
    text: &'a [u8],
    pos: usize,
    line: i64,
}

/// Tokenize `text` for the posting pass.
pub fn line_tokens(text: &[u8]) -> LineTokens<'_> {
    LineTokens { text, pos: 0, line: 1 }
}

impl Iterator for LineTokens<'_> {
    type Item = (Vec<u8>, i64);

    fn next(&mut self) -> Option<Self::Item> {
        // Skip delimiters, counting newlines as they pass.
        while self.pos < self.text.len() {
            match self.text[self.pos] {
                b' ' => self.pos += 1,
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => break,
            }
        }

        if self.pos >= self.text.len() {
            return None;
        }

        let line = self.line;
        let mut token = Vec::new();
        while self.pos < self.text.len() {
            let byte = self.text[self.pos];
            if byte == b' ' || byte == b'\n' {
                break;
            }
            token.push(byte.to_ascii_lowercase());
            self.pos += 1;
        }

        Some((token, line))
    }
}
