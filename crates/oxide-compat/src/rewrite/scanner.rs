//! Masking of SQL text so keyword patterns only see top-level code.
//!
//! A mask is a byte-for-byte copy of the statement in which comments and
//! the contents of string literals and quoted identifiers are overwritten
//! with spaces. Quote delimiters stay, so a statement ending in a literal
//! still ends there. With [`Nesting::Blank`] everything between the
//! outermost parentheses is blanked too, leaving only the parentheses
//! themselves. Offsets in the mask
//! are offsets in the original statement, so a pattern match on the mask
//! splits the original text at the same position.

use crate::error::{CompatError, Result};

/// What to do with parenthesized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nesting {
    /// Keep nested code visible (only literals and comments are masked).
    Keep,
    /// Blank everything at parenthesis depth one or deeper.
    Blank,
}

/// Builds the mask of `sql`.
///
/// Unterminated literals or comments and unbalanced parentheses make the
/// statement unrewritable.
pub(crate) fn mask(sql: &str, nesting: Nesting) -> Result<Vec<u8>> {
    let src = sql.as_bytes();
    let len = src.len();
    let mut out = src.to_vec();
    let mut depth = 0_usize;
    let mut i = 0;

    while i < len {
        match src[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                let end = skip_quoted(src, i, quote)
                    .ok_or_else(|| CompatError::unrewritable(sql, "unterminated quoted text"))?;
                blank_quoted(&mut out, i, end, depth > 0 && nesting == Nesting::Blank);
                i = end + 1;
                continue;
            }
            b'[' => {
                let end = skip_quoted(src, i, b']').ok_or_else(|| {
                    CompatError::unrewritable(sql, "unterminated bracketed identifier")
                })?;
                blank_quoted(&mut out, i, end, depth > 0 && nesting == Nesting::Blank);
                i = end + 1;
                continue;
            }
            b'-' if src.get(i + 1) == Some(&b'-') => {
                let end = src[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(len, |pos| i + pos);
                blank(&mut out, i, end - 1);
                i = end;
                continue;
            }
            b'/' if src.get(i + 1) == Some(&b'*') => {
                let end = src[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map(|pos| i + 2 + pos + 1)
                    .ok_or_else(|| CompatError::unrewritable(sql, "unterminated comment"))?;
                blank(&mut out, i, end);
                i = end + 1;
                continue;
            }
            b'(' => {
                if depth > 0 && nesting == Nesting::Blank {
                    out[i] = b' ';
                }
                depth += 1;
            }
            b')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CompatError::unrewritable(sql, "unbalanced parentheses"))?;
                if depth > 0 && nesting == Nesting::Blank {
                    out[i] = b' ';
                }
            }
            _ => {
                if depth > 0 && nesting == Nesting::Blank {
                    out[i] = b' ';
                }
            }
        }
        i += 1;
    }

    if depth != 0 {
        return Err(CompatError::unrewritable(sql, "unbalanced parentheses"));
    }
    Ok(out)
}

/// Returns the end of the statement proper, excluding trailing whitespace,
/// semicolons and comments.
pub(crate) fn statement_end(masked: &[u8]) -> usize {
    masked
        .iter()
        .rposition(|&b| !b.is_ascii_whitespace() && b != b';')
        .map_or(0, |pos| pos + 1)
}

/// Finds the closing delimiter of a quoted section starting at `start`.
///
/// A doubled closing delimiter is an escape.
fn skip_quoted(src: &[u8], start: usize, close: u8) -> Option<usize> {
    let mut j = start + 1;
    while j < src.len() {
        if src[j] == close {
            if src.get(j + 1) == Some(&close) {
                j += 2;
                continue;
            }
            return Some(j);
        }
        j += 1;
    }
    None
}

fn blank(out: &mut [u8], from: usize, to_inclusive: usize) {
    for b in &mut out[from..=to_inclusive] {
        *b = b' ';
    }
}

/// Blanks a quoted section, keeping its delimiters unless `whole`.
fn blank_quoted(out: &mut [u8], open: usize, close: usize, whole: bool) {
    if whole {
        blank(out, open, close);
    } else {
        for b in &mut out[open + 1..close] {
            *b = b' ';
        }
    }
}
