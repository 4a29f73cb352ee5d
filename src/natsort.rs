//! Natural ordering for query identifiers.
//!
//! Identifiers mix digit runs and letters ("1", "12", "A"); digit runs
//! compare numerically so "2" sorts before "12", and digit runs sort before
//! letter runs.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Token {
    Number(u64),
    Text(String),
}

fn tokenize(s: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut value: u64 = 0;
            while let Some(&d) = chars.peek() {
                if let Some(digit) = d.to_digit(10) {
                    value = value.saturating_mul(10).saturating_add(digit as u64);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(value));
        } else {
            let mut run = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    break;
                }
                run.push(d.to_ascii_uppercase());
                chars.next();
            }
            tokens.push(Token::Text(run));
        }
    }
    tokens
}

/// Compare two identifiers under natural ordering.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    tokenize(a).cmp(&tokenize(b))
}
