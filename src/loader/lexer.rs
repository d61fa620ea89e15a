use itertools::PeekingNext;

use crate::grammar::Symbol;

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Symbol(Symbol)
}

// Only the first `->` separates head from body, any later one is two
// ordinary terminals
pub fn lex_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut seen_arrow = false;

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.next() {
        if c == '-' && !seen_arrow && line_chars.peeking_next(|&next| next == '>').is_some() {
            seen_arrow = true;
            tokens.push(Token::Arrow);
        } else {
            tokens.push(Token::Symbol(c));
        }
    }

    return tokens;
}
