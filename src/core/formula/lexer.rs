/// A word or bracket symbol with its starting character position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }
}

fn is_symbol(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}')
}

/// Splits `input` into whitespace separated words and single-character bracket tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;

    for (position, ch) in input.chars().enumerate() {
        if ch.is_whitespace() || is_symbol(ch) {
            if let Some(word) = current.take() {
                tokens.push(word);
            }
            if is_symbol(ch) {
                tokens.push(Token {
                    text: ch.to_string(),
                    position,
                });
            }
            continue;
        }
        match current.as_mut() {
            Some(word) => word.text.push(ch),
            None => {
                current = Some(Token {
                    text: ch.to_string(),
                    position,
                })
            }
        }
    }
    if let Some(word) = current {
        tokens.push(word);
    }
    tokens
}
