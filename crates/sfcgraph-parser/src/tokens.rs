//! Token types produced by the [`lexer`](super::lexer).

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token kinds of S7-GRAPH source text.
///
/// Keywords are matched on whole words only, so `STEP_A` is an identifier.
/// Everything the block grammars do not care about (operators inside
/// conditions, `#` prefixes, `.` member access, ...) is lexed as [`Token::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    // Unit keywords
    FunctionBlock,
    EndFunctionBlock,

    // Block keywords
    InitialStep,
    Step,
    EndStep,
    Transition,
    EndTransition,
    From,
    To,
    Condition,
    Supervision,
    EndSupervision,
    VarInput,
    EndVar,
    PermConditionAtBegin,
    EndPermCondition,

    /// `(*$_NAME body*)`
    Pragma { name: &'src str, body: &'src str },
    /// `(* ... *)`
    BlockComment(&'src str),
    /// `// ...`
    LineComment(&'src str),

    Identifier(&'src str),
    Number(&'src str),
    /// `"..."`, without the quotes.
    QuotedSymbol(&'src str),

    Assign,     // :=
    Colon,      // :
    Comma,      // ,
    LeftParen,  // (
    RightParen, // )
    Semicolon,  // ;

    Whitespace,
    Newline,

    Text(&'src str),
}

impl Token<'_> {
    /// Whitespace, newlines and ordinary comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::BlockComment(_) | Token::LineComment(_)
        )
    }

    /// Returns `true` for a `$_` pragma with the given name.
    pub fn is_pragma(&self, expected: &str) -> bool {
        matches!(self, Token::Pragma { name, .. } if *name == expected)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::FunctionBlock => write!(f, "FUNCTION_BLOCK"),
            Token::EndFunctionBlock => write!(f, "END_FUNCTION_BLOCK"),
            Token::InitialStep => write!(f, "INITIAL_STEP"),
            Token::Step => write!(f, "STEP"),
            Token::EndStep => write!(f, "END_STEP"),
            Token::Transition => write!(f, "TRANSITION"),
            Token::EndTransition => write!(f, "END_TRANSITION"),
            Token::From => write!(f, "FROM"),
            Token::To => write!(f, "TO"),
            Token::Condition => write!(f, "CONDITION"),
            Token::Supervision => write!(f, "SUPERVISION"),
            Token::EndSupervision => write!(f, "END_SUPERVISION"),
            Token::VarInput => write!(f, "VAR_INPUT"),
            Token::EndVar => write!(f, "END_VAR"),
            Token::PermConditionAtBegin => write!(f, "PERM_CONDITION_AT_BEGIN"),
            Token::EndPermCondition => write!(f, "END_PERM_CONDITION"),
            Token::Pragma { name, .. } => write!(f, "pragma `$_{name}`"),
            Token::BlockComment(_) => write!(f, "comment"),
            Token::LineComment(_) => write!(f, "line comment"),
            Token::Identifier(name) => write!(f, "identifier `{name}`"),
            Token::Number(n) => write!(f, "number `{n}`"),
            Token::QuotedSymbol(s) => write!(f, "symbol \"{s}\""),
            Token::Assign => write!(f, ":="),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
            Token::Text(text) => write!(f, "`{text}`"),
        }
    }
}

/// A token with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(Token::Whitespace.is_trivia());
        assert!(Token::Newline.is_trivia());
        assert!(Token::BlockComment(" note ").is_trivia());
        assert!(Token::LineComment(" note").is_trivia());

        assert!(!Token::Step.is_trivia());
        assert!(
            !Token::Pragma {
                name: "COM",
                body: " x"
            }
            .is_trivia()
        );
    }

    #[test]
    fn test_is_pragma() {
        let token = Token::Pragma {
            name: "NUM",
            body: " 3",
        };
        assert!(token.is_pragma("NUM"));
        assert!(!token.is_pragma("COM"));
        assert!(!Token::Identifier("NUM").is_pragma("NUM"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::EndTransition.to_string(), "END_TRANSITION");
        assert_eq!(Token::Identifier("S1").to_string(), "identifier `S1`");
        assert_eq!(
            Token::Pragma {
                name: "CMPSET",
                body: ""
            }
            .to_string(),
            "pragma `$_CMPSET`"
        );
    }
}
