//! Lexical analyzer for S7-GRAPH source text.
//!
//! The lexer converts source text into a stream of [`Token`]s. It is total
//! over everything except unterminated comments and quoted symbols: any
//! character the block grammars have no use for becomes [`Token::Text`], so
//! opaque condition expressions always lex.
//!
//! The public entry point is [`tokenize`], which collects every diagnostic
//! in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn unterminated_comment(start: usize) -> LexerDiagnostic {
    LexerDiagnostic {
        code: ErrorCode::E001,
        message: "unterminated comment",
        help: Some("close the comment with `*)`"),
        start,
    }
}

/// Parse a `(*$_NAME body*)` pragma.
///
/// The body is everything between the name and the closing `*)`, verbatim.
fn pragma<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    literal("(*$_").parse_next(input)?;

    cut_err((
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
        terminated(take_until(0.., "*)"), "*)"),
    ))
    .context(unterminated_comment(start))
    .map(|(name, body)| Token::Pragma { name, body })
    .parse_next(input)
}

/// Parse a `(* ... *)` comment. Comments do not nest.
fn block_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    literal("(*").parse_next(input)?;

    cut_err(terminated(take_until(0.., "*)"), "*)"))
        .context(unterminated_comment(start))
        .map(Token::BlockComment)
        .parse_next(input)
}

/// Parse line comment starting with '//'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse a `"..."` symbol. Symbols cannot span lines.
fn quoted_symbol<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    '"'.parse_next(input)?;

    cut_err(terminated(
        take_while(0.., |c: char| c != '"' && c != '\n'),
        '"',
    ))
    .context(LexerDiagnostic {
        code: ErrorCode::E002,
        message: "unterminated quoted symbol",
        help: Some("add closing `\"`"),
        start,
    })
    .map(Token::QuotedSymbol)
    .parse_next(input)
}

/// Classify a run of word characters.
fn classify_word(word: &str) -> Token<'_> {
    match word {
        "FUNCTION_BLOCK" => Token::FunctionBlock,
        "END_FUNCTION_BLOCK" => Token::EndFunctionBlock,
        "INITIAL_STEP" => Token::InitialStep,
        "STEP" => Token::Step,
        "END_STEP" => Token::EndStep,
        "TRANSITION" => Token::Transition,
        "END_TRANSITION" => Token::EndTransition,
        "FROM" => Token::From,
        "TO" => Token::To,
        "CONDITION" => Token::Condition,
        "SUPERVISION" => Token::Supervision,
        "END_SUPERVISION" => Token::EndSupervision,
        "VAR_INPUT" => Token::VarInput,
        "END_VAR" => Token::EndVar,
        "PERM_CONDITION_AT_BEGIN" => Token::PermConditionAtBegin,
        "END_PERM_CONDITION" => Token::EndPermCondition,
        _ if word.chars().all(|c| c.is_ascii_digit()) => Token::Number(word),
        _ if word.starts_with(|c: char| c.is_alphabetic() || c == '_') => Token::Identifier(word),
        _ => Token::Text(word),
    }
}

/// Parse keywords, identifiers and numbers.
///
/// Whole words are taken before classification, which gives keywords their
/// word boundaries.
fn word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .map(classify_word)
        .parse_next(input)
}

/// Parse punctuation (`:=` before `:`)
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        literal(":=").value(Token::Assign),
        ':'.value(Token::Colon),
        ','.value(Token::Comma),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        ';'.value(Token::Semicolon),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse newline
fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Any single character nothing else claims.
fn text<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    any.take().map(Token::Text).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        pragma,        // Must come before block_comment
        block_comment, // Must come before '('
        line_comment,
        quoted_symbol,
        word,
        punctuation,
        newline, // Must come before whitespace
        whitespace,
        text,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();

    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // An unterminated comment swallows the rest of the input;
                    // resume after the opening character so that later
                    // problems are still reported.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        let tokens = self.tokens;
        self.diagnostics.finish().map(|_| tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            // Label the opening `(*` or `"`.
            let width = if *code == ErrorCode::E001 { 2 } else { 1 };
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..*start + width), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        Diagnostic::error("unexpected character")
            .with_label(Span::new(error_pos..error_pos + 1), "not recognised here")
    }
}

/// Split source text into tokens, collecting every error.
///
/// # Returns
///
/// - `Ok(tokens)` - the whole input was tokenized
/// - `Err(ParseError)` - one or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
