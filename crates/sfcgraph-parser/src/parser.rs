//! Extraction of sequences, steps and transitions from a token stream.
//!
//! Extraction walks the significant tokens of each program unit as a small
//! state machine. Whenever a block keyword is found, the matching block
//! grammar (written with winnow combinators over a [`TokenSlice`]) runs from
//! that position. A block that does not follow its grammar is reported and
//! skipped; extraction then continues after the block's terminator.
//!
//! Field text (conditions, settings, step bodies) is never rebuilt from
//! tokens. The grammars only record spans, and the text is sliced from the
//! input source.

use log::{debug, trace, warn};
use winnow::{
    Parser,
    combinator::{alt, cut_err, delimited, opt, peek, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use sfcgraph_core::{
    identifier::Id,
    model::{Sequence, Step, Transition},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// What the grammar expected at the failing position.
    Expected(&'static str),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = Result<O, ErrMode<ContextError<Context>>>;

/// Options controlling extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail the whole input on the first malformed block instead of
    /// skipping it with a warning.
    pub strict: bool,
}

/// Result of a successful extraction.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    /// Sequences of every program unit, in file order.
    pub sequences: Vec<ParsedSequence>,
    /// Warnings for blocks that were skipped or assumed.
    pub diagnostics: Vec<Diagnostic>,
}

/// An extracted sequence with the source locations of its parts.
#[derive(Debug, Clone)]
pub struct ParsedSequence {
    pub sequence: Sequence,
    pub spans: SequenceSpans,
}

/// Source locations of a sequence, parallel to the model's vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceSpans {
    /// The sequence header.
    pub header: Span,
    /// Step name spans, one per step.
    pub steps: Vec<Span>,
    /// Endpoint spans, one entry per transition.
    pub transitions: Vec<TransitionSpans>,
}

/// Source locations of a transition's endpoint names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionSpans {
    pub from: Vec<Span>,
    pub to: Vec<Span>,
}

// ============================================================================
// Block grammars
// ============================================================================

/// Sequence header as written in the source.
#[derive(Debug)]
struct HeaderSyntax<'src> {
    com: Spanned<&'src str>,
    cmpset: Spanned<&'src str>,
    settings: Spanned<&'src str>,
    var_input: Option<Span>,
    perm_condition: Option<Span>,
}

/// Step block as written in the source.
#[derive(Debug)]
struct StepSyntax<'src> {
    initial: bool,
    name: Spanned<&'src str>,
    number: Spanned<&'src str>,
    comment: &'src str,
    supervision: Option<Span>,
    body: Span,
}

/// Transition block as written in the source.
#[derive(Debug)]
struct TransitionSyntax<'src> {
    name: Spanned<&'src str>,
    number: Spanned<&'src str>,
    from: Vec<Spanned<&'src str>>,
    to: Vec<Spanned<&'src str>>,
    condition: Span,
}

/// Tokens that always start a new block.
fn is_block_start(token: &Token<'_>) -> bool {
    matches!(token, Token::Step | Token::InitialStep | Token::Transition)
}

/// Tokens that can only follow the `$_COM` pragma of a sequence header.
fn is_header_continuation(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Pragma {
            name: "SETTINGS",
            ..
        } | Token::VarInput
            | Token::PermConditionAtBegin
    ) || is_block_start(token)
}

/// Match one token equal to `expected` and return its span.
fn keyword<'src>(
    expected: Token<'static>,
) -> impl Parser<Input<'src>, Span, ErrMode<ContextError<Context>>> {
    any.verify_map(move |token: &'src PositionedToken<'src>| {
        (token.token == expected).then_some(token.span)
    })
}

/// Match a `(*$_NAME body*)` pragma and return its body.
fn pragma<'src>(
    expected: &'static str,
) -> impl Parser<Input<'src>, Spanned<&'src str>, ErrMode<ContextError<Context>>> {
    any.verify_map(
        move |token: &'src PositionedToken<'src>| match token.token {
            Token::Pragma { name, body } if name == expected => Some(Spanned::new(body, token.span)),
            _ => None,
        },
    )
}

/// Parse a step name.
fn step_name<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &'src PositionedToken<'src>| match token.token {
        Token::Identifier(name) => Some(Spanned::new(name, token.span)),
        _ => None,
    })
    .context(Context::Expected("step name"))
    .parse_next(input)
}

/// Parse comma-separated step names.
fn step_names<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<&'src str>>> {
    separated(1.., step_name, keyword(Token::Comma)).parse_next(input)
}

/// Parse a transition endpoint list: `S1`, `S1, S2` or `(S1, S2)`.
fn step_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<&'src str>>> {
    alt((
        delimited(
            keyword(Token::LeftParen),
            step_names,
            keyword(Token::RightParen).context(Context::Expected("`)`")),
        ),
        step_names,
    ))
    .parse_next(input)
}

/// Skip opaque tokens up to `terminator` and return the terminator's span.
///
/// Stops early, without consuming, at the start of another block so that a
/// missing terminator does not swallow the blocks that follow.
fn opaque_until<'src>(
    input: &mut Input<'src>,
    terminator: Token<'static>,
    label: &'static str,
) -> IResult<Span> {
    let _: () = repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| {
            token.token != terminator && !is_block_start(&token.token)
        }),
    )
    .parse_next(input)?;

    keyword(terminator)
        .context(Context::Expected(label))
        .parse_next(input)
}

/// Parse `KEYWORD text END_KEYWORD` and return the span of `text`.
fn section<'src>(
    input: &mut Input<'src>,
    open: Token<'static>,
    close: Token<'static>,
    label: &'static str,
) -> IResult<Span> {
    let start = keyword(open).parse_next(input)?;
    let end = cut_err(|input: &mut Input<'src>| opaque_until(input, close, label)).parse_next(input)?;
    Ok(Span::new(start.end()..end.start()))
}

/// Parse `CONDITION := text` up to `terminator` and return the span of
/// `text` and of the terminator.
fn condition_clause<'src>(
    input: &mut Input<'src>,
    terminator: Token<'static>,
    label: &'static str,
) -> IResult<(Span, Span)> {
    keyword(Token::Condition)
        .context(Context::Expected("CONDITION"))
        .parse_next(input)?;
    let assign = keyword(Token::Assign)
        .context(Context::Expected("`:=`"))
        .parse_next(input)?;
    let end = opaque_until(input, terminator, label)?;
    Ok((Span::new(assign.end()..end.start()), end))
}

/// Parse a sequence header:
///
/// ```text
/// (*$_COM name
/// comment*)
/// (*$_CMPSET ...*)
/// (*$_SETTINGS ...*)
/// [VAR_INPUT ... END_VAR]
/// [PERM_CONDITION_AT_BEGIN ... END_PERM_CONDITION]
/// ```
///
/// A `$_COM` followed by `$_CMPSET` opens a header. A `$_COM` followed by
/// something only a header or a sequence body can hold is a header missing
/// its `$_CMPSET`. Any other `$_COM` is a free comment and backtracks.
fn sequence_header<'src>(input: &mut Input<'src>) -> IResult<HeaderSyntax<'src>> {
    let com = pragma("COM").parse_next(input)?;
    let cmpset = alt((
        pragma("CMPSET"),
        preceded(
            peek(any.verify(|token: &PositionedToken<'_>| is_header_continuation(&token.token))),
            cut_err(pragma("CMPSET").context(Context::Expected("`(*$_CMPSET ...*)`"))),
        ),
    ))
    .parse_next(input)?;

    cut_err(move |input: &mut Input<'src>| {
        let settings = pragma("SETTINGS")
            .context(Context::Expected("`(*$_SETTINGS ...*)`"))
            .parse_next(input)?;
        let var_input = opt(|input: &mut Input<'src>| {
            section(input, Token::VarInput, Token::EndVar, "END_VAR")
        })
        .parse_next(input)?;
        let perm_condition = opt(|input: &mut Input<'src>| {
            section(
                input,
                Token::PermConditionAtBegin,
                Token::EndPermCondition,
                "END_PERM_CONDITION",
            )
        })
        .parse_next(input)?;

        Ok(HeaderSyntax {
            com,
            cmpset,
            settings,
            var_input,
            perm_condition,
        })
    })
    .parse_next(input)
}

/// Parse a step block:
///
/// ```text
/// STEP name (*$_NUM n*): (*$_COM comment*)
/// [SUPERVISION CONDITION := ... END_SUPERVISION]
/// body
/// END_STEP
/// ```
///
/// `INITIAL_STEP` opens the start step of a sequence.
fn step_block<'src>(input: &mut Input<'src>) -> IResult<StepSyntax<'src>> {
    let initial = any
        .verify_map(|token: &'src PositionedToken<'src>| match token.token {
            Token::Step => Some(false),
            Token::InitialStep => Some(true),
            _ => None,
        })
        .parse_next(input)?;

    cut_err(move |input: &mut Input<'src>| {
        let name = step_name.parse_next(input)?;
        let number = pragma("NUM")
            .context(Context::Expected("`(*$_NUM n*)` step number"))
            .parse_next(input)?;
        keyword(Token::Colon)
            .context(Context::Expected("`:`"))
            .parse_next(input)?;
        let comment = pragma("COM")
            .context(Context::Expected("`(*$_COM ...*)` step comment"))
            .parse_next(input)?;

        let supervision = opt(preceded(
            keyword(Token::Supervision),
            cut_err(|input: &mut Input<'src>| {
                condition_clause(input, Token::EndSupervision, "END_SUPERVISION")
            }),
        ))
        .parse_next(input)?;

        let body_start = supervision.map_or(comment.span().end(), |(_, end)| end.end());
        let end = opaque_until(input, Token::EndStep, "END_STEP")?;

        Ok(StepSyntax {
            initial,
            name,
            number,
            comment: *comment.inner(),
            supervision: supervision.map(|(text, _)| text),
            body: Span::new(body_start..end.start()),
        })
    })
    .parse_next(input)
}

/// Parse a transition block:
///
/// ```text
/// TRANSITION name (*$_NUM n*)
/// FROM list TO list
/// CONDITION := ... END_TRANSITION
/// ```
fn transition_block<'src>(input: &mut Input<'src>) -> IResult<TransitionSyntax<'src>> {
    keyword(Token::Transition).parse_next(input)?;

    cut_err(|input: &mut Input<'src>| {
        let name = any
            .verify_map(|token: &'src PositionedToken<'src>| match token.token {
                Token::Identifier(name) => Some(Spanned::new(name, token.span)),
                _ => None,
            })
            .context(Context::Expected("transition name"))
            .parse_next(input)?;
        let number = pragma("NUM")
            .context(Context::Expected("`(*$_NUM n*)` transition number"))
            .parse_next(input)?;
        keyword(Token::From)
            .context(Context::Expected("FROM"))
            .parse_next(input)?;
        let from = step_list
            .context(Context::Expected("source step names"))
            .parse_next(input)?;
        keyword(Token::To)
            .context(Context::Expected("TO"))
            .parse_next(input)?;
        let to = step_list
            .context(Context::Expected("destination step names"))
            .parse_next(input)?;
        opt(keyword(Token::Colon)).parse_next(input)?;
        let (condition, _) = condition_clause(input, Token::EndTransition, "END_TRANSITION")?;

        Ok(TransitionSyntax {
            name,
            number,
            from,
            to,
            condition,
        })
    })
    .parse_next(input)
}

/// Run `parser` at the start of `tokens`.
///
/// Returns the result together with the number of tokens consumed, which
/// on failure is the index of the offending token.
fn run_block<'src, O>(
    tokens: &'src [PositionedToken<'src>],
    mut parser: impl Parser<Input<'src>, O, ErrMode<ContextError<Context>>>,
) -> (IResult<O>, usize) {
    let mut input = TokenSlice::new(tokens);
    let result = parser.parse_next(&mut input);
    (result, tokens.len() - input.eof_offset())
}

/// The innermost "expected ..." label of a grammar error.
fn expected_label(error: &ErrMode<ContextError<Context>>) -> &'static str {
    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e
            .context()
            .map(|Context::Expected(label)| *label)
            .next()
            .unwrap_or("a well-formed block"),
        ErrMode::Incomplete(_) => "more input",
    }
}

/// Index just past the block starting at `tokens[0]`.
///
/// The block ends after the first `terminator`, or before the next block
/// start if that comes first. Without a terminator (sequence headers) the
/// next `$_COM` pragma also ends the block.
fn recovery_point(tokens: &[PositionedToken<'_>], terminator: Option<Token<'static>>) -> usize {
    for (idx, token) in tokens.iter().enumerate().skip(1) {
        if Some(token.token) == terminator {
            return idx + 1;
        }
        if is_block_start(&token.token) || (terminator.is_none() && token.is_pragma("COM")) {
            return idx;
        }
    }
    tokens.len()
}

// ============================================================================
// Extraction state machine
// ============================================================================

/// A sequence whose header has been read and whose blocks are being
/// collected.
struct OpenSequence {
    sequence: Sequence,
    spans: SequenceSpans,
}

/// Walks program units and collects sequences and diagnostics.
struct Extractor<'src> {
    source: &'src str,
    options: ParseOptions,
    sequences: Vec<ParsedSequence>,
    diagnostics: DiagnosticCollector,
}

impl<'src> Extractor<'src> {
    fn new(source: &'src str, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            sequences: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Split `tokens` into program units and extract each of them.
    fn extract(&mut self, tokens: &[PositionedToken<'_>]) {
        let segments: Vec<_> = tokens
            .split(|token| token.token == Token::EndFunctionBlock)
            .collect();
        let Some((trailing, units)) = segments.split_last() else {
            return;
        };

        for unit in units {
            self.extract_unit(unit);
        }

        if let (Some(first), Some(last)) = (trailing.first(), trailing.last()) {
            self.malformed(
                Diagnostic::error("program unit is not terminated")
                    .with_code(ErrorCode::E101)
                    .with_label(first.span.union(last.span), "ignored")
                    .with_help("close the program unit with `END_FUNCTION_BLOCK`"),
            );
        }
    }

    fn extract_unit(&mut self, unit: &[PositionedToken<'_>]) {
        let Some(first) = unit.first() else {
            return;
        };

        let fb_name = match unit.iter().find(|token| token.token == Token::FunctionBlock) {
            Some(token) => self.unit_name(token.span),
            None => {
                self.diagnostics.emit(
                    Diagnostic::warning("program unit has no `FUNCTION_BLOCK` declaration")
                        .with_code(ErrorCode::E203)
                        .with_label(first.span, "unit starts here")
                        .with_help("its sequences are reported with an empty unit name"),
                );
                String::new()
            }
        };
        debug!(unit = fb_name.as_str(), tokens = unit.len(); "Extracting program unit");

        let mut open: Option<OpenSequence> = None;
        // Blocks after a reported header belong to that header's sequence.
        let mut header_reported = false;
        let mut pos = 0;

        while let Some(token) = unit.get(pos) {
            let rest = &unit[pos..];
            pos += match token.token {
                Token::Step | Token::InitialStep => self.step(rest, open.as_mut(), header_reported),
                Token::Transition => self.transition(rest, open.as_mut(), header_reported),
                Token::Pragma { name: "COM", .. } => match self.header(rest, &fb_name) {
                    (_, 0) => 1,
                    // A malformed header still ends the previous sequence.
                    (header, consumed) => {
                        header_reported = header.is_none();
                        if let Some(done) = std::mem::replace(&mut open, header) {
                            self.close(done);
                        }
                        consumed
                    }
                },
                _ => 1,
            };
        }

        if let Some(done) = open {
            self.close(done);
        }
    }

    /// The rest of the line following `FUNCTION_BLOCK`.
    fn unit_name(&self, keyword: Span) -> String {
        let rest = Span::new(keyword.end()..self.source.len()).slice(self.source);
        rest.lines().next().unwrap_or_default().trim().to_string()
    }

    fn close(&mut self, done: OpenSequence) {
        debug!(
            sequence = done.sequence.qualified_name(),
            steps = done.sequence.steps.len(),
            transitions = done.sequence.transitions.len();
            "Extracted sequence"
        );
        trace!(sequence:? = done.sequence; "Sequence model");
        self.sequences.push(ParsedSequence {
            sequence: done.sequence,
            spans: done.spans,
        });
    }

    /// Try to read a sequence header at `tokens[0]`.
    ///
    /// Returns `(None, 0)` when the pragma is not a sequence header.
    fn header(&mut self, tokens: &[PositionedToken<'_>], fb_name: &str) -> (Option<OpenSequence>, usize) {
        let (result, consumed) = run_block(tokens, sequence_header);
        match result {
            Ok(syntax) => (Some(self.build_header(syntax, fb_name)), consumed),
            Err(ErrMode::Backtrack(_)) => (None, 0),
            Err(err) => {
                self.report_block(tokens, consumed, &err, "sequence header");
                (None, recovery_point(tokens, None))
            }
        }
    }

    fn build_header(&self, syntax: HeaderSyntax<'_>, fb_name: &str) -> OpenSequence {
        let com = syntax.com.inner().trim_start();
        let (name, comment) = com.split_once('\n').unwrap_or((com, ""));
        let text = |span: Span| span.slice(self.source).trim().to_string();

        let header_end = [syntax.var_input, syntax.perm_condition]
            .into_iter()
            .flatten()
            .fold(syntax.settings.span(), |acc, span| acc.union(span));

        OpenSequence {
            sequence: Sequence {
                fb_name: fb_name.to_string(),
                name: name.trim().to_string(),
                comment: comment.trim().to_string(),
                cmpset: syntax.cmpset.inner().trim().to_string(),
                settings: syntax.settings.inner().trim().to_string(),
                var_input: syntax.var_input.map(text),
                perm_condition: syntax.perm_condition.map(text),
                steps: Vec::new(),
                transitions: Vec::new(),
            },
            spans: SequenceSpans {
                header: syntax.com.span().union(header_end),
                ..SequenceSpans::default()
            },
        }
    }

    fn step(
        &mut self,
        tokens: &[PositionedToken<'_>],
        open: Option<&mut OpenSequence>,
        header_reported: bool,
    ) -> usize {
        let (result, consumed) = run_block(tokens, step_block);
        let syntax = match result {
            Ok(syntax) => syntax,
            Err(err) => {
                self.report_block(tokens, consumed, &err, "step");
                return recovery_point(tokens, Some(Token::EndStep));
            }
        };

        let Some(number) = self.number(syntax.number, "step") else {
            return consumed;
        };
        let Some(open) = open else {
            self.orphan(syntax.name, "step", header_reported);
            return consumed;
        };

        let lines: Vec<String> = syntax
            .body
            .slice(self.source)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        open.sequence.steps.push(Step {
            name: Id::new(syntax.name.inner()),
            number,
            comment: syntax.comment.trim().to_string(),
            initial: syntax.initial,
            supervision: syntax
                .supervision
                .map(|span| span.slice(self.source).trim().to_string()),
            condition: (!lines.is_empty()).then_some(lines),
        });
        open.spans.steps.push(syntax.name.span());
        consumed
    }

    fn transition(
        &mut self,
        tokens: &[PositionedToken<'_>],
        open: Option<&mut OpenSequence>,
        header_reported: bool,
    ) -> usize {
        let (result, consumed) = run_block(tokens, transition_block);
        let syntax = match result {
            Ok(syntax) => syntax,
            Err(err) => {
                self.report_block(tokens, consumed, &err, "transition");
                return recovery_point(tokens, Some(Token::EndTransition));
            }
        };

        let Some(number) = self.number(syntax.number, "transition") else {
            return consumed;
        };
        let Some(open) = open else {
            self.orphan(syntax.name, "transition", header_reported);
            return consumed;
        };

        let ids = |names: &[Spanned<&str>]| -> Vec<Id> {
            names.iter().map(|name| Id::new(name.inner())).collect()
        };
        let spans = |names: &[Spanned<&str>]| -> Vec<Span> {
            names.iter().map(Spanned::span).collect()
        };

        open.sequence.transitions.push(Transition {
            name: Id::new(syntax.name.inner()),
            number,
            from: ids(&syntax.from),
            to: ids(&syntax.to),
            condition: syntax.condition.slice(self.source).trim().to_string(),
        });
        open.spans.transitions.push(TransitionSpans {
            from: spans(&syntax.from),
            to: spans(&syntax.to),
        });
        consumed
    }

    /// Report a block that no sequence header precedes.
    ///
    /// Blocks following a header that was already reported as malformed
    /// are only logged.
    fn orphan(&mut self, name: Spanned<&str>, what: &str, header_reported: bool) {
        if header_reported {
            warn!(block = *name.inner(); "Ignoring {what} of a malformed sequence header");
            return;
        }

        self.malformed(
            Diagnostic::error(format!("{what} `{}` is outside of a sequence", name.inner()))
                .with_code(ErrorCode::E100)
                .with_label(name.span(), "no sequence header precedes this block")
                .with_help(format!(
                    "open the sequence with `(*$_COM ...*)`, `(*$_CMPSET ...*)` and `(*$_SETTINGS ...*)`; the {what} is skipped"
                )),
        );
    }

    /// Parse the body of a `$_NUM` pragma.
    fn number(&mut self, number: Spanned<&str>, what: &str) -> Option<u32> {
        match number.inner().trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.malformed(
                    Diagnostic::error(format!(
                        "invalid {what} number `{}`",
                        number.inner().trim()
                    ))
                    .with_code(ErrorCode::E102)
                    .with_label(number.span(), "not a non-negative integer")
                    .with_help(format!("the {what} is skipped")),
                );
                None
            }
        }
    }

    fn report_block(
        &mut self,
        tokens: &[PositionedToken<'_>],
        failed_at: usize,
        err: &ErrMode<ContextError<Context>>,
        what: &str,
    ) {
        let expected = expected_label(err);
        let start = tokens.first().map(|token| token.span).unwrap_or_default();

        let diagnostic = match tokens.get(failed_at) {
            Some(found) => Diagnostic::error(format!("malformed {what}"))
                .with_code(ErrorCode::E100)
                .with_label(found.span, format!("expected {expected}, found {}", found.token)),
            None => {
                let last = tokens.last().map(|token| token.span).unwrap_or_default();
                Diagnostic::error(format!("incomplete {what}"))
                    .with_code(ErrorCode::E101)
                    .with_label(last, format!("expected {expected} before the end of the program unit"))
            }
        };

        self.malformed(
            diagnostic
                .with_secondary_label(start, format!("{what} starts here"))
                .with_help(format!("the {what} is skipped")),
        );
    }

    /// Report a malformed block, as a warning unless in strict mode.
    fn malformed(&mut self, diagnostic: Diagnostic) {
        if self.options.strict {
            self.diagnostics.emit(diagnostic);
        } else {
            warn!(diagnostic = diagnostic.to_string(); "Skipping malformed block");
            self.diagnostics.emit(diagnostic.into_warning());
        }
    }

    fn finish(self) -> Result<ParsedSource, ParseError> {
        let sequences = self.sequences;
        let diagnostics = self.diagnostics.finish()?;
        Ok(ParsedSource {
            sequences,
            diagnostics,
        })
    }
}

/// Extract sequences from the tokens of `source`.
///
/// `tokens` must not contain trivia.
pub(crate) fn extract(
    source: &str,
    tokens: &[PositionedToken<'_>],
    options: ParseOptions,
) -> Result<ParsedSource, ParseError> {
    let mut extractor = Extractor::new(source, options);
    extractor.extract(tokens);
    extractor.finish()
}
