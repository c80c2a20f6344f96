//! Error codes for the diagnostic system.
//!
//! Codes are grouped by the phase that reports them:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Block extraction errors
//! - `E2xx` - Sequence validation errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated comment.
    ///
    /// A `(*` comment or `(*$_` pragma was opened but never closed with `*)`.
    E001,

    /// Unterminated quoted symbol.
    ///
    /// A `"` symbol was opened but not closed on the same line.
    E002,

    // =========================================================================
    // Extraction Errors (E1xx)
    // =========================================================================
    /// Malformed block.
    ///
    /// A sequence, step or transition block does not follow the block grammar.
    E100,

    /// Incomplete block.
    ///
    /// The program unit ended before the block's terminator was found.
    E101,

    /// Invalid number pragma.
    ///
    /// A `(*$_NUM …*)` pragma does not hold a non-negative integer.
    E102,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Unresolved step reference.
    ///
    /// A transition names a source or destination step that is not declared
    /// in the same sequence.
    E200,

    /// Duplicate step name.
    ///
    /// Two steps of one sequence share a name.
    E201,

    /// No root step.
    ///
    /// Every step of the sequence has an incoming transition. Reported as a
    /// warning; layout decides whether it can proceed.
    E202,

    /// Missing unit header.
    ///
    /// A program unit segment has no `FUNCTION_BLOCK` declaration.
    E203,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated comment",
            ErrorCode::E002 => "unterminated quoted symbol",
            ErrorCode::E100 => "malformed block",
            ErrorCode::E101 => "incomplete block",
            ErrorCode::E102 => "invalid number",
            ErrorCode::E200 => "unresolved step reference",
            ErrorCode::E201 => "duplicate step name",
            ErrorCode::E202 => "no root step",
            ErrorCode::E203 => "missing unit header",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E203.to_string(), "E203");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E100.description(), "malformed block");
        assert_eq!(ErrorCode::E200.description(), "unresolved step reference");
        assert_eq!(ErrorCode::E201.description(), "duplicate step name");
    }
}
