//! Grammar scenarios for sequence, step and transition extraction.

use sfcgraph_core::identifier::Id;

use crate::{
    ParseOptions, ParsedSource,
    error::{ErrorCode, Severity},
    parse,
    span::Span,
};

const CLAMP: &str = r#"FUNCTION_BLOCK FB_Clamp
VERSION : 0.1
(*$_COM Clamp
Close and open the clamp*)
(*$_CMPSET 17*)
(*$_SETTINGS Standard, Skip=FALSE*)
VAR_INPUT
    xStart : BOOL;
END_VAR
PERM_CONDITION_AT_BEGIN
    "Safety".xOk
END_PERM_CONDITION
INITIAL_STEP S1 (*$_NUM 1*): (*$_COM Wait for start*)
END_STEP

STEP S2 (*$_NUM 2*): (*$_COM Close clamp*)
SUPERVISION
CONDITION := "Clamp".tClose.Q
END_SUPERVISION
    N "Clamp".qClose;

    S "Clamp".xBusy;
END_STEP

STEP S3 (*$_NUM 7*): (*$_COM Clamp closed*)
END_STEP

TRANSITION T1 (*$_NUM 1*)
FROM S1 TO S2
CONDITION := xStart AND "Safety".xOk
END_TRANSITION

TRANSITION T2 (*$_NUM 2*)
FROM S2 TO S3
CONDITION := "Clamp".xClosed
END_TRANSITION
END_FUNCTION_BLOCK
"#;

const HEADER: &str = "(*$_COM Seq\nComment*)\n(*$_CMPSET 1*)\n(*$_SETTINGS none*)\n";

/// Wrap `body` in a program unit with one sequence header.
fn unit(body: &str) -> String {
    format!("FUNCTION_BLOCK FB1\n{HEADER}{body}\nEND_FUNCTION_BLOCK\n")
}

fn parse_ok(source: &str) -> ParsedSource {
    match parse(source, ParseOptions::default()) {
        Ok(parsed) => parsed,
        Err(err) => panic!("Expected extraction to succeed, but got error: {err}"),
    }
}

fn warning_codes(parsed: &ParsedSource) -> Vec<ErrorCode> {
    parsed
        .diagnostics
        .iter()
        .inspect(|diag| assert_eq!(diag.severity(), Severity::Warning))
        .filter_map(|diag| diag.code())
        .collect()
}

fn names(ids: &[Id]) -> Vec<String> {
    ids.iter().map(Id::to_string).collect()
}

mod sequence_tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_header_fields() {
        let parsed = parse_ok(CLAMP);
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.sequences.len(), 1);

        let seq = &parsed.sequences[0].sequence;
        assert_eq!(seq.fb_name, "FB_Clamp");
        assert_eq!(seq.name, "Clamp");
        assert_eq!(seq.comment, "Close and open the clamp");
        assert_eq!(seq.cmpset, "17");
        assert_eq!(seq.settings, "Standard, Skip=FALSE");
        assert_eq!(seq.var_input.as_deref(), Some("xStart : BOOL;"));
        assert_eq!(seq.perm_condition.as_deref(), Some("\"Safety\".xOk"));
    }

    #[test]
    fn test_optional_sections_absent() {
        let parsed = parse_ok(&unit(""));
        let seq = &parsed.sequences[0].sequence;

        assert_eq!(seq.var_input, None);
        assert_eq!(seq.perm_condition, None);
        assert_eq!(seq.var_input_or_absent(), "none");
        assert!(seq.steps.is_empty());
        assert!(seq.transitions.is_empty());
    }

    #[test]
    fn test_empty_optional_section_is_present() {
        let parsed = parse_ok(&unit("VAR_INPUT\nEND_VAR"));
        assert_eq!(parsed.sequences[0].sequence.var_input.as_deref(), Some(""));
    }

    #[test]
    fn test_only_perm_condition() {
        let parsed = parse_ok(&unit("PERM_CONDITION_AT_BEGIN TRUE END_PERM_CONDITION"));
        let seq = &parsed.sequences[0].sequence;

        assert_eq!(seq.var_input, None);
        assert_eq!(seq.perm_condition.as_deref(), Some("TRUE"));
    }

    #[test]
    fn test_comments_between_clauses() {
        let source = "FUNCTION_BLOCK FB1\n(*$_COM Seq*)\n// generated\n(*$_CMPSET 1*) (* keep *)\n(*$_SETTINGS x*)\nEND_FUNCTION_BLOCK";
        let parsed = parse_ok(source);

        assert_eq!(parsed.sequences.len(), 1);
        assert_eq!(parsed.sequences[0].sequence.name, "Seq");
        assert_eq!(parsed.sequences[0].sequence.comment, "");
    }

    #[test]
    fn test_multiple_sequences_split_bodies() {
        let body = "STEP A1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\n\
                    (*$_COM Second\nAnother*)\n(*$_CMPSET 2*)\n(*$_SETTINGS y*)\n\
                    STEP B1 (*$_NUM 1*): (*$_COM b*)\nEND_STEP\n\
                    STEP B2 (*$_NUM 2*): (*$_COM b*)\nEND_STEP";
        let parsed = parse_ok(&unit(body));

        assert_eq!(parsed.sequences.len(), 2);
        let first = &parsed.sequences[0].sequence;
        let second = &parsed.sequences[1].sequence;

        assert_eq!(first.name, "Seq");
        assert_eq!(first.steps.len(), 1);
        assert_eq!(second.name, "Second");
        assert_eq!(second.cmpset, "2");
        assert_eq!(second.steps.len(), 2);
        assert_eq!(second.steps[0].name, "B1");
    }

    #[test]
    fn test_multiple_units() {
        let source = format!("{}{}", unit(""), unit("").replace("FB1", "FB2"));
        let parsed = parse_ok(&source);

        let units: Vec<_> = parsed
            .sequences
            .iter()
            .map(|s| s.sequence.qualified_name())
            .collect();
        assert_eq!(units, vec!["FB1/Seq", "FB2/Seq"]);
    }

    #[test]
    fn test_free_comment_is_not_a_header() {
        let source = format!(
            "FUNCTION_BLOCK FB1\n(*$_COM just a note*)\nVERSION : 0.1\n{HEADER}\
             STEP S1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\nEND_FUNCTION_BLOCK"
        );
        let parsed = parse_ok(&source);

        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.sequences.len(), 1);
        assert_eq!(parsed.sequences[0].sequence.name, "Seq");
        assert_eq!(parsed.sequences[0].sequence.steps.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_header_fields_match_source_text(
            name in "[A-Za-z][A-Za-z0-9_ ]{0,15}",
            comment in "[A-Za-z0-9 ,.=]{0,30}",
            cmpset in "[0-9]{1,4}",
            settings in "[A-Za-z0-9 ,.=]{0,30}",
        ) {
            let source = format!(
                "FUNCTION_BLOCK FB1\n(*$_COM {name}\n{comment}*)\n\
                 (*$_CMPSET {cmpset}*)\n(*$_SETTINGS {settings}*)\nEND_FUNCTION_BLOCK\n"
            );
            let parsed = parse_ok(&source);

            prop_assert!(parsed.diagnostics.is_empty());
            prop_assert_eq!(parsed.sequences.len(), 1);
            let seq = &parsed.sequences[0].sequence;
            prop_assert_eq!(seq.name.as_str(), name.trim());
            prop_assert_eq!(seq.comment.as_str(), comment.trim());
            prop_assert_eq!(seq.cmpset.as_str(), cmpset.as_str());
            prop_assert_eq!(seq.settings.as_str(), settings.trim());
        }
    }

    #[test]
    fn test_header_span() {
        let source = unit("");
        let parsed = parse_ok(&source);
        let header = parsed.sequences[0].spans.header;

        assert!(header.slice(&source).starts_with("(*$_COM Seq"));
        assert!(header.slice(&source).ends_with("(*$_SETTINGS none*)"));
    }
}

mod step_tests {
    use super::*;

    #[test]
    fn test_step_fields() {
        let parsed = parse_ok(CLAMP);
        let steps = &parsed.sequences[0].sequence.steps;
        assert_eq!(steps.len(), 3);

        let s1 = &steps[0];
        assert_eq!(s1.name, "S1");
        assert_eq!(s1.number, 1);
        assert_eq!(s1.comment, "Wait for start");
        assert!(s1.initial);
        assert_eq!(s1.supervision, None);
        assert_eq!(s1.condition, None);

        let s2 = &steps[1];
        assert!(!s2.initial);
        assert_eq!(s2.supervision.as_deref(), Some("\"Clamp\".tClose.Q"));
        assert_eq!(
            s2.condition,
            Some(vec![
                "N \"Clamp\".qClose;".to_string(),
                "S \"Clamp\".xBusy;".to_string(),
            ])
        );
    }

    #[test]
    fn test_steps_keep_source_order() {
        let body = "STEP S9 (*$_NUM 9*): (*$_COM a*)\nEND_STEP\n\
                    STEP S2 (*$_NUM 2*): (*$_COM b*)\nEND_STEP\n\
                    STEP S5 (*$_NUM 5*): (*$_COM c*)\nEND_STEP";
        let parsed = parse_ok(&unit(body));
        let numbers: Vec<_> = parsed.sequences[0]
            .sequence
            .steps
            .iter()
            .map(|s| s.number)
            .collect();

        assert_eq!(numbers, vec![9, 2, 5]);
    }

    #[test]
    fn test_body_keeps_comments_verbatim() {
        let body = "STEP S1 (*$_NUM 1*): (*$_COM a*)\n  N xLamp; // lamp on\nEND_STEP";
        let parsed = parse_ok(&unit(body));

        assert_eq!(
            parsed.sequences[0].sequence.steps[0].condition,
            Some(vec!["N xLamp; // lamp on".to_string()])
        );
    }

    #[test]
    fn test_step_name_spans() {
        let parsed = parse_ok(CLAMP);
        let spans = &parsed.sequences[0].spans.steps;

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].slice(CLAMP), "S1");
        assert_eq!(spans[2].slice(CLAMP), "S3");
    }

    #[test]
    fn test_malformed_step_is_skipped() {
        let body = "STEP S1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\n\
                    STEP S2 (*$_COM missing number*)\nEND_STEP\n\
                    STEP S3 (*$_NUM 3*): (*$_COM c*)\nEND_STEP";
        let source = unit(body);
        let parsed = parse_ok(&source);

        let steps = &parsed.sequences[0].sequence.steps;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].name, "S3");

        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100]);
        let diag = &parsed.diagnostics[0];
        assert_eq!(diag.message(), "malformed step");
        let label = diag.primary_span().unwrap();
        assert_eq!(label.slice(&source), "(*$_COM missing number*)");
    }

    #[test]
    fn test_missing_end_step_does_not_swallow_next_step() {
        let body = "STEP S1 (*$_NUM 1*): (*$_COM a*)\n  x := 1;\n\
                    STEP S2 (*$_NUM 2*): (*$_COM b*)\nEND_STEP";
        let source = unit(body);
        let parsed = parse_ok(&source);

        let steps = &parsed.sequences[0].sequence.steps;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "S2");

        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100]);
        let label = &parsed.diagnostics[0].labels()[0];
        assert_eq!(label.message(), "expected END_STEP, found STEP");
    }

    #[test]
    fn test_incomplete_step_at_unit_end() {
        let parsed = parse_ok(&unit("STEP S1 (*$_NUM 1*): (*$_COM a*)\n  x := 1;"));

        assert!(parsed.sequences[0].sequence.steps.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E101]);
        assert_eq!(parsed.diagnostics[0].message(), "incomplete step");
    }

    #[test]
    fn test_invalid_step_number() {
        let parsed = parse_ok(&unit("STEP S1 (*$_NUM one*): (*$_COM a*)\nEND_STEP"));

        assert!(parsed.sequences[0].sequence.steps.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E102]);
        assert_eq!(parsed.diagnostics[0].message(), "invalid step number `one`");
    }

    #[test]
    fn test_malformed_supervision() {
        let body = "STEP S1 (*$_NUM 1*): (*$_COM a*)\nSUPERVISION xFault END_SUPERVISION\nEND_STEP";
        let parsed = parse_ok(&unit(body));

        assert!(parsed.sequences[0].sequence.steps.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100]);
        assert_eq!(
            parsed.diagnostics[0].labels()[0].message(),
            "expected CONDITION, found identifier `xFault`"
        );
    }
}

mod transition_tests {
    use super::*;

    #[test]
    fn test_transition_fields() {
        let parsed = parse_ok(CLAMP);
        let transitions = &parsed.sequences[0].sequence.transitions;
        assert_eq!(transitions.len(), 2);

        let t1 = &transitions[0];
        assert_eq!(t1.name, "T1");
        assert_eq!(t1.number, 1);
        assert_eq!(names(&t1.from), vec!["S1"]);
        assert_eq!(names(&t1.to), vec!["S2"]);
        assert_eq!(t1.condition, "xStart AND \"Safety\".xOk");
    }

    #[test]
    fn test_endpoint_lists() {
        let body = "TRANSITION T1 (*$_NUM 1*)\nFROM S1 TO (S2, S3)\nCONDITION := TRUE\nEND_TRANSITION\n\
                    TRANSITION T2 (*$_NUM 2*)\nFROM S2, S3 TO S4\nCONDITION := TRUE\nEND_TRANSITION";
        let parsed = parse_ok(&unit(body));
        let transitions = &parsed.sequences[0].sequence.transitions;

        assert_eq!(names(&transitions[0].to), vec!["S2", "S3"]);
        assert_eq!(names(&transitions[1].from), vec!["S2", "S3"]);
        assert_eq!(names(&transitions[1].to), vec!["S4"]);
    }

    #[test]
    fn test_colon_before_condition() {
        let body = "TRANSITION T1 (*$_NUM 1*) FROM S1 TO S2 : CONDITION := x END_TRANSITION";
        let parsed = parse_ok(&unit(body));

        assert_eq!(parsed.sequences[0].sequence.transitions[0].condition, "x");
    }

    #[test]
    fn test_multiline_condition_verbatim() {
        let body = "TRANSITION T1 (*$_NUM 1*)\nFROM S1 TO S2\nCONDITION := a\n  AND (b OR c)\nEND_TRANSITION";
        let parsed = parse_ok(&unit(body));

        assert_eq!(
            parsed.sequences[0].sequence.transitions[0].condition,
            "a\n  AND (b OR c)"
        );
    }

    #[test]
    fn test_endpoint_spans() {
        let parsed = parse_ok(CLAMP);
        let spans = &parsed.sequences[0].spans.transitions[1];

        assert_eq!(spans.from[0].slice(CLAMP), "S2");
        assert_eq!(spans.to[0].slice(CLAMP), "S3");
    }

    #[test]
    fn test_missing_to_is_reported() {
        let body = "TRANSITION T1 (*$_NUM 1*) FROM S1 CONDITION := x END_TRANSITION\n\
                    TRANSITION T2 (*$_NUM 2*) FROM S1 TO S2 CONDITION := y END_TRANSITION";
        let parsed = parse_ok(&unit(body));

        let transitions = &parsed.sequences[0].sequence.transitions;
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].name, "T2");
        assert_eq!(
            parsed.diagnostics[0].labels()[0].message(),
            "expected TO, found CONDITION"
        );
    }
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_missing_unit_header() {
        let source = format!("{HEADER}END_FUNCTION_BLOCK\n");
        let parsed = parse_ok(&source);

        assert_eq!(parsed.sequences.len(), 1);
        assert_eq!(parsed.sequences[0].sequence.fb_name, "");
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E203]);
    }

    #[test]
    fn test_unterminated_unit_is_ignored() {
        let source = format!("{}FUNCTION_BLOCK FB2\n{HEADER}", unit(""));
        let parsed = parse_ok(&source);

        assert_eq!(parsed.sequences.len(), 1);
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E101]);
        assert_eq!(parsed.diagnostics[0].message(), "program unit is not terminated");
    }

    #[test]
    fn test_empty_source() {
        let parsed = parse_ok("");
        assert!(parsed.sequences.is_empty());
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_header() {
        let source = "FUNCTION_BLOCK FB1\n(*$_COM Seq*)\n(*$_CMPSET 1*)\n\
                      STEP S1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\nEND_FUNCTION_BLOCK";
        let parsed = parse_ok(source);

        assert!(parsed.sequences.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100]);
        assert_eq!(parsed.diagnostics[0].message(), "malformed sequence header");
    }

    #[test]
    fn test_header_without_cmpset_is_reported() {
        let source = "FUNCTION_BLOCK FB1\n(*$_COM Seq\nComment*)\n(*$_SETTINGS none*)\n\
                      INITIAL_STEP S1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\n\
                      STEP S2 (*$_NUM 2*): (*$_COM b*)\nEND_STEP\n\
                      TRANSITION T1 (*$_NUM 1*) FROM S1 TO S2 CONDITION := x END_TRANSITION\n\
                      END_FUNCTION_BLOCK";
        let parsed = parse_ok(source);

        assert!(parsed.sequences.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100]);
        let diag = &parsed.diagnostics[0];
        assert_eq!(diag.message(), "malformed sequence header");
        assert_eq!(diag.primary_span().unwrap().slice(source), "(*$_SETTINGS none*)");

        let err = parse(source, ParseOptions { strict: true }).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_comment_directly_before_step_is_a_broken_header() {
        let source = "FUNCTION_BLOCK FB1\n(*$_COM Seq*)\n\
                      STEP S1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\nEND_FUNCTION_BLOCK";
        let parsed = parse_ok(source);

        assert!(parsed.sequences.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100]);
        assert_eq!(
            parsed.diagnostics[0].labels()[0].message(),
            "expected `(*$_CMPSET ...*)`, found STEP"
        );
    }

    #[test]
    fn test_blocks_without_header_are_reported() {
        let source = "FUNCTION_BLOCK FB1\n\
                      STEP S1 (*$_NUM 1*): (*$_COM a*)\nEND_STEP\n\
                      TRANSITION T1 (*$_NUM 1*) FROM S1 TO S1 CONDITION := x END_TRANSITION\n\
                      END_FUNCTION_BLOCK";
        let parsed = parse_ok(source);

        assert!(parsed.sequences.is_empty());
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::E100, ErrorCode::E100]);
        assert_eq!(parsed.diagnostics[0].message(), "step `S1` is outside of a sequence");
        assert_eq!(
            parsed.diagnostics[1].message(),
            "transition `T1` is outside of a sequence"
        );
        assert_eq!(parsed.diagnostics[0].primary_span().unwrap().slice(source), "S1");

        assert!(parse(source, ParseOptions { strict: true }).is_err());
    }

    #[test]
    fn test_strict_mode_fails_on_malformed_block() {
        let source = unit("STEP S1 (*$_NUM 1*) (*$_COM missing colon*)\nEND_STEP");
        let err = parse(&source, ParseOptions { strict: true }).unwrap_err();

        assert_eq!(err.errors().count(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_lexer_errors_are_fatal() {
        let source = unit("(* unterminated");
        let at = source.find("(* unterminated").unwrap();
        let err = parse(&source, ParseOptions::default()).unwrap_err();

        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
        assert_eq!(
            err.diagnostics()[0].primary_span(),
            Some(Span::new(at..at + 2))
        );
    }
}
