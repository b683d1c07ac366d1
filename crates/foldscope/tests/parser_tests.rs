use foldscope::parser::{parse_line, LineParser, ParseWarningKind, ParsedLine};
use foldscope::utils::config::WeightPolicy;

fn sample_of(line: &str) -> (Vec<String>, i64) {
    match parse_line(line) {
        ParsedLine::Sample(s) | ParsedLine::Fallback(s) => (
            s.frames.iter().map(|f| f.to_string()).collect(),
            s.weight,
        ),
        other => panic!("expected a sample for {:?}, got {:?}", line, other),
    }
}

#[test]
fn test_space_separated_weight() {
    assert_eq!(sample_of("a;b;c 7"), (vec!["a".into(), "b".into(), "c".into()], 7));
}

#[test]
fn test_semicolon_separated_weight() {
    assert_eq!(sample_of("a;b;c;7"), (vec!["a".into(), "b".into(), "c".into()], 7));
}

#[test]
fn test_single_frame_with_weight() {
    assert_eq!(sample_of("  main 12  "), (vec!["main".into()], 12));
}

#[test]
fn test_lenient_fallback_single_field() {
    assert!(matches!(parse_line("onlyonefield"), ParsedLine::Fallback(_)));
    assert_eq!(sample_of("onlyonefield"), (vec!["onlyonefield".into()], 1));
}

#[test]
fn test_non_integer_tail_keeps_whole_line() {
    assert!(matches!(parse_line("a;b;c nine"), ParsedLine::Fallback(_)));
    assert_eq!(
        sample_of("a;b;c nine"),
        (vec!["a".into(), "b".into(), "c nine".into()], 1)
    );
}

#[test]
fn test_negative_weight_parses_verbatim() {
    assert_eq!(sample_of("a;b -3"), (vec!["a".into(), "b".into()], -3));
}

#[test]
fn test_empty_stack_is_rejected() {
    assert_eq!(parse_line(";; 4"), ParsedLine::EmptyStack);
    assert_eq!(parse_line("   "), ParsedLine::Blank);
}

#[test]
fn test_empty_frames_are_dropped() {
    assert_eq!(sample_of("a;;b 2"), (vec!["a".into(), "b".into()], 2));
}

#[test]
fn test_rejected_line_leaves_counters_alone() {
    let mut parser = LineParser::new(WeightPolicy::PassThrough, false);
    assert!(parser.feed(";; 4").is_none());
    assert!(parser.feed("").is_none());

    let stats = parser.stats();
    assert_eq!(stats.lines_seen, 2);
    assert_eq!(stats.blank_lines, 1);
    assert_eq!(stats.rejected_lines, 1);
    assert_eq!(stats.parsed_lines, 0);
}

#[test]
fn test_strict_mode_reports_line_numbers() {
    let mut parser = LineParser::new(WeightPolicy::PassThrough, true);
    for line in ["main;run 3", "", "garbage", "main;run 1", "also garbage here"] {
        parser.feed(line);
    }

    let (stats, warnings) = parser.finish();
    assert_eq!(stats.fallback_lines, 2);
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].line_number, 3);
    assert_eq!(warnings[0].kind, ParseWarningKind::LenientFallback);
    assert_eq!(warnings[1].line_number, 5);
    assert_eq!(warnings[1].excerpt, "also garbage here");
}

#[test]
fn test_lenient_mode_keeps_no_warnings() {
    let mut parser = LineParser::new(WeightPolicy::PassThrough, false);
    parser.feed("garbage");
    let (stats, warnings) = parser.finish();
    assert_eq!(stats.fallback_lines, 1);
    assert!(warnings.is_empty());
}

#[test]
fn test_reject_policy() {
    let mut parser = LineParser::new(WeightPolicy::Reject, true);
    assert!(parser.feed("a;b 0").is_none());
    assert!(parser.feed("a;b -3").is_none());
    assert!(parser.feed("a;b 2").is_some());

    let (stats, warnings) = parser.finish();
    assert_eq!(stats.rejected_lines, 2);
    assert_eq!(stats.parsed_lines, 1);
    assert_eq!(warnings[1].kind, ParseWarningKind::NonPositiveWeight(-3));
}

#[test]
fn test_clamp_policy() {
    let mut parser = LineParser::new(WeightPolicy::Clamp, false);
    let sample = parser.feed("a;b -3").unwrap();
    assert_eq!(sample.weight, 0);
    assert_eq!(sample.frames, vec!["a", "b"]);

    let zero = parser.feed("a;b 0").unwrap();
    assert_eq!(zero.weight, 0);
}

#[test]
fn test_weight_beyond_i64_saturates_with_warning() {
    let mut parser = LineParser::new(WeightPolicy::PassThrough, true);
    let sample = parser.feed("a 99999999999999999999").unwrap();
    assert_eq!(sample.frames, vec!["a"]);
    assert_eq!(sample.weight, i64::MAX);

    let (stats, warnings) = parser.finish();
    assert_eq!(stats.parsed_lines, 1);
    assert_eq!(stats.fallback_lines, 0);
    assert_eq!(warnings[0].kind, ParseWarningKind::WeightOutOfRange);
}

#[test]
fn test_empty_frame_is_not_a_call() {
    match parse_line("a;;b 3") {
        ParsedLine::Sample(s) => {
            assert_eq!(s.frames, vec!["a", "b"]);
            assert_eq!(s.calls().count(), 0);
        }
        other => panic!("expected a sample, got {:?}", other),
    }
}
