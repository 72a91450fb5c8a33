use proptest::prelude::*;
use regen_markers::{BlockKind, parse, scan};

/// Lines that never contain marker tokens.
fn plain_line() -> impl Strategy<Value = String> {
    "[a-z (){};=]{0,20}"
}

proptest! {
    #[test]
    fn test_scan_reassembles_input(s in "\\PC*(\n\\PC*){0,5}") {
        let rebuilt: String = scan(&s).map(|line| line.raw).collect();
        prop_assert_eq!(rebuilt, s);
    }

    #[test]
    fn test_parse_never_panics(s in "((CUSTOM_START: a|CUSTOM_END|GENERATED: g|GENERATED_END|x)\n){0,12}") {
        let parsed = parse("p", &s);
        for block in parsed.blocks() {
            prop_assert!(block.start_line <= block.end_line);
        }
    }

    #[test]
    fn test_custom_content_roundtrips(body in prop::collection::vec(plain_line(), 0..6)) {
        let content: String = body.iter().map(|l| format!("{l}\n")).collect();
        let text = format!("head\n// CUSTOM_START: m\n{content}// CUSTOM_END: m\ntail\n");
        let parsed = parse("p", &text);
        let block = parsed.get(BlockKind::Custom, "m").unwrap();
        prop_assert_eq!(&block.content, &content);
        prop_assert_eq!(block.end_line, body.len() + 3);
    }
}
