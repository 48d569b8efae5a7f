use crate::engine::fraud::comparables::{parse_comparables, ComparablesImportError};

#[test]
fn parses_well_formed_rows() {
    let csv = "price,source,quoted_on\n120000,naver-place,2025-05-01\n98000,kakao-map,2025-05-12\n";

    let comparables = parse_comparables(csv.as_bytes()).expect("parse");

    assert_eq!(comparables.len(), 2);
    assert_eq!(comparables[0].price, 120_000);
    assert_eq!(comparables[0].source, "naver-place");
    assert_eq!(comparables[1].price, 98_000);
}

#[test]
fn tolerates_currency_symbols_and_separators() {
    let csv = "price,source,quoted_on\n\"\u{20a9}1,200,000\",lease-board,2025-05-01\n";

    let comparables = parse_comparables(csv.as_bytes()).expect("parse");

    assert_eq!(comparables[0].price, 1_200_000);
}

#[test]
fn blank_source_defaults_to_unknown() {
    let csv = "price,source,quoted_on\n120000,,2025-05-01\n";

    let comparables = parse_comparables(csv.as_bytes()).expect("parse");

    assert_eq!(comparables[0].source, "unknown");
}

#[test]
fn reports_row_number_for_bad_price() {
    let csv = "price,source,quoted_on\n120000,naver-place,2025-05-01\nfree,flyer,2025-05-02\n";

    let result = parse_comparables(csv.as_bytes());

    match result {
        Err(ComparablesImportError::InvalidPrice { row, value }) => {
            assert_eq!(row, 3);
            assert_eq!(value, "free");
        }
        other => panic!("expected invalid price error, got {other:?}"),
    }
}

#[test]
fn reports_row_number_for_bad_date() {
    let csv = "price,source,quoted_on\n120000,naver-place,05/01/2025\n";

    let result = parse_comparables(csv.as_bytes());

    match result {
        Err(ComparablesImportError::InvalidDate { row, value }) => {
            assert_eq!(row, 2);
            assert_eq!(value, "05/01/2025");
        }
        other => panic!("expected invalid date error, got {other:?}"),
    }
}

#[test]
fn empty_input_yields_no_comparables() {
    let csv = "price,source,quoted_on\n";

    let comparables = parse_comparables(csv.as_bytes()).expect("parse");

    assert!(comparables.is_empty());
}
