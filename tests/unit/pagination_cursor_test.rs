use tabbed_gallery::managers::pagination_cursor::PaginationCursor;
use tabbed_gallery::types::token::PageToken;

#[test]
fn test_fresh_cursor_requests_first_page() {
    let cursor = PaginationCursor::fresh(PageToken::first());
    assert_eq!(cursor.request_next(), Some(PageToken::Number(1)));
    assert_eq!(cursor.current_token(), None);
    assert!(!cursor.is_exhausted());
    assert!(cursor.history().is_empty());
}

#[test]
fn test_advance_moves_to_response_tokens() {
    let mut cursor = PaginationCursor::fresh(PageToken::first());
    cursor.advance(PageToken::Number(1), Some(PageToken::Number(2)));
    assert_eq!(cursor.current_token(), Some(&PageToken::Number(1)));
    assert_eq!(cursor.request_next(), Some(PageToken::Number(2)));

    cursor.advance(PageToken::Number(2), Some(PageToken::from("abc")));
    assert_eq!(cursor.request_next(), Some(PageToken::Cursor("abc".to_string())));
    assert_eq!(
        cursor.history(),
        &[PageToken::Number(1), PageToken::Number(2)]
    );
}

#[test]
fn test_advance_without_next_exhausts_cursor() {
    let mut cursor = PaginationCursor::fresh(PageToken::first());
    cursor.advance(PageToken::Number(1), None);
    assert!(cursor.is_exhausted());
    assert_eq!(cursor.request_next(), None);
    assert!(cursor.state().exhausted);
}

#[test]
fn test_resume_keeps_saved_token() {
    let cursor = PaginationCursor::resume(
        Some(PageToken::Number(7)),
        Some(PageToken::Number(8)),
        PageToken::first(),
    );
    assert_eq!(cursor.current_token(), Some(&PageToken::Number(7)));
    assert_eq!(cursor.request_next(), Some(PageToken::Number(8)));
}

#[test]
fn test_resume_with_opaque_cursor_token() {
    let cursor = PaginationCursor::resume(
        Some(PageToken::from("c-41")),
        Some(PageToken::from("c-42")),
        PageToken::first(),
    );
    assert_eq!(cursor.current_token(), Some(&PageToken::from("c-41")));
    assert_eq!(cursor.request_next(), Some(PageToken::from("c-42")));
}

#[test]
fn test_resume_without_next_is_exhausted() {
    let cursor = PaginationCursor::resume(Some(PageToken::Number(3)), None, PageToken::first());
    assert_eq!(cursor.current_token(), Some(&PageToken::Number(3)));
    assert!(cursor.is_exhausted());
}

#[test]
fn test_resume_without_saved_token_starts_fresh() {
    let cursor = PaginationCursor::resume(None, None, PageToken::first());
    assert_eq!(cursor.current_token(), None);
    assert_eq!(cursor.request_next(), Some(PageToken::first()));
}

#[test]
fn test_resume_unloaded_fetches_saved_token() {
    let cursor = PaginationCursor::resume_unloaded(Some(PageToken::Number(4)), PageToken::first());
    assert_eq!(cursor.request_next(), Some(PageToken::Number(4)));
    assert_eq!(cursor.current_token(), None);

    let cursor = PaginationCursor::resume_unloaded(None, PageToken::first());
    assert_eq!(cursor.request_next(), Some(PageToken::first()));
}

#[test]
fn test_reset_drops_progress() {
    let mut cursor = PaginationCursor::fresh(PageToken::first());
    cursor.advance(PageToken::Number(1), None);
    cursor.reset(PageToken::first());
    assert_eq!(cursor, PaginationCursor::fresh(PageToken::first()));
}

#[test]
fn test_page_token_serializes_untagged() {
    assert_eq!(serde_json::to_string(&PageToken::Number(3)).unwrap(), "3");
    assert_eq!(
        serde_json::to_string(&PageToken::from("next-x")).unwrap(),
        "\"next-x\""
    );
    let parsed: PageToken = serde_json::from_str("\"12\"").unwrap();
    assert_eq!(parsed, PageToken::Cursor("12".to_string()));
    let parsed: PageToken = serde_json::from_str("12").unwrap();
    assert_eq!(parsed, PageToken::Number(12));
}
