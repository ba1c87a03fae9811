use chrono::Utc;

use super::*;

fn sample_session() -> Session {
    Session {
        course: "Calculus I".to_string(),
        section: "S1".to_string(),
        date: "2024-04-02".to_string(),
        start_time: "08:00".to_string(),
        instructor: "Ramos".to_string(),
        session_type: "Teoría".to_string(),
        status: "Finalizada".to_string(),
        modality: "Virtual".to_string(),
        week: Some(4),
        has_link: true,
        link_url: Some(RecordingLink::Unresolved),
        button_id: Some("ver12".to_string()),
        button_enabled: true,
        extracted_at: Utc::now(),
    }
}

#[test]
fn test_unresolved_link_serializes_as_sentinel() {
    let json = serde_json::to_string(&RecordingLink::Unresolved).unwrap();
    assert_eq!(json, "\"pending\"");
}

#[test]
fn test_resolved_link_serializes_as_url() {
    let link = RecordingLink::Resolved("https://utec.zoom.us/rec/share/abc".to_string());
    let json = serde_json::to_string(&link).unwrap();
    assert_eq!(json, "\"https://utec.zoom.us/rec/share/abc\"");
}

#[test]
fn test_link_deserializes_sentinel() {
    let link: RecordingLink = serde_json::from_str("\"pending\"").unwrap();
    assert_eq!(link, RecordingLink::Unresolved);
    assert!(link.url().is_none());
}

#[test]
fn test_session_json_field_names() {
    let value = serde_json::to_value(sample_session()).unwrap();
    assert_eq!(value["type"], "Teoría");
    assert_eq!(value["start_time"], "08:00");
    assert_eq!(value["link_url"], "pending");
    assert_eq!(value["week"], 4);
    assert!(value.get("session_type").is_none());
}

#[test]
fn test_session_without_link_serializes_null() {
    let mut session = sample_session();
    session.link_url = None;
    session.has_link = false;
    let value = serde_json::to_value(&session).unwrap();
    assert!(value["link_url"].is_null());
}

#[test]
fn test_session_key_ignores_non_key_fields() {
    let a = sample_session();
    let mut b = sample_session();
    b.instructor = "Someone else".to_string();
    b.status = "Pendiente".to_string();
    assert_eq!(a.key(), b.key());

    b.start_time = "10:00".to_string();
    assert_ne!(a.key(), b.key());
}

#[test]
fn test_resolved_url_skips_sentinel() {
    let mut session = sample_session();
    assert!(session.resolved_url().is_none());
    assert!(session.is_unresolved());

    session.link_url = Some(RecordingLink::Resolved("https://zoom.us/rec/play/x".to_string()));
    assert_eq!(session.resolved_url(), Some("https://zoom.us/rec/play/x"));
    assert!(!session.is_unresolved());
}

#[test]
fn test_metadata_copies_button_id() {
    let meta = sample_session().metadata();
    assert_eq!(meta.button_id.as_deref(), Some("ver12"));
    assert_eq!(meta.week, Some(4));
}

#[test]
fn test_correlation_tokens_are_unique() {
    assert_ne!(CorrelationToken::new(), CorrelationToken::new());
}

#[test]
fn test_tab_event_tab_accessor() {
    let tab = TabInfo::new("t1", "about:blank").with_opener("t0");
    assert_eq!(TabEvent::Created(tab.clone()).tab(), Some(&tab));
    assert!(TabEvent::Removed(TabId::from("t1")).tab().is_none());
    assert_eq!(tab.opener, Some(TabId::from("t0")));
}
