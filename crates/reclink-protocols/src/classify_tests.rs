use super::*;

#[test]
fn test_accepts_share_and_play_paths() {
    let c = RecordingClassifier::default();
    assert!(c.is_recording_url("https://zoom.us/rec/share/AbC123.xyz"));
    assert!(c.is_recording_url("https://us02web.zoom.us/rec/play/8f2c?startTime=1"));
    assert!(c.is_recording_url("https://utec.zoom.us/rec/share/q-9_Z"));
    assert!(c.is_recording_url("http://zoom.us/rec/component-page?meeting_id=1"));
}

#[test]
fn test_accepts_institution_host_rec_paths() {
    let c = RecordingClassifier::default();
    assert!(c.is_recording_url("https://utec.zoom.us/recording/detail?id=1"));
    assert!(c.is_recording_url("https://UTEC.zoom.us/rec/xyz"));
}

#[test]
fn test_rejects_other_hosts_with_rec_substring() {
    let c = RecordingClassifier::default();
    assert!(!c.is_recording_url("https://example.com/rec"));
    assert!(!c.is_recording_url("https://example.com/rec/share/abc"));
    assert!(!c.is_recording_url("https://notzoom.us/rec/share/abc"));
    assert!(!c.is_recording_url("https://zoom.us.evil.com/rec/share/abc"));
    assert!(!c.is_recording_url("https://example.com/?next=https://zoom.us/rec/share/x"));
}

#[test]
fn test_rejects_non_recording_provider_paths() {
    let c = RecordingClassifier::default();
    assert!(!c.is_recording_url("https://zoom.us/j/123456789"));
    assert!(!c.is_recording_url("https://us02web.zoom.us/recording"));
    assert!(!c.is_recording_url("https://zoom.us/"));
}

#[test]
fn test_rejects_garbage_and_other_schemes() {
    let c = RecordingClassifier::default();
    assert!(!c.is_recording_url(""));
    assert!(!c.is_recording_url("pending"));
    assert!(!c.is_recording_url("about:blank"));
    assert!(!c.is_recording_url("ftp://zoom.us/rec/share/abc"));
    assert!(!c.is_recording_url("javascript:open('https://zoom.us/rec/share/a')"));
}

#[test]
fn test_provider_url_matches_any_provider_page() {
    let c = RecordingClassifier::default();
    assert!(c.is_provider_url("https://zoom.us/j/1"));
    assert!(c.is_provider_url("https://utec.zoom.us/"));
    assert!(!c.is_provider_url("https://conference.utec.edu.pe/"));
    assert!(!c.is_provider_url("chrome://newtab/"));
}

#[test]
fn test_extract_from_handler_text() {
    let c = RecordingClassifier::default();
    let handler = "window.open('https://utec.zoom.us/rec/share/Zx9', '_blank'); return false;";
    assert_eq!(
        c.extract_from(handler).as_deref(),
        Some("https://utec.zoom.us/rec/share/Zx9")
    );
    assert!(c.extract_from("verGrabacion(12)").is_none());
}

#[test]
fn test_find_urls_trims_trailing_punctuation() {
    let urls = find_recording_urls("See https://zoom.us/rec/share/abc. Or https://example.com/x, ok");
    assert_eq!(urls, vec!["https://zoom.us/rec/share/abc", "https://example.com/x"]);
}

#[test]
fn test_custom_provider() {
    let c = RecordingClassifier::new("meet.example.org", None, vec!["/recordings/".to_string()]);
    assert!(c.is_recording_url("https://meet.example.org/recordings/42"));
    assert!(!c.is_recording_url("https://zoom.us/rec/share/abc"));
}
