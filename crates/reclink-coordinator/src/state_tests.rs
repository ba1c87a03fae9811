use super::*;

const MAIN: &str = "main";
const REC_A: &str = "https://utec.zoom.us/rec/share/aaa";
const REC_B: &str = "https://zoom.us/rec/play/bbb";

fn coordinator() -> Coordinator {
    Coordinator::from_config(&Config::default())
}

fn tracked(now: DateTime<Utc>) -> Coordinator {
    let mut c = coordinator();
    c.set_extraction_tab(TabId::from(MAIN), now);
    c
}

fn meta(button: &str) -> SessionMetadata {
    SessionMetadata {
        course: "CS101".to_string(),
        button_id: Some(button.to_string()),
        ..Default::default()
    }
}

fn child(id: &str, url: &str) -> TabInfo {
    TabInfo::new(id, url).with_opener(MAIN)
}

fn pushed(effects: &[Effect]) -> Vec<&CapturedRecording> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Push(Envelope {
                message: PageMessage::RecordingCaptured { recording },
                ..
            }) => Some(recording),
            _ => None,
        })
        .collect()
}

#[test]
fn test_child_tab_with_recording_url_is_captured() {
    let now = Utc::now();
    let mut c = tracked(now);
    let token = c.expect_recording(meta("ver1"), now);

    let effects = c.observe(TabEvent::Created(child("t1", REC_A)), now);

    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].url, REC_A);
    assert_eq!(captures[0].token, Some(token));
    assert_eq!(captures[0].button_id(), Some("ver1"));

    assert_eq!(pushed(&effects).len(), 1);
    assert_eq!(
        effects.last(),
        Some(&Effect::CloseTabLater(TabId::from("t1")))
    );
    assert!(matches!(&effects[0], Effect::Push(env) if env.to.as_str() == MAIN));
}

#[test]
fn test_binding_happens_at_creation_before_url_settles() {
    let now = Utc::now();
    let mut c = tracked(now);
    let first = c.expect_recording(meta("ver1"), now);
    let second = c.expect_recording(meta("ver2"), now);

    c.observe(TabEvent::Created(child("t1", "")), now);
    c.observe(TabEvent::Created(child("t2", "about:blank")), now);

    // Second tab's URL settles first.
    c.observe(TabEvent::Navigated(child("t2", REC_B)), now);
    c.observe(TabEvent::Updated(child("t1", REC_A)), now);

    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 2);
    let by_url = |url: &str| captures.iter().find(|r| r.url == url).unwrap();
    assert_eq!(by_url(REC_A).token, Some(first));
    assert_eq!(by_url(REC_B).token, Some(second));
    assert_eq!(by_url(REC_B).button_id(), Some("ver2"));
}

#[test]
fn test_duplicate_url_is_not_appended() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.observe(TabEvent::Created(child("t1", REC_A)), now);
    let effects = c.observe(TabEvent::Created(child("t2", REC_A)), now);

    assert_eq!(c.captured_recordings().len(), 1);
    assert!(pushed(&effects).is_empty());
    assert_eq!(effects, vec![Effect::CloseTabLater(TabId::from("t2"))]);
}

#[test]
fn test_repeated_updates_of_captured_tab_are_ignored() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.observe(TabEvent::Created(child("t1", REC_A)), now);
    let effects = c.observe(TabEvent::Updated(child("t1", REC_A).with_title("Recording")), now);

    assert!(effects.is_empty());
    assert_eq!(c.captured_recordings().len(), 1);
}

#[test]
fn test_non_recording_urls_are_ignored() {
    let now = Utc::now();
    let mut c = tracked(now);
    let effects = c.observe(
        TabEvent::Created(child("t1", "https://zoom.us/j/123456")),
        now,
    );
    assert!(effects.is_empty());
    assert!(c.captured_recordings().is_empty());
}

#[test]
fn test_tabs_from_other_openers_are_ignored() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.expect_recording(meta("ver1"), now);
    let tab = TabInfo::new("t9", REC_A).with_opener("elsewhere");
    assert!(c.observe(TabEvent::Created(tab), now).is_empty());
    assert!(c.captured_recordings().is_empty());
}

#[test]
fn test_nothing_captured_without_extraction_tab() {
    let now = Utc::now();
    let mut c = coordinator();
    assert!(c.observe(TabEvent::Created(child("t1", REC_A)), now).is_empty());
    assert!(c.captured_recordings().is_empty());
}

#[test]
fn test_openerless_tab_adopted_only_while_expecting() {
    let now = Utc::now();
    let mut c = tracked(now);

    c.observe(TabEvent::Created(TabInfo::new("t1", REC_A)), now);
    assert!(c.captured_recordings().is_empty());

    let token = c.expect_recording(meta("ver1"), now);
    c.observe(TabEvent::Created(TabInfo::new("t2", REC_B)), now);
    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].token, Some(token));
}

#[test]
fn test_extraction_tab_itself_is_never_captured() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.expect_recording(meta("ver1"), now);
    let effects = c.observe(TabEvent::Navigated(TabInfo::new(MAIN, REC_A)), now);
    assert!(effects.is_empty());
    assert!(c.captured_recordings().is_empty());
}

#[test]
fn test_retention_purge_happens_on_pass_start() {
    let start = Utc::now();
    let mut c = tracked(start);
    c.observe(TabEvent::Created(child("t1", REC_A)), start);

    // Nothing is purged until the next pass starts.
    let later = start + Duration::seconds(301);
    assert_eq!(c.captured_recordings().len(), 1);

    c.set_extraction_tab(TabId::from(MAIN), later);
    assert!(c.captured_recordings().is_empty());
}

#[test]
fn test_recent_captures_survive_pass_start() {
    let start = Utc::now();
    let mut c = tracked(start);
    c.observe(TabEvent::Created(child("t1", REC_A)), start);
    c.set_extraction_tab(TabId::from(MAIN), start + Duration::seconds(120));
    assert_eq!(c.captured_recordings().len(), 1);
}

#[test]
fn test_clear_drops_captures_and_expectations() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.observe(TabEvent::Created(child("t1", REC_A)), now);
    c.expect_recording(meta("ver1"), now);

    c.clear_captured_recordings();
    assert!(c.captured_recordings().is_empty());

    c.observe(TabEvent::Created(child("t2", REC_B)), now);
    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 1);
    assert!(captures[0].token.is_none());
    assert!(captures[0].expected.is_none());
}

#[test]
fn test_removing_extraction_tab_clears_tracking_only() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.observe(TabEvent::Created(child("t1", REC_A)), now);

    c.observe(TabEvent::Removed(TabId::from(MAIN)), now);
    assert!(c.extraction_tab().is_none());
    assert_eq!(c.captured_recordings().len(), 1);

    assert!(c.observe(TabEvent::Created(child("t2", REC_B)), now).is_empty());
}

#[test]
fn test_removed_child_drops_its_binding() {
    let now = Utc::now();
    let mut c = tracked(now);
    c.expect_recording(meta("ver1"), now);
    c.observe(TabEvent::Created(child("t1", "")), now);
    c.observe(TabEvent::Removed(TabId::from("t1")), now);

    c.observe(TabEvent::Created(child("t2", REC_A)), now);
    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 1);
    assert!(captures[0].token.is_none());
}

#[test]
fn test_click_without_tab_does_not_leak_its_token() {
    let start = Utc::now();
    let mut c = tracked(start);
    let stale = c.expect_recording(meta("ver1"), start);
    // Capture wait for ver1 runs out with no tab.
    let later = start + Duration::seconds(6);
    assert!(c.withdraw_expectation(stale));
    let second = c.expect_recording(meta("ver2"), later);

    c.observe(TabEvent::Created(child("t2", REC_B)), later);

    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].token, Some(second));
    assert_eq!(captures[0].button_id(), Some("ver2"));
}

#[test]
fn test_withdraw_keeps_binding_of_late_tab() {
    let now = Utc::now();
    let mut c = tracked(now);
    let token = c.expect_recording(meta("ver1"), now);
    c.observe(TabEvent::Created(child("t1", "about:blank")), now);

    assert!(!c.withdraw_expectation(token));

    c.observe(TabEvent::Navigated(child("t1", REC_A)), now);
    let captures = c.captured_recordings();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].token, Some(token));
}

#[test]
fn test_provider_tabs_to_close_skips_extraction_tab() {
    let now = Utc::now();
    let mut c = coordinator();
    c.set_extraction_tab(TabId::from("zoom-main"), now);
    let tabs = vec![
        TabInfo::new("zoom-main", "https://utec.zoom.us/rec/share/x"),
        TabInfo::new("a", "https://zoom.us/rec/play/y"),
        TabInfo::new("b", "https://utec.zoom.us/j/1"),
        TabInfo::new("c", "https://conference.utec.edu.pe/schedule"),
        TabInfo::new("d", "https://notzoom.us/"),
    ];
    let ids = c.provider_tabs_to_close(&tabs);
    assert_eq!(ids, vec![TabId::from("a"), TabId::from("b")]);
}

#[test]
fn test_settings_from_config() {
    let mut config = Config::default();
    config.capture.close_tab_delay_ms = 10;
    config.capture.retention_secs = 5;
    let settings = CoordinatorSettings::from_config(&config);
    assert_eq!(settings.close_tab_delay, StdDuration::from_millis(10));
    assert_eq!(settings.retention, Duration::seconds(5));
}
