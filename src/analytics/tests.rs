use super::*;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingForwarder {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl AnalyticsForwarder for RecordingForwarder {
    fn forward(&self, event: &AnalyticsEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct FailingForwarder;

impl AnalyticsForwarder for FailingForwarder {
    fn forward(&self, _event: &AnalyticsEvent) -> anyhow::Result<()> {
        anyhow::bail!("analytics global not loaded")
    }
}

#[test]
fn event_names_match_wire_names() {
    assert_eq!(EventName::PageView.as_str(), "page_view");
    assert_eq!(EventName::RuntimeError.to_string(), "javascript_error");
    assert_eq!(
        serde_json::to_string(&EventName::RuntimeError).unwrap(),
        "\"javascript_error\""
    );
    assert_eq!(
        serde_json::to_string(&EventName::FormSubmission).unwrap(),
        "\"form_submission\""
    );
}

#[test]
fn form_submission_event_carries_status_and_error() {
    let recorder = Arc::new(RecordingForwarder::default());
    let analytics = Analytics::new("/msl.html").with_forwarder(recorder.clone());

    analytics.track_form_submission("msl", SubmissionStatus::Success, None);
    analytics.track_form_submission("kam", SubmissionStatus::Error, Some("no mail client"));

    let events = recorder.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, EventName::FormSubmission);
    assert_eq!(events[0].params["status"], "success");
    assert_eq!(events[0].params["page"], "/msl.html");
    assert!(events[0].params.get("error").is_none());
    assert_eq!(events[1].params["form_type"], "kam");
    assert_eq!(events[1].params["error"], "no mail client");
}

#[test]
fn forwarder_failure_is_swallowed() {
    let analytics = Analytics::new("/").with_forwarder(Arc::new(FailingForwarder));
    let event = analytics.track_page_view("Ask-Nova", "");
    assert_eq!(event.name, EventName::PageView);
    assert_eq!(event.params["title"], "Ask-Nova");
}

#[test]
fn cta_click_trims_text_and_nests_position() {
    let analytics = Analytics::new("/");
    let position = CtaPosition {
        x: 12.0,
        y: 340.5,
        section: section_for(["btn-primary", "pricing", "main"]).to_string(),
    };
    let event = analytics.track_cta_click("  Book a demo \n", &position);
    assert_eq!(event.params["text"], "Book a demo");
    assert_eq!(event.params["position"]["section"], "pricing");
    assert_eq!(event.params["position"]["y"], 340.5);
}

#[test]
fn runtime_error_event_has_location() {
    let analytics = Analytics::new("/about.html");
    let event = analytics.report_runtime_error("boom", "src/site.rs", 42);
    assert_eq!(event.name, EventName::RuntimeError);
    assert_eq!(event.params["line"], 42);
    assert_eq!(event.params["page"], "/about.html");
}

#[test]
fn section_lookup_follows_page_order() {
    assert_eq!(section_for(["contact", "hero"]), "hero");
    assert_eq!(section_for(["sidebar"]), "unknown");
    assert_eq!(section_for(Vec::<&str>::new()), "unknown");
}

#[test]
fn scroll_milestones_fire_once() {
    let mut tracker = ScrollDepthTracker::new();
    // 1000px scrollable
    assert_eq!(tracker.observe(100.0, 1800.0, 800.0), Vec::<u32>::new());
    assert_eq!(tracker.observe(260.0, 1800.0, 800.0), vec![25]);
    assert_eq!(tracker.observe(200.0, 1800.0, 800.0), Vec::<u32>::new());
    // jumping past two milestones reports both
    assert_eq!(tracker.observe(800.0, 1800.0, 800.0), vec![50, 75]);
    assert_eq!(tracker.observe(1000.0, 1800.0, 800.0), vec![100]);
    assert_eq!(tracker.observe(1000.0, 1800.0, 800.0), Vec::<u32>::new());
    assert_eq!(tracker.max_percent(), 100);
}

#[test]
fn short_page_counts_as_fully_scrolled() {
    let mut tracker = ScrollDepthTracker::new();
    assert_eq!(tracker.observe(0.0, 600.0, 800.0), vec![25, 50, 75, 100]);
}

#[test]
fn scroll_depth_event_uses_page_path() {
    let analytics = Analytics::new("/pricing.html");
    let event = analytics.track_scroll_depth(50);
    assert_eq!(event.params["depth"], 50);
    assert_eq!(event.params["page"], "/pricing.html");
}

#[test]
fn panic_reporter_tracks_runtime_error() {
    let recorder = Arc::new(RecordingForwarder::default());
    let analytics = Arc::new(Analytics::new("/").with_forwarder(recorder.clone()));
    let original = std::panic::take_hook();
    analytics.install_panic_reporter();

    let result = std::panic::catch_unwind(|| panic!("widget exploded"));
    drop(std::panic::take_hook());
    std::panic::set_hook(original);

    assert!(result.is_err());
    let events = recorder.events.lock().unwrap();
    let reported = events
        .iter()
        .find(|e| e.name == EventName::RuntimeError && e.params["message"] == "widget exploded")
        .expect("panic was reported");
    assert!(reported.params["filename"].as_str().unwrap().ends_with("tests.rs"));
}
