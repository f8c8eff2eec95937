//! Integration tests for the triage-core crate.
//!
//! These exercise the classifier and workflow tracker together the way a
//! front end drives them: classify at creation, then advance on demand.

use chrono::{DateTime, Duration, TimeZone, Utc};

use triage_core::{
    AdvanceOutcome, Channel, Classifier, Clock, Department, LifecycleState, NewRequest,
    Priority, Request, RequesterType, StepClock, SystemClock, WorkflowTracker,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
}

fn create(classifier: &Classifier, clock: &impl Clock, summary: &str, description: &str) -> Request {
    let classification = classifier.classify(summary, description);
    Request::create(
        1,
        NewRequest {
            channel: Channel::Phone,
            requester_type: RequesterType::Resident,
            summary: summary.into(),
            description: description.into(),
        },
        &classification,
        clock.now(),
    )
}

// ═══════════════════════════════════════════════════════════════════════
//  Classifier
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn classification_is_deterministic() {
    let classifier = Classifier::builtin().unwrap();
    let inputs = [
        ("", ""),
        ("Urgent streetlight outage", ""),
        ("Payroll problem", "My benefits and vacation balance look wrong"),
        ("Zoning question", "Need an application for a business permit"),
    ];
    for (summary, description) in inputs {
        let a = classifier.classify(summary, description);
        let b = classifier.classify(summary, description);
        assert_eq!(a, b, "classification of {summary:?} changed between calls");
    }
}

#[test]
fn empty_input_falls_back_to_defaults() {
    let c = Classifier::builtin().unwrap().classify("", "");
    assert_eq!(
        (c.priority, c.department, c.category.as_str()),
        (Priority::Low, Department::GeneralServices, "General")
    );
}

#[test]
fn urgency_and_department_keywords_combine() {
    let c = Classifier::builtin()
        .unwrap()
        .classify_text("urgent streetlight outage");
    assert_eq!(c.priority, Priority::High);
    assert_eq!(c.department, Department::PublicWorks);
    assert_eq!(c.category, "Infrastructure");
    assert_eq!(
        c.keywords_detected,
        vec!["street".to_string(), "streetlight".into(), "urgent".into()]
    );
    assert_eq!(c.confidence, 85);
}

#[test]
fn description_contributes_keywords() {
    let c = Classifier::builtin()
        .unwrap()
        .classify("Cannot log in", "Password reset needed for my laptop");
    assert_eq!(c.department, Department::It);
    assert_eq!(c.category, "Technology");
    assert_eq!(c.department_reason, "Technology and IT support keywords detected");
}

// ═══════════════════════════════════════════════════════════════════════
//  Workflow
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn six_advances_visit_every_state_once() {
    let classifier = Classifier::builtin().unwrap();
    let tracker = WorkflowTracker::with_clock(StepClock::new(start(), Duration::seconds(1)));
    let mut req = create(&classifier, tracker.clock(), "Trash pickup missed", "");

    let mut seen = vec![tracker.current_state(&req)];
    for _ in 0..5 {
        assert!(matches!(
            tracker.advance(&mut req),
            AdvanceOutcome::Advanced { .. }
        ));
        seen.push(tracker.current_state(&req));
    }
    assert_eq!(seen, LifecycleState::ALL.to_vec());

    assert_eq!(tracker.advance(&mut req), AdvanceOutcome::AlreadyTerminal);
    assert_eq!(req.status(), LifecycleState::Closed);
}

#[test]
fn timestamps_are_monotonic() {
    let classifier = Classifier::builtin().unwrap();
    let tracker = WorkflowTracker::new();
    let mut req = create(&classifier, &SystemClock, "Sidewalk cracked", "");
    let created = req.created_at();

    let mut previous = req.updated_at();
    for _ in 0..8 {
        tracker.advance(&mut req);
        assert!(req.updated_at() >= previous);
        assert!(req.created_at() <= req.updated_at());
        assert_eq!(req.created_at(), created);
        previous = req.updated_at();
    }
}

#[test]
fn closed_request_keeps_its_stamp() {
    let classifier = Classifier::builtin().unwrap();
    let tracker = WorkflowTracker::with_clock(StepClock::new(start(), Duration::minutes(10)));
    let mut req = create(&classifier, tracker.clock(), "Road sign down", "");
    while !req.status().is_terminal() {
        tracker.advance(&mut req);
    }

    let closed_at = req.updated_at();
    for _ in 0..4 {
        assert_eq!(tracker.advance(&mut req), AdvanceOutcome::AlreadyTerminal);
        assert_eq!(req.updated_at(), closed_at);
        assert_eq!(req.status(), LifecycleState::Closed);
    }
}

#[test]
fn streetlight_report_end_to_end() {
    let classifier = Classifier::builtin().unwrap();
    let tracker = WorkflowTracker::with_clock(StepClock::new(start(), Duration::minutes(5)));
    let mut req = create(
        &classifier,
        tracker.clock(),
        "broken streetlight on Main Street",
        "",
    );

    assert_eq!(req.channel(), Channel::Phone);
    assert_eq!(req.requester_type(), RequesterType::Resident);
    assert_eq!(req.department(), Department::PublicWorks);
    assert_eq!(req.category(), "Infrastructure");
    assert_eq!(req.priority(), Priority::Medium);
    assert_eq!(req.status(), LifecycleState::New);
    assert_eq!(req.created_at(), req.updated_at());

    tracker.advance(&mut req);
    assert_eq!(req.status(), LifecycleState::Triage);
    assert!(req.updated_at() > req.created_at());
}
