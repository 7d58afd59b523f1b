//! Integration tests for the availability pass.
//!
//! The portal is replaced by a scripted fake; notification delivery is tested
//! both with a recording fake and against a mock Telegram endpoint.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;

use slot_alert::error::{AppError, Result};
use slot_alert::models::{Config, TelegramCredentials};
use slot_alert::services::{Filter, Notifier, RegistrationPortal, SlotChecker, TelegramNotifier};

/// Portal that replays canned result text per course and records every call.
#[derive(Default)]
struct ScriptedPortal {
    results: Vec<(String, String)>,
    fail_filters: bool,
    fail_courses: Vec<String>,
    calls: Vec<String>,
    selected: Option<String>,
}

impl ScriptedPortal {
    fn new(results: &[(&str, &str)]) -> Self {
        Self {
            results: results
                .iter()
                .map(|(c, t)| (c.to_string(), t.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn selections(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| c.strip_prefix("select:"))
            .collect()
    }
}

#[async_trait]
impl RegistrationPortal for ScriptedPortal {
    async fn open(&mut self) -> Result<()> {
        self.calls.push("open".into());
        Ok(())
    }

    async fn apply_filter(&mut self, filter: Filter, value: &str) -> Result<()> {
        self.calls.push(format!("filter:{}={}", filter.name(), value));
        if self.fail_filters {
            return Err(AppError::portal(filter.name(), "control not found"));
        }
        Ok(())
    }

    async fn select_course(&mut self, course: &str) -> Result<()> {
        self.calls.push(format!("select:{course}"));
        if self.fail_courses.iter().any(|c| c == course) {
            return Err(AppError::portal("course", "timed out"));
        }
        self.selected = Some(course.to_string());
        Ok(())
    }

    async fn trigger_query(&mut self) -> Result<()> {
        self.calls.push("query".into());
        Ok(())
    }

    async fn read_result_text(&mut self) -> Result<String> {
        self.calls.push("read".into());
        let selected = self.selected.as_deref().unwrap_or_default();
        Ok(self
            .results
            .iter()
            .find(|(c, _)| c == selected)
            .map(|(_, t)| t.clone())
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<()> {
        self.calls.push("close".into());
        Ok(())
    }
}

/// Notifier that records courses instead of calling out.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, course: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::notify("unreachable"));
        }
        self.sent.lock().unwrap().push(course.to_string());
        Ok(())
    }
}

fn test_config(courses: &[&str]) -> Arc<Config> {
    let mut config = Config::default();
    config.site.courses = courses.iter().map(|c| c.to_string()).collect();
    config.checker.notify_delay_ms = 0;
    Arc::new(config)
}

fn test_credentials() -> TelegramCredentials {
    TelegramCredentials {
        bot_token: "test-token".into(),
        chat_id: "777".into(),
    }
}

#[tokio::test]
async fn checks_courses_in_order_and_notifies_only_available() {
    let config = test_config(&["A", "B"]);
    let mut portal = ScriptedPortal::new(&[
        ("A", "No Record Found for given criteria"),
        ("B", "1 match found"),
    ]);
    let notifier = RecordingNotifier::default();

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    assert!(report.aborted.is_none());
    assert_eq!(report.checked_count(), 2);
    assert!(!report.results[0].available);
    assert!(report.results[1].available);
    assert_eq!(report.notified, vec!["B".to_string()]);
    assert_eq!(notifier.sent(), vec!["B".to_string()]);
    assert_eq!(portal.selections(), vec!["A", "B"]);
}

#[tokio::test]
async fn filters_are_applied_before_the_course_loop() {
    let config = test_config(&["A"]);
    let mut portal = ScriptedPortal::new(&[("A", "no batch available")]);
    let notifier = RecordingNotifier::default();

    SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    let first_select = portal
        .calls
        .iter()
        .position(|c| c.starts_with("select:"))
        .unwrap();
    let calls = &portal.calls[..first_select];
    assert!(calls.contains(&"open".to_string()));
    assert!(calls.contains(&"filter:region=Southern".to_string()));
    assert!(calls.contains(&"filter:pou=HYDERABAD".to_string()));
}

#[tokio::test]
async fn filter_failure_aborts_before_any_course() {
    let config = test_config(&["A", "B"]);
    let mut portal = ScriptedPortal::new(&[]);
    portal.fail_filters = true;
    let notifier = RecordingNotifier::default();

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    assert!(report.aborted.is_some());
    assert_eq!(report.checked_count(), 0);
    assert!(report.notified.is_empty());
    assert!(portal.selections().is_empty());
}

#[tokio::test]
async fn notify_failure_does_not_stop_the_pass() {
    let config = test_config(&["A", "B"]);
    let mut portal =
        ScriptedPortal::new(&[("A", "open batch listed"), ("B", "open batch listed")]);
    let notifier = RecordingNotifier {
        fail: true,
        ..Default::default()
    };

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    assert_eq!(report.checked_count(), 2);
    assert_eq!(report.available_courses(), vec!["A", "B"]);
    assert!(report.notified.is_empty());
}

#[tokio::test]
async fn failed_course_counts_as_unavailable_and_loop_continues() {
    let config = test_config(&["A", "B"]);
    let mut portal = ScriptedPortal::new(&[("B", "seats available")]);
    portal.fail_courses = vec!["A".to_string()];
    let notifier = RecordingNotifier::default();

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    assert_eq!(report.checked_count(), 2);
    assert!(!report.results[0].available);
    assert!(report.results[0].raw_text.is_empty());
    assert!(report.results[1].available);
    assert_eq!(report.notified, vec!["B".to_string()]);
}

#[tokio::test]
async fn stop_after_first_ends_the_pass_early() {
    let mut config = Config::default();
    config.site.courses = vec!["A".into(), "B".into(), "C".into()];
    config.checker.stop_after_first = true;
    config.checker.notify_delay_ms = 0;
    let config = Arc::new(config);

    let mut portal = ScriptedPortal::new(&[
        ("A", "no batch available"),
        ("B", "open batch listed"),
        ("C", "open batch listed"),
    ]);
    let notifier = RecordingNotifier::default();

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    assert_eq!(report.checked_count(), 2);
    assert_eq!(report.notified, vec!["B".to_string()]);
    assert_eq!(portal.selections(), vec!["A", "B"]);
}

#[tokio::test]
async fn sends_exactly_one_telegram_message_for_the_available_course() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body(json!({
                "chat_id": "777",
                "text": "🚨 ICAI SLOT OPEN!\n\nCourse: B\nPOU: HYDERABAD\n\nBook NOW!",
                "parse_mode": "HTML",
            }));
        then.status(200).json_body(json!({ "ok": true }));
    });

    let mut config = Config::default();
    config.site.courses = vec!["A".into(), "B".into()];
    config.checker.notify_delay_ms = 0;
    config.notify.api_base = server.base_url();
    let config = Arc::new(config);

    let notifier = TelegramNotifier::new(
        config.notify.clone(),
        test_credentials(),
        config.site.pou.clone(),
    )
    .unwrap();

    let mut portal = ScriptedPortal::new(&[
        ("A", "No Record Found for given criteria"),
        ("B", "1 match found"),
    ]);

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    mock.assert();
    assert_eq!(report.notified, vec!["B".to_string()]);
}

#[tokio::test]
async fn telegram_api_error_is_surfaced_as_notify_failure() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/bottest-token/sendMessage");
        then.status(502);
    });

    let mut config = Config::default();
    config.notify.api_base = server.base_url();
    let config = Arc::new(config);

    let notifier = TelegramNotifier::new(
        config.notify.clone(),
        test_credentials(),
        config.site.pou.clone(),
    )
    .unwrap();

    let result = notifier.notify("Some Course").await;
    mock.assert();
    assert!(matches!(result, Err(AppError::Notify(_))));
}

#[tokio::test]
async fn notify_server_error_still_completes_the_pass() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/bottest-token/sendMessage");
        then.status(502);
    });

    let mut config = Config::default();
    config.site.courses = vec!["A".into()];
    config.checker.notify_delay_ms = 0;
    config.notify.api_base = server.base_url();
    let config = Arc::new(config);

    let notifier = TelegramNotifier::new(
        config.notify.clone(),
        test_credentials(),
        config.site.pou.clone(),
    )
    .unwrap();

    let mut portal = ScriptedPortal::new(&[("A", "open batch listed")]);

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    mock.assert();
    assert!(report.aborted.is_none());
    assert_eq!(report.checked_count(), 1);
    assert!(report.results[0].available);
    assert!(report.notified.is_empty());
}

#[tokio::test]
async fn unreachable_notify_endpoint_still_completes_the_pass() {
    // grab a free port, then drop the listener so connections are refused
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut config = Config::default();
    config.site.courses = vec!["A".into()];
    config.checker.notify_delay_ms = 0;
    config.notify.api_base = format!("http://127.0.0.1:{port}");
    config.notify.timeout_secs = 2;
    let config = Arc::new(config);

    let notifier = TelegramNotifier::new(
        config.notify.clone(),
        test_credentials(),
        config.site.pou.clone(),
    )
    .unwrap();

    let mut portal = ScriptedPortal::new(&[("A", "open batch listed")]);

    let report = SlotChecker::new(Arc::clone(&config))
        .run(&mut portal, &notifier)
        .await;

    assert!(report.aborted.is_none());
    assert_eq!(report.checked_count(), 1);
    assert!(report.results[0].available);
    assert!(report.notified.is_empty());
}
