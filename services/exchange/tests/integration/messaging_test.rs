use uuid::Uuid;

use santa_domain::notification::Channel;
use santa_exchange::error::ExchangeServiceError;
use santa_exchange::usecase::messaging::{
    SendAuthCodesUseCase, SendLinksUseCase, SendTestMessageUseCase,
};

use crate::helpers::{
    MockAuditRepo, MockAuthCodeRepo, MockEventRepo, MockNotifier, MockParticipantRepo, audit,
    ledger, test_event, test_participants,
};

const BASE_URL: &str = "https://santa.example.com";

#[tokio::test]
async fn should_report_partial_failures_when_sending_links() {
    let event = test_event();
    let mut people = test_participants(event.id, &["Ana", "Ben", "Cleo"]);
    people[2].email = None;
    let notifier = MockNotifier::failing_for(&["ben@example.com"]);
    let audit_repo = MockAuditRepo::default();

    let uc = SendLinksUseCase {
        events: MockEventRepo::with(vec![event.clone()]),
        participants: MockParticipantRepo::with(people.clone()),
        notifier: notifier.clone(),
        audit: audit(&audit_repo),
        base_url: BASE_URL.to_owned(),
    };
    let report = uc
        .execute(event.id, Channel::Email, Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().any(|e| e.starts_with("Cleo")));

    let emails = notifier.emails.lock().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "ana@example.com");
    let expected_link = format!("{BASE_URL}/pairing/{}", people[0].unique_link);
    assert!(emails[0].html.contains(&expected_link));
    assert_eq!(audit_repo.actions(), vec!["messaging.send_links"]);
}

#[tokio::test]
async fn should_format_whatsapp_numbers() {
    let event = test_event();
    let mut people = test_participants(event.id, &["Ana", "Ben"]);
    people[0].phone_number = Some("612 34 56 78".to_owned());
    people[0].country_code = Some("+34".to_owned());
    people[1].phone_number = Some("(555) 010-0199".to_owned());
    let notifier = MockNotifier::default();

    let uc = SendLinksUseCase {
        events: MockEventRepo::with(vec![event.clone()]),
        participants: MockParticipantRepo::with(people),
        notifier: notifier.clone(),
        audit: audit(&MockAuditRepo::default()),
        base_url: BASE_URL.to_owned(),
    };
    let report = uc
        .execute(event.id, Channel::Whatsapp, Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(report.sent, 2);
    let sent: Vec<String> = notifier
        .whatsapps
        .lock()
        .unwrap()
        .iter()
        .map(|(to, _)| to.clone())
        .collect();
    assert_eq!(sent, vec!["34612345678", "15550100199"]);
}

#[tokio::test]
async fn should_issue_fresh_code_per_participant_when_sending_codes() {
    let event = test_event();
    let people = test_participants(event.id, &["Ana", "Ben", "Cleo"]);
    let codes = MockAuthCodeRepo::default();
    let notifier = MockNotifier::default();

    let uc = SendAuthCodesUseCase {
        events: MockEventRepo::with(vec![event.clone()]),
        participants: MockParticipantRepo::with(people.clone()),
        ledger: ledger(&codes),
        notifier: notifier.clone(),
        audit: audit(&MockAuditRepo::default()),
        base_url: BASE_URL.to_owned(),
    };
    let report = uc
        .execute(event.id, Channel::Email, Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(report.sent, 3);
    assert_eq!(report.failed, 0);
    let emails = notifier.emails.lock().unwrap();
    for (person, email) in people.iter().zip(emails.iter()) {
        let stored = codes.for_participant(person.id);
        assert_eq!(stored.len(), 1);
        assert!(email.html.contains(&stored[0].code));
    }
}

#[tokio::test]
async fn should_fail_send_for_unknown_event() {
    let uc = SendLinksUseCase {
        events: MockEventRepo::default(),
        participants: MockParticipantRepo::default(),
        notifier: MockNotifier::default(),
        audit: audit(&MockAuditRepo::default()),
        base_url: BASE_URL.to_owned(),
    };
    let result = uc
        .execute(Uuid::new_v4(), Channel::Email, Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(ExchangeServiceError::EventNotFound)));
}

#[tokio::test]
async fn should_surface_failed_test_message_as_upstream_unavailable() {
    let ok = SendTestMessageUseCase {
        notifier: MockNotifier::default(),
    };
    ok.execute(Channel::Email, "ops@example.com").await.unwrap();

    let failing = SendTestMessageUseCase {
        notifier: MockNotifier::failing_for(&["ops@example.com"]),
    };
    let result = failing.execute(Channel::Email, "ops@example.com").await;
    assert!(
        matches!(result, Err(ExchangeServiceError::UpstreamUnavailable)),
        "expected UpstreamUnavailable, got {result:?}"
    );
}
