use uuid::Uuid;

use santa_exchange::error::ExchangeServiceError;
use santa_exchange::usecase::auth_code::{
    IssueAuthCodeInput, IssueAuthCodeUseCase, VerifyAuthCodeUseCase,
};

use crate::helpers::{
    MockAuditRepo, MockAuthCodeRepo, MockEventRepo, MockParticipantRepo, audit, ledger,
    test_event, test_participant,
};

#[tokio::test]
async fn should_keep_only_latest_code_valid_after_reissue() {
    let participant_id = Uuid::new_v4();
    let codes = MockAuthCodeRepo::default();
    let ledger = ledger(&codes);

    let first = ledger.issue(participant_id, 24).await.unwrap();
    let second = ledger.issue(participant_id, 24).await.unwrap();

    let stored = codes.for_participant(participant_id);
    assert_eq!(stored.len(), 1, "at most one unverified code per participant");
    assert_eq!(stored[0].id, second.id);

    if first.code != second.code {
        let result = ledger.verify(participant_id, &first.code).await;
        assert!(
            matches!(result, Err(ExchangeServiceError::InvalidCode)),
            "superseded code must be rejected, got {result:?}"
        );
    }
    let verified = ledger.verify(participant_id, &second.code).await.unwrap();
    assert!(verified.verified);
    assert!(verified.verified_at.is_some());
}

#[tokio::test]
async fn should_reject_second_verification_of_same_code() {
    let participant_id = Uuid::new_v4();
    let codes = MockAuthCodeRepo::default();
    let ledger = ledger(&codes);
    let issued = ledger.issue(participant_id, 24).await.unwrap();

    ledger.verify(participant_id, &issued.code).await.unwrap();
    let result = ledger.verify(participant_id, &issued.code).await;

    assert!(
        matches!(result, Err(ExchangeServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_expired_code_and_leave_it_unverified() {
    let participant_id = Uuid::new_v4();
    let codes = MockAuthCodeRepo::default();
    let ledger = ledger(&codes);
    let issued = ledger.issue(participant_id, 1).await.unwrap();
    codes.expire_all(participant_id);

    let result = ledger.verify(participant_id, &issued.code).await;

    assert!(
        matches!(result, Err(ExchangeServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );
    assert!(!codes.for_participant(participant_id)[0].verified);
}

#[tokio::test]
async fn should_reject_code_of_another_participant() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let codes = MockAuthCodeRepo::default();
    let ledger = ledger(&codes);
    let issued = ledger.issue(alice, 24).await.unwrap();

    let result = ledger.verify(bob, &issued.code).await;
    assert!(matches!(result, Err(ExchangeServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_issue_six_digit_code_with_event_expiry() {
    let mut event = test_event();
    event.auth_code_expiry_hours = 48;
    let participant = test_participant(event.id, "Ana");
    let codes = MockAuthCodeRepo::default();
    let audit_repo = MockAuditRepo::default();

    let uc = IssueAuthCodeUseCase {
        participants: MockParticipantRepo::with(vec![participant.clone()]),
        events: MockEventRepo::with(vec![event]),
        ledger: ledger(&codes),
        audit: audit(&audit_repo),
    };
    let code = uc
        .execute(IssueAuthCodeInput {
            participant_id: participant.id,
            expiry_hours: None,
            actor: Uuid::new_v4(),
        })
        .await
        .unwrap();

    assert_eq!(code.code.len(), 6);
    assert!(code.code.bytes().all(|b| b.is_ascii_digit()));
    let hours = (code.expires_at - code.created_at).num_hours();
    assert_eq!(hours, 48);
    assert_eq!(audit_repo.actions(), vec!["auth_code.generate"]);
}

#[tokio::test]
async fn should_reject_expiry_outside_allowed_range() {
    let event = test_event();
    let participant = test_participant(event.id, "Ana");
    let uc = IssueAuthCodeUseCase {
        participants: MockParticipantRepo::with(vec![participant.clone()]),
        events: MockEventRepo::with(vec![event]),
        ledger: ledger(&MockAuthCodeRepo::default()),
        audit: audit(&MockAuditRepo::default()),
    };

    for hours in [0, 721] {
        let result = uc
            .execute(IssueAuthCodeInput {
                participant_id: participant.id,
                expiry_hours: Some(hours),
                actor: Uuid::new_v4(),
            })
            .await;
        assert!(
            matches!(result, Err(ExchangeServiceError::InvalidRequest(_))),
            "{hours}h should be rejected, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_verify_through_participant_link() {
    let event = test_event();
    let participant = test_participant(event.id, "Ana");
    let codes = MockAuthCodeRepo::default();
    let issued = ledger(&codes).issue(participant.id, 24).await.unwrap();

    let uc = VerifyAuthCodeUseCase {
        participants: MockParticipantRepo::with(vec![participant.clone()]),
        ledger: ledger(&codes),
    };
    let verified = uc.execute(&participant.unique_link, &issued.code).await.unwrap();
    assert_eq!(verified.id, participant.id);

    let result = uc.execute("no-such-link", &issued.code).await;
    assert!(matches!(result, Err(ExchangeServiceError::ParticipantNotFound)));
}
