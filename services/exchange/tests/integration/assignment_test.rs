use std::collections::HashSet;

use uuid::Uuid;

use santa_exchange::error::ExchangeServiceError;
use santa_exchange::usecase::assignment::{
    GenerateAssignmentInput, GenerateAssignmentUseCase, derange, is_derangement,
};

use crate::helpers::{
    MockAuditRepo, MockEventRepo, MockPairingRepo, MockParticipantRepo, audit, test_event,
    test_participants,
};

fn usecase(
    events: &MockEventRepo,
    participants: &MockParticipantRepo,
    pairings: &MockPairingRepo,
    audit_repo: &MockAuditRepo,
) -> GenerateAssignmentUseCase<MockEventRepo, MockParticipantRepo, MockPairingRepo, MockAuditRepo>
{
    GenerateAssignmentUseCase {
        events: events.clone(),
        participants: participants.clone(),
        pairings: pairings.clone(),
        audit: audit(audit_repo),
    }
}

#[test]
fn should_never_assign_self_over_many_trials() {
    let givers: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let mut rng = rand::rng();
    for _ in 0..1000 {
        let receivers = derange(&givers, &mut rng).unwrap();
        assert!(is_derangement(&givers, &receivers));
        let unique: HashSet<_> = receivers.iter().collect();
        assert_eq!(unique.len(), givers.len(), "every participant receives once");
    }
}

#[tokio::test]
async fn should_pair_every_participant_once_as_giver_and_receiver() {
    let event = test_event();
    let people = test_participants(event.id, &["Ana", "Ben", "Cleo", "Dev", "Eli"]);
    let events = MockEventRepo::with(vec![event.clone()]);
    let participants = MockParticipantRepo::with(people.clone());
    let pairings = MockPairingRepo::default();
    let audit_repo = MockAuditRepo::default();

    let result = usecase(&events, &participants, &pairings, &audit_repo)
        .execute(GenerateAssignmentInput {
            event_id: event.id,
            actor: Uuid::new_v4(),
        })
        .await
        .unwrap();

    assert_eq!(result.len(), people.len());
    let givers: HashSet<_> = result.iter().map(|p| p.giver_id).collect();
    let receivers: HashSet<_> = result.iter().map(|p| p.receiver_id).collect();
    let ids: HashSet<_> = people.iter().map(|p| p.id).collect();
    assert_eq!(givers, ids);
    assert_eq!(receivers, ids);
    assert!(result.iter().all(|p| p.giver_id != p.receiver_id));
    assert!(result.iter().all(|p| !p.revealed && p.revealed_at.is_none()));
    assert_eq!(pairings.for_event(event.id).len(), people.len());
    assert_eq!(audit_repo.actions(), vec!["pairings.generate"]);
}

#[tokio::test]
async fn should_replace_previous_pairings_on_regeneration() {
    let event = test_event();
    let people = test_participants(event.id, &["Ana", "Ben", "Cleo"]);
    let events = MockEventRepo::with(vec![event.clone()]);
    let participants = MockParticipantRepo::with(people);
    let pairings = MockPairingRepo::default();
    let audit_repo = MockAuditRepo::default();
    let uc = usecase(&events, &participants, &pairings, &audit_repo);
    let input = || GenerateAssignmentInput {
        event_id: event.id,
        actor: Uuid::new_v4(),
    };

    let first = uc.execute(input()).await.unwrap();
    let second = uc.execute(input()).await.unwrap();

    let stored = pairings.for_event(event.id);
    assert_eq!(stored.len(), 3, "old rows must not accumulate");
    let first_ids: HashSet<_> = first.iter().map(|p| p.id).collect();
    assert!(stored.iter().all(|p| !first_ids.contains(&p.id)));
    let second_ids: HashSet<_> = second.iter().map(|p| p.id).collect();
    assert!(stored.iter().all(|p| second_ids.contains(&p.id)));
}

#[tokio::test]
async fn should_reject_fewer_than_three_participants() {
    let event = test_event();
    let events = MockEventRepo::with(vec![event.clone()]);
    let participants = MockParticipantRepo::with(test_participants(event.id, &["Ana", "Ben"]));
    let pairings = MockPairingRepo::default();

    let result = usecase(&events, &participants, &pairings, &MockAuditRepo::default())
        .execute(GenerateAssignmentInput {
            event_id: event.id,
            actor: Uuid::new_v4(),
        })
        .await;

    assert!(
        matches!(result, Err(ExchangeServiceError::InsufficientParticipants)),
        "expected InsufficientParticipants, got {result:?}"
    );
    assert!(pairings.for_event(event.id).is_empty());
}

#[tokio::test]
async fn should_surface_generation_in_progress() {
    let event = test_event();
    let events = MockEventRepo::with(vec![event.clone()]);
    let participants =
        MockParticipantRepo::with(test_participants(event.id, &["Ana", "Ben", "Cleo"]));
    let pairings = MockPairingRepo::default();
    pairings.lock_generation();
    let audit_repo = MockAuditRepo::default();

    let result = usecase(&events, &participants, &pairings, &audit_repo)
        .execute(GenerateAssignmentInput {
            event_id: event.id,
            actor: Uuid::new_v4(),
        })
        .await;

    assert!(
        matches!(result, Err(ExchangeServiceError::GenerationInProgress)),
        "expected GenerationInProgress, got {result:?}"
    );
    assert!(audit_repo.actions().is_empty());
}

#[tokio::test]
async fn should_return_event_not_found_for_unknown_event() {
    let result = usecase(
        &MockEventRepo::default(),
        &MockParticipantRepo::default(),
        &MockPairingRepo::default(),
        &MockAuditRepo::default(),
    )
    .execute(GenerateAssignmentInput {
        event_id: Uuid::new_v4(),
        actor: Uuid::new_v4(),
    })
    .await;

    assert!(matches!(result, Err(ExchangeServiceError::EventNotFound)));
}
