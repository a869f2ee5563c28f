use santa_domain::event::EventStatus;
use santa_exchange::domain::types::{DEFAULT_CLOSURE_MESSAGE, Event, Participant};
use santa_exchange::error::ExchangeServiceError;
use santa_exchange::usecase::reveal::{
    ListPairingsUseCase, PairingView, Party, RevealPairingUseCase, RevealStateMachine,
    ViewPairingUseCase,
};

use crate::helpers::{
    MockAuditRepo, MockEventRepo, MockPairingRepo, MockParticipantRepo, audit, test_event,
    test_pairing, test_participants,
};

/// Event with Ana → Ben → Cleo → Ana.
struct World {
    event: Event,
    people: Vec<Participant>,
    events: MockEventRepo,
    participants: MockParticipantRepo,
    pairings: MockPairingRepo,
    audit_repo: MockAuditRepo,
}

impl World {
    fn new(event: Event) -> Self {
        let people = test_participants(event.id, &["Ana", "Ben", "Cleo"]);
        let pairings = MockPairingRepo::default();
        {
            let mut stored = pairings.pairings.lock().unwrap();
            for i in 0..people.len() {
                let receiver = &people[(i + 1) % people.len()];
                stored.push(test_pairing(event.id, people[i].id, receiver.id));
            }
        }
        Self {
            events: MockEventRepo::with(vec![event.clone()]),
            participants: MockParticipantRepo::with(people.clone()),
            event,
            people,
            pairings,
            audit_repo: MockAuditRepo::default(),
        }
    }

    fn view(&self) -> ViewPairingUseCase<MockParticipantRepo, MockEventRepo, MockPairingRepo> {
        ViewPairingUseCase {
            participants: self.participants.clone(),
            events: self.events.clone(),
            pairings: self.pairings.clone(),
        }
    }

    fn reveal(
        &self,
    ) -> RevealPairingUseCase<MockParticipantRepo, MockEventRepo, MockPairingRepo, MockAuditRepo>
    {
        RevealPairingUseCase {
            participants: self.participants.clone(),
            events: self.events.clone(),
            machine: RevealStateMachine {
                repo: self.pairings.clone(),
            },
            audit: audit(&self.audit_repo),
        }
    }

    fn admin_view(
        &self,
    ) -> ListPairingsUseCase<MockEventRepo, MockParticipantRepo, MockPairingRepo> {
        ListPairingsUseCase {
            events: self.events.clone(),
            participants: self.participants.clone(),
            pairings: self.pairings.clone(),
        }
    }

    fn link(&self, i: usize) -> &str {
        &self.people[i].unique_link
    }
}

#[tokio::test]
async fn should_keep_first_revealed_at_on_repeat() {
    let w = World::new(test_event());

    let first = w.reveal().execute(w.link(0), |_| true).await.unwrap();
    let second = w.reveal().execute(w.link(0), |_| true).await.unwrap();

    let (PairingView::Ready(a), PairingView::Ready(b)) = (first, second) else {
        panic!("expected ready views");
    };
    assert_eq!(a.receiver_name, "Ben");
    assert!(a.revealed && b.revealed);
    assert!(a.revealed_at.is_some());
    assert_eq!(a.revealed_at, b.revealed_at, "revealed_at never moves");
    assert_eq!(w.audit_repo.actions(), vec!["pairing.reveal"], "audited once");
}

#[tokio::test]
async fn should_conceal_receiver_until_revealed() {
    let w = World::new(test_event());

    let view = w.view().execute(w.link(1), |_| true).await.unwrap();

    assert_eq!(
        view,
        PairingView::ReadyToReveal {
            participant_name: "Ben".to_owned(),
            event_title: w.event.title.clone(),
            rules: w.event.rules.clone(),
        }
    );
    assert!(w.pairings.for_event(w.event.id).iter().all(|p| !p.revealed));
    assert!(w.audit_repo.actions().is_empty());
}

#[tokio::test]
async fn should_show_assignment_once_revealed() {
    let w = World::new(test_event());
    w.reveal().execute(w.link(1), |_| true).await.unwrap();

    let view = w.view().execute(w.link(1), |_| true).await.unwrap();

    let PairingView::Ready(assignment) = view else {
        panic!("expected ready view, got {view:?}");
    };
    assert_eq!(assignment.participant_name, "Ben");
    assert_eq!(assignment.receiver_name, "Cleo");
    assert!(assignment.revealed);
    assert!(assignment.revealed_at.is_some());
}

#[tokio::test]
async fn should_show_closure_before_verification_gate() {
    let mut event = test_event();
    event.status = EventStatus::Closed;
    event.require_auth_codes = true;
    event.closure_message = Some("See you next year".to_owned());
    let w = World::new(event);

    let view = w.view().execute(w.link(0), |_| false).await.unwrap();
    assert_eq!(
        view,
        PairingView::Closed {
            message: "See you next year".to_owned()
        }
    );

    let reveal = w.reveal().execute(w.link(0), |_| false).await.unwrap();
    assert!(matches!(reveal, PairingView::Closed { .. }));
    assert!(w.pairings.for_event(w.event.id).iter().all(|p| !p.revealed));
}

#[tokio::test]
async fn should_fall_back_to_default_closure_text() {
    let mut event = test_event();
    event.status = EventStatus::Closed;
    let w = World::new(event);

    let view = w.view().execute(w.link(2), |_| true).await.unwrap();
    assert_eq!(
        view,
        PairingView::Closed {
            message: DEFAULT_CLOSURE_MESSAGE.to_owned()
        }
    );
}

#[tokio::test]
async fn should_gate_unverified_participant() {
    let mut event = test_event();
    event.require_auth_codes = true;
    let w = World::new(event);

    let view = w.view().execute(w.link(0), |_| false).await.unwrap();
    assert!(matches!(
        view,
        PairingView::VerificationRequired { ref participant_name, .. } if participant_name == "Ana"
    ));

    let result = w.reveal().execute(w.link(0), |_| false).await;
    assert!(
        matches!(result, Err(ExchangeServiceError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
}

#[tokio::test]
async fn should_only_honour_marker_for_resolved_participant() {
    let mut event = test_event();
    event.require_auth_codes = true;
    let w = World::new(event);
    let ben = w.people[1].id;

    // A marker for Ben does not open Ana's page.
    let view = w.view().execute(w.link(0), |id| id == ben).await.unwrap();
    assert!(matches!(view, PairingView::VerificationRequired { .. }));

    let view = w.view().execute(w.link(1), |id| id == ben).await.unwrap();
    assert!(matches!(view, PairingView::ReadyToReveal { .. }));
}

#[tokio::test]
async fn should_report_not_assigned_before_generation() {
    let w = World::new(test_event());
    w.pairings.pairings.lock().unwrap().clear();

    let view = w.view().execute(w.link(0), |_| true).await.unwrap();
    assert!(matches!(view, PairingView::NotAssigned { .. }));

    let result = w.reveal().execute(w.link(0), |_| true).await;
    assert!(matches!(result, Err(ExchangeServiceError::PairingNotFound)));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_link() {
    let w = World::new(test_event());
    let result = w.view().execute("does-not-exist", |_| true).await;
    assert!(matches!(result, Err(ExchangeServiceError::ParticipantNotFound)));
}

#[tokio::test]
async fn should_hide_identities_but_keep_counts_for_admins() {
    let mut event = test_event();
    event.hide_pairings_from_admins = true;
    let w = World::new(event);
    w.reveal().execute(w.link(0), |_| true).await.unwrap();

    let view = w.admin_view().execute(w.event.id).await.unwrap();

    assert!(view.hidden);
    assert_eq!(view.rows.len(), 3);
    assert!(
        view.rows
            .iter()
            .all(|r| r.giver == Party::Hidden && r.receiver == Party::Hidden)
    );
    assert_eq!(view.counts.participant_count, 3);
    assert_eq!(view.counts.pairing_count, 3);
    assert_eq!(view.counts.revealed_count, 1);
    assert_eq!(view.rows.iter().filter(|r| r.revealed).count(), 1);
}

#[tokio::test]
async fn should_name_parties_when_not_hidden() {
    let w = World::new(test_event());

    let view = w.admin_view().execute(w.event.id).await.unwrap();

    assert!(!view.hidden);
    let ana = &w.people[0];
    let row = view
        .rows
        .iter()
        .find(|r| matches!(&r.giver, Party::Visible { id, .. } if *id == ana.id))
        .unwrap();
    assert_eq!(
        row.receiver,
        Party::Visible {
            id: w.people[1].id,
            name: "Ben".to_owned()
        }
    );
}
