use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use santa_core::health::healthz;
use santa_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin_auth::{claim_ownership, finish_sign_in, get_session, sign_out, start_sign_in},
    admins::{approve_admin, list_admins},
    audit::list_audit_logs,
    auth_code::{issue_auth_code, verify_code},
    events::{create_event, delete_event, get_event, list_events, update_event, update_rules},
    health::readyz,
    messaging::{send_auth_codes, send_links, send_test_message},
    pairings::{generate_pairings, list_pairings},
    participants::{add_participant, delete_participant, list_participants, update_moodboard},
    reveal::{reveal_pairing, view_pairing},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Admin sign-in
        .route("/auth/{provider}", get(start_sign_in))
        .route("/auth/{provider}/callback", get(finish_sign_in))
        .route("/admin/claim-ownership", post(claim_ownership))
        .route("/admin/session", get(get_session))
        .route("/admin/session", delete(sign_out))
        // Administrators (owner only)
        .route("/admin/admins", get(list_admins))
        .route("/admin/admins", post(approve_admin))
        // Events
        .route("/admin/events", post(create_event))
        .route("/admin/events", get(list_events))
        .route("/admin/events/{id}", get(get_event))
        .route("/admin/events/{id}", patch(update_event))
        .route("/admin/events/{id}", delete(delete_event))
        .route("/admin/events/{id}/rules", put(update_rules))
        // Participants
        .route("/admin/events/{id}/participants", post(add_participant))
        .route("/admin/events/{id}/participants", get(list_participants))
        .route("/admin/participants/{id}", delete(delete_participant))
        .route("/admin/participants/{id}/moodboard", put(update_moodboard))
        .route("/admin/participants/{id}/auth-code", post(issue_auth_code))
        // Pairings
        .route("/admin/events/{id}/pairings", post(generate_pairings))
        .route("/admin/events/{id}/pairings", get(list_pairings))
        // Messaging
        .route("/admin/events/{id}/messages/links", post(send_links))
        .route("/admin/events/{id}/messages/auth-codes", post(send_auth_codes))
        .route("/admin/messaging/test", post(send_test_message))
        // System health
        .route("/admin/audit-logs", get(list_audit_logs))
        // Participant reveal
        .route("/pairing/{link}", get(view_pairing))
        .route("/pairing/{link}/verify", post(verify_code))
        .route("/pairing/{link}/reveal", post(reveal_pairing))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
