use serde_json::json;

use super::*;
use crate::net::api::{CURRENT_USER_ENDPOINT, LOGIN_ENDPOINT};
use crate::net::test_helpers::{ScriptedTransport, ok, status};
use crate::net::types::{ApiError, RoleCode};
use crate::router::routes::LOGIN_PATH;

fn doctor_json() -> serde_json::Value {
    json!({ "id": "d-1", "email": "doc@clinic.test", "firstName": "Dana", "roleCode": "DOCTOR" })
}

fn build(transport: ScriptedTransport) -> (Portal, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    (Portal::new(PortalConfig::default(), transport.clone()), transport)
}

#[tokio::test]
async fn first_visit_without_session_redirects_once() {
    let (mut portal, _) = build(ScriptedTransport::new().reply(CURRENT_USER_ENDPOINT, status(401)));

    let nav = portal.navigate("/doctor").await.unwrap();

    assert_eq!(nav.redirects, vec![LOGIN_PATH.to_owned()]);
    assert_eq!(nav.committed_path(), Some(LOGIN_PATH));
    // The 401 stage also asked for login; the router is already there.
    assert!(portal.process_pending().await.is_empty());
    assert_eq!(portal.router().history(), vec![LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn login_then_dashboard_is_allowed() {
    let (portal, transport) = build(
        ScriptedTransport::new()
            .reply(LOGIN_ENDPOINT, ok(doctor_json()))
            .reply(CURRENT_USER_ENDPOINT, ok(doctor_json())),
    );

    let user = portal.gateway().login("doc@clinic.test", "secret").await.unwrap();
    let nav = portal.navigate(user.dashboard_path()).await.unwrap();

    assert!(nav.allowed());
    assert_eq!(portal.session().role(), Some(RoleCode::Doctor));
    assert_eq!(transport.calls().len(), 2);
    assert!(!portal.loading().is_loading());
}

#[tokio::test]
async fn expired_session_during_domain_call_returns_to_login() {
    let (mut portal, _) = build(
        ScriptedTransport::new()
            .reply(CURRENT_USER_ENDPOINT, ok(doctor_json()))
            .reply("/appointments", status(401)),
    );
    assert!(portal.navigate("/doctor").await.unwrap().allowed());

    let err = portal.request(ApiRequest::get("/appointments")).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!portal.session().is_authenticated());
    assert_eq!(portal.loading().pending(), 0);

    let results = portal.process_pending().await;
    assert_eq!(results.len(), 1);
    let nav = results.into_iter().next().unwrap().unwrap();
    assert!(nav.allowed());
    assert_eq!(portal.router().location().as_deref(), Some(LOGIN_PATH));
}

#[tokio::test]
async fn connect_builds_http_portal_from_config() {
    let config = PortalConfig::default().with_api_url("http://127.0.0.1:9/api/").unwrap();
    let portal = Portal::connect(config).unwrap();
    assert_eq!(portal.config().api_url, "http://127.0.0.1:9/api");
    assert!(!portal.session().is_authenticated());
}

#[tokio::test]
async fn session_check_outage_with_cached_user_redirects_once() {
    for failure in [Err(ApiError::Transport("connection refused".into())), status(503), status(403)] {
        let (mut portal, transport) = build(
            ScriptedTransport::new()
                .reply(LOGIN_ENDPOINT, ok(doctor_json()))
                .reply(CURRENT_USER_ENDPOINT, failure),
        );
        portal.gateway().login("doc@clinic.test", "secret").await.unwrap();

        let nav = portal.navigate("/doctor").await.unwrap();

        assert_eq!(nav.redirects, vec![LOGIN_PATH.to_owned()]);
        assert_eq!(portal.router().location().as_deref(), Some(LOGIN_PATH));
        assert!(!portal.session().is_authenticated());
        assert_eq!(transport.calls().len(), 2);
        assert!(portal.process_pending().await.is_empty());
    }
}
