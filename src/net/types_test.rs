use super::*;
use serde_json::json;

// =============================================================
// RoleCode
// =============================================================

#[test]
fn dashboard_paths_cover_every_role() {
    assert_eq!(RoleCode::Admin.dashboard_path(), "/admin");
    assert_eq!(RoleCode::Doctor.dashboard_path(), "/doctor");
    assert_eq!(RoleCode::Staff.dashboard_path(), "/staff");
    assert_eq!(RoleCode::Patient.dashboard_path(), "/patient");
}

#[test]
fn role_code_parses_case_insensitively() {
    assert_eq!("doctor".parse::<RoleCode>(), Ok(RoleCode::Doctor));
    assert_eq!(" STAFF ".parse::<RoleCode>(), Ok(RoleCode::Staff));
    assert_eq!("nurse".parse::<RoleCode>(), Err(UnknownRole("nurse".into())));
}

#[test]
fn role_code_uses_uppercase_wire_names() {
    assert_eq!(serde_json::to_value(RoleCode::Patient).unwrap(), json!("PATIENT"));
    for role in RoleCode::ALL {
        assert_eq!(role.to_string(), role.as_str());
    }
}

// =============================================================
// User
// =============================================================

#[test]
fn user_deserializes_backend_shape() {
    let user: User = serde_json::from_value(json!({
        "id": "42",
        "email": "ann@clinic.test",
        "firstName": "Ann",
        "lastName": "Lee",
        "roleCode": "DOCTOR",
        "specialisations": ["cardiology"]
    }))
    .unwrap();

    assert_eq!(user.role, RoleCode::Doctor);
    assert_eq!(user.dashboard_path(), "/doctor");
    assert_eq!(user.display_name(), "Ann Lee");
}

#[test]
fn user_rejects_unknown_role() {
    let result = serde_json::from_value::<User>(json!({ "id": "1", "roleCode": "JANITOR" }));
    assert!(result.is_err());
}

#[test]
fn display_name_falls_back_to_email() {
    let user: User = serde_json::from_value(json!({
        "id": "7",
        "email": "p@clinic.test",
        "roleCode": "PATIENT"
    }))
    .unwrap();
    assert_eq!(user.display_name(), "p@clinic.test");
}

// =============================================================
// Payloads
// =============================================================

#[test]
fn registration_request_omits_absent_optionals() {
    let payload = RegistrationRequest {
        email: "a@b.c".into(),
        password: "pw".into(),
        first_name: "A".into(),
        last_name: "B".into(),
        phone_number: None,
        pesel: None,
    };
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["firstName"], "A");
    assert!(value.get("phoneNumber").is_none());
}

#[test]
fn password_reset_request_uses_camel_case() {
    let payload = PasswordResetRequest {
        token: "t".into(),
        new_password: "n".into(),
        confirm_password: "n".into(),
    };
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value, json!({ "token": "t", "newPassword": "n", "confirmPassword": "n" }));
}

// =============================================================
// ApiError
// =============================================================

#[test]
fn unauthorized_is_only_status_401() {
    assert!(ApiError::Status { status: 401, body: String::new() }.is_unauthorized());
    assert!(!ApiError::Status { status: 403, body: String::new() }.is_unauthorized());
    assert!(!ApiError::Transport("reset".into()).is_unauthorized());
    assert_eq!(ApiError::Decode("x".into()).status(), None);
}

#[test]
fn encode_and_decode_errors_name_their_direction() {
    assert_eq!(ApiError::Encode("bad key".into()).to_string(), "request encode failed: bad key");
    assert_eq!(ApiError::Decode("missing id".into()).to_string(), "response decode failed: missing id");
    assert_eq!(ApiError::Encode("x".into()).status(), None);
}
