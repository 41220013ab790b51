use std::sync::{Mutex, MutexGuard};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// # Safety
/// Callers hold `ENV_LOCK` so no other test touches the same vars.
unsafe fn clear_portal_env() {
    unsafe {
        std::env::remove_var("API_URL");
        std::env::remove_var("PORTAL_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("PORTAL_UNTRACKED_PREFIXES");
        std::env::remove_var("PORTAL_BOOTSTRAP_BYPASS_PREFIXES");
    }
}

#[test]
fn from_env_uses_defaults() {
    let _env = lock_env();
    unsafe { clear_portal_env() };

    let cfg = PortalConfig::from_env().unwrap();
    assert_eq!(cfg, PortalConfig::default());
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    assert!(cfg.untracked_prefixes.iter().any(|p| p == "/users/login"));
    assert_eq!(cfg.bootstrap_bypass_prefixes, vec!["/auth".to_owned()]);
}

#[test]
fn from_env_parses_overrides() {
    let _env = lock_env();
    unsafe {
        clear_portal_env();
        std::env::set_var("API_URL", "https://clinic.example.test/api/");
        std::env::set_var("PORTAL_CONNECT_TIMEOUT_SECS", "3");
        std::env::set_var("PORTAL_UNTRACKED_PREFIXES", "/users/login, /events ,,");
        std::env::set_var("PORTAL_BOOTSTRAP_BYPASS_PREFIXES", "/auth,/public");
    }

    let cfg = PortalConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://clinic.example.test/api");
    assert_eq!(cfg.connect_timeout_secs, 3);
    assert_eq!(cfg.untracked_prefixes, vec!["/users/login".to_owned(), "/events".to_owned()]);
    assert_eq!(cfg.bootstrap_bypass_prefixes, vec!["/auth".to_owned(), "/public".to_owned()]);

    unsafe { clear_portal_env() };
}

#[test]
fn from_env_rejects_bad_timeout() {
    let _env = lock_env();
    unsafe {
        clear_portal_env();
        std::env::set_var("PORTAL_CONNECT_TIMEOUT_SECS", "soon");
    }

    let err = PortalConfig::from_env().unwrap_err();
    assert_eq!(
        err,
        ConfigError::Invalid { var: "PORTAL_CONNECT_TIMEOUT_SECS".into(), value: "soon".into() }
    );

    unsafe { clear_portal_env() };
}

#[test]
fn with_api_url_rejects_non_http_scheme() {
    let err = PortalConfig::default().with_api_url("ftp://clinic").unwrap_err();
    assert!(err.to_string().contains("API_URL"));
}

#[test]
fn parse_list_drops_blank_items() {
    assert_eq!(parse_list(" a , ,b,"), vec!["a".to_owned(), "b".to_owned()]);
    assert!(parse_list("").is_empty());
}
