use super::*;

// =============================================================
// Request counter
// =============================================================

#[test]
fn starts_idle() {
    let loading = LoadingState::new();
    assert_eq!(loading.snapshot(), LoadingSnapshot::default());
    assert!(!loading.is_loading());
    assert!(!loading.is_operator_loading());
}

#[test]
fn overlapping_tickets_keep_loading_until_last_drop() {
    let loading = LoadingState::new();
    let first = loading.begin();
    let second = loading.begin();
    let third = loading.begin();
    assert_eq!(loading.pending(), 3);

    drop(second);
    assert!(loading.is_loading());
    drop(first);
    assert!(loading.is_loading());
    drop(third);
    assert!(!loading.is_loading());
    assert_eq!(loading.pending(), 0);
}

#[test]
fn clones_share_the_same_counter() {
    let loading = LoadingState::new();
    let view = loading.clone();
    let ticket = loading.begin();
    assert!(view.is_loading());
    drop(ticket);
    assert!(!view.is_loading());
}

// =============================================================
// Operator counter
// =============================================================

#[test]
fn operator_counter_is_independent() {
    let loading = LoadingState::new();
    loading.show_operator();
    assert!(loading.is_operator_loading());
    assert!(!loading.is_loading());

    let ticket = loading.begin();
    loading.hide_operator();
    assert!(!loading.is_operator_loading());
    assert!(loading.is_loading());
    drop(ticket);
}

#[test]
fn operator_hide_clamps_at_zero() {
    let loading = LoadingState::new();
    loading.hide_operator();
    loading.hide_operator();
    assert_eq!(loading.snapshot().operator, 0);

    loading.show_operator();
    assert!(loading.is_operator_loading());
    loading.hide_operator();
    assert!(!loading.is_operator_loading());
}

// =============================================================
// Subscriptions
// =============================================================

#[tokio::test]
async fn subscribers_see_loading_transitions() {
    let loading = LoadingState::new();
    let mut changes = loading.subscribe();

    let ticket = loading.begin();
    changes.changed().await.unwrap();
    assert!(changes.borrow_and_update().is_loading());

    drop(ticket);
    changes.changed().await.unwrap();
    assert!(!changes.borrow_and_update().is_loading());
}
