// switchboard-core/tests/switch.rs
// ============================================================================
// Module: Switch Tests
// Description: Defaults, condition mutations, and activation decisions.
// ============================================================================
//! ## Overview
//! Covers OR/AND compounding, the parent veto, dirty tracking, and condition
//! events for switches evaluated directly against a store.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

#[path = "support/fixtures.rs"]
mod fixtures;
mod support;

use std::sync::Arc;

use fixtures::fixed;
use fixtures::older_than;
use fixtures::path_is;
use fixtures::request;
use fixtures::user;
use support::TestResult;
use support::ensure;
use switchboard_core::EvaluationError;
use switchboard_core::InMemorySwitchStore;
use switchboard_core::MAX_LINEAGE_DEPTH;
use switchboard_core::RecordingNotifier;
use switchboard_core::Switch;
use switchboard_core::SwitchEventKind;
use switchboard_core::SwitchName;
use switchboard_core::SwitchState;

// ============================================================================
// SECTION: Defaults and States
// ============================================================================

#[test]
fn states_are_distinct() {
    let states = [SwitchState::Disabled, SwitchState::Selective, SwitchState::Global];
    for (index, state) in states.iter().enumerate() {
        for other in states.iter().skip(index + 1) {
            assert_ne!(state, other);
        }
    }
    assert_eq!(SwitchState::default(), SwitchState::Disabled);
}

#[test]
fn new_switch_has_documented_defaults() {
    let switch = Switch::new("movies");
    assert_eq!(switch.name(), &SwitchName::new("movies"));
    assert_eq!(switch.state(), SwitchState::Disabled);
    assert!(!switch.compounded());
    assert!(switch.concent());
    assert!(switch.conditions().is_empty());
    assert!(switch.parent().is_none());
    assert!(switch.children().is_empty());
    assert!(switch.manager().is_none());
    assert!(!switch.is_dirty());
    assert!(switch.description().is_none());
}

// ============================================================================
// SECTION: Condition Mutations
// ============================================================================

#[test]
fn add_then_remove_restores_conditions() -> TestResult {
    let first = older_than(18);
    let second = path_is("/checkout");
    let mut switch = Switch::new("checkout");
    switch.add_condition(first.clone());
    let before: Vec<_> = switch.conditions().to_vec();

    switch.add_condition(second.clone());
    let removed = switch.remove_condition(&second);

    ensure(removed.as_ref() == Some(&second), "removed condition is returned")?;
    ensure(switch.conditions() == before.as_slice(), "prior conditions are restored")?;
    ensure(switch.is_dirty(), "mutations mark the switch dirty")?;
    Ok(())
}

#[test]
fn removing_an_unknown_condition_changes_nothing() {
    let mut switch = Switch::new("checkout");
    switch.add_condition(older_than(18));
    switch.mark_clean();
    assert!(switch.remove_condition(&older_than(18)).is_none());
    assert_eq!(switch.conditions().len(), 1);
    assert!(!switch.is_dirty());
}

#[test]
fn condition_mutations_notify_the_attached_sink() {
    let events = RecordingNotifier::new();
    let condition = older_than(18);
    let mut switch = Switch::new("checkout").with_notifier(Arc::new(events.clone()));
    switch.add_condition(condition.clone());
    switch.remove_condition(&condition);

    let records = events.records();
    assert_eq!(events.kinds(), [SwitchEventKind::ConditionAdded, SwitchEventKind::ConditionRemoved]);
    assert_eq!(records[0].switch, SwitchName::new("checkout"));
    assert_eq!(records[0].condition.as_deref(), Some("user.age > 18"));
}

#[test]
fn unattached_switch_mutates_silently() {
    let mut switch = Switch::new("checkout");
    switch.add_condition(older_than(18));
    assert!(switch.is_dirty());
}

#[test]
fn renaming_marks_dirty_only_on_change() {
    let mut switch = Switch::new("movies");
    switch.set_name("movies");
    assert!(!switch.is_dirty());
    switch.set_name("films");
    assert!(switch.is_dirty());
    assert_eq!(switch.name().as_str(), "films");
}

// ============================================================================
// SECTION: Own Decision
// ============================================================================

#[test]
fn no_conditions_is_always_off() -> TestResult {
    let store = InMemorySwitchStore::new();
    let switch = Switch::new("lonely").with_state(SwitchState::Global);
    ensure(!switch.enabled_for(&[user("ada", 36)], &store)?, "no conditions means off")?;
    Ok(())
}

#[test]
fn no_inputs_is_off_under_both_policies() -> TestResult {
    let store = InMemorySwitchStore::new();
    let mut any = Switch::new("any");
    any.add_condition(fixed(true));
    let all = any.clone().with_compounded(true);
    ensure(!any.enabled_for(&[], &store)?, "OR with no inputs is off")?;
    ensure(!all.enabled_for(&[], &store)?, "AND with no inputs is off")?;
    Ok(())
}

#[test]
fn one_passing_condition_enables_an_uncompounded_switch() -> TestResult {
    let store = InMemorySwitchStore::new();
    let mut switch = Switch::new("any");
    switch.add_condition(fixed(false));
    switch.add_condition(fixed(true));
    switch.add_condition(fixed(false));
    ensure(switch.enabled_for(&[user("ada", 36)], &store)?, "one true condition suffices")?;
    Ok(())
}

#[test]
fn one_failing_condition_disables_a_compounded_switch() -> TestResult {
    let store = InMemorySwitchStore::new();
    let mut switch = Switch::new("all").with_compounded(true);
    switch.add_condition(fixed(true));
    switch.add_condition(fixed(true));
    ensure(switch.enabled_for(&[user("ada", 36)], &store)?, "all true enables")?;
    switch.add_condition(fixed(false));
    ensure(!switch.enabled_for(&[user("ada", 36)], &store)?, "one false disables")?;
    Ok(())
}

#[test]
fn uncompounded_switch_matches_any_input() -> TestResult {
    let store = InMemorySwitchStore::new();
    let mut switch = Switch::new("mixed");
    switch.add_condition(older_than(18));
    switch.add_condition(path_is("/beta"));
    let inputs = [user("kid", 9), request("/beta")];
    ensure(switch.enabled_for(&inputs, &store)?, "request input satisfies the path condition")?;
    ensure(!switch.enabled_for(&inputs[.. 1], &store)?, "the user alone does not")?;
    Ok(())
}

#[test]
fn compounded_switch_rejects_heterogeneous_inputs() -> TestResult {
    let store = InMemorySwitchStore::new();
    let mut switch = Switch::new("strict").with_compounded(true);
    switch.add_condition(older_than(18));
    let inputs = [user("ada", 36), request("/")];
    ensure(switch.own_decision(&inputs[.. 1]), "matching input alone passes")?;
    ensure(!switch.enabled_for(&inputs, &store)?, "a type mismatch counts as a failure")?;
    Ok(())
}

#[test]
fn state_never_changes_the_decision() -> TestResult {
    let store = InMemorySwitchStore::new();
    let mut switch = Switch::new("stateful");
    switch.add_condition(older_than(18));
    let inputs = [user("ada", 36)];
    for state in [SwitchState::Disabled, SwitchState::Selective, SwitchState::Global] {
        switch.set_state(state);
        ensure(switch.enabled_for(&inputs, &store)?, "state is informational")?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Parent Veto
// ============================================================================

/// Stores a parent that passes or fails for every user.
fn store_with_parent(parent_passes: bool) -> InMemorySwitchStore {
    let mut parent = Switch::new("movies");
    parent.add_condition(fixed(parent_passes));
    InMemorySwitchStore::from_switches([parent])
}

/// Child of `movies` whose own conditions always pass.
fn passing_child() -> Switch {
    let mut child = Switch::new("movies:jaws").with_parent("movies");
    child.add_condition(fixed(true));
    child
}

#[test]
fn denying_parent_vetoes_a_concenting_child() -> TestResult {
    let store = store_with_parent(false);
    let child = passing_child();
    ensure(child.own_decision(&[user("ada", 36)]), "child passes on its own")?;
    ensure(!child.enabled_for(&[user("ada", 36)], &store)?, "parent denial vetoes the child")?;
    Ok(())
}

#[test]
fn allowing_parent_defers_to_the_child() -> TestResult {
    let store = store_with_parent(true);
    let mut child = Switch::new("movies:jaws").with_parent("movies");
    child.add_condition(fixed(false));
    ensure(!child.enabled_for(&[user("ada", 36)], &store)?, "parent approval never forces true")?;
    ensure(passing_child().enabled_for(&[user("ada", 36)], &store)?, "both pass")?;
    Ok(())
}

#[test]
fn non_concenting_child_ignores_its_parent() -> TestResult {
    let store = store_with_parent(false);
    let child = passing_child().with_concent(false);
    ensure(child.enabled_for(&[user("ada", 36)], &store)?, "parent is ignored")?;
    Ok(())
}

#[test]
fn unresolvable_parent_counts_as_no_parent() -> TestResult {
    let store = InMemorySwitchStore::new();
    ensure(passing_child().enabled_for(&[user("ada", 36)], &store)?, "missing parent is no veto")?;
    Ok(())
}

#[test]
fn cyclic_lineage_fails_instead_of_recursing() {
    let mut loop_a = Switch::new("a").with_parent("b");
    loop_a.add_condition(fixed(true));
    let mut loop_b = Switch::new("b").with_parent("a");
    loop_b.add_condition(fixed(true));
    let store = InMemorySwitchStore::from_switches([loop_a.clone(), loop_b]);

    let err = loop_a.enabled_for(&[user("ada", 36)], &store).unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::LineageTooDeep { max_depth, .. } if max_depth == MAX_LINEAGE_DEPTH
    ));
}
