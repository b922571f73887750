//! Tests for the continuation queue.

use super::*;
use std::time::Duration;

fn owner(index: u32) -> Entity {
    Entity::from_raw(index)
}

#[test]
fn test_due_entries_fire_in_deadline_order() {
    let mut queue = ContinuationQueue::default();
    queue.schedule(owner(1), 0.3, Continuation::SpawnTick);
    queue.schedule(owner(2), 0.1, Continuation::Despawn);
    queue.schedule(owner(3), 0.2, Continuation::RecoverRig);

    queue.set_now(Duration::from_secs_f32(0.25));
    let due = queue.drain_due();

    assert_eq!(
        due,
        vec![
            (owner(2), Continuation::Despawn),
            (owner(3), Continuation::RecoverRig),
        ]
    );
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_equal_deadlines_keep_scheduling_order() {
    let mut queue = ContinuationQueue::default();
    for i in 0..4 {
        queue.schedule(owner(i), 0.5, Continuation::ResidualImpulse { magnitude: i as f32 });
    }

    queue.set_now(Duration::from_secs(1));
    let owners: Vec<Entity> = queue.drain_due().into_iter().map(|(o, _)| o).collect();

    assert_eq!(owners, vec![owner(0), owner(1), owner(2), owner(3)]);
}

#[test]
fn test_cancelled_handle_never_fires() {
    let mut queue = ContinuationQueue::default();
    let handle = queue.schedule(owner(1), 0.1, Continuation::RecoverRig);
    queue.schedule(owner(1), 0.1, Continuation::Despawn);

    assert!(queue.is_pending(handle));
    queue.cancel(handle);
    queue.cancel(handle); // повторная отмена: no-op
    assert!(!queue.is_pending(handle));
    assert_eq!(queue.len(), 1);

    queue.set_now(Duration::from_secs(1));
    assert_eq!(queue.drain_due(), vec![(owner(1), Continuation::Despawn)]);
    assert!(queue.is_empty());
}

#[test]
fn test_cancel_owner_removes_only_that_owner() {
    let mut queue = ContinuationQueue::default();
    queue.schedule(owner(1), 0.1, Continuation::ResidualImpulse { magnitude: 1.0 });
    queue.schedule(owner(1), 0.2, Continuation::ResidualImpulse { magnitude: 1.0 });
    queue.schedule(owner(2), 0.1, Continuation::SpawnTick);

    assert_eq!(queue.cancel_owner(owner(1)), 2);
    assert_eq!(queue.cancel_owner(owner(1)), 0);

    queue.set_now(Duration::from_secs(1));
    assert_eq!(queue.drain_due(), vec![(owner(2), Continuation::SpawnTick)]);
}

#[test]
fn test_clock_never_moves_backwards() {
    let mut queue = ContinuationQueue::default();
    queue.set_now(Duration::from_secs(2));
    queue.set_now(Duration::from_secs(1));
    assert_eq!(queue.now(), Duration::from_secs(2));

    // Дедлайн считается от "now", а не от нуля
    queue.schedule(owner(1), 0.5, Continuation::SpawnTick);
    queue.set_now(Duration::from_millis(2400));
    assert!(queue.drain_due().is_empty());
    queue.set_now(Duration::from_millis(2500));
    assert_eq!(queue.drain_due().len(), 1);
}
