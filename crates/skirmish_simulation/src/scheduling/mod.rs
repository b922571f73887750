//! Scheduled continuations (recovery timers, residual impulses, delayed despawn, spawn ticks)
//!
//! Вместо корутин: одна очередь с дедлайнами на весь мир.
//! - `schedule` возвращает `TimerHandle` для отмены
//! - уничтожение владельца отменяет все его continuation'ы (observer ниже)
//! - `dispatch_due_continuations` в начале тика превращает созревшие записи в `ContinuationFired`
//!
//! Ни одна запись не блокирует тик: продолжение просто срабатывает на более позднем тике.

use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

pub mod queue;

#[cfg(test)]
mod queue_tests;

pub use queue::{ContinuationQueue, TimerHandle};

/// Что делать, когда дедлайн наступил.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Continuation {
    /// Удалить entity (отложенное уничтожение после смерти)
    Despawn,
    /// Вернуть reaction rig в kinematic режим
    RecoverRig,
    /// Один шаг "хаотичного" остаточного импульса
    ResidualImpulse { magnitude: f32 },
    /// Очередной тик спавнера
    SpawnTick,
    /// Пауза между волнами закончилась
    AdvanceWave,
    /// Пауза после последней волны закончилась
    FinishWaves,
}

/// Event: continuation созрел (владелец ещё существует).
#[derive(Event, Debug, Clone, Copy)]
pub struct ContinuationFired {
    pub owner: Entity,
    pub continuation: Continuation,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ScheduledEntry {
    pub deadline: Duration,
    pub id: u64,
    pub owner: Entity,
    pub continuation: Continuation,
}

// Min-heap по (deadline, id): id монотонный, так что при равных дедлайнах
// порядок срабатывания = порядок постановки
impl Ord for ScheduledEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for ScheduledEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScheduledEntry {}

pub(crate) type EntryHeap = BinaryHeap<ScheduledEntry>;
pub(crate) type CancelledSet = HashSet<u64>;

/// Scheduling Plugin
///
/// Регистрирует очередь, событие `ContinuationFired` и dispatch в `SimSet::Timers`.
pub struct SchedulingPlugin;

impl Plugin for SchedulingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ContinuationQueue>()
            .add_event::<ContinuationFired>()
            .add_observer(cancel_on_damageable_removed)
            .add_observer(cancel_on_rig_removed)
            .add_observer(cancel_on_spawner_removed)
            .add_systems(
                FixedUpdate,
                dispatch_due_continuations.in_set(crate::SimSet::Timers),
            );
    }
}

/// Система: выдать все созревшие continuation'ы
///
/// Записи, чей владелец уже удалён, отбрасываются без события.
pub fn dispatch_due_continuations(
    time: Res<Time>,
    mut queue: ResMut<ContinuationQueue>,
    entities: &bevy::ecs::entity::Entities,
    mut fired: EventWriter<ContinuationFired>,
) {
    queue.set_now(time.elapsed());

    for (owner, continuation) in queue.drain_due() {
        if !entities.contains(owner) {
            crate::log(&format!(
                "⏱️ Dropping {:?} for despawned owner {:?}",
                continuation, owner
            ));
            continue;
        }

        fired.write(ContinuationFired { owner, continuation });
    }
}

fn cancel_on_damageable_removed(
    trigger: Trigger<OnRemove, crate::combat::Damageable>,
    mut queue: ResMut<ContinuationQueue>,
) {
    queue.cancel_owner(trigger.target());
}

fn cancel_on_rig_removed(
    trigger: Trigger<OnRemove, crate::reaction::ReactionRig>,
    mut queue: ResMut<ContinuationQueue>,
) {
    queue.cancel_owner(trigger.target());
}

fn cancel_on_spawner_removed(
    trigger: Trigger<OnRemove, crate::spawning::Spawner>,
    mut queue: ResMut<ContinuationQueue>,
) {
    queue.cancel_owner(trigger.target());
}
