//! Deadline queue for continuations.

use bevy::prelude::*;
use std::time::Duration;

use super::{CancelledSet, Continuation, EntryHeap, ScheduledEntry};

/// Handle для отмены одной запланированной записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct TimerHandle(u64);

/// Resource: очередь continuation'ов, упорядоченная по дедлайну.
///
/// Отмена ленивая: id помечается в `cancelled` и пропускается при извлечении.
#[derive(Resource, Default)]
pub struct ContinuationQueue {
    now: Duration,
    next_id: u64,
    entries: EntryHeap,
    cancelled: CancelledSet,
}

impl ContinuationQueue {
    /// Текущее время симуляции, как его видела последняя `dispatch`.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Duration) {
        // Время монотонно; откат часов не должен перевыпускать старые записи
        if now > self.now {
            self.now = now;
        }
    }

    /// Запланировать `continuation` через `delay_secs` от текущего тика.
    pub fn schedule(&mut self, owner: Entity, delay_secs: f32, continuation: Continuation) -> TimerHandle {
        let delay = Duration::from_secs_f32(delay_secs.max(0.0));
        self.schedule_at(owner, self.now + delay, continuation)
    }

    pub fn schedule_at(&mut self, owner: Entity, deadline: Duration, continuation: Continuation) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.push(ScheduledEntry {
            deadline,
            id,
            owner,
            continuation,
        });

        TimerHandle(id)
    }

    /// Отменить одну запись. Повторная отмена и отмена сработавшей записи: no-op.
    pub fn cancel(&mut self, handle: TimerHandle) {
        if self.entries.iter().any(|e| e.id == handle.0) {
            self.cancelled.insert(handle.0);
        }
    }

    /// Отменить всё, чем владеет entity. Возвращает число отменённых записей.
    pub fn cancel_owner(&mut self, owner: Entity) -> usize {
        let ids: Vec<u64> = self
            .entries
            .iter()
            .filter(|e| e.owner == owner && !self.cancelled.contains(&e.id))
            .map(|e| e.id)
            .collect();

        let count = ids.len();
        self.cancelled.extend(ids);
        count
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        !self.cancelled.contains(&handle.0) && self.entries.iter().any(|e| e.id == handle.0)
    }

    /// Живые (не отменённые) записи.
    pub fn len(&self) -> usize {
        self.entries.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Извлечь все записи с `deadline <= now` в порядке дедлайна.
    pub fn drain_due(&mut self) -> Vec<(Entity, Continuation)> {
        let mut due = Vec::new();

        while let Some(entry) = self.entries.peek() {
            if entry.deadline > self.now {
                break;
            }

            let Some(entry) = self.entries.pop() else {
                break;
            };

            if self.cancelled.remove(&entry.id) {
                continue;
            }

            due.push((entry.owner, entry.continuation));
        }

        due
    }
}
