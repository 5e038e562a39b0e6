//! Queues that move notifications out of the ticker.
//!
//! Systems and observers never call host code directly. Sprite-level events
//! land in the scene's [`SignalQueue`] during a tick; the owning effect drains
//! it once the tick (render included) has finished and turns the signals into
//! host callbacks on a [`TaskQueue`]. The host runs that queue on its next
//! turn, so callbacks always observe a committed frame and never re-enter the
//! ticker.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};

use crate::components::motion::Side;

/// Notification raised by a sprite during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteSignal {
    /// The frame sequence finished; `forced` when a boundary cut it short.
    FramesEnded { entity: Entity, forced: bool },
    BoundaryHit { entity: Entity, side: Side },
}

impl SpriteSignal {
    pub fn entity(&self) -> Entity {
        match self {
            SpriteSignal::FramesEnded { entity, .. } | SpriteSignal::BoundaryHit { entity, .. } => {
                *entity
            }
        }
    }
}

/// Signals collected during the current tick, in emission order.
#[derive(Resource, Debug, Default)]
pub struct SignalQueue {
    signals: Vec<SpriteSignal>,
}

impl SignalQueue {
    pub fn push(&mut self, signal: SpriteSignal) {
        self.signals.push(signal);
    }

    pub fn drain(&mut self) -> Vec<SpriteSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// FIFO of work to run on the host's next turn.
///
/// [`TaskQueue::take_batch`] only hands out what was queued before the call;
/// anything pushed while a batch runs waits for the following turn.
#[derive(Debug)]
pub struct TaskQueue<T> {
    tasks: VecDeque<T>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: T) {
        self.tasks.push_back(task);
    }

    pub fn take_batch(&mut self) -> Vec<T> {
        self.tasks.drain(..).collect()
    }

    /// Drop everything pending. Returns how many tasks were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.tasks.len();
        self.tasks.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_excludes_tasks_pushed_later() {
        let mut queue = TaskQueue::new();
        queue.push(1);
        queue.push(2);
        let batch = queue.take_batch();
        queue.push(3);
        assert_eq!(batch, vec![1, 2]);
        assert_eq!(queue.take_batch(), vec![3]);
    }

    #[test]
    fn test_clear_reports_dropped() {
        let mut queue = TaskQueue::new();
        queue.push("a");
        assert_eq!(queue.clear(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_signal_queue_drains_in_order() {
        let entity = Entity::PLACEHOLDER;
        let mut queue = SignalQueue::default();
        queue.push(SpriteSignal::BoundaryHit {
            entity,
            side: Side::Right,
        });
        queue.push(SpriteSignal::FramesEnded {
            entity,
            forced: true,
        });
        let drained = queue.drain();
        assert!(matches!(drained[0], SpriteSignal::BoundaryHit { .. }));
        assert!(queue.is_empty());
    }
}
