// Cooperative frame scheduling: one pass over every engine per frame, plus
// deferred fire-and-forget tasks keyed by a logical millisecond clock.

use log::trace;

use crate::canvas::Canvas;

/// A self-contained animation engine that owns its store and its canvas.
pub trait Engine {
    fn name(&self) -> &'static str;

    /// Advance the store by one frame and re-render the canvas.
    fn tick(&mut self, frame: u64);

    /// Resize the canvas in place. Entity positions stay in absolute coordinates.
    fn resize(&mut self, width: usize, height: usize);

    fn canvas(&self) -> &Canvas;
}

pub struct FrameScheduler {
    frame: u64,
    fps: u64,
}

impl FrameScheduler {
    pub fn new(target_fps: u32) -> Self {
        FrameScheduler {
            frame: 0,
            fps: target_fps.max(1) as u64,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Elapsed frames times the frame period, rounded down once.
    pub fn now_ms(&self) -> u64 {
        self.frame * 1000 / self.fps
    }

    /// Run each engine to completion once, then advance the clock.
    pub fn tick(&mut self, engines: &mut [&mut dyn Engine]) {
        for engine in engines.iter_mut() {
            trace!("frame {} tick {}", self.frame, engine.name());
            engine.tick(self.frame);
        }
        self.frame += 1;
    }
}

struct Pending<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

/// Deferred actions drained by the frame loop. Dropping the queue contents is
/// the only cancellation there is.
pub struct TaskQueue<T> {
    pending: Vec<Pending<T>>,
    next_seq: u64,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        TaskQueue {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, task: T) {
        self.pending.push(Pending {
            due_ms: now_ms + delay_ms,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Remove and return every task due at or before `now_ms`, earliest first,
    /// scheduling order breaking ties.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<T> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by_key(|p| (p.due_ms, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }

    /// Remove the earliest task due at or before `now_ms`, with its due time.
    /// Tasks scheduled while popping are seen by the next call.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(i, _)| i)?;
        let p = self.pending.swap_remove(index);
        Some((p.due_ms, p.task))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
