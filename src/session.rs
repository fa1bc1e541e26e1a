// Session state machine: which sector is open, which question was revealed,
// and the set of questions that can never be picked again.
//
// The locked set only ever grows. A successful pick locks the whole sector
// at once; the card grid then catches up through a staggered, purely
// cosmetic lock animation driven by the session's task queue.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::content::{Catalog, QuestionId, SectorId};
use crate::effects::{Effect, Tone};
use crate::error::SessionError;
use crate::scheduler::TaskQueue;
use crate::view::ViewRequest;

/// Upper bound of the random delay before a sibling card starts locking.
pub const LOCK_STAGGER_MAX_MS: u64 = 500;
/// How long a card spends in the locking animation.
pub const LOCK_ANIMATION_MS: u64 = 1000;
/// Delay between a pick and the revealed page.
pub const REVEAL_VIEW_DELAY_MS: u64 = 1500;
/// The session-end page returns to the overview on its own after this long.
pub const SESSION_END_RETURN_MS: u64 = 8000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Overview,
    SectorActive(SectorId),
    QuestionRevealed(QuestionId),
    SessionEnded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardState {
    Hidden,
    Revealed,
    Locking,
    Blocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: QuestionId,
    pub state: CardState,
}

impl Card {
    /// Blocked cards accept no further transition and render as denied.
    pub fn is_inert(&self) -> bool {
        matches!(self.state, CardState::Locking | CardState::Blocked)
    }
}

/// Outgoing requests for the view and cosmetic-effect collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    View(ViewRequest),
    Effect(Effect),
}

#[derive(Clone, Copy, Debug)]
enum SessionTask {
    BeginLock(QuestionId),
    FinishLock(QuestionId),
    ShowRevealed(QuestionId),
    ReturnToOverview,
}

pub struct Session {
    catalog: Catalog,
    phase: Phase,
    locked: BTreeSet<QuestionId>,
    revealed: Option<QuestionId>,
    cards: Vec<Card>,
    tasks: TaskQueue<SessionTask>,
    signals: Vec<Signal>,
    rng: StdRng,
    now_ms: u64,
}

impl Session {
    pub fn new(catalog: Catalog, rng: StdRng) -> Self {
        Session {
            catalog,
            phase: Phase::Overview,
            locked: BTreeSet::new(),
            revealed: None,
            cards: Vec::new(),
            tasks: TaskQueue::new(),
            signals: Vec::new(),
            rng,
            now_ms: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_sector(&self) -> Option<SectorId> {
        match self.phase {
            Phase::SectorActive(sector) => Some(sector),
            Phase::QuestionRevealed(id) => Some(id.sector),
            Phase::Overview | Phase::SessionEnded => None,
        }
    }

    pub fn revealed(&self) -> Option<QuestionId> {
        self.revealed
    }

    pub fn revealed_text(&self) -> Option<&str> {
        self.revealed.and_then(|id| self.catalog.question(id))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn locked(&self) -> &BTreeSet<QuestionId> {
        &self.locked
    }

    pub fn is_locked(&self, id: QuestionId) -> bool {
        self.locked.contains(&id)
    }

    pub fn locked_total(&self) -> usize {
        self.locked.len()
    }

    pub fn locked_in(&self, sector: SectorId) -> usize {
        self.locked.iter().filter(|id| id.sector == sector).count()
    }

    pub fn available_in(&self, sector: SectorId) -> usize {
        self.catalog.questions(sector).len() - self.locked_in(sector)
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Hand queued view/effect requests to the caller.
    pub fn take_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    pub fn enter_sector(&mut self, sector: SectorId) -> Result<(), SessionError> {
        match self.phase {
            Phase::Overview => {}
            Phase::SectorActive(current) if current == sector => {}
            _ => {
                warn!("enter_sector({}) rejected in phase {:?}", sector, self.phase);
                return Err(SessionError::InvalidTransition(
                    "sectors can only be entered from the overview",
                ));
            }
        }

        self.phase = Phase::SectorActive(sector);
        self.rebuild_cards(sector);
        info!(
            "entered sector {} ({} of {} available)",
            sector,
            self.available_in(sector),
            self.cards.len()
        );

        self.signals.push(Signal::Effect(Effect::SectorExplosion(sector)));
        self.signals.push(Signal::Effect(Effect::Tone(Tone::Select)));
        self.signals.push(Signal::View(ViewRequest::SectorActive));
        Ok(())
    }

    /// Reveal one question and lock its whole sector.
    ///
    /// A locked question yields `RejectedLocked` and changes nothing; picking
    /// from a sector that is not open is a contract violation.
    pub fn select_question(&mut self, sector: SectorId, ordinal: usize) -> Result<QuestionId, SessionError> {
        let Some(current) = self.current_sector() else {
            warn!("select_question({}, {}) with no active sector", sector, ordinal);
            return Err(SessionError::InvalidTransition("no sector is active"));
        };
        if current != sector {
            warn!("select_question({}, {}) while {} is active", sector, ordinal, current);
            return Err(SessionError::InvalidTransition(
                "question belongs to a sector that is not active",
            ));
        }

        let count = self.catalog.questions(sector).len();
        if ordinal >= count {
            return Err(SessionError::UnknownQuestion(sector, ordinal));
        }

        let id = QuestionId::new(sector, ordinal);
        if self.locked.contains(&id) {
            debug!("{} is locked, rejecting", id);
            self.signals.push(Signal::Effect(Effect::Denied(id)));
            self.signals.push(Signal::Effect(Effect::Tone(Tone::Blocked)));
            return Err(SessionError::RejectedLocked(id));
        }

        for other in 0..count {
            self.locked.insert(QuestionId::new(sector, other));
        }
        self.revealed = Some(id);
        self.phase = Phase::QuestionRevealed(id);

        let now = self.now_ms;
        for card in &mut self.cards {
            if card.id == id {
                card.state = CardState::Revealed;
            } else if card.state == CardState::Hidden {
                let delay = self.rng.gen_range(0..=LOCK_STAGGER_MAX_MS);
                self.tasks.schedule(now, delay, SessionTask::BeginLock(card.id));
            }
        }
        self.tasks.schedule(now, REVEAL_VIEW_DELAY_MS, SessionTask::ShowRevealed(id));

        info!("revealed {} ({} questions locked)", id, self.locked.len());
        self.signals.push(Signal::Effect(Effect::Portal(id)));
        self.signals.push(Signal::Effect(Effect::Tone(Tone::Portal)));
        Ok(id)
    }

    /// Uniform pick among the sector's unlocked questions, routed through
    /// `select_question`.
    pub fn pick_random_available(&mut self, sector: SectorId) -> Result<QuestionId, SessionError> {
        let available: Vec<usize> = (0..self.catalog.questions(sector).len())
            .filter(|&ordinal| !self.locked.contains(&QuestionId::new(sector, ordinal)))
            .collect();

        let Some(&ordinal) = available.choose(&mut self.rng) else {
            return Err(SessionError::NoAvailableQuestions(sector));
        };
        self.select_question(sector, ordinal)
    }

    /// Valid from any phase. The locked set is left alone.
    pub fn return_to_overview(&mut self) {
        info!("returning to overview from {:?}", self.phase);
        self.phase = Phase::Overview;
        self.revealed = None;
        self.cards.clear();
        self.tasks.clear();
        self.signals.push(Signal::View(ViewRequest::Overview));
    }

    /// From a revealed question back to a freshly built grid of the same sector.
    pub fn return_to_sector(&mut self) -> Result<(), SessionError> {
        let Phase::QuestionRevealed(id) = self.phase else {
            return Err(SessionError::InvalidTransition("no question has been revealed"));
        };
        self.tasks.clear();
        self.revealed = None;
        self.phase = Phase::SectorActive(id.sector);
        self.rebuild_cards(id.sector);
        info!("back to sector {}", id.sector);
        self.signals.push(Signal::View(ViewRequest::SectorActive));
        Ok(())
    }

    pub fn end_session(&mut self) {
        info!("session end requested from {:?}", self.phase);
        self.phase = Phase::SessionEnded;
        self.revealed = None;
        self.cards.clear();
        self.tasks.clear();
        self.tasks.schedule(self.now_ms, SESSION_END_RETURN_MS, SessionTask::ReturnToOverview);
        self.signals.push(Signal::Effect(Effect::SignOff));
        self.signals.push(Signal::View(ViewRequest::SessionEnd));
    }

    /// Move the session clock forward and run every deferred task now due.
    pub fn advance(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        while let Some((due_ms, task)) = self.tasks.pop_due(self.now_ms) {
            self.run_task(due_ms, task);
        }
    }

    /// Chained stages are timed from when the task was due, not when it ran.
    fn run_task(&mut self, due_ms: u64, task: SessionTask) {
        match task {
            SessionTask::BeginLock(id) => {
                if let Some(card) = self.cards.iter_mut().find(|c| c.id == id && c.state == CardState::Hidden) {
                    card.state = CardState::Locking;
                    self.tasks.schedule(due_ms, LOCK_ANIMATION_MS, SessionTask::FinishLock(id));
                    self.signals.push(Signal::Effect(Effect::LockAnimation(id)));
                }
            }
            SessionTask::FinishLock(id) => {
                if let Some(card) = self.cards.iter_mut().find(|c| c.id == id && c.state == CardState::Locking) {
                    card.state = CardState::Blocked;
                    debug!("card {} blocked", id);
                }
            }
            SessionTask::ShowRevealed(id) => {
                if self.phase == Phase::QuestionRevealed(id) {
                    self.signals.push(Signal::Effect(Effect::Celebration));
                    self.signals.push(Signal::View(ViewRequest::Revealed));
                }
            }
            SessionTask::ReturnToOverview => {
                if self.phase == Phase::SessionEnded {
                    self.return_to_overview();
                }
            }
        }
    }

    fn rebuild_cards(&mut self, sector: SectorId) {
        self.cards = (0..self.catalog.questions(sector).len())
            .map(|ordinal| {
                let id = QuestionId::new(sector, ordinal);
                let state = if self.locked.contains(&id) {
                    CardState::Blocked
                } else {
                    CardState::Hidden
                };
                Card { id, state }
            })
            .collect();
    }
}
