// One-shot cosmetic triggers. The kiosk only fires them; nothing reads back.

use log::debug;

use crate::content::{QuestionId, SectorId};
use crate::geometry::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Hover,
    Select,
    Blocked,
    Portal,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Burst { at: Vec2 },
    Ripple { at: Vec2 },
    SectorExplosion(SectorId),
    Portal(QuestionId),
    Denied(QuestionId),
    LockAnimation(QuestionId),
    Celebration,
    SignOff,
    Tone(Tone),
}

pub trait Effects {
    fn trigger(&mut self, effect: &Effect);
}

/// Stand-in collaborator that records effects in the log only.
#[derive(Default)]
pub struct LoggedEffects {
    fired: u64,
}

impl LoggedEffects {
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

impl Effects for LoggedEffects {
    fn trigger(&mut self, effect: &Effect) {
        self.fired += 1;
        debug!("effect: {:?}", effect);
    }
}
