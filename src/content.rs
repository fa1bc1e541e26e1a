// Fixed sector list and the question text for each sector.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::canvas::Rgb;
use crate::error::{CommandError, ContentError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorId {
    Anime,
    Superheroes,
    Gaming,
    Fantasy,
    Sitcoms,
}

impl SectorId {
    pub const ALL: [SectorId; 5] = [
        SectorId::Anime,
        SectorId::Superheroes,
        SectorId::Gaming,
        SectorId::Fantasy,
        SectorId::Sitcoms,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectorId::Anime => "anime",
            SectorId::Superheroes => "superheroes",
            SectorId::Gaming => "gaming",
            SectorId::Fantasy => "fantasy",
            SectorId::Sitcoms => "sitcoms",
        }
    }

    /// Position on the overview and the star ring; also the `1`-`5` hotkey minus one.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<SectorId> {
        SectorId::ALL.get(index).copied()
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectorId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SectorId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CommandError::UnknownSector(s.trim().to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId {
    pub sector: SectorId,
    pub ordinal: usize,
}

impl QuestionId {
    pub fn new(sector: SectorId, ordinal: usize) -> Self {
        QuestionId { sector, ordinal }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sector, self.ordinal)
    }
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub id: SectorId,
    pub label: &'static str,
    pub color: Rgb,
    pub questions: Vec<String>,
}

/// Read-only content, loaded once before the session starts.
#[derive(Clone, Debug)]
pub struct Catalog {
    sectors: Vec<Sector>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let sectors = SectorId::ALL
            .iter()
            .map(|&id| Sector {
                id,
                label: label_for(id),
                color: color_for(id),
                questions: builtin_questions(id).iter().map(|q| q.to_string()).collect(),
            })
            .collect();
        Catalog { sectors }
    }

    /// Built-in catalog with question lists replaced by those in a JSON object
    /// keyed by sector id.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&raw)?;
        info!("loaded question content from {}", path.as_ref().display());
        Ok(catalog)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ContentError> {
        let overrides: HashMap<SectorId, Vec<String>> = serde_json::from_str(raw)?;
        let mut catalog = Self::builtin();
        for sector in &mut catalog.sectors {
            if let Some(questions) = overrides.get(&sector.id) {
                if questions.is_empty() {
                    return Err(ContentError::EmptySector(sector.id));
                }
                sector.questions = questions.clone();
            }
        }
        Ok(catalog)
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector(&self, id: SectorId) -> &Sector {
        // Catalogs are always built from SectorId::ALL, in order.
        &self.sectors[id.index()]
    }

    pub fn questions(&self, id: SectorId) -> &[String] {
        &self.sector(id).questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&str> {
        self.questions(id.sector).get(id.ordinal).map(|q| q.as_str())
    }
}

fn label_for(id: SectorId) -> &'static str {
    match id {
        SectorId::Anime => "ANIME",
        SectorId::Superheroes => "SUPERHEROES",
        SectorId::Gaming => "GAMING",
        SectorId::Fantasy => "FANTASY",
        SectorId::Sitcoms => "SITCOMS / TV SHOWS",
    }
}

fn color_for(id: SectorId) -> Rgb {
    match id {
        SectorId::Anime => Rgb(255, 107, 157),
        SectorId::Superheroes => Rgb(55, 66, 250),
        SectorId::Gaming => Rgb(0, 210, 211),
        SectorId::Fantasy => Rgb(162, 155, 254),
        SectorId::Sitcoms => Rgb(255, 159, 243),
    }
}

fn builtin_questions(id: SectorId) -> &'static [&'static str] {
    match id {
        SectorId::Anime => &[
            "Which anime character would definitely get debarred for low attendance?",
            "If your life was an anime, what would your current episode title be?",
            "Which anime character would cry first after seeing CAT-1 results?",
            "If you had to shout one overdramatic anime dialogue before exams, what would it be?",
        ],
        SectorId::Superheroes => &[
            "If you had one superhero power only during exams, what would you choose?",
            "Which superhero would fail miserably in a group project?",
            "If villains had LinkedIn, what would they list under \"Experience\"?",
            "If you were Spider-Man, what extremely stupid but realistic situation would make you lose a fight?",
        ],
        SectorId::Gaming => &[
            "If your life had a skill tree like a game, which skill are you currently upgrading?",
            "If life had cheat codes, what code would you secretly use?",
            "Imagine your teammate keeps messing up in a ranked match. How do you react?",
            "If you had unlimited lives in real life, what risky thing would you try?",
        ],
        SectorId::Fantasy => &[
            "If magic existed in VIT for one day, what rule would students break first?",
            "Would you rather have a dragon as a pet or an invisibility cloak - and what trouble would you cause?",
            "If you were sorted into a fantasy kingdom, would you be royalty or a random villager who disappears early but does something great?",
            "If you had a magic wand during placements, what would you fix first?",
        ],
        SectorId::Sitcoms => &[
            "Which TV or sitcom character would turn a simple problem into way too much drama?",
            "Which TV character would completely ignore the Table Topics timer and keep talking confidently?",
            "If your life had a laugh track, which everyday moment would trigger it the most?",
            "If your life was a sitcom narrator, which slightly embarrassing moment would they describe?",
        ],
    }
}
