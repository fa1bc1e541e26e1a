pub mod geometry;
pub mod canvas;
pub mod scheduler;
pub mod error;
pub mod content;
pub mod effects;
pub mod view;
pub mod session;
pub mod terminal;
pub mod particles;
pub mod neural;
pub mod starmap;
pub mod hud;
pub mod config;
pub mod app;

pub use geometry::Vec2;
pub use canvas::{Canvas, Rgb};
pub use scheduler::{Engine, FrameScheduler, TaskQueue};
pub use error::{AppError, CommandError, ContentError, SessionError};
pub use content::{Catalog, QuestionId, Sector, SectorId};
pub use effects::{Effect, Effects, LoggedEffects, Tone};
pub use view::{Theme, ViewRequest, ViewState, ViewToggle};
pub use session::{Card, CardState, Phase, Session, Signal};
pub use terminal::{Console, Line, LineKind, Terminal};
pub use particles::ParticleField;
pub use neural::NeuralNetwork;
pub use starmap::{StarMap, ViewTransform, WarpRequest};
pub use config::Config;
pub use app::{App, KeyPress};
