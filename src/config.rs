use std::path::PathBuf;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::content::Catalog;
use crate::error::ContentError;
use crate::neural::NODE_COUNT;
use crate::particles::PARTICLE_COUNT;

#[derive(Parser, Debug, Clone)]
#[command(name = "holotopics")]
#[command(about = "Holographic conversation-topic kiosk")]
#[command(version)]
pub struct Config {
    /// Window width in pixels
    #[arg(long, default_value = "800")]
    pub width: usize,

    /// Window height in pixels
    #[arg(long, default_value = "600")]
    pub height: usize,

    /// Target frames per second
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Seed for every random draw (omit for a fresh seed per run)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of ambient particles
    #[arg(long, default_value_t = PARTICLE_COUNT)]
    pub particles: usize,

    /// Number of neural backdrop nodes
    #[arg(long, default_value_t = NODE_COUNT)]
    pub nodes: usize,

    /// JSON file overriding question lists per sector
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 800,
            height: 600,
            fps: 60,
            seed: None,
            particles: PARTICLE_COUNT,
            nodes: NODE_COUNT,
            content: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn load_catalog(&self) -> Result<Catalog, ContentError> {
        match &self.content {
            Some(path) => {
                info!("loading questions from {}", path.display());
                Catalog::from_json_path(path)
            }
            None => Ok(Catalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn defaults_match_the_kiosk_surface() {
        let config = Config::parse_from(["holotopics"]);
        assert_eq!((config.width, config.height, config.fps), (800, 600, 60));
        assert_eq!(config.particles, PARTICLE_COUNT);
        assert_eq!(config.nodes, NODE_COUNT);
        assert!(config.content.is_none());
        assert_eq!(config.log_level, Config::default().log_level);
    }

    #[test]
    fn seeded_configs_draw_the_same_numbers() {
        let config = Config::parse_from(["holotopics", "--seed", "7", "--particles", "10"]);
        assert_eq!(config.particles, 10);
        let a: u64 = config.rng().r#gen();
        let b: u64 = config.rng().r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_content_file_is_an_io_error() {
        let config = Config {
            content: Some(PathBuf::from("/nonexistent/holotopics.json")),
            ..Config::default()
        };
        assert!(matches!(config.load_catalog(), Err(ContentError::Io(_))));
    }
}
