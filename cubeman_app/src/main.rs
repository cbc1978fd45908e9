//! Cube-man headless demo
//!
//! Loads the model and level JSON from an asset directory, builds the default
//! scene and plays a scripted input sequence through the environment at a
//! fixed 60 Hz step, logging what a renderer would draw.
//!
//! Usage: `cubeman_demo [asset-dir]` (defaults to `cubeman_app/assets`).

use std::path::{Path, PathBuf};

use cubeman_engine::assets::{AssetError, AssetLibrary, LevelRecord};
use cubeman_engine::config::Config;
use cubeman_engine::ecs::{Environment, EnvironmentError, FrameStatus};
use cubeman_engine::foundation::logging;
use cubeman_engine::foundation::time::Timer;
use cubeman_engine::game::{self, Character, PowerUpManager};
use cubeman_engine::input::{KeyCode, MouseButtons, MouseEvent};
use cubeman_engine::core::config::{ConfigError, GameConfig};

const FRAME_DELTA: f32 = 1.0 / 60.0;
const FRAME_COUNT: u64 = 300;

/// Demo failures
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("assets: {0}")]
    Asset(#[from] AssetError),

    #[error("environment: {0}")]
    Environment(#[from] EnvironmentError),
}

/// One host event fed to the environment
#[derive(Debug, Clone, Copy)]
enum Input {
    Resize(u32, u32),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Drag(f32, f32),
    Hover(f32, f32),
}

/// Frame at which each event is delivered, before that frame's update
const SCRIPT: &[(u64, Input)] = &[
    (0, Input::Resize(1280, 720)),
    (10, Input::KeyDown(KeyCode::Up)),
    (60, Input::KeyDown(KeyCode::Left)),
    (90, Input::KeyUp(KeyCode::Left)),
    (130, Input::KeyDown(KeyCode::Space)),
    (150, Input::KeyDown(KeyCode::Q)),
    (151, Input::Hover(640.0, 360.0)),
    (152, Input::Drag(680.0, 360.0)),
    (153, Input::Drag(720.0, 340.0)),
    (160, Input::KeyDown(KeyCode::W)),
    (180, Input::KeyDown(KeyCode::Q)),
    (240, Input::KeyUp(KeyCode::Up)),
];

struct DemoApp {
    env: Environment,
    timer: Timer,
}

impl DemoApp {
    fn new(asset_dir: &Path) -> Result<Self, DemoError> {
        let config_path = asset_dir.join("config.toml");
        let config = if config_path.exists() {
            log::info!("Loading config from {}", config_path.display());
            GameConfig::load_from_file(&config_path)?
        } else {
            log::info!("No config at {}; using defaults", config_path.display());
            GameConfig::default()
        };

        let mut env = Environment::with_validated_config(config)?;
        game::register_default_entities(&mut env)?;

        Ok(Self { env, timer: Timer::new() })
    }

    fn load(&mut self, asset_dir: &Path) -> Result<(), DemoError> {
        let models = AssetLibrary::load_json_file(asset_dir.join("models.json"))?;
        self.env.on_models_loaded(models);

        let level = LevelRecord::load_json_file(asset_dir.join("level.json"))?;
        self.env.on_level_loaded(level);
        Ok(())
    }

    fn deliver(&mut self, input: Input) {
        match input {
            Input::Resize(width, height) => self.env.on_window_resize(width, height),
            Input::KeyDown(key) => self.env.on_key_down(key),
            Input::KeyUp(key) => self.env.on_key_up(key),
            Input::Hover(x, y) => self.env.on_mouse_over(&MouseEvent::new(x, y, MouseButtons::empty())),
            Input::Drag(x, y) => self.env.on_mouse_move(&MouseEvent::new(x, y, MouseButtons::LEFT)),
        }
    }

    fn run(&mut self) -> Result<(), DemoError> {
        for frame in 0..FRAME_COUNT {
            for (_, input) in SCRIPT.iter().filter(|(at, _)| *at == frame) {
                log::debug!("Frame {}: {:?}", frame, input);
                self.deliver(*input);
            }

            self.timer.advance(FRAME_DELTA);
            match self.env.on_update(self.timer.delta_time())? {
                FrameStatus::Waiting { waited } => log::info!("Waiting for assets ({:.2}s)", waited),
                FrameStatus::Ran { frame } if frame % 60 == 0 => self.report(),
                FrameStatus::Ran { .. } => {}
            }
        }
        self.report();
        Ok(())
    }

    fn report(&self) {
        let view = self.env.render_view();
        let eye = view.camera.position;
        log::info!(
            "t={:.2}s nodes={} boxes={} camera=({:.1}, {:.1}, {:.1}) mode={:?}",
            self.timer.total_time(),
            view.scene.visible_nodes().len(),
            view.collision_boxes.len(),
            eye.x,
            eye.y,
            eye.z,
            self.env.camera().mode(),
        );

        if let Some(character) = self.env.get::<Character>(game::CHARACTER) {
            if let Some(position) = character.position(self.env.scene()) {
                log::info!(
                    "character at ({:.1}, {:.1}, {:.1}), collected {}, blocked {}",
                    position.x,
                    position.y,
                    position.z,
                    character.items_collected(),
                    character.blocked_moves(),
                );
            }
        }
        if let Some(manager) = self.env.get::<PowerUpManager>(game::POWER_UPS) {
            log::info!("{} power-ups remaining", manager.remaining());
        }
        for failure in self.env.failures() {
            log::warn!("'{}' failed during {:?}: {}", failure.name, failure.phase, failure.error);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info");
    log::info!("Starting cube-man demo");

    let asset_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets")), PathBuf::from);

    let mut app = DemoApp::new(&asset_dir)?;
    app.load(&asset_dir)?;

    match app.run() {
        Ok(()) => {
            log::info!("Demo completed");
            Ok(())
        }
        Err(e) => {
            log::error!("Demo failed: {}", e);
            Err(e.into())
        }
    }
}
