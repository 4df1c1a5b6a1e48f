//! Keepsake demo application
//!
//! Plays a scripted, headless run through the whole presentation: loading,
//! intro, browsing the memory gallery card by card, the letter and the
//! finale. Pass a config file (TOML or RON) and optionally a seed:
//!
//! ```text
//! keepsake_demo [presentation.toml] [seed]
//! ```

use keepsake_engine::prelude::*;
use keepsake_engine::render::SurfaceLog;
use rand::rngs::StdRng;
use rand::SeedableRng;

const FRAME: f32 = 1.0 / 60.0;

/// Stage that narrates every hook to the log
#[derive(Debug, Default)]
struct LoggingStage {
    found: usize,
    finale_started: bool,
}

impl Stage for LoggingStage {
    fn loading_finished(&mut self) {
        log::info!("[stage] loading screen dismissed");
    }

    fn loading_progress(&mut self, loaded: usize, total: usize) {
        log::debug!("[stage] loading {}/{}", loaded, total);
    }

    fn scene_entered(&mut self, scene: SceneId) {
        log::info!("[stage] entered {scene}");
    }

    fn scene_left(&mut self, scene: SceneId) {
        log::info!("[stage] left {scene}");
    }

    fn reset_letter_state(&mut self) {
        log::info!("[stage] letter sealed again");
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        log::debug!("[stage] cursor {:?}", cursor);
    }

    fn set_close_affordance(&mut self, visible: bool) {
        log::debug!("[stage] close button visible: {}", visible);
    }

    fn show_tutorial(&mut self) {
        log::info!("[stage] tutorial: drag to look around, scroll to zoom, tap a card");
    }

    fn dismiss_tutorial(&mut self) {
        log::debug!("[stage] tutorial hidden");
    }

    fn update_memory_counter(&mut self, found: usize, total: usize) {
        self.found = found;
        log::info!("[stage] memories found {}/{}", found, total);
    }

    fn reveal_next_scene_affordance(&mut self, next: SceneId) {
        log::info!("[stage] continue to {next} is now available");
    }

    fn start_finale(&mut self) {
        self.finale_started = true;
        log::info!("[stage] candles lit");
    }
}

struct DemoApp {
    presentation: Presentation<LoggingStage>,
    factory: HeadlessSurfaceFactory,
}

impl DemoApp {
    fn new(config: PresentationConfig, seed: Option<u64>) -> Self {
        let factory = HeadlessSurfaceFactory::new();
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let presentation = Presentation::with_rng(
            config,
            Viewport::default(),
            Box::new(factory.clone()),
            Box::new(ImageFileSource::new(".")),
            LoggingStage::default(),
            rng,
        );
        Self { presentation, factory }
    }

    fn advance(&mut self, seconds: f32) {
        let frames = (seconds / FRAME).ceil() as usize;
        for _ in 0..frames {
            self.presentation.update(FRAME);
        }
    }

    fn run(&mut self) -> Result<(), AppError> {
        log::info!("Loading...");
        while !self.presentation.gate().is_open() {
            self.advance(FRAME);
        }
        self.advance(2.0);
        self.presentation.intro_continue_ready();

        self.presentation.navigate(SceneId::Memory)?;
        self.advance(4.5);
        // Scrolling closer also dismisses the tutorial
        self.presentation.handle_event(AppEvent::Wheel { delta: -100.0 });
        self.advance(0.5);
        self.browse_gallery();

        self.presentation.navigate(SceneId::Letter)?;
        self.advance(1.5);
        self.presentation.navigate(SceneId::Finale)?;
        self.advance(2.5);

        self.report();
        Ok(())
    }

    /// Focus each card in turn until every image has been found
    fn browse_gallery(&mut self) {
        let keys = self
            .presentation
            .gallery()
            .bundle()
            .map(|bundle| bundle.item_keys())
            .unwrap_or_default();

        for key in keys {
            if self.presentation.viewed().is_complete() {
                break;
            }
            let Some((x, y)) = self
                .presentation
                .gallery()
                .bundle()
                .and_then(|bundle| bundle.card_screen_position(key))
            else {
                continue;
            };

            self.presentation.handle_event(AppEvent::PointerMoved { x, y });
            self.presentation.handle_event(AppEvent::PointerPressed);
            self.presentation.handle_event(AppEvent::PointerReleased);
            self.advance(1.5);
            self.presentation.handle_event(AppEvent::KeyPressed(KeyCode::Escape));
            self.advance(1.2);
        }

        // Let the all-found reveal fire
        self.advance(1.0);
    }

    fn report(&self) {
        let log: SurfaceLog = self.factory.log();
        let stage = self.presentation.stage();
        log::info!(
            "Session finished on '{}' after {:.1}s ({} frames): {} memories found, finale started: {}",
            self.presentation.current_scene(),
            self.presentation.clock().total_time(),
            self.presentation.clock().frame_count(),
            stage.found,
            stage.finale_started
        );
        log::info!(
            "Surfaces created {} / disposed {}, {} gallery frames drawn",
            log.created,
            log.disposed,
            log.frames
        );
    }
}

fn load_config(path: Option<&str>) -> Result<PresentationConfig, AppError> {
    let config = match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            PresentationConfig::load_from_file(path)?
        }
        None => PresentationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    keepsake_engine::foundation::logging::init_with_default("info");

    log::info!("Starting Keepsake demo");

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let seed = args.next().and_then(|seed| seed.parse().ok());

    let config = load_config(config_path.as_deref())?;
    let mut app = DemoApp::new(config, seed);

    match app.run() {
        Ok(()) => {
            log::info!("Keepsake demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Keepsake demo failed: {:?}", e);
            Err(e.into())
        }
    }
}
