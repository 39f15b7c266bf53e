//! Marsh - a small 3D platformer
//!
//! This is the main entry point: window, input, audio and the scene loop.

mod settings;
mod state;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use marsh_audio::{AmbientAudioLoop, AmbientSlot, AudioEngine, Install};
use marsh_core::{Animator, GameTime, TimeConfig};
use marsh_game::{
    FrameInput, GameEvent, InputAction, InputHandler, LevelDesc, Scene, SceneHost, SoundCue,
};

use settings::GameSettings;
use state::ApplicationState;

/// Step applied by the volume keys
const VOLUME_STEP: f32 = 0.1;

/// Animator that reports parameter changes to the log
#[derive(Default)]
struct TraceAnimator {
    params: HashMap<String, bool>,
}

impl Animator for TraceAnimator {
    fn set_bool(&mut self, name: &str, value: bool) {
        if self.params.insert(name.to_string(), value) != Some(value) {
            debug!("Animator {} = {}", name, value);
        }
    }
}

/// Application state
struct MarshApp {
    window: Option<Arc<Window>>,
    settings: GameSettings,
    state: ApplicationState,
    game_time: GameTime,
    last_frame: Option<Instant>,
    input: InputHandler,
    audio: Option<AudioEngine>,
    ambient: AmbientSlot,
    scene: Option<Scene>,
}

impl MarshApp {
    fn new(settings: GameSettings) -> Self {
        let audio = match AudioEngine::new(settings.audio.engine_config()) {
            Ok(mut engine) => {
                register_cues(&mut engine, &settings);
                Some(engine)
            }
            Err(e) => {
                warn!("Audio unavailable, running silent: {}", e);
                None
            }
        };
        let start = settings.levels.start.clone();

        Self {
            window: None,
            settings,
            state: ApplicationState::start(start),
            game_time: GameTime::new(TimeConfig::default()),
            last_frame: None,
            input: InputHandler::new(),
            audio,
            ambient: AmbientSlot::new(),
            scene: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("Marsh")
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = event_loop
            .create_window(window_attrs)
            .context("Failed to create window")?;
        self.window = Some(Arc::new(window));
        info!("Window initialized");
        Ok(())
    }

    fn start_music(&mut self) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        let playlist = AmbientAudioLoop::new(
            self.settings.audio.playlist.clone(),
            self.settings.audio.music,
        );
        if let Install::Installed = self.ambient.install(playlist, audio) {
            info!("Ambient music started");
        }
    }

    /// Returns true when the scene was replaced
    fn load_scene(&mut self, name: &str) -> bool {
        let path = LevelDesc::path_for(&self.settings.levels.dir, name);
        let desc = match LevelDesc::load(&path) {
            Ok(desc) => desc,
            Err(e) => {
                error!("Failed to load scene '{}': {}", name, e);
                return false;
            }
        };

        let host = SceneHost {
            animator: Some(Box::new(TraceAnimator::default())),
            teleport_cue: self
                .audio
                .as_ref()
                .and_then(|audio| audio.cue_duration(SoundCue::Teleport.name()))
                .map(|d| d.as_secs_f32()),
            ..Default::default()
        };

        match Scene::load(&desc, &self.settings.gameplay, host) {
            Ok(scene) => {
                info!("Entered scene '{}'", scene.name());
                self.scene = Some(scene);
                true
            }
            Err(e) => {
                error!("Failed to build scene '{}': {}", name, e);
                false
            }
        }
    }

    fn adjust_music_volume(&mut self, step: f32) {
        let (Some(audio), Some(ambient)) = (self.audio.as_mut(), self.ambient.get_mut()) else {
            return;
        };
        let volume = ambient.volume() + step;
        ambient.set_volume(volume, audio, &mut self.settings);
        info!("Music volume {:.1}", ambient.volume());
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PlayCue(cue) => {
                if let Some(audio) = self.audio.as_mut() {
                    if let Err(e) = audio.play_cue(cue.name()) {
                        warn!("Could not play cue '{}': {}", cue.name(), e);
                    }
                }
            }
            GameEvent::HudText(text) => {
                info!("{}", text);
                if let Some(window) = &self.window {
                    window.set_title(&format!("Marsh - {}", text));
                }
            }
            GameEvent::LoadScene(name) => {
                let from = self.scene.as_ref().map(|scene| scene.name().to_owned());
                self.state = ApplicationState::travel(name, from);
            }
            GameEvent::CameraShake(offset) => {
                debug!("Camera shake {:?}", offset);
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let raw_delta = match self.last_frame {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);
        self.game_time.update(raw_delta);

        if self.input.state.is_just_pressed(InputAction::Quit) {
            self.state = ApplicationState::Exiting;
        }
        if self.input.state.is_just_pressed(InputAction::VolumeUp) {
            self.adjust_music_volume(VOLUME_STEP);
        }
        if self.input.state.is_just_pressed(InputAction::VolumeDown) {
            self.adjust_music_volume(-VOLUME_STEP);
        }

        while let ApplicationState::Loading(pending) = &self.state {
            let pending = pending.clone();
            let loaded = self.load_scene(&pending.scene);
            if !loaded {
                // The old scene may be mid-teleport and unplayable
                self.scene = None;
            }
            self.state = pending.resolve(loaded);
        }

        if self.state == ApplicationState::Exiting {
            event_loop.exit();
            return;
        }

        let delta = self.game_time.delta_time;
        let steps = self.game_time.fixed_steps();
        let timestep = self.game_time.fixed_timestep();
        let events = match self.scene.as_mut() {
            Some(scene) => {
                scene.update(&FrameInput::sample(&self.input.state), delta);
                for _ in 0..steps {
                    scene.fixed_update(timestep);
                }
                scene.drain_events()
            }
            None => Vec::new(),
        };
        for event in events {
            self.handle_event(event);
        }

        if let Some(audio) = self.audio.as_mut() {
            self.ambient.update(audio);
            audio.update();
        }
        self.input.end_frame();
    }
}

impl ApplicationHandler for MarshApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            error!("{:#}", e);
            event_loop.exit();
            return;
        }
        self.start_music();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.handle_keyboard(event.physical_key, event.state);
            }
            WindowEvent::Focused(false) => {
                self.input.clear_all();
                self.game_time.pause();
            }
            WindowEvent::Focused(true) => {
                self.game_time.resume();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.frame(event_loop);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(audio) = self.audio.as_mut() {
            self.ambient.teardown(audio);
        }
        info!("Shutting down");
    }
}

fn register_cues(engine: &mut AudioEngine, settings: &GameSettings) {
    let cues = [
        (SoundCue::Eat, &settings.audio.eat_cue),
        (SoundCue::Teleport, &settings.audio.teleport_cue),
    ];
    for (cue, path) in cues {
        let Some(path) = path else {
            continue;
        };
        match engine.register_cue(cue.name(), path) {
            Ok(length) => debug!("Registered cue '{}' ({:.2}s)", cue.name(), length.as_secs_f32()),
            Err(e) => warn!("Could not load cue '{}' from {:?}: {}", cue.name(), path, e),
        }
    }
}

fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    info!("Starting Marsh...");

    let settings = GameSettings::load();

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = MarshApp::new(settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}
