//! The per-frame pipeline for the hero scene.
//!
//! Within one call to [`HeroScene::frame`] the order is fixed: queued events
//! are applied, the phase machine advances, adapters are sampled, every
//! driver is updated, the camera is placed, and only then does composition
//! read the drivers and write the scene handles. No stage ever blocks.

use crate::camera::{Camera, CameraRig};
use crate::compose::{self, LightingSummary};
use crate::config::SceneConfig;
use crate::constants::MAX_FRAME_DT_SEC;
use crate::drivers::{DriverInputs, Drivers};
use crate::events::{EventQueue, SceneEvent, SceneNotice, Stamped};
use crate::hotspot::{HotspotId, Orbits, Selection};
use crate::orbiters::{roster, OrbiterSpec};
use crate::particles::RainField;
use crate::phase::{LoadingOverlay, PhaseMachine, PhaseStep, ScenePhase};
use crate::reactions::CastleReactions;
use crate::scene::{ParticleBuffer, SceneHandles};
use crate::signals::{ScrollAdapter, ScrollSample, TimeMultipliers, TimeOfDayAdapter};
use crate::story::StoryState;
use crate::weather::WeatherSnapshot;
use glam::Vec2;

/// External signals sampled for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub dt_sec: f32,
    /// Raw page scroll fraction in \[0, 1\].
    pub scroll: f32,
    /// Pointer normalized to \[-0.5, 0.5\]².
    pub pointer: Vec2,
    /// Local wall-clock hour, 0..24.
    pub local_hour: u32,
}

pub struct HeroScene {
    config: SceneConfig,
    frame_index: u64,
    elapsed: f64,
    inbox: Vec<SceneEvent>,
    notices: EventQueue<SceneNotice>,

    phase: PhaseMachine,
    overlay: LoadingOverlay,
    selection: Selection,
    story: StoryState,

    scroll: ScrollAdapter,
    last_scroll: ScrollSample,
    time_of_day: TimeOfDayAdapter,
    time_lighting: bool,
    weather: Option<WeatherSnapshot>,

    drivers: Drivers,
    orbits: Orbits,
    camera: CameraRig,
    reactions: CastleReactions,
    rain: RainField,
    orbiters: Vec<OrbiterSpec>,
    lighting: LightingSummary,
}

impl HeroScene {
    pub fn new(config: SceneConfig) -> Self {
        log::info!(
            "hero scene: mobile={} rain={} seed={}",
            config.mobile,
            config.rain_count,
            config.seed
        );
        Self {
            frame_index: 0,
            elapsed: 0.0,
            inbox: Vec::new(),
            notices: EventQueue::new(),
            phase: PhaseMachine::new(),
            overlay: LoadingOverlay::default(),
            selection: Selection::default(),
            story: StoryState::default(),
            scroll: ScrollAdapter::new(config.story_end),
            last_scroll: ScrollSample::default(),
            time_of_day: TimeOfDayAdapter::default(),
            time_lighting: config.time_lighting,
            weather: None,
            drivers: Drivers::new(),
            orbits: Orbits::new(),
            camera: CameraRig::new(config.reveal_start, config.reveal_end),
            reactions: CastleReactions::new(config.seed.wrapping_add(1)),
            rain: RainField::new(config.rain_count, config.seed),
            orbiters: roster(config.mobile),
            lighting: LightingSummary::default(),
            config,
        }
    }

    /// Empty handle set sized for this scene; attach objects as they load.
    pub fn handles(&self) -> SceneHandles {
        let camera = Camera {
            eye: self.config.reveal_start,
            ..Camera::default()
        };
        SceneHandles::new(camera, self.orbiters.len())
    }

    /// Rain buffer sized for this scene's drop count.
    pub fn rain_buffer(&self) -> ParticleBuffer {
        ParticleBuffer::with_len(self.rain.capacity())
    }

    pub fn orbiters(&self) -> &[OrbiterSpec] {
        &self.orbiters
    }

    /// Queues an event for the next frame.
    pub fn push(&mut self, event: SceneEvent) {
        self.inbox.push(event);
    }

    pub fn drain_notices(&mut self) -> Vec<Stamped<SceneNotice>> {
        self.notices.drain()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Seconds of scene time, kept in `f64` so long sessions stay precise.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase.phase()
    }

    pub fn fog_opacity(&self) -> f32 {
        self.phase.fog_opacity()
    }

    pub fn overlay(&self) -> &LoadingOverlay {
        &self.overlay
    }

    pub fn active_hotspot(&self) -> Option<HotspotId> {
        self.selection.active()
    }

    pub fn story(&self) -> &StoryState {
        &self.story
    }

    pub fn scroll(&self) -> ScrollSample {
        self.last_scroll
    }

    pub fn drivers(&self) -> &Drivers {
        &self.drivers
    }

    pub fn orbits(&self) -> &Orbits {
        &self.orbits
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn reactions(&self) -> &CastleReactions {
        &self.reactions
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn time_multipliers(&self) -> TimeMultipliers {
        self.time_of_day.multipliers(self.time_lighting)
    }

    pub fn lighting(&self) -> &LightingSummary {
        &self.lighting
    }

    pub fn frame(&mut self, input: &FrameInput, handles: &mut SceneHandles) -> LightingSummary {
        let dt = if input.dt_sec.is_finite() {
            input.dt_sec.clamp(0.0, MAX_FRAME_DT_SEC)
        } else {
            0.0
        };
        self.frame_index += 1;
        self.elapsed += f64::from(dt);
        let t = self.elapsed;

        // 1. events
        for event in std::mem::take(&mut self.inbox) {
            self.apply(event);
        }

        // 2. phase
        for step in self.phase.update(dt) {
            let notice = match step {
                PhaseStep::Entered(p) => SceneNotice::PhaseChanged(p),
                PhaseStep::Revealed => SceneNotice::Revealed,
            };
            self.notices.push(self.frame_index, notice);
        }
        self.overlay.update(self.phase.progress());

        // 3. adapters
        let scroll = self.scroll.sample(input.scroll);
        self.last_scroll = scroll;
        self.time_of_day.update(dt, input.local_hour);
        let time = self.time_of_day.multipliers(self.time_lighting);

        // 4. drivers
        self.drivers.update(DriverInputs {
            dt_sec: dt,
            scroll: scroll.adjusted,
            active: self.selection.active(),
            weather: self.weather.as_ref().map(|w| &w.multipliers),
            story_tint: self.story.tints_ambient(),
        });
        self.orbits.update(self.selection.active().is_some());

        // 5. camera
        let story_target = self.story.active.then(|| self.story.camera_target());
        self.camera
            .update(&mut handles.camera, self.phase.phase(), input.pointer, story_target);

        // 6. composition
        self.lighting = compose::lighting(t, scroll.adjusted, time, &self.drivers, &self.story);
        compose::apply_lighting(&self.lighting, handles);
        compose::apply_crystals(t, &self.drivers, &self.orbits, self.selection, handles);
        compose::apply_castle(t, scroll.adjusted, handles);
        compose::apply_atmosphere(&self.drivers, handles);
        if let Some(buf) = handles.rain.as_mut() {
            let wind = self.weather.as_ref().map(|w| w.wind_speed).unwrap_or(0.0);
            self.rain.update(dt, self.drivers.weather.rain, wind, buf);
        }
        self.reactions.update(
            t,
            dt,
            &self.drivers.hotspot,
            self.selection.active(),
            &mut handles.reactions,
            handles.castle_inner.as_mut(),
        );
        for (spec, slot) in self.orbiters.iter().zip(handles.orbiters.iter_mut()) {
            if let Some(h) = slot.as_mut() {
                spec.apply(t, self.drivers.cyan_boost, h);
            }
        }

        log::trace!(
            "frame {}: ambient={:.3} dir={:.3} cyan={:.3}",
            self.frame_index,
            self.lighting.ambient,
            self.lighting.directional,
            self.lighting.cyan
        );
        self.lighting
    }

    fn apply(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::ToggleHotspot(id) => {
                let changed = self.selection.toggle(id);
                self.selection_changed(changed);
            }
            SceneEvent::SetHotspot(next) => {
                let changed = self.selection.set(next);
                self.selection_changed(changed);
            }
            SceneEvent::ClearHotspot => {
                let changed = self.selection.clear();
                self.selection_changed(changed);
            }
            SceneEvent::Story {
                active,
                progress,
                block,
            } => self.story.set(active, progress, block),
            SceneEvent::StoryEnd(end) => self.scroll.set_story_end(end),
            SceneEvent::LoadProgress(p) => self.phase.set_progress(p),
            SceneEvent::Weather(w) => {
                if let Some(w) = &w {
                    log::debug!("weather applied: {}", w.category.as_str());
                }
                self.weather = w;
            }
            SceneEvent::TimeLighting(on) => self.time_lighting = on,
            SceneEvent::OrbitDrag { dx, dy } => {
                self.camera.drag(self.phase.phase(), self.story.active, dx, dy);
            }
        }
    }

    fn selection_changed(&mut self, changed: bool) {
        if changed {
            let active = self.selection.active();
            log::debug!("active hotspot: {:?}", active.map(HotspotId::as_str));
            self.notices
                .push(self.frame_index, SceneNotice::HotspotChanged(active));
        }
    }
}
