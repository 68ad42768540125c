mod net;
mod store;

use anyhow::Context;
use castle_core::reactions::CastleReactions;
use castle_core::scene::{CrystalHandles, LightHandle, MaterialHandle};
use castle_core::{
    Clock, Coordinate, FrameInput, HeroScene, HotspotId, LocationController, SceneConfig,
    SceneEvent, SceneHandles, SystemClock, WeatherCache, WeatherCategory, WeatherRequest,
    WeatherService,
};
use chrono::Timelike;
use clap::Parser;
use glam::{Vec2, Vec3};
use net::{Job, Reply, Worker};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use store::FileStore;

const FPS: u32 = 60;

#[derive(Parser, Debug)]
#[command(
    name = "castle-probe",
    about = "Runs the floating castle hero scene headless and logs its lighting"
)]
struct Args {
    /// Use the narrow-viewport roster and particle counts.
    #[arg(long)]
    mobile: bool,

    /// Simulated run length.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Pace frames to wall-clock time instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Fetch live weather for the current location.
    #[arg(long)]
    weather: bool,

    /// Preview a weather category (clear, clouds, rain, fog, snow, thunderstorm).
    #[arg(long, value_name = "CATEGORY")]
    preview: Option<String>,

    /// Treat these coordinates as a device position fix.
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    /// Forget the stored location and use the default.
    #[arg(long)]
    reset_location: bool,

    #[arg(long, default_value = "castle-location.json")]
    location_file: PathBuf,

    /// Apply wall-clock time-of-day lighting.
    #[arg(long)]
    time_lighting: bool,

    /// Activate a hotspot halfway through the run.
    #[arg(long, value_name = "NAME")]
    hotspot: Option<String>,

    /// Sweep page scroll from top to bottom over the run.
    #[arg(long)]
    scroll_sweep: bool,

    /// Scroll fraction where a story section ends.
    #[arg(long)]
    story_end: Option<f32>,
}

struct Probe {
    scene: HeroScene,
    handles: SceneHandles,
    weather: WeatherService<SystemClock>,
    location: LocationController<FileStore>,
    clock: SystemClock,
    worker: Worker,
}

impl Probe {
    fn request_weather(&mut self, refetch: bool) {
        let coord = self.location.current().coord();
        let req = if refetch {
            self.weather.refetch(coord)
        } else {
            self.weather.request(coord)
        };
        match req {
            WeatherRequest::Disabled => {}
            WeatherRequest::Cached => self.publish_weather(),
            WeatherRequest::Fetch(ticket) => self.worker.send(Job::Forecast(ticket)),
        }
    }

    fn publish_weather(&mut self) {
        self.scene.push(SceneEvent::Weather(self.weather.effective()));
    }

    fn simulate_fix(&mut self, lat: f64, lon: f64) {
        let Some(ticket) = self.location.begin_geolocation(self.clock.now()) else {
            return;
        };
        if let Some(coord) = self.location.fix_acquired(ticket, lat, lon) {
            self.worker.send(Job::Geocode(ticket, coord));
        }
    }

    fn poll_replies(&mut self) {
        while let Some(reply) = self.worker.try_recv() {
            match reply {
                Reply::Forecast(ticket, result) => {
                    if self.weather.complete(ticket, result) {
                        self.publish_weather();
                    }
                }
                Reply::Geocode(ticket, result) => {
                    if self.location.name_resolved(ticket, result) {
                        log::info!("location: {}", self.location.current().name);
                    }
                }
            }
        }
        if self.location.poll_timeout(self.clock.now()) {
            self.request_weather(false);
        }
    }
}

/// Handles for every object, as if all models loaded at once.
fn attach_everything(scene: &HeroScene, handles: &mut SceneHandles) {
    handles.attach_lights();
    handles.attach_castle();
    handles.attach_clouds();
    handles.rain = Some(scene.rain_buffer());
    CastleReactions::attach(&mut handles.reactions);
    for id in HotspotId::ALL {
        let spec = id.spec();
        let glow = MaterialHandle {
            emissive: castle_core::color::hex(spec.light_color),
            ..MaterialHandle::default()
        };
        let light = LightHandle::new(
            Vec3::new(0.0, 0.1, 0.0),
            castle_core::color::hex(spec.light_color),
            0.0,
            0.0,
        );
        handles.attach_crystal(id, CrystalHandles::from_materials(id, vec![glow], Some(light)));
    }
    for (i, spec) in scene.orbiters().iter().enumerate() {
        let glow = MaterialHandle {
            emissive: Vec3::ONE,
            ..MaterialHandle::default()
        };
        handles.attach_orbiter(i, spec.handles(vec![glow]));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Args::parse();

    let preview = match args.preview.as_deref() {
        Some(name) => Some(
            WeatherCategory::from_name(name)
                .with_context(|| format!("unknown weather category {name:?}"))?,
        ),
        None => None,
    };
    let hotspot = match args.hotspot.as_deref() {
        Some(name) => {
            Some(HotspotId::from_name(name).with_context(|| format!("unknown hotspot {name:?}"))?)
        }
        None => None,
    };

    let mut config = if args.mobile {
        SceneConfig::mobile()
    } else {
        SceneConfig::default()
    };
    config.story_end = args.story_end;
    config.time_lighting = args.time_lighting;

    let scene = HeroScene::new(config);
    let mut handles = scene.handles();
    attach_everything(&scene, &mut handles);

    let clock = SystemClock::new();
    let cache = WeatherCache::with_ttl(clock.clone(), scene.config().weather_ttl);
    let mut probe = Probe {
        scene,
        handles,
        weather: WeatherService::new(cache),
        location: LocationController::new(FileStore::new(&args.location_file)),
        clock,
        worker: Worker::spawn().context("starting network worker")?,
    };

    if args.reset_location {
        probe.location.select_default();
    }
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        probe.simulate_fix(lat, lon);
    }
    probe.weather.set_override(preview);
    probe.weather.set_enabled(args.weather || preview.is_some());
    probe.request_weather(false);
    probe.publish_weather();

    let frames = (args.seconds.max(0.0) * FPS as f32) as u32;
    let dt = Duration::from_secs_f32(1.0 / FPS as f32);
    let start = Instant::now();
    for i in 0..frames {
        let t = i as f32 / FPS as f32;
        probe.poll_replies();

        // assets report in over the first second
        probe
            .scene
            .push(SceneEvent::LoadProgress((t * 100.0).min(100.0)));
        if hotspot.is_some() && i == frames / 2 {
            probe.scene.push(SceneEvent::SetHotspot(hotspot));
        }

        let input = FrameInput {
            dt_sec: dt.as_secs_f32(),
            scroll: if args.scroll_sweep {
                i as f32 / frames.max(1) as f32
            } else {
                0.0
            },
            pointer: Vec2::new((t * 0.7).sin() * 0.3, (t * 0.5).cos() * 0.2),
            local_hour: chrono::Local::now().hour(),
        };
        let lighting = probe.scene.frame(&input, &mut probe.handles);

        for notice in probe.scene.drain_notices() {
            log::info!("frame {}: {:?}", notice.frame_index, notice.item);
        }
        if i % FPS == 0 {
            let weather = probe
                .scene
                .weather()
                .map(|w| w.category.as_str())
                .unwrap_or("off");
            log::info!(
                "t={:5.1}s phase={} scroll={:.2} ambient={:.3} dir={:.3} cyan={:.3} weather={} eye=({:.2},{:.2},{:.2})",
                t,
                probe.scene.phase().as_str(),
                probe.scene.scroll().adjusted,
                lighting.ambient,
                lighting.directional,
                lighting.cyan,
                weather,
                probe.handles.camera.eye.x,
                probe.handles.camera.eye.y,
                probe.handles.camera.eye.z,
            );
        }

        if args.realtime {
            let due = start + dt * (i + 1);
            if let Some(wait) = due.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        }
    }

    let loc = probe.location.current();
    let Coordinate { lat, lon } = loc.coord();
    log::info!(
        "done: {} frames, location {} ({lat:.4},{lon:.4})",
        probe.scene.frame_index(),
        loc.name
    );
    Ok(())
}
