//! Platform-free core of the floating castle hero scene.
//!
//! External signals (scroll, pointer, wall clock, weather, UI events) are
//! normalized by adapters, folded into per-frame drivers and composed into
//! light, material and transform parameters on [`SceneHandles`]. Network and
//! device access are expressed as ticket-based state machines
//! ([`WeatherService`], [`LocationController`]) so the front ends can do the
//! I/O off the frame loop.

pub mod camera;
pub mod clock;
pub mod color;
pub mod compose;
pub mod config;
pub mod constants;
pub mod curve;
pub mod drivers;
pub mod error;
pub mod events;
pub mod hero;
pub mod hotspot;
pub mod location;
pub mod orbiters;
pub mod particles;
pub mod phase;
pub mod reactions;
pub mod scene;
pub mod signals;
pub mod sources;
pub mod story;
pub mod weather;

pub use camera::{Camera, CameraMode, CameraRig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compose::LightingSummary;
pub use config::SceneConfig;
pub use error::AdapterError;
pub use events::{SceneEvent, SceneNotice, Stamped};
pub use hero::{FrameInput, HeroScene};
pub use hotspot::{HotspotId, Selection, HOTSPOTS};
pub use location::{Location, LocationController, LocationStore, MemoryStore};
pub use phase::ScenePhase;
pub use scene::SceneHandles;
pub use signals::{normalize_pointer, TimeOfDay};
pub use weather::{
    Coordinate, FetchTicket, WeatherCache, WeatherCategory, WeatherRequest, WeatherService,
    WeatherSnapshot,
};
