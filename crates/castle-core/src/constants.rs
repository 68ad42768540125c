use glam::Vec3;

// Shared tuning constants for the hero scene. Per-frame rates are tuned
// against a ~60 fps loop (see `curve::approach`).

// Frame timing
pub const ASSUMED_FRAME_SEC: f32 = 1.0 / 60.0; // orbit integration step
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // clamp for tab-switch hitches

// Scene phase timing
pub const LOAD_SETTLE_SEC: f32 = 0.5; // progress 100 -> fog
pub const REVEAL_NOTICE_SEC: f32 = 0.8; // fog -> "reveal" notice
pub const FOG_DWELL_SEC: f32 = 2.0; // fog -> ready

// Loading overlay counter
pub const LOADING_COUNTER_RATE: f32 = 0.06;
pub const LOADING_COUNTER_RATE_DONE: f32 = 0.15;

// Lighting bases
pub const CYAN_PULSE_FREQ: f32 = 1.2;
pub const CYAN_PULSE_AMP: f32 = 0.3;
pub const STORY_BLOCK1_CYAN_GAIN: f32 = 1.4;
pub const STORY_BLOCK3_CYAN_GAIN: f32 = 1.3;
pub const STORY_BURST_GAIN: f32 = 3.0;
pub const STORY_TINT_RATE: f32 = 0.05;
pub const STORY_TINT_COLOR: Vec3 = Vec3::new(0.043, 0.227, 0.267); // #0b3a44

// Weather smoothing (~2 s settle)
pub const WEATHER_RATE: f32 = 0.03;
pub const WEATHER_CACHE_TTL_SEC: u64 = 30 * 60;

// Time-of-day re-evaluation
pub const TIME_OF_DAY_INTERVAL_SEC: f32 = 60.0;

// Hotspots
pub const SHARED_ORBIT_SPEED: f32 = 0.10; // rad/s
pub const ORBIT_VELOCITY_RATE: f32 = 0.05;
pub const HOTSPOT_FADE_PER_SEC: f32 = 2.0; // ~0.5 s to full
pub const HOTSPOT_PULSE_FREQ: f32 = 1.5;
pub const HOTSPOT_PULSE_PHASE: f32 = 1.8;
pub const HOTSPOT_PULSE_AMP: f32 = 0.8;
pub const HOTSPOT_PULSE_SCROLL_GAIN: f32 = 2.0; // pulse speed-up per unit scroll velocity
pub const HOTSPOT_ACTIVE_EMISSIVE_GAIN: f32 = 2.0;
pub const HOTSPOT_BOB_FREQ: f32 = 0.8;
pub const HOTSPOT_BOB_PHASE: f32 = 1.2;
pub const HOTSPOT_BOB_AMP: f32 = 0.03;
pub const HOTSPOT_SPIN_PER_FRAME: f32 = 0.002;
pub const HOTSPOT_SCALE: f32 = 0.12;
pub const HOTSPOT_SCALE_ACTIVE: f32 = 0.14;
pub const HOTSPOT_LIGHT: (f32, f32) = (2.0, 1.2); // intensity, distance
pub const HOTSPOT_LIGHT_ACTIVE: (f32, f32) = (4.0, 1.5);

// Database crystal amplification of the shared cyan light
pub const DATABASE_BOOST: f32 = 3.0;
pub const DATABASE_BOOST_RATE: f32 = 0.05;

// Scroll velocity / sparkles
pub const SCROLL_VELOCITY_SCALE: f32 = 100.0;
pub const SCROLL_VELOCITY_RATE: f32 = 0.1;
pub const SPARKLE_OPACITY_FLOOR: f32 = 0.05;
pub const SPARKLE_OPACITY_GAIN: f32 = 3.0;

// Castle and fragments
pub const CASTLE_SCROLL_YAW: f32 = std::f32::consts::PI * 0.8;
pub const FRAGMENT_SPREAD_GAIN: f32 = 1.5;
pub const FRAGMENT_SINK_GAIN: f32 = 0.5;
pub const FRAGMENT_SPIN_BASE: f32 = 0.03;
pub const FRAGMENT_SPIN_SCROLL: f32 = 0.05;
pub const STARS_VISIBLE_AFTER: f32 = 0.4;
pub const FRAGMENT_BASE: [[f32; 3]; 5] = [
    [1.00, 0.10, 0.57],
    [-1.00, 0.30, 0.84],
    [-0.92, -0.10, -0.77],
    [0.93, 0.50, -1.11],
    [0.00, -0.25, 1.60],
];

// Camera
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_TARGET: Vec3 = Vec3::ZERO;
pub const REVEAL_START: Vec3 = Vec3::new(0.0, 0.5, 10.0);
pub const REVEAL_END: Vec3 = Vec3::new(0.0, 0.6, 3.0);
pub const REVEAL_RATE: f32 = 0.03;
pub const REVEAL_EPSILON: f32 = 0.01;
pub const PARALLAX_GAIN_X: f32 = 0.8;
pub const PARALLAX_GAIN_Y: f32 = 0.4;
pub const PARALLAX_RATE: f32 = 0.05;
pub const ORBIT_CONTROL_DISTANCE: f32 = 3.0; // min == max distance
pub const ORBIT_CONTROL_SENSITIVITY: f32 = 0.005; // rad per pixel
pub const ORBIT_CONTROL_PITCH_LIMIT: f32 = 1.3;
pub const STORY_CAMERA_RATE: f32 = 0.08;

// Clouds
pub const CLOUD_BASE_OPACITY: [f32; 2] = [0.15, 0.10];

// Rain
pub const RAIN_COUNT: usize = 800;
pub const RAIN_COUNT_MOBILE: usize = 400;
pub const RAIN_OPACITY: f32 = 0.4;
pub const RAIN_FLOOR_Y: f32 = -1.5;
pub const RAIN_PARK_Y: f32 = -100.0;
pub const RAIN_WIND_NORM: f32 = 50.0; // km/h for full drift
pub const RAIN_WIND_DRIFT: f32 = 0.5;

// Reactions
pub const CIRCUIT_PARTICLE_COUNT: usize = 550;
pub const CASTLE_ACTIVE_SCALE: f32 = 1.2;
pub const CASTLE_BREATH_AMP: f32 = 0.03;
pub const CASTLE_SPIN_PER_SEC: f32 = 0.8;
pub const CASTLE_SPIN_DECAY: f32 = 0.95;

// Default particle seed, fixed so replays reproduce particle trajectories
pub const PARTICLE_SEED: u64 = 42;
