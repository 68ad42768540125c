//! Scalar helpers shared by every driver: keyframe curves, exponential
//! smoothing and orbit geometry.

use glam::Vec3;

/// Values that can be linearly blended.
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key<V> {
    pub at: f32,
    pub value: V,
}

impl<V> Key<V> {
    pub const fn new(at: f32, value: V) -> Self {
        Self { at, value }
    }
}

/// Ordered keyframe table covering \[0, 1\].
#[derive(Clone, Copy, Debug)]
pub struct Curve<V: 'static> {
    keys: &'static [Key<V>],
}

impl<V: Lerp> Curve<V> {
    /// Panics at compile time when used in a `const` with an empty table.
    pub const fn new(keys: &'static [Key<V>]) -> Self {
        assert!(!keys.is_empty(), "curve needs at least one key");
        Self { keys }
    }

    pub fn keys(&self) -> &'static [Key<V>] {
        self.keys
    }

    /// Piecewise-linear lookup. The first bracketing pair in table order wins,
    /// a query on a key position returns that key's value exactly, queries
    /// outside the table clamp to the end keys, and a zero-width bracket is
    /// treated as width 1.
    pub fn sample(&self, x: f32) -> V {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if x.is_nan() || x < first.at {
            return first.value;
        }
        if x > last.at {
            return last.value;
        }
        let (lower, upper) = self
            .keys
            .windows(2)
            .find(|w| w[0].at <= x && x <= w[1].at)
            .map(|w| (w[0], w[1]))
            .unwrap_or((first, last));
        if x == lower.at {
            return lower.value;
        }
        if x == upper.at {
            return upper.value;
        }
        let mut range = upper.at - lower.at;
        if range == 0.0 {
            range = 1.0;
        }
        let t = (x - lower.at) / range;
        lower.value.lerp(upper.value, t)
    }
}

/// Moves `current` toward `target` by `rate` of the remaining gap.
///
/// Most call sites pass a fixed per-frame rate tuned for ~60 fps, so settle
/// time stretches on slower displays and shrinks on faster ones. Reaction
/// fades pass a `dt`-scaled rate via [`dt_rate`] instead. The rate is clamped
/// to \[0, 1\] so a step can never overshoot or move away from the target.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate.clamp(0.0, 1.0)
}

#[inline]
pub fn approach_vec3(current: Vec3, target: Vec3, rate: f32) -> Vec3 {
    current + (target - current) * rate.clamp(0.0, 1.0)
}

/// Per-frame rate for a `per_sec` speed over `dt_sec`, capped at 1.
#[inline]
pub fn dt_rate(per_sec: f32, dt_sec: f32) -> f32 {
    (per_sec * dt_sec).clamp(0.0, 1.0)
}

/// `t * rate + offset` reduced to \[0, 2π) in `f64` before narrowing, so
/// waves keep their frequency however long the scene has been running.
#[inline]
pub fn cycle(t: f64, rate: f32, offset: f32) -> f32 {
    (t * f64::from(rate) + f64::from(offset)).rem_euclid(std::f64::consts::TAU) as f32
}

/// Angle reduced to \[0, 2π).
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

/// Point on a circle of `radius` at `angle`, inclined by `tilt` and then
/// rotated about Y by `tilt_dir` (all radians).
#[inline]
pub fn orbit_position(radius: f32, angle: f32, tilt: f32, tilt_dir: f32) -> Vec3 {
    let base_x = radius * angle.cos();
    let base_z = radius * angle.sin();
    let tilted_y = base_z * tilt.sin();
    let tilted_z = base_z * tilt.cos();
    let (sin_dir, cos_dir) = tilt_dir.sin_cos();
    Vec3::new(
        base_x * cos_dir - tilted_z * sin_dir,
        tilted_y,
        base_x * sin_dir + tilted_z * cos_dir,
    )
}

/// Uniform Catmull-Rom through `points`, parameterized over \[0, 1\].
/// End segments reuse the end points as phantom neighbours.
pub fn catmull_rom(points: &[Vec3], u: f32) -> Vec3 {
    match points.len() {
        0 => return Vec3::ZERO,
        1 => return points[0],
        _ => {}
    }
    let segments = (points.len() - 1) as f32;
    let s = u.clamp(0.0, 1.0) * segments;
    let i = (s.floor() as usize).min(points.len() - 2);
    let t = s - i as f32;

    let p1 = points[i];
    let p2 = points[i + 1];
    let p0 = if i == 0 { p1 } else { points[i - 1] };
    let p3 = points.get(i + 2).copied().unwrap_or(p2);

    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}
