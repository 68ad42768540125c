//! CPU particle systems: weather rain and the database circuit pulse.
//! Both use a seeded RNG so identical frame inputs replay identically.

use crate::constants::{RAIN_FLOOR_Y, RAIN_OPACITY, RAIN_PARK_Y, RAIN_WIND_DRIFT, RAIN_WIND_NORM};
use crate::scene::{ParticleBuffer, ParticlePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

const RAIN_SPREAD: f32 = 8.0; // x/z extent around the castle
const RAIN_SPAWN_Y: (f32, f32) = (4.0, 6.0);
const RAIN_FALL_SPEED: (f32, f32) = (3.0, 5.0);
const RAIN_VISIBLE_MIN: f32 = 0.01;

pub struct RainField {
    rng: StdRng,
    positions: Vec<[f32; 3]>,
    fall_speed: Vec<f32>,
}

impl RainField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut field = Self {
            rng: StdRng::seed_from_u64(seed),
            positions: vec![[0.0; 3]; count],
            fall_speed: vec![0.0; count],
        };
        for i in 0..count {
            field.respawn(i, true);
        }
        field
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Number of drops simulated at `intensity`; the rest are parked.
    pub fn active_count(&self, intensity: f32) -> usize {
        (self.capacity() as f32 * intensity.clamp(0.0, 1.0)).floor() as usize
    }

    fn respawn(&mut self, i: usize, anywhere: bool) {
        let x = (self.rng.gen::<f32>() - 0.5) * RAIN_SPREAD;
        let z = (self.rng.gen::<f32>() - 0.5) * RAIN_SPREAD;
        let y = if anywhere {
            self.rng.gen::<f32>() * RAIN_SPREAD + RAIN_FLOOR_Y
        } else {
            self.rng.gen_range(RAIN_SPAWN_Y.0..RAIN_SPAWN_Y.1)
        };
        self.positions[i] = [x, y, z];
        self.fall_speed[i] = self.rng.gen_range(RAIN_FALL_SPEED.0..RAIN_FALL_SPEED.1);
    }

    /// Steps the field and writes it into `buf`. Below a trace of rain the
    /// buffer is hidden and nothing moves.
    pub fn update(
        &mut self,
        dt_sec: f32,
        intensity: f32,
        wind_speed: f32,
        buf: &mut ParticleBuffer,
    ) {
        if intensity <= RAIN_VISIBLE_MIN {
            buf.visible = false;
            return;
        }
        buf.visible = true;
        let active = self.active_count(intensity);
        let drift = (wind_speed / RAIN_WIND_NORM) * RAIN_WIND_DRIFT * dt_sec;
        for i in 0..self.capacity() {
            if i >= active {
                self.positions[i][1] = RAIN_PARK_Y;
                continue;
            }
            self.positions[i][1] -= self.fall_speed[i] * dt_sec;
            self.positions[i][0] += drift;
            if self.positions[i][1] < RAIN_FLOOR_Y {
                self.respawn(i, false);
            }
        }
        write_points(&self.positions, buf);
        buf.opacity = RAIN_OPACITY * intensity.min(1.0);
    }
}

const CIRCUIT_RING: (f32, f32) = (0.3, 0.8);
const CIRCUIT_RISE_ACCEL: f32 = 0.3;
const CIRCUIT_CEILING: f32 = 1.0;
const CIRCUIT_OPACITY: f32 = 0.7;

struct CircuitParticle {
    position: [f32; 3],
    velocity: [f32; 3],
    life: f32,
}

/// Points born on a ring around the castle base, drifting upward.
pub struct CircuitField {
    rng: StdRng,
    particles: Vec<CircuitParticle>,
}

impl CircuitField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..count).map(|_| Self::spawn(&mut rng)).collect();
        Self { rng, particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn spawn(rng: &mut StdRng) -> CircuitParticle {
        let angle = rng.gen::<f32>() * TAU;
        let radius = rng.gen_range(CIRCUIT_RING.0..CIRCUIT_RING.1);
        CircuitParticle {
            position: [angle.cos() * radius, 0.0, angle.sin() * radius],
            velocity: [
                (rng.gen::<f32>() - 0.5) * 0.02,
                rng.gen_range(0.05..0.20),
                (rng.gen::<f32>() - 0.5) * 0.02,
            ],
            life: rng.gen_range(1.5..3.5),
        }
    }

    /// Movement is scaled by `fade` so the field freezes as it fades out.
    pub fn update(&mut self, dt_sec: f32, fade: f32, buf: &mut ParticleBuffer) {
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.velocity[1] += CIRCUIT_RISE_ACCEL * dt_sec;
            for axis in 0..3 {
                p.position[axis] += p.velocity[axis] * dt_sec * fade;
            }
            p.life -= dt_sec;
            if p.life <= 0.0 || p.position[1] > CIRCUIT_CEILING {
                self.particles[i] = Self::spawn(&mut self.rng);
            }
        }
        if buf.points.len() != self.particles.len() {
            buf.points.resize(self.particles.len(), ParticlePoint::default());
        }
        for (dst, p) in buf.points.iter_mut().zip(&self.particles) {
            dst.position = p.position;
        }
        buf.opacity = fade * CIRCUIT_OPACITY;
        buf.visible = fade > 0.0;
    }
}

fn write_points(src: &[[f32; 3]], buf: &mut ParticleBuffer) {
    if buf.points.len() != src.len() {
        buf.points.resize(src.len(), ParticlePoint::default());
    }
    for (dst, p) in buf.points.iter_mut().zip(src) {
        dst.position = *p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = RainField::new(32, 7);
        let mut b = RainField::new(32, 7);
        let mut ba = ParticleBuffer::with_len(32);
        let mut bb = ParticleBuffer::with_len(32);
        for _ in 0..120 {
            a.update(1.0 / 60.0, 0.8, 10.0, &mut ba);
            b.update(1.0 / 60.0, 0.8, 10.0, &mut bb);
        }
        assert_eq!(ba, bb);
    }

    #[test]
    fn inactive_drops_are_parked() {
        let mut rain = RainField::new(10, 1);
        let mut buf = ParticleBuffer::with_len(10);
        rain.update(1.0 / 60.0, 0.5, 0.0, &mut buf);
        assert_eq!(rain.active_count(0.5), 5);
        assert!(buf.points[5..].iter().all(|p| p.position[1] == RAIN_PARK_Y));
        assert!((buf.opacity - 0.2).abs() < 1e-6);
    }

    #[test]
    fn no_rain_hides_buffer() {
        let mut rain = RainField::new(10, 1);
        let mut buf = ParticleBuffer::with_len(10);
        rain.update(1.0 / 60.0, 0.0, 0.0, &mut buf);
        assert!(!buf.visible);
    }
}
