//! Ballistic droplets thrown off the walls on sharp lateral motion
//!
//! Droplets live in a bounded pool. Each step they fall under gravity, lose
//! speed to drag and fade out; a droplet that crosses the surface line becomes
//! an [`ImpactEvent`] and is removed in the same pass.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Container;
use crate::tuning::DropletTuning;

/// Wall a burst is thrown from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Positive jerk throws liquid toward the right wall
    pub fn from_jerk(jerk: f32) -> Self {
        if jerk > 0.0 { Side::Right } else { Side::Left }
    }

    #[inline]
    fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// A single droplet (pixels, px/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// 1 at spawn, removed at 0
    pub life: f32,
}

/// Droplet/surface collision report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    /// Horizontal position as a fraction of the container width
    pub fraction: f32,
    /// Speed at impact (px/s)
    pub speed: f32,
    /// Impulse power derived from speed
    pub power: f32,
}

/// Bounded droplet pool
#[derive(Debug, Clone)]
pub struct DropletPool {
    droplets: Vec<Droplet>,
    capacity: usize,
}

impl DropletPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            droplets: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.droplets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.droplets.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Droplet> {
        self.droplets.iter()
    }

    pub fn clear(&mut self) {
        self.droplets.clear();
    }

    /// Add a droplet if there is room; returns whether it was admitted
    pub fn push(&mut self, droplet: Droplet) -> bool {
        if self.droplets.len() >= self.capacity {
            return false;
        }
        self.droplets.push(droplet);
        true
    }

    /// Throw up to `count` droplets off `side`, starting just above `surface_y`.
    ///
    /// Requests beyond the pool capacity are dropped. Returns the number admitted.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        side: Side,
        surface_y: f32,
        container: Container,
        strength: f32,
        tuning: &DropletTuning,
        rng: &mut R,
    ) -> usize {
        let room = self.capacity.saturating_sub(self.droplets.len());
        let admitted = count.min(room);

        let x = match side {
            Side::Left => tuning.wall_inset,
            Side::Right => container.width - tuning.wall_inset,
        };

        for _ in 0..admitted {
            let vx = side.sign()
                * (tuning.launch_vx_min + rng.random::<f32>() * tuning.launch_vx_range)
                * (0.6 + strength);
            let vy = -(tuning.launch_vy_min + rng.random::<f32>() * tuning.launch_vy_range)
                * (0.7 + strength);
            let y = surface_y - rng.random::<f32>() * tuning.spawn_jitter;
            let radius = tuning.radius_min + rng.random::<f32>() * tuning.radius_range;
            self.droplets.push(Droplet {
                pos: Vec2::new(x, y),
                vel: Vec2::new(vx, vy),
                radius,
                life: 1.0,
            });
        }

        admitted
    }

    /// Integrate every droplet and resolve exits and surface impacts.
    ///
    /// `surface_y` maps a width fraction to the surface line in container
    /// pixels. Impacts are returned in pool order.
    pub fn advance<F>(
        &mut self,
        dt: f32,
        container: Container,
        tuning: &DropletTuning,
        surface_y: F,
    ) -> Vec<ImpactEvent>
    where
        F: Fn(f32) -> f32,
    {
        let mut impacts = Vec::new();
        let drag = tuning.air_drag.powf(dt * 60.0);
        let margin = tuning.bounds_margin;

        self.droplets.retain_mut(|d| {
            d.vel.y += tuning.gravity * dt;
            d.vel *= drag;
            d.pos += d.vel * dt;
            d.life -= tuning.life_decay * dt;

            if d.life <= 0.0
                || d.pos.y > container.height + margin
                || d.pos.x < -margin
                || d.pos.x > container.width + margin
            {
                return false;
            }

            let fraction = if container.width > 0.0 {
                (d.pos.x / container.width).clamp(0.0, 1.0)
            } else {
                0.5
            };
            if d.pos.y >= surface_y(fraction) {
                let speed = d.vel.length();
                impacts.push(ImpactEvent {
                    fraction,
                    speed,
                    power: (speed / tuning.impact_speed_scale)
                        .clamp(tuning.impact_min_power, tuning.impact_max_power),
                });
                return false;
            }

            true
        });

        impacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 0.016;

    fn container() -> Container {
        Container::new(300.0, 500.0)
    }

    fn droplet(x: f32, y: f32, vx: f32, vy: f32) -> Droplet {
        Droplet {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            radius: 2.5,
            life: 1.0,
        }
    }

    #[test]
    fn test_spawn_respects_cap() {
        let tuning = DropletTuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = DropletPool::new(40);

        for _ in 0..38 {
            assert!(pool.push(droplet(150.0, 100.0, 0.0, 0.0)));
        }
        let admitted = pool.spawn(4, Side::Left, 200.0, container(), 0.6, &tuning, &mut rng);
        assert_eq!(admitted, 2);
        assert_eq!(pool.len(), 40);

        let admitted = pool.spawn(4, Side::Right, 200.0, container(), 0.6, &tuning, &mut rng);
        assert_eq!(admitted, 0);
        assert!(!pool.push(droplet(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_spawn_kinematics() {
        let tuning = DropletTuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut pool = DropletPool::new(40);
        let strength = 0.5;

        pool.spawn(3, Side::Right, 200.0, container(), strength, &tuning, &mut rng);
        pool.spawn(3, Side::Left, 200.0, container(), strength, &tuning, &mut rng);

        let (right, left): (Vec<&Droplet>, Vec<&Droplet>) = pool.iter().partition(|d| d.pos.x > 150.0);
        assert_eq!(right.len(), 3);
        assert_eq!(left.len(), 3);

        for d in &right {
            assert_eq!(d.pos.x, 290.0);
            assert!(d.vel.x >= 144.0 * 1.1 && d.vel.x <= 336.0 * 1.1);
        }
        for d in &left {
            assert_eq!(d.pos.x, 10.0);
            assert!(d.vel.x <= -144.0 * 1.1 && d.vel.x >= -336.0 * 1.1);
        }
        for d in pool.iter() {
            assert!(d.pos.y <= 200.0 && d.pos.y >= 190.0);
            assert!(d.vel.y <= -252.0 * 1.2 && d.vel.y >= -528.0 * 1.2);
            assert!(d.radius >= 2.1 && d.radius <= 3.4);
            assert_eq!(d.life, 1.0);
        }
    }

    #[test]
    fn test_expired_droplet_removed() {
        let tuning = DropletTuning::default();
        let mut pool = DropletPool::new(8);
        // Well above a surface far below, drifting sideways slowly
        pool.push(Droplet {
            life: 0.005,
            ..droplet(150.0, -10.0, 0.0, -900.0)
        });
        let impacts = pool.advance(DT, container(), &tuning, |_| 1000.0);
        assert!(impacts.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_out_of_bounds_removed_without_impact() {
        let tuning = DropletTuning::default();
        let mut pool = DropletPool::new(8);
        pool.push(droplet(-39.0, 100.0, -600.0, 0.0));
        pool.push(droplet(339.0, 100.0, 600.0, 0.0));
        pool.push(droplet(150.0, 539.0, 0.0, 600.0));
        pool.push(droplet(150.0, 100.0, 0.0, -300.0));

        let impacts = pool.advance(DT, container(), &tuning, |_| 10_000.0);
        assert!(impacts.is_empty());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.iter().next().map(|d| d.pos.x), Some(150.0));
    }

    #[test]
    fn test_multiple_removals_in_one_pass() {
        let tuning = DropletTuning::default();
        let mut pool = DropletPool::new(8);
        // Alternate hits and survivors so adjacent removals are exercised
        pool.push(droplet(30.0, 250.0, 0.0, 200.0));
        pool.push(droplet(60.0, 251.0, 0.0, 200.0));
        pool.push(droplet(90.0, 10.0, 0.0, -400.0));
        pool.push(droplet(120.0, 252.0, 0.0, 200.0));
        pool.push(droplet(150.0, 20.0, 0.0, -400.0));

        let impacts = pool.advance(DT, container(), &tuning, |_| 250.0);
        assert_eq!(impacts.len(), 3);
        assert_eq!(pool.len(), 2);
        assert!((impacts[0].fraction - 0.1).abs() < 1e-6);
        assert!((impacts[1].fraction - 0.2).abs() < 1e-6);
        assert!((impacts[2].fraction - 0.4).abs() < 1e-6);
        let survivors: Vec<f32> = pool.iter().map(|d| d.pos.x).collect();
        assert_eq!(survivors, vec![90.0, 150.0]);
    }

    #[test]
    fn test_impact_matches_ballistic_recurrence() {
        let tuning = DropletTuning::default();
        let mut pool = DropletPool::new(4);
        let start = droplet(100.0, 150.0, 240.0, -420.0);
        pool.push(start);

        let surface = 220.0;
        let drag = tuning.air_drag.powf(DT * 60.0);
        let mut pos = start.pos;
        let mut vel = start.vel;

        for _ in 0..200 {
            vel.y += tuning.gravity * DT;
            vel *= drag;
            pos += vel * DT;

            let impacts = pool.advance(DT, container(), &tuning, |_| surface);
            if pos.y >= surface {
                assert_eq!(impacts.len(), 1);
                let hit = impacts[0];
                let speed = vel.length();
                assert!((hit.fraction - pos.x / 300.0).abs() < 1e-5);
                assert!((hit.speed - speed).abs() < 1e-3);
                assert_eq!(hit.power, (speed / 700.0).clamp(0.8, 3.2));
                assert!(pool.is_empty());
                return;
            }
            assert!(impacts.is_empty());
            assert_eq!(pool.len(), 1);
        }
        panic!("droplet never reached the surface");
    }

    #[test]
    fn test_slow_impact_power_floored() {
        let tuning = DropletTuning::default();
        let mut pool = DropletPool::new(2);
        // Gravity brings it up to 100 px/s downward during the step
        pool.push(droplet(150.0, 199.0, 0.0, 100.0 - tuning.gravity * DT));
        let impacts = pool.advance(DT, container(), &tuning, |_| 200.0);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].power, 0.8);
        assert!((impacts[0].fraction - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_side_from_jerk() {
        assert_eq!(Side::from_jerk(7.0), Side::Right);
        assert_eq!(Side::from_jerk(-7.0), Side::Left);
    }
}
