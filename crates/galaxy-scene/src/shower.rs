//! One-off meteor shower made of delayed one-shot stars.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;

use crate::timer::{Scheduler, TimerHandle};
use crate::transient::{Flight, SpawnVolume, TransientStar};

/// Shape of a meteor shower.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowerConfig {
    /// Number of stars in the shower.
    pub star_count: usize,
    /// Seconds from mount until the shower opens.
    pub start_delay: f32,
    /// Each star waits a random delay in `[0, max_delay)` once the shower opens.
    pub max_delay: f32,
    /// Slowest star speed.
    pub speed_min: f32,
    /// Random extra speed per star.
    pub speed_jitter: f32,
}

impl Default for ShowerConfig {
    fn default() -> Self {
        Self {
            star_count: 20,
            start_delay: 5.0,
            max_delay: 3.0,
            speed_min: 20.0,
            speed_jitter: 15.0,
        }
    }
}

/// Where the shower is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowerPhase {
    /// Gate timer not fired yet; nothing is drawn.
    Waiting,
    /// Stars are mounted and flying or pending.
    Running,
    /// Every star has completed.
    Finished,
}

/// Phase change reported by [`MeteorShower::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowerEvent {
    Started,
    Finished,
}

/// A group of one-shot stars released together after a fixed delay.
#[derive(Debug)]
pub struct MeteorShower {
    config: ShowerConfig,
    gate: TimerHandle,
    phase: ShowerPhase,
    stars: Vec<TransientStar>,
    completed: Rc<Cell<usize>>,
}

impl MeteorShower {
    /// Mount the shower and start its gate timer.
    pub fn new(config: ShowerConfig, scheduler: &dyn Scheduler) -> Self {
        let start_delay = if config.start_delay.is_finite() {
            config.start_delay.max(0.0)
        } else {
            0.0
        };
        Self {
            gate: scheduler.schedule(Duration::from_secs_f32(start_delay)),
            config,
            phase: ShowerPhase::Waiting,
            stars: Vec::new(),
            completed: Rc::new(Cell::new(0)),
        }
    }

    /// Step the shower by one frame.
    pub fn advance(
        &mut self,
        dt: f32,
        rng: &mut impl Rng,
        scheduler: &dyn Scheduler,
    ) -> Option<ShowerEvent> {
        match self.phase {
            ShowerPhase::Waiting => {
                if !self.gate.has_fired() {
                    return None;
                }
                self.mount_stars(rng, scheduler);
                self.phase = ShowerPhase::Running;
                Some(ShowerEvent::Started)
            }
            ShowerPhase::Running => {
                for star in &mut self.stars {
                    star.advance(dt, rng);
                }
                if self.completed.get() < self.stars.len() {
                    return None;
                }
                self.stars.clear();
                self.phase = ShowerPhase::Finished;
                Some(ShowerEvent::Finished)
            }
            ShowerPhase::Finished => None,
        }
    }

    fn mount_stars(&mut self, rng: &mut impl Rng, scheduler: &dyn Scheduler) {
        let ShowerConfig {
            star_count,
            max_delay,
            speed_min,
            speed_jitter,
            ..
        } = self.config;

        self.stars = (0..star_count)
            .map(|_| {
                let delay = rng.r#gen::<f32>() * max_delay.max(0.0);
                let speed = speed_min + rng.r#gen::<f32>() * speed_jitter;
                let completed = self.completed.clone();
                TransientStar::one_shot(
                    delay,
                    speed,
                    SpawnVolume::default(),
                    scheduler,
                    rng,
                    Some(Box::new(move || completed.set(completed.get() + 1))),
                )
            })
            .collect();
    }

    pub fn phase(&self) -> ShowerPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == ShowerPhase::Finished
    }

    /// Stars currently in flight.
    pub fn flights(&self) -> impl Iterator<Item = Flight> + '_ {
        self.stars.iter().filter_map(TransientStar::flight)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualScheduler;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_shower_is_inert_until_gate_opens() {
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        let mut shower = MeteorShower::new(ShowerConfig::default(), &scheduler);

        for _ in 0..100 {
            assert_eq!(shower.advance(0.04, &mut rng, &scheduler), None);
            assert_eq!(shower.flights().count(), 0);
        }
        assert_eq!(shower.phase(), ShowerPhase::Waiting);

        scheduler.advance(Duration::from_secs(5));
        assert_eq!(
            shower.advance(0.04, &mut rng, &scheduler),
            Some(ShowerEvent::Started)
        );
        // Each star still waits on its own delay
        assert_eq!(shower.flights().count(), 0);
        assert!(scheduler.pending() <= 20);
    }

    #[test]
    fn test_shower_runs_to_completion_once() {
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg64Mcg::seed_from_u64(12);
        let mut shower = MeteorShower::new(ShowerConfig::default(), &scheduler);

        scheduler.advance(Duration::from_secs(5));
        shower.advance(0.0, &mut rng, &scheduler);
        scheduler.advance(Duration::from_secs(3));

        let mut finished = 0;
        let mut peak = 0;
        for _ in 0..200 {
            if shower.advance(0.25, &mut rng, &scheduler) == Some(ShowerEvent::Finished) {
                finished += 1;
            }
            peak = peak.max(shower.flights().count());
        }

        assert_eq!(finished, 1);
        assert_eq!(peak, 20);
        assert_eq!(shower.completed.get(), 20);
        assert!(shower.is_finished());
        assert_eq!(shower.flights().count(), 0);
    }

    #[test]
    fn test_dropping_shower_cancels_timers() {
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg64Mcg::seed_from_u64(13);
        let mut shower = MeteorShower::new(ShowerConfig::default(), &scheduler);
        scheduler.advance(Duration::from_secs(5));
        shower.advance(0.0, &mut rng, &scheduler);

        drop(shower);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_empty_shower_finishes_immediately() {
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg64Mcg::seed_from_u64(14);
        let config = ShowerConfig {
            star_count: 0,
            start_delay: 0.0,
            ..ShowerConfig::default()
        };
        let mut shower = MeteorShower::new(config, &scheduler);
        assert_eq!(
            shower.advance(0.1, &mut rng, &scheduler),
            Some(ShowerEvent::Started)
        );
        assert_eq!(
            shower.advance(0.1, &mut rng, &scheduler),
            Some(ShowerEvent::Finished)
        );
    }
}
