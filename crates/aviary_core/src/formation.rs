//! Squad of drones flown by one pretrained controller to caller-supplied
//! points.

use crate::config::DroneConfig;
use crate::controller::{Controller, ControllerLogic};
use crate::drone::{Drone, DroneError, WaypointScript};
use crate::metrics::Metrics;
use crate::physics::{PhysicsError, PhysicsWorld};
use aviary_data::{DeathCause, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationEvent {
    /// A drone dwelled on its point.
    Arrived { drone: Uuid, tick: u64 },
    /// A drone crashed or timed out and was removed from the squad.
    Lost { drone: Uuid, cause: DeathCause },
}

pub struct Formation {
    pub drones: Vec<Drone>,
    controller: Controller,
    config: DroneConfig,
    rng: ChaCha8Rng,
    tick: u64,
    metrics: Metrics,
}

impl Formation {
    #[must_use]
    pub fn new(controller: Controller, config: &DroneConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            drones: Vec::new(),
            controller,
            config: config.clone(),
            rng,
            tick: 0,
            metrics: Metrics::new(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Resizes the squad to one drone per point and points each drone at
    /// its target. New drones start at the spawn point.
    pub fn set_targets<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        points: &[Vec2],
    ) -> Result<(), DroneError> {
        if points.len() < self.drones.len() {
            for drone in self.drones.split_off(points.len()) {
                drone.dispose(world)?;
                self.metrics.record_dispose();
            }
        }
        while self.drones.len() < points.len() {
            let drone = Drone::new(world, &self.config, self.controller.clone(), &mut self.rng)?
                .with_script(WaypointScript::Hover);
            self.metrics.record_spawn();
            self.drones.push(drone);
        }
        for (drone, point) in self.drones.iter_mut().zip(points) {
            drone.set_target(*point);
        }
        tracing::debug!(drones = self.drones.len(), "Formation retargeted");
        Ok(())
    }

    /// Flies every drone one tick, drops the destroyed ones and steps the world.
    pub fn update<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
    ) -> Result<Vec<FormationEvent>, PhysicsError> {
        let mut events = Vec::new();
        for drone in &mut self.drones {
            let reached = drone.waypoints_reached;
            drone.update(world)?;
            if drone.waypoints_reached > reached {
                events.push(FormationEvent::Arrived {
                    drone: drone.id,
                    tick: self.tick,
                });
            }
        }

        let (alive, lost): (Vec<Drone>, Vec<Drone>) =
            std::mem::take(&mut self.drones).into_iter().partition(|d| d.alive);
        self.drones = alive;
        for drone in lost {
            if let Some(cause) = drone.death_cause {
                self.metrics.record_death(cause);
                events.push(FormationEvent::Lost {
                    drone: drone.id,
                    cause,
                });
            }
            drone.dispose(world)?;
            self.metrics.record_dispose();
        }

        world.step();
        self.tick += 1;
        Ok(events)
    }

    /// Removes every drone and releases the shared controller.
    pub fn dispose<W: PhysicsWorld + ?Sized>(self, world: &mut W) -> Result<(), PhysicsError> {
        for drone in self.drones {
            drone.dispose(world)?;
        }
        self.controller.dispose();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::physics::ArenaWorld;

    fn setup() -> (ArenaWorld, Formation) {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let controller = Controller::new_random_with_rng(&mut rng);
        (
            ArenaWorld::new(&config.arena),
            Formation::new(controller, &config.drone, Some(3)),
        )
    }

    #[test]
    fn test_squad_grows_and_shrinks() {
        let (mut world, mut formation) = setup();
        let points: Vec<Vec2> = (0..5)
            .map(|i| Vec2::new(100.0 + 50.0 * i as f32, 300.0))
            .collect();

        formation.set_targets(&mut world, &points).expect("grow");
        assert_eq!(formation.drones.len(), 5);
        assert_eq!(world.body_count(), 4 + 5);
        assert_eq!(formation.drones[3].target(), points[3]);

        formation.set_targets(&mut world, &points[..2]).expect("shrink");
        assert_eq!(formation.drones.len(), 2);
        assert_eq!(world.body_count(), 4 + 2);
        assert_eq!(formation.metrics().live_controllers(), 2);
    }

    #[test]
    fn test_drones_share_controller_weights() {
        let (mut world, mut formation) = setup();
        formation
            .set_targets(&mut world, &[Vec2::new(200.0, 200.0), Vec2::new(400.0, 200.0)])
            .expect("targets");
        assert_eq!(formation.drones[0].controller, formation.drones[1].controller);
        assert_eq!(formation.drones[0].script, WaypointScript::Hover);
    }

    #[test]
    fn test_empty_course_rejected() {
        let mut config = AppConfig::default();
        config.drone.waypoints.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let controller = Controller::new_random_with_rng(&mut rng);
        let mut world = ArenaWorld::new(&config.arena);
        let mut formation = Formation::new(controller, &config.drone, Some(3));

        let result = formation.set_targets(&mut world, &[Vec2::new(600.0, 300.0)]);
        assert_eq!(result, Err(DroneError::EmptyCourse));
        assert!(formation.drones.is_empty());
        assert_eq!(world.body_count(), 4);
    }

    #[test]
    fn test_update_steps_world() {
        let (mut world, mut formation) = setup();
        formation
            .set_targets(&mut world, &[Vec2::new(600.0, 300.0)])
            .expect("targets");
        formation.update(&mut world).expect("update");
        assert_eq!(formation.tick_count(), 1);
    }

    #[test]
    fn test_dispose_empties_world() {
        let (mut world, mut formation) = setup();
        formation
            .set_targets(&mut world, &[Vec2::new(600.0, 300.0); 3])
            .expect("targets");
        formation.dispose(&mut world).expect("dispose");
        assert_eq!(world.body_count(), 4);
    }
}
