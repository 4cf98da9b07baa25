use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::model::config::DroneConfig;
use crate::model::controller::Controller;
use crate::model::formation::{Formation, FormationEvent};
use crate::model::geometry::Vec2;
use crate::model::history::{DeathCause, HistoryLogger};
use crate::model::physics::PhysicsWorld;

/// Outcome of a headless formation flight.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlightReport {
    pub ticks: u64,
    /// Drones that dwelled on their point, with the tick of first arrival.
    pub arrivals: Vec<(Uuid, u64)>,
    pub losses: Vec<(Uuid, DeathCause)>,
    pub airborne: usize,
}

/// Flies one drone per point for at most `ticks` ticks, stopping early once
/// every remaining drone has arrived.
pub fn fly_formation<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    controller: Controller,
    config: &DroneConfig,
    points: &[Vec2],
    ticks: u64,
    history: &mut HistoryLogger,
) -> Result<FlightReport> {
    let mut formation = Formation::new(controller, config, None);
    formation.set_targets(world, points)?;

    let mut report = FlightReport::default();
    while report.ticks < ticks && !formation.drones.is_empty() {
        for event in formation.update(world)? {
            match event {
                FormationEvent::Arrived { drone, tick } => {
                    if report.arrivals.iter().all(|(id, _)| *id != drone) {
                        history.formation_arrived(drone, tick)?;
                        report.arrivals.push((drone, tick));
                    }
                }
                FormationEvent::Lost { drone, cause } => {
                    tracing::debug!(%drone, cause = cause.as_str(), "Formation drone lost");
                    report.losses.push((drone, cause));
                }
            }
        }
        report.ticks += 1;
        if formation.drones.iter().all(|d| d.waypoints_reached > 0) {
            break;
        }
    }

    report.airborne = formation.drones.len();
    formation.dispose(world)?;
    tracing::info!(
        ticks = report.ticks,
        arrived = report.arrivals.len(),
        lost = report.losses.len(),
        "Formation flight finished"
    );
    Ok(report)
}
