//! Particle swarm search over Delta vectors
//!
//! Each particle is a full Delta vector. Per dimension:
//!
//! ```text
//! v ← w·v + c1·r1·(personal_best − x) + c2·r2·(swarm_best − x)
//! x ← max(0, x + v)
//! ```
//!
//! with independent `r1, r2 ∈ [0, 1)`. Bests update on strict improvement, and
//! a particle sees swarm-best updates made earlier in the same iteration. The
//! search stops after `stagnation_limit` consecutive iterations without a new
//! swarm best.

use super::{AvailabilityModel, Objective, OptimizationResult, OptimizerError};
use crate::config::OptimizerConfig;
use crate::rng::RngManager;
use crate::topology::Topology;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    best_position: Vec<f64>,
    best_value: f64,
}

/// Swarm bound to one topology and availability model
pub struct ParticleSwarm<'a> {
    config: &'a OptimizerConfig,
    objective: Objective<'a>,
    dimensions: usize,
}

impl<'a> ParticleSwarm<'a> {
    pub fn new(
        topology: &'a Topology,
        model: AvailabilityModel,
        config: &'a OptimizerConfig,
    ) -> Result<Self, OptimizerError> {
        if topology.node_count() == 0 {
            return Err(OptimizerError::EmptyTopology);
        }

        Ok(Self {
            config,
            objective: Objective::new(topology, model),
            dimensions: topology.node_count(),
        })
    }

    /// Run the search to stagnation (or the optional iteration cap)
    pub fn optimize(mut self, rng: &mut RngManager) -> OptimizationResult {
        let mut particles: Vec<Particle> = (0..self.config.swarm_size)
            .map(|_| self.spawn(rng))
            .collect();

        let (mut swarm_best, mut swarm_best_value) = particles
            .iter()
            .fold(None::<&Particle>, |best, p| match best {
                Some(b) if b.best_value >= p.best_value => Some(b),
                _ => Some(p),
            })
            .map(|p| (p.best_position.clone(), p.best_value))
            .unwrap_or_else(|| (vec![0.0; self.dimensions], f64::NEG_INFINITY));

        let mut history = Vec::new();
        let mut iterations = 0;
        let mut stagnant = 0;

        while stagnant < self.config.stagnation_limit
            && self.config.max_iterations.map_or(true, |cap| iterations < cap)
        {
            let mut improved = false;

            for particle in particles.iter_mut() {
                for d in 0..self.dimensions {
                    let r1 = rng.next_f64();
                    let r2 = rng.next_f64();
                    particle.velocity[d] = self.config.inertia_weight * particle.velocity[d]
                        + self.config.cognitive_coefficient
                            * r1
                            * (particle.best_position[d] - particle.position[d])
                        + self.config.social_coefficient
                            * r2
                            * (swarm_best[d] - particle.position[d]);
                }

                for d in 0..self.dimensions {
                    particle.position[d] = (particle.position[d] + particle.velocity[d]).max(0.0);
                }

                let value = self.objective.evaluate(&particle.position);
                if value > particle.best_value {
                    particle.best_position.clone_from(&particle.position);
                    particle.best_value = value;

                    if value > swarm_best_value {
                        swarm_best.clone_from(&particle.position);
                        swarm_best_value = value;
                        improved = true;
                    }
                }
            }

            iterations += 1;
            history.push(swarm_best_value);

            if improved {
                stagnant = 0;
                debug!(iteration = iterations, best = swarm_best_value, "Swarm best improved");
            } else {
                stagnant += 1;
            }
        }

        let efficiency = swarm_best_value / self.dimensions as f64;
        info!(
            iterations,
            best_fitness = swarm_best_value,
            efficiency,
            "Delta optimization finished"
        );

        OptimizationResult {
            deltas: swarm_best,
            best_fitness: swarm_best_value,
            efficiency,
            iterations,
            history,
        }
    }

    fn spawn(&mut self, rng: &mut RngManager) -> Particle {
        let (low, high) = (self.config.init_low, self.config.init_high);

        let position: Vec<f64> = (0..self.dimensions)
            .map(|_| rng.uniform(low, high))
            .collect();
        let best_value = self.objective.evaluate(&position);
        let velocity = (0..self.dimensions)
            .map(|_| {
                let magnitude = rng.uniform(low, high);
                magnitude * rng.random_sign()
            })
            .collect();

        Particle {
            best_position: position.clone(),
            position,
            velocity,
            best_value,
        }
    }
}

/// Optimize Deltas for `topology` with the given settings
pub fn optimize_deltas(
    topology: &Topology,
    model: AvailabilityModel,
    config: &OptimizerConfig,
    rng: &mut RngManager,
) -> Result<OptimizationResult, OptimizerError> {
    Ok(ParticleSwarm::new(topology, model, config)?.optimize(rng))
}
