//! Iterative inverse kinematics via damped Jacobian pseudoinverse.
//!
//! The position Jacobian is built numerically by finite differences; the
//! update step is `q += damping * pinv(J) * error`. Adequate for a 3-DOF
//! chain at control-loop rates; an analytic Jacobian could be substituted
//! without changing the convergence contract.

use nalgebra::{Matrix3, Vector3};

use strider_core::error::ConvergenceFailure;
use strider_core::types::JointAngles;

use crate::chain::LegChain;

/// Configuration for the solver.
#[derive(Debug, Clone)]
pub struct IkConfig {
    /// Position error tolerance, same linear units as link lengths.
    pub tolerance: f64,
    /// Maximum solver iterations.
    pub max_iterations: u32,
    /// Step damping. 0.5 trades convergence speed for stability near
    /// singularities (prevents oscillation and overshoot).
    pub damping: f64,
    /// Joint perturbation for finite-difference Jacobian columns (radians).
    pub fd_epsilon: f64,
    /// Smallest admissible singular value of the Jacobian. Below this the
    /// pseudoinverse is treated as undefined.
    pub singular_floor: f64,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 100,
            damping: 0.5,
            fd_epsilon: 1e-5,
            singular_floor: 1e-6,
        }
    }
}

/// A converged solve.
#[derive(Debug, Clone, Copy)]
pub struct IkSolution {
    /// Joint angles reaching the target, degrees.
    pub angles: JointAngles,
    /// Iterations used.
    pub iterations: u32,
    /// Final position error norm.
    pub residual: f64,
}

/// Solve for joint angles placing the foot at `target`.
///
/// `initial` should be the leg's last known angles: warm-starting keeps the
/// solution on the same kinematic branch and speeds convergence.
///
/// # Errors
///
/// [`ConvergenceFailure::Singular`] when the Jacobian collapses, or
/// [`ConvergenceFailure::IterationsExhausted`] when the budget runs out
/// before the error drops below tolerance. The caller must not apply any
/// angles on failure.
pub fn solve(
    chain: &LegChain,
    target: Vector3<f64>,
    initial: JointAngles,
    config: &IkConfig,
) -> Result<IkSolution, ConvergenceFailure> {
    let mut q = Vector3::new(
        initial.shoulder.to_radians(),
        initial.upper_hip.to_radians(),
        initial.lower_hip.to_radians(),
    );

    for iteration in 0..config.max_iterations {
        let position = chain.foot_from_radians(&q);
        let error = target - position;
        let residual = error.norm();
        if residual < config.tolerance {
            return Ok(IkSolution {
                angles: degrees(&q),
                iterations: iteration,
                residual,
            });
        }

        let jacobian = numeric_jacobian(chain, &q, position, config.fd_epsilon);
        let svd = jacobian.svd(true, true);
        if svd.singular_values.iter().any(|s| *s < config.singular_floor) {
            return Err(ConvergenceFailure::Singular);
        }
        let pseudoinverse = svd
            .pseudo_inverse(config.singular_floor)
            .map_err(|_| ConvergenceFailure::Singular)?;

        q += config.damping * (pseudoinverse * error);
    }

    let residual = (target - chain.foot_from_radians(&q)).norm();
    Err(ConvergenceFailure::IterationsExhausted { residual })
}

/// 3x3 position Jacobian by forward finite differences.
fn numeric_jacobian(
    chain: &LegChain,
    q: &Vector3<f64>,
    position: Vector3<f64>,
    epsilon: f64,
) -> Matrix3<f64> {
    let mut jacobian = Matrix3::zeros();
    for i in 0..3 {
        let mut perturbed = *q;
        perturbed[i] += epsilon;
        let column = (chain.foot_from_radians(&perturbed) - position) / epsilon;
        jacobian.set_column(i, &column);
    }
    jacobian
}

fn degrees(q: &Vector3<f64>) -> JointAngles {
    JointAngles::new(
        q[0].to_degrees(),
        q[1].to_degrees(),
        q[2].to_degrees(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
