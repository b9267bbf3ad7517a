// strider-kinematics: DH-chain forward kinematics and the iterative IK solver.

pub mod chain;
pub mod solver;

pub use chain::{DhLink, LegChain, dh_matrix};
pub use solver::{IkConfig, IkSolution, solve};
