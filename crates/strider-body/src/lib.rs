// strider-body: leg models, command arbitration, the control tick and its runtime thread.

pub mod actuator;
pub mod command;
pub mod controller;
pub mod leg;
pub mod runtime;
pub mod snapshot;
pub mod telemetry;

pub use actuator::{Actuator, CalibrationTable, LoggingActuator, NullActuator, RecordingActuator};
pub use command::{Command, JointTarget};
pub use controller::{BodyController, SAFE_MAX_DEG, SAFE_MIN_DEG};
pub use leg::LegModel;
pub use runtime::{ControlHandle, spawn};
pub use snapshot::{LegSnapshot, Snapshot};
pub use telemetry::{NoTelemetry, Telemetry};
