//! Control-thread runtime.
//!
//! One dedicated thread runs the fixed-rate tick. Every other subsystem
//! talks to it through a thread-safe FIFO command queue and a published
//! snapshot; nothing else ever touches the controller state.
//!
//! Queue semantics: the control thread drains the queue non-blockingly at
//! the start of every tick (drain-until-empty, never wait-for-more), so
//! command bursts cannot stall the loop. A command enqueued after a tick's
//! drain began is guaranteed visible by the next tick. There is no
//! cross-tick cancellation: work in flight always runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::info;

use strider_core::config::RobotConfig;
use strider_core::error::{CommandError, ConfigError};
use strider_core::time::TickClock;

use crate::actuator::Actuator;
use crate::command::Command;
use crate::controller::BodyController;
use crate::snapshot::Snapshot;
use crate::telemetry::Telemetry;

struct Shared {
    snapshot: RwLock<Snapshot>,
    running: AtomicBool,
}

/// Handle to a running control thread.
///
/// Cloning the sender side is cheap; the handle itself owns the thread and
/// stops it on [`shutdown`](Self::shutdown) or drop.
pub struct ControlHandle {
    sender: Sender<Command>,
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl ControlHandle {
    /// Enqueue a command for the next tick.
    ///
    /// # Errors
    ///
    /// [`CommandError::Disconnected`] when the control thread has exited.
    pub fn send(&self, command: Command) -> Result<(), CommandError> {
        self.sender
            .send(command)
            .map_err(|_| CommandError::Disconnected)
    }

    /// Latest published snapshot. Non-blocking with respect to the control
    /// thread beyond the copy itself.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        match self.shared.snapshot.read() {
            Ok(guard) => guard.clone(),
            // A poisoned lock still holds a coherent snapshot; the control
            // thread never panics mid-write.
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether the control thread is still ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }

    /// Stop the control thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ControlHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start the control loop on its own thread.
///
/// # Errors
///
/// [`ConfigError`] when the configuration fails validation; nothing is
/// spawned in that case.
pub fn spawn<A, T>(
    config: &RobotConfig,
    actuator: A,
    telemetry: T,
) -> Result<ControlHandle, ConfigError>
where
    A: Actuator + Send + 'static,
    T: Telemetry + Send + 'static,
{
    let mut controller = BodyController::new(config, actuator)?;
    let rate_hz = config.control.rate_hz;

    let (sender, receiver): (Sender<Command>, Receiver<Command>) = unbounded();
    let shared = Arc::new(Shared {
        snapshot: RwLock::new(Snapshot::default()),
        running: AtomicBool::new(true),
    });

    let thread_shared = Arc::clone(&shared);
    let mut telemetry = telemetry;
    let thread = std::thread::Builder::new()
        .name("strider-control".into())
        .spawn(move || {
            info!(rate_hz, "control loop started");
            let mut clock = TickClock::new(rate_hz);
            while thread_shared.running.load(Ordering::Relaxed) {
                for command in receiver.try_iter() {
                    controller.apply(command);
                }
                controller.tick();

                let snapshot = controller.snapshot(telemetry.read());
                if let Ok(mut guard) = thread_shared.snapshot.write() {
                    *guard = snapshot;
                }

                clock.wait();
            }
            info!("control loop stopped");
        })
        .map_err(ConfigError::Io)?;

    Ok(ControlHandle {
        sender,
        shared,
        thread: Some(thread),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::actuator::NullActuator;
    use crate::telemetry::NoTelemetry;
    use strider_gait::GaitMode;

    /// Fast loop so the tests finish quickly.
    fn test_config() -> RobotConfig {
        let mut config = RobotConfig::default();
        config.control.rate_hz = 200.0;
        config
    }

    #[test]
    fn spawn_rejects_invalid_config() {
        let mut config = test_config();
        config.control.speed = 0.0;
        assert!(spawn(&config, NullActuator, NoTelemetry).is_err());
    }

    #[test]
    fn loop_ticks_and_publishes_snapshots() {
        let handle = spawn(&test_config(), NullActuator, NoTelemetry).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        let snapshot = handle.snapshot();
        assert!(snapshot.tick > 5, "only {} ticks", snapshot.tick);
        assert_eq!(snapshot.legs.len(), 4);
        handle.shutdown();
    }

    #[test]
    fn commands_take_effect_by_a_later_tick() {
        let handle = spawn(&test_config(), NullActuator, NoTelemetry).unwrap();
        handle.send(Command::StartWalk).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.gait_mode, GaitMode::Trot);
        assert!(snapshot.phase > 0.0);
        handle.shutdown();
    }

    #[test]
    fn shutdown_stops_the_thread() {
        let handle = spawn(&test_config(), NullActuator, NoTelemetry).unwrap();
        assert!(handle.is_running());
        handle.shutdown();
        // Handle consumed; nothing left to assert beyond a clean join.
    }
}
