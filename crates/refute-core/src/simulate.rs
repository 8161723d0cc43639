use refute_monitor::Trace;
use refute_space::Point;

/// External simulator failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("simulation failed: {0}")]
    Failed(String),

    #[error("simulation timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// The external simulate-and-trace collaborator.
///
/// Takes a sample point and a maximum trace length, returns the execution
/// trace. The engine treats calls as synchronous and non-idempotent: retrying
/// a failed call is a policy decision of the falsification loop, never an
/// assumption about the simulator.
pub trait Simulator {
    fn simulate(&mut self, point: &Point, max_steps: usize) -> Result<Trace, SimulationError>;
}

/// Adapter for closure-based simulators; the main seam for loop tests.
pub struct FnSimulator<F>(pub F);

impl<F> Simulator for FnSimulator<F>
where
    F: FnMut(&Point, usize) -> Result<Trace, SimulationError>,
{
    fn simulate(&mut self, point: &Point, max_steps: usize) -> Result<Trace, SimulationError> {
        (self.0)(point, max_steps)
    }
}
