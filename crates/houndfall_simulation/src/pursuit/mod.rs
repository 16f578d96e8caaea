//! Pursuit controller module
//!
//! machine — чистая машина состояний (transition table);
//! components — Chaser (конфиг + таймер + машина);
//! events — команды и chase-progress notifications;
//! systems — drive_pursuit, единственный исполнитель машины.

pub mod components;
pub mod events;
pub mod machine;
pub mod systems;


pub use components::{Chaser, DEFAULT_CHASE_INTERVAL, DEFAULT_STOP_DISTANCE};
pub use events::{ChaseCommand, ChaseContinued, ChaseStarted};
pub use machine::{ChaseMachine, FovCandidate, MachineContext, PursuitAction, PursuitEvent, PursuitState};
pub use systems::drive_pursuit;
