//! Door controller: wires the serial link, decision gate, motor, and
//! remote channel into an access-controlled door.
//!
//! Data flow:
//!
//! ```text
//! serial bytes -> Transport -> Codec -> { Response  -> Correlator
//!                                       ; Detection -> RecognitionGate
//!                                       ; Recognition -> RecognitionGate }
//! RecognitionGate -> success -> Door::open -> StepperMotor + auto-close
//!                 -> reject  -> remote log sink
//! RemoteCommand -> DoorController::handle_remote_command
//! ```

pub mod controller;
pub mod door;

pub use controller::{ControllerConfig, DoorController};
pub use door::Door;
