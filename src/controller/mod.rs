// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod camera_controller;
pub mod movement;
pub mod interaction;
pub mod door;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputProcessor, KeyBindings, MovementKeys};
pub use camera_controller::LookController;
pub use movement::{MovementController, MoveOutcome};
pub use interaction::{InteractionDispatcher, InteractionState};
pub use door::DoorAnimator;
pub use frame_loop::{FrameReport, Walkthrough};
