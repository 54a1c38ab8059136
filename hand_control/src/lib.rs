//! # hand_control
//!
//! Desktop front end for [`hand_engine`]: a hand source feeds landmark
//! frames to the engine, whose commands drive a simulated desktop shown in
//! a software overlay window.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the mouse and keyboard pose a
//!   synthetic hand.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! `--replay <file>` plays back a JSON-lines recording in either build.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | mouse | Index fingertip position |
//! | `1`…`5` | Toggle thumb … pinky |
//! | `[` / `]` | Narrow / widen the thumb–index pinch |
//! | `P` | Pinch on / off |
//! | `-` / `=` | Shrink / grow the hand |
//! | `H` | Hide / show the hand |
//! | `Escape` | Quit |

pub mod app;
pub mod desktop;
pub mod sim;
pub mod source;
pub mod visualizer;
