//! Output drivers: the PCA9685 controller, the servo and frog built on its
//! channels, and the turnout actuator that combines them.

pub mod frog;
pub mod pca9685;
pub mod servo;
pub mod turnout;
