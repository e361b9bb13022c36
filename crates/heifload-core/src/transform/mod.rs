//! The two transformation stages applied to a decoded frame.
//!
//! # Stage Order
//!
//! 1. Crop: the declared crop rectangle becomes a view into the buffer
//! 2. Orientation: the declared orientation moves into the EXIF block
//!
//! Both stages take a container by reference and return a new one. Crop
//! runs first because it is the only stage that can fail.

mod crop;
mod orientation;

pub use crop::crop;
pub use orientation::reconcile;
