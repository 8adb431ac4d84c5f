//! Controller layer: page controllers, their view state, and the UI inputs they consume.

pub mod bills;
pub mod events;
pub mod new_bill;
