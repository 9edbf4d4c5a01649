// Decorative timing: visibility sensors, one-shot sparkle windows and the
// falling-petal window. All timers run on the tokio clock and are aborted when
// their owner is dropped.

pub mod one_shot;
pub mod timer;
pub mod visibility;

pub use one_shot::OneShotAnimation;
pub use timer::TimedWindow;
pub use visibility::VisibilitySensor;
