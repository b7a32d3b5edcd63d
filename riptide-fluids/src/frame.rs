/// A display frame: an index into a fixed-rate timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub index: u32,
    pub time_interval_in_seconds: f64,
}

impl Frame {
    pub fn new(index: u32, time_interval_in_seconds: f64) -> Self {
        Self {
            index,
            time_interval_in_seconds,
        }
    }

    /// Timeline position of this frame.
    pub fn time_in_seconds(&self) -> f64 {
        self.index as f64 * self.time_interval_in_seconds
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    pub fn advance_by(&mut self, delta: u32) {
        self.index += delta;
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            index: 0,
            time_interval_in_seconds: 1.0 / 60.0,
        }
    }
}

/// A purely kinematic animation driven by frame updates.
pub trait Animation {
    fn on_update(&mut self, frame: Frame);

    /// Advance the animation to `frame`.
    fn update(&mut self, frame: Frame) {
        self.on_update(frame);
    }
}
