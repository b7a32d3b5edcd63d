use crate::error::{FluidError, Result};
use crate::frame::Frame;

/// Book-keeping shared by every physics animation: where the timeline stands
/// and how frames are split into sub-timesteps.
#[derive(Debug, Clone)]
pub struct PhysicsAnimationState {
    current_frame: Frame,
    current_time_in_seconds: f64,
    is_using_fixed_sub_time_steps: bool,
    number_of_fixed_sub_time_steps: usize,
    has_initialized: bool,
}

impl PhysicsAnimationState {
    pub fn current_frame(&self) -> Frame {
        self.current_frame
    }

    pub fn current_time_in_seconds(&self) -> f64 {
        self.current_time_in_seconds
    }

    pub fn is_using_fixed_sub_time_steps(&self) -> bool {
        self.is_using_fixed_sub_time_steps
    }

    pub fn set_is_using_fixed_sub_time_steps(&mut self, value: bool) {
        self.is_using_fixed_sub_time_steps = value;
    }

    pub fn number_of_fixed_sub_time_steps(&self) -> usize {
        self.number_of_fixed_sub_time_steps
    }

    pub fn set_number_of_fixed_sub_time_steps(&mut self, count: usize) {
        self.number_of_fixed_sub_time_steps = count.max(1);
    }
}

impl Default for PhysicsAnimationState {
    fn default() -> Self {
        Self {
            current_frame: Frame::default(),
            current_time_in_seconds: 0.0,
            is_using_fixed_sub_time_steps: true,
            number_of_fixed_sub_time_steps: 1,
            has_initialized: false,
        }
    }
}

/// Fixed-frame physics driver with adaptive sub-timestepping.
///
/// Implementors supply the sub-step body; the provided [`update`] drives the
/// timeline frame-by-frame, splitting each frame into
/// [`number_of_sub_time_steps`] equal sub-timesteps (or a fixed count when
/// fixed stepping is enabled).
///
/// [`update`]: PhysicsAnimation::update
/// [`number_of_sub_time_steps`]: PhysicsAnimation::number_of_sub_time_steps
pub trait PhysicsAnimation {
    fn physics_state(&self) -> &PhysicsAnimationState;

    fn physics_state_mut(&mut self) -> &mut PhysicsAnimationState;

    /// One sub-timestep of physics. A failure here aborts the frame and
    /// leaves the system in an indeterminate state.
    fn on_advance_sub_time_step(&mut self, time_interval_in_seconds: f64) -> Result<()>;

    /// How many sub-timesteps the given frame interval needs.
    fn number_of_sub_time_steps(&self, _time_interval_in_seconds: f64) -> usize {
        1
    }

    /// Called once before the very first advance.
    fn on_initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Advance the simulation to `frame`.
    ///
    /// Calling with the current frame index is a no-op; an index in the past
    /// is silently ignored. A non-positive frame interval is rejected.
    fn update(&mut self, frame: Frame) -> Result<()> {
        if frame.time_interval_in_seconds <= 0.0 {
            return Err(FluidError::InvalidArgument(format!(
                "frame interval must be positive, got {}",
                frame.time_interval_in_seconds
            )));
        }

        if !self.physics_state().has_initialized {
            self.on_initialize()?;
            self.physics_state_mut().has_initialized = true;
        }

        let current_index = self.physics_state().current_frame.index;
        if frame.index > current_index {
            for i in 0..(frame.index - current_index) {
                // Re-anchor the clock at each frame boundary so it cannot
                // drift over long runs; sub-timesteps accumulate within the
                // frame.
                let frame_begin =
                    Frame::new(current_index + i, frame.time_interval_in_seconds);
                self.physics_state_mut().current_time_in_seconds =
                    frame_begin.time_in_seconds();
                self.advance_time_step(frame.time_interval_in_seconds)?;
            }
            self.physics_state_mut().current_frame = frame;
        }

        Ok(())
    }

    /// Advance by one frame interval, split into equal sub-timesteps.
    fn advance_time_step(&mut self, time_interval_in_seconds: f64) -> Result<()> {
        let num_steps = if self.physics_state().is_using_fixed_sub_time_steps {
            self.physics_state().number_of_fixed_sub_time_steps
        } else {
            self.number_of_sub_time_steps(time_interval_in_seconds).max(1)
        };
        let actual_time_interval = time_interval_in_seconds / num_steps as f64;

        for _ in 0..num_steps {
            self.on_advance_sub_time_step(actual_time_interval)?;
            self.physics_state_mut().current_time_in_seconds += actual_time_interval;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StepCounter {
        state: PhysicsAnimationState,
        steps: Vec<f64>,
        initialized: u32,
        requested_sub_steps: usize,
    }

    impl StepCounter {
        fn new(requested_sub_steps: usize) -> Self {
            Self {
                state: PhysicsAnimationState::default(),
                steps: Vec::new(),
                initialized: 0,
                requested_sub_steps,
            }
        }
    }

    impl PhysicsAnimation for StepCounter {
        fn physics_state(&self) -> &PhysicsAnimationState {
            &self.state
        }

        fn physics_state_mut(&mut self) -> &mut PhysicsAnimationState {
            &mut self.state
        }

        fn on_advance_sub_time_step(&mut self, dt: f64) -> Result<()> {
            self.steps.push(dt);
            Ok(())
        }

        fn number_of_sub_time_steps(&self, _dt: f64) -> usize {
            self.requested_sub_steps
        }

        fn on_initialize(&mut self) -> Result<()> {
            self.initialized += 1;
            Ok(())
        }
    }

    #[test]
    fn rejects_non_positive_interval() {
        let mut anim = StepCounter::new(1);
        assert!(anim.update(Frame::new(1, 0.0)).is_err());
        assert!(anim.update(Frame::new(1, -1.0)).is_err());
    }

    #[test]
    fn initializes_exactly_once() {
        let mut anim = StepCounter::new(1);
        anim.update(Frame::new(1, 1.0 / 60.0)).unwrap();
        anim.update(Frame::new(2, 1.0 / 60.0)).unwrap();
        assert_eq!(anim.initialized, 1);
    }

    #[test]
    fn catches_up_over_skipped_frames() {
        let mut anim = StepCounter::new(1);
        anim.update(Frame::new(3, 0.5)).unwrap();
        assert_eq!(anim.steps.len(), 3);
        assert!((anim.state.current_time_in_seconds() - 1.5).abs() < 1e-12);
        assert_eq!(anim.state.current_frame().index, 3);
    }

    #[test]
    fn past_and_present_frames_are_no_ops() {
        let mut anim = StepCounter::new(1);
        anim.update(Frame::new(2, 0.5)).unwrap();
        anim.update(Frame::new(2, 0.5)).unwrap();
        anim.update(Frame::new(1, 0.5)).unwrap();
        assert_eq!(anim.steps.len(), 2);
        assert_eq!(anim.state.current_frame().index, 2);
    }

    #[test]
    fn adaptive_stepping_splits_frames_evenly() {
        let mut anim = StepCounter::new(4);
        anim.state.set_is_using_fixed_sub_time_steps(false);
        anim.update(Frame::new(1, 1.0)).unwrap();
        assert_eq!(anim.steps.len(), 4);
        for dt in &anim.steps {
            assert!((dt - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn fixed_stepping_ignores_heuristic() {
        let mut anim = StepCounter::new(7);
        anim.state.set_number_of_fixed_sub_time_steps(2);
        anim.update(Frame::new(1, 1.0)).unwrap();
        assert_eq!(anim.steps.len(), 2);
    }
}
