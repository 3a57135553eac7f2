use crate::camera::{Camera, OrbitControls};
use crate::core::clock::TimeSource;
use crate::scene::Scene;

/// Driver lifecycle. There is no terminal state: once running, the loop
/// lives until the host tears the window down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    Running,
}

/// Owns the per-frame advance: reads elapsed time once, poses every
/// spinning object, and eases the orbit controls. Rendering and the next
/// frame request stay with the caller (the winit redraw handler).
///
/// Object orientation is a pure function of elapsed time - `rate * t`,
/// never `previous + rate * dt` - so a suspended host resumes without any
/// accumulated drift.
#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    frames: u64,
    last_elapsed: f32,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::NotStarted,
            frames: 0,
            last_elapsed: 0.0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds reported by the clock at the last tick.
    pub fn last_elapsed(&self) -> f32 {
        self.last_elapsed
    }

    /// Transition to running. Idempotent.
    pub fn start(&mut self) {
        if self.state == DriverState::NotStarted {
            self.state = DriverState::Running;
            log::debug!("animation driver started");
        }
    }

    /// Advance one frame. Does nothing until [`AnimationDriver::start`]
    /// has been called.
    pub fn tick(
        &mut self,
        clock: &dyn TimeSource,
        scene: &mut Scene,
        controls: &mut OrbitControls,
        camera: &mut Camera,
    ) {
        if self.state != DriverState::Running {
            return;
        }

        let elapsed = clock.elapsed();
        self.last_elapsed = elapsed;
        self.frames += 1;

        for object in &mut scene.objects {
            object.orientation.x = object.spin.x * elapsed;
            object.orientation.y = object.spin.y * elapsed;
        }

        controls.update(camera);
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}
