//! Smooth page scrolling with exponential ease-out.
//!
//! Keys and the mouse wheel move the scroll *target*; each frame the
//! position closes a fraction of the remaining distance.  The per-frame
//! step is capped so the offset never skips over a menu item's threshold
//! zone between two frames.

/// Pixel-offset smooth scroll animator.
#[derive(Debug, Clone)]
pub struct ScrollDriver {
    position: f64,
    target: f64,
    max: f64,
    /// Damping: the remaining distance shrinks by this fraction per frame.
    speed: f64,
    /// Largest distance covered in one frame.
    max_step: f64,
}

impl ScrollDriver {
    pub fn new(speed: f64, max_step: f64) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            max: 0.0,
            speed: speed.clamp(0.05, 0.95),
            max_step: max_step.max(1.0),
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Largest reachable offset (content height minus viewport height).
    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(0.0);
        self.target = self.target.clamp(0.0, self.max);
        self.position = self.position.clamp(0.0, self.max);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.target + delta);
    }

    pub fn scroll_to(&mut self, target: f64) {
        self.target = target.clamp(0.0, self.max);
    }

    pub fn scroll_to_end(&mut self) {
        self.target = self.max;
    }

    /// Move towards the target.  Call once per frame; returns the new
    /// position.
    pub fn tick(&mut self) -> f64 {
        let remaining = self.target - self.position;
        if remaining.abs() < 0.5 {
            self.position = self.target;
        } else {
            let step = (remaining * self.speed).clamp(-self.max_step, self.max_step);
            // Always make at least half a pixel of progress.
            self.position += if step.abs() < 0.5 { 0.5 * remaining.signum() } else { step };
        }
        self.position
    }

    /// True while the position has not reached the target.
    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.position != self.target
    }
}
