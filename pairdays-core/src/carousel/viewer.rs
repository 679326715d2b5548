//! Full-screen image viewer driven by drag and pinch gestures.
//!
//! ```text
//!   Idle --pointer_down--> Dragging --pointer_up--> Settling --settle--> Idle
//!                            |  ^                      |
//!                            +--+ pointer_move         +--pointer_down--> Dragging
//! ```
//!
//! On release the drag offset picks the outcome: a vertical pull past
//! `DISMISS_THRESHOLD_PX` closes the viewer, otherwise a horizontal pull past
//! `SWIPE_THRESHOLD_PX` changes slide. The translation always snaps back to
//! the origin on release. Zoom survives slide changes and is only reset when
//! the viewer closes.

use crate::carousel::Carousel;
use crate::constants::{DISMISS_THRESHOLD_PX, MAX_SCALE, MIN_SCALE, SWIPE_THRESHOLD_PX};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging { dx: f64, dy: f64 },
    /// Released; the image is animating back to the origin.
    Settling,
}

/// What a pointer release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerOutcome {
    Stay,
    Next,
    Previous,
    Dismiss,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    carousel: Carousel,
    phase: GesturePhase,
    scale: f64,
    open: bool,
}

impl Viewer {
    /// Open on `start_index` (clamped). `None` when there is nothing to show.
    pub fn open(image_count: usize, start_index: usize) -> Option<Self> {
        let mut carousel = Carousel::new(image_count)?;
        carousel.set_active(start_index);
        Some(Viewer {
            carousel,
            phase: GesturePhase::Idle,
            scale: MIN_SCALE,
            open: true,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active(&self) -> usize {
        self.carousel.active()
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current translation of the image; zero unless a drag is in progress.
    pub fn offset(&self) -> (f64, f64) {
        match self.phase {
            GesturePhase::Dragging { dx, dy } => (dx, dy),
            _ => (0.0, 0.0),
        }
    }

    pub fn pointer_down(&mut self) {
        if self.open {
            self.phase = GesturePhase::Dragging { dx: 0.0, dy: 0.0 };
        }
    }

    /// Report the drag's total offset from where the pointer went down.
    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        if let GesturePhase::Dragging { .. } = self.phase {
            self.phase = GesturePhase::Dragging { dx, dy };
        }
    }

    pub fn pointer_up(&mut self) -> ViewerOutcome {
        let GesturePhase::Dragging { dx, dy } = self.phase else {
            return ViewerOutcome::Stay;
        };
        self.phase = GesturePhase::Settling;

        if dy.abs() > DISMISS_THRESHOLD_PX {
            self.close();
            return ViewerOutcome::Dismiss;
        }

        // Dragging left reveals the next image.
        if dx < -SWIPE_THRESHOLD_PX && self.carousel.next() {
            ViewerOutcome::Next
        } else if dx > SWIPE_THRESHOLD_PX && self.carousel.previous() {
            ViewerOutcome::Previous
        } else {
            ViewerOutcome::Stay
        }
    }

    /// The snap-back animation finished.
    pub fn settle(&mut self) {
        if self.phase == GesturePhase::Settling {
            self.phase = GesturePhase::Idle;
        }
    }

    /// A whole drag in one call: down, move to `(dx, dy)`, release.
    pub fn fling(&mut self, dx: f64, dy: f64) -> ViewerOutcome {
        self.pointer_down();
        self.pointer_move(dx, dy);
        let outcome = self.pointer_up();
        self.settle();
        outcome
    }

    /// Apply a pinch; `scale` is the gesture's cumulative scale factor.
    pub fn pinch(&mut self, scale: f64) {
        if self.open && scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.scale = MIN_SCALE;
        self.phase = GesturePhase::Idle;
    }
}
