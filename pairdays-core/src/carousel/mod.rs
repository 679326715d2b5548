//! Image carousel state for multi-image memories.
//!
//! Two input paths drive the active slide:
//! - the inline strip in the feed, where every horizontal scroll tick
//!   recomputes the index from the scroll position ([`Carousel::on_scroll`])
//! - the full-screen [`Viewer`], driven by drag/pinch gestures
//!
//! Dot indicators are derived from the active index, never stored.

mod viewer;

pub use viewer::{GesturePhase, Viewer, ViewerOutcome};

use std::collections::HashMap;
use uuid::Uuid;

/// Active slide of one memory's image strip. Only exists for one or more
/// images; a memory without images has no carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    image_count: usize,
    active: usize,
}

impl Carousel {
    pub fn new(image_count: usize) -> Option<Self> {
        (image_count > 0).then_some(Carousel {
            image_count,
            active: 0,
        })
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    fn last(&self) -> usize {
        self.image_count - 1
    }

    /// Jump to `index`, clamped to the available slides.
    pub fn set_active(&mut self, index: usize) {
        self.active = index.min(self.last());
    }

    /// Recompute the active slide from the strip's horizontal scroll
    /// position. Idempotent; meant to run on every scroll tick.
    pub fn on_scroll(&mut self, scroll_left: f64, slide_width: f64) {
        if !(slide_width.is_finite() && slide_width > 0.0) || !scroll_left.is_finite() {
            return;
        }
        let index = (scroll_left / slide_width).round().max(0.0) as usize;
        self.set_active(index);
    }

    pub fn next(&mut self) -> bool {
        if self.active < self.last() {
            self.active += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.active > 0 {
            self.active -= 1;
            true
        } else {
            false
        }
    }

    /// One flag per slide, true for the active one.
    pub fn dots(&self) -> Vec<bool> {
        (0..self.image_count).map(|i| i == self.active).collect()
    }
}

/// Per-memory carousels for a whole feed. Every memory starts on its first
/// image.
#[derive(Debug, Default)]
pub struct CarouselBoard {
    carousels: HashMap<Uuid, Carousel>,
}

impl CarouselBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or resize) the carousel for a memory. Memories with no
    /// images are dropped from the board.
    pub fn track(&mut self, memory_id: Uuid, image_count: usize) {
        match Carousel::new(image_count) {
            Some(fresh) => {
                let carousel = self.carousels.entry(memory_id).or_insert(fresh);
                carousel.image_count = image_count;
                carousel.set_active(carousel.active);
            }
            None => {
                self.carousels.remove(&memory_id);
            }
        }
    }

    pub fn get(&self, memory_id: Uuid) -> Option<&Carousel> {
        self.carousels.get(&memory_id)
    }

    pub fn active(&self, memory_id: Uuid) -> usize {
        self.get(memory_id).map(Carousel::active).unwrap_or(0)
    }

    pub fn on_scroll(&mut self, memory_id: Uuid, scroll_left: f64, slide_width: f64) {
        if let Some(carousel) = self.carousels.get_mut(&memory_id) {
            carousel.on_scroll(scroll_left, slide_width);
        }
    }

    /// Drop carousels for memories no longer in the feed.
    pub fn retain(&mut self, live: &[Uuid]) {
        self.carousels.retain(|id, _| live.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_carousel_without_images() {
        assert!(Carousel::new(0).is_none());
    }

    #[test]
    fn test_scroll_rounds_to_nearest_slide() {
        let mut carousel = Carousel::new(4).unwrap();
        carousel.on_scroll(320.0, 300.0);
        assert_eq!(carousel.active(), 1);
        carousel.on_scroll(449.0, 300.0);
        assert_eq!(carousel.active(), 1);
        carousel.on_scroll(451.0, 300.0);
        assert_eq!(carousel.active(), 2);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut carousel = Carousel::new(3).unwrap();
        carousel.on_scroll(10_000.0, 300.0);
        assert_eq!(carousel.active(), 2);
        carousel.on_scroll(-500.0, 300.0);
        assert_eq!(carousel.active(), 0);
    }

    #[test]
    fn test_scroll_ignores_degenerate_width() {
        let mut carousel = Carousel::new(3).unwrap();
        carousel.set_active(2);
        carousel.on_scroll(100.0, 0.0);
        carousel.on_scroll(f64::NAN, 300.0);
        assert_eq!(carousel.active(), 2);
    }

    #[test]
    fn test_index_stays_in_bounds_for_any_sequence() {
        let mut carousel = Carousel::new(5).unwrap();
        let positions = [0.0, 1234.5, -3.0, 299.9, 1e9, 600.0, 150.0];
        for (i, pos) in positions.iter().enumerate() {
            carousel.on_scroll(*pos, 300.0);
            if i % 2 == 0 {
                carousel.next();
            } else {
                carousel.previous();
            }
            assert!(carousel.active() < carousel.image_count());
        }
    }

    #[test]
    fn test_dots_follow_active() {
        let mut carousel = Carousel::new(3).unwrap();
        carousel.next();
        assert_eq!(carousel.dots(), vec![false, true, false]);
    }

    #[test]
    fn test_board_tracks_each_memory() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut board = CarouselBoard::new();
        board.track(a, 3);
        board.track(b, 2);

        board.on_scroll(a, 600.0, 300.0);
        assert_eq!(board.active(a), 2);
        assert_eq!(board.active(b), 0);

        // shrinking the image list clamps the index
        board.track(a, 2);
        assert_eq!(board.active(a), 1);

        board.track(b, 0);
        assert!(board.get(b).is_none());

        board.retain(&[]);
        assert!(board.get(a).is_none());
    }
}
