//! Typed messages into and out of the scene.
//!
//! Producers outside the frame loop (UI buttons, the story section detector,
//! the asset loader, weather and time-of-day toggles) push [`SceneEvent`]s;
//! the scene drains them at the start of the next frame. The scene in turn
//! records [`SceneNotice`]s stamped with the frame they happened on.

use crate::hotspot::HotspotId;
use crate::phase::ScenePhase;
use crate::weather::WeatherSnapshot;

#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    /// Click on a crystal, or a 2D button mirroring one.
    ToggleHotspot(HotspotId),
    /// Explicit selection from outside the canvas.
    SetHotspot(Option<HotspotId>),
    /// Click on empty space.
    ClearHotspot,
    Story {
        active: bool,
        progress: f32,
        block: u8,
    },
    /// Scroll fraction at which the story section ends, once measured.
    StoryEnd(Option<f32>),
    /// Asset load progress in percent.
    LoadProgress(f32),
    /// Effective weather, or `None` when weather lighting is off.
    Weather(Option<WeatherSnapshot>),
    TimeLighting(bool),
    OrbitDrag {
        dx: f32,
        dy: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneNotice {
    HotspotChanged(Option<HotspotId>),
    PhaseChanged(ScenePhase),
    /// The intro fog is clearing; page text may animate in.
    Revealed,
}

impl SceneNotice {
    /// DOM event name the web front end dispatches for this notice.
    pub fn dom_name(&self) -> &'static str {
        match self {
            SceneNotice::HotspotChanged(_) => "threemodel:hotspot",
            SceneNotice::PhaseChanged(_) => "threemodel:phase",
            SceneNotice::Revealed => "threemodel:reveal",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stamped<T> {
    pub frame_index: u64,
    pub item: T,
}

/// FIFO of items tagged with the frame index they were recorded on.
#[derive(Clone, Debug)]
pub struct EventQueue<T> {
    items: Vec<Stamped<T>>,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame_index: u64, item: T) {
        self.items.push(Stamped { frame_index, item });
    }

    pub fn items(&self) -> &[Stamped<T>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Stamped<T>> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_clears() {
        let mut q = EventQueue::new();
        q.push(3, SceneNotice::Revealed);
        q.push(4, SceneNotice::PhaseChanged(ScenePhase::Ready));
        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].frame_index, 3);
        assert!(q.is_empty());
    }
}
