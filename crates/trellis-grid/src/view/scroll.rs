//! Scrollbar collaborator boundary.
//!
//! The engine never owns scroll offsets; it reads the current values from
//! the host's scrollbar pair and writes the content extent back after
//! layout. [`SharedScrollState`] is a self-contained implementation with
//! clamping, usable directly by hosts without their own scrollbar widgets.

use parking_lot::Mutex;
use trellis_core::geometry::Size;

/// The value/extent contract of a horizontal+vertical scrollbar pair.
pub trait ScrollBar: Send + Sync {
    /// Current horizontal scroll offset.
    fn value_x(&self) -> f32;

    /// Current vertical scroll offset.
    fn value_y(&self) -> f32;

    /// Set the horizontal offset. Implementations clamp to the scrollable
    /// range.
    fn set_value_x(&self, value: f32);

    /// Set the vertical offset. Implementations clamp to the scrollable
    /// range.
    fn set_value_y(&self, value: f32);

    /// Publish the content and viewport extents after layout.
    fn set_content_extent(&self, content: Size, viewport: Size);

    /// Whether the horizontal bar is shown (content wider than viewport).
    fn visible_x(&self) -> bool;

    /// Whether the vertical bar is shown (content taller than viewport).
    fn visible_y(&self) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
struct ScrollData {
    value_x: f32,
    value_y: f32,
    content: Size,
    viewport: Size,
}

impl ScrollData {
    fn max_x(&self) -> f32 {
        (self.content.width - self.viewport.width).max(0.0)
    }

    fn max_y(&self) -> f32 {
        (self.content.height - self.viewport.height).max(0.0)
    }
}

/// A clamping scrollbar-state implementation.
///
/// Offsets are clamped on every write and re-clamped when the extent
/// shrinks, so the viewport can never drift past the content.
#[derive(Debug, Default)]
pub struct SharedScrollState {
    inner: Mutex<ScrollData>,
}

impl SharedScrollState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScrollBar for SharedScrollState {
    fn value_x(&self) -> f32 {
        self.inner.lock().value_x
    }

    fn value_y(&self) -> f32 {
        self.inner.lock().value_y
    }

    fn set_value_x(&self, value: f32) {
        let mut data = self.inner.lock();
        data.value_x = value.clamp(0.0, data.max_x());
    }

    fn set_value_y(&self, value: f32) {
        let mut data = self.inner.lock();
        data.value_y = value.clamp(0.0, data.max_y());
    }

    fn set_content_extent(&self, content: Size, viewport: Size) {
        let mut data = self.inner.lock();
        data.content = content;
        data.viewport = viewport;
        // Re-clamp in case the content shrank under the current offsets.
        data.value_x = data.value_x.clamp(0.0, data.max_x());
        data.value_y = data.value_y.clamp(0.0, data.max_y());
    }

    fn visible_x(&self) -> bool {
        self.inner.lock().max_x() > 0.0
    }

    fn visible_y(&self) -> bool {
        self.inner.lock().max_y() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_content() {
        let scroll = SharedScrollState::new();
        scroll.set_content_extent(Size::new(500.0, 1000.0), Size::new(200.0, 300.0));

        scroll.set_value_x(10_000.0);
        assert_eq!(scroll.value_x(), 300.0);
        scroll.set_value_y(-5.0);
        assert_eq!(scroll.value_y(), 0.0);

        assert!(scroll.visible_x());
        assert!(scroll.visible_y());
    }

    #[test]
    fn test_reclamps_when_content_shrinks() {
        let scroll = SharedScrollState::new();
        scroll.set_content_extent(Size::new(1000.0, 1000.0), Size::new(200.0, 200.0));
        scroll.set_value_y(800.0);

        scroll.set_content_extent(Size::new(1000.0, 300.0), Size::new(200.0, 200.0));
        assert_eq!(scroll.value_y(), 100.0);
    }

    #[test]
    fn test_bars_hidden_when_content_fits() {
        let scroll = SharedScrollState::new();
        scroll.set_content_extent(Size::new(100.0, 100.0), Size::new(200.0, 200.0));
        assert!(!scroll.visible_x());
        assert!(!scroll.visible_y());
        scroll.set_value_x(50.0);
        assert_eq!(scroll.value_x(), 0.0);
    }
}
