use crate::harmonics::NUM_HARMONICS;

/*
Editor Geometry
===============

The editor is a stack of horizontal bars, one per harmonic, fundamental at
the BOTTOM. Bar length is amplitude.

  ┌─────────┬──────────────────────────────┬──────┐
  │  label  │████████████░░░░░░░░░░░░░░░░░░│margin│  ← index 15
  │         │██████░░░░░░░░░░░░░░░░░░░░░░░░│      │
  │   ...   │                              │      │
  │  Root   │██████████████████████████████│      │  ← index 0
  └─────────┴──────────────────────────────┴──────┘
  0     label_width            label_width + plot_width

  bar_height = height / N
  index      = (N - 1) - floor(y / bar_height)
  amplitude  = clamp((x - label_width) / plot_width, 0, 1)

The index is NOT clamped. A pointer above the top bar maps to N or more, one
below the bottom bar to a negative index; callers drop those. Amplitude IS
clamped, so dragging past either end of a bar pins it at 0 or 1.
*/

const LABEL_WIDTH: f32 = 45.0;
const RIGHT_MARGIN: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorLayout {
    pub label_width: f32,
    pub plot_width: f32,
    pub height: f32,
}

impl EditorLayout {
    pub fn new(label_width: f32, plot_width: f32, height: f32) -> Self {
        Self {
            label_width,
            plot_width,
            height,
        }
    }

    /// Layout for a canvas of `width x height` with the stock label column
    /// and right margin.
    pub fn for_canvas(width: f32, height: f32) -> Self {
        Self::new(LABEL_WIDTH, width - LABEL_WIDTH - RIGHT_MARGIN, height)
    }

    pub fn bar_height(&self) -> f32 {
        self.height / NUM_HARMONICS as f32
    }

    /// Top edge of the bar drawn for `index`.
    pub fn bar_top(&self, index: usize) -> f32 {
        let row = (NUM_HARMONICS - 1).saturating_sub(index);
        row as f32 * self.bar_height()
    }

    pub fn map_pointer(&self, x: f32, y: f32) -> (isize, f32) {
        map_pointer(x, y, self)
    }
}

/// Map a pointer position to `(harmonic index, amplitude)`.
pub fn map_pointer(x: f32, y: f32, layout: &EditorLayout) -> (isize, f32) {
    let bar_height = layout.bar_height();
    let row = if bar_height > 0.0 {
        (y / bar_height).floor() as isize
    } else {
        0
    };
    let index = (NUM_HARMONICS as isize - 1) - row;

    let amplitude = if layout.plot_width > 0.0 {
        ((x - layout.label_width) / layout.plot_width).clamp(0.0, 1.0)
    } else {
        0.0
    };

    (index, amplitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> EditorLayout {
        // 640 wide: 45 label, 580 plot, 15 margin; 16 bars of 20
        EditorLayout::for_canvas(640.0, 320.0)
    }

    #[test]
    fn canvas_geometry() {
        let l = layout();
        assert_eq!(l.label_width, 45.0);
        assert_eq!(l.plot_width, 580.0);
        assert_eq!(l.bar_height(), 20.0);
        assert_eq!(l.bar_top(0), 300.0);
        assert_eq!(l.bar_top(15), 0.0);
    }

    #[test]
    fn bottom_bar_midpoint_is_the_fundamental() {
        let l = layout();
        let (index, amplitude) = map_pointer(45.0 + 290.0, 310.0, &l);
        assert_eq!(index, 0);
        assert!((amplitude - 0.5).abs() < 1e-6);
    }

    #[test]
    fn amplitude_pins_at_both_ends() {
        let l = layout();
        assert_eq!(map_pointer(10.0, 10.0, &l), (15, 0.0));
        assert_eq!(map_pointer(639.0, 10.0, &l), (15, 1.0));
    }

    #[test]
    fn outside_the_plot_vertically_is_out_of_range() {
        let l = layout();
        assert_eq!(map_pointer(100.0, -1.0, &l).0, 16);
        assert_eq!(map_pointer(100.0, 320.0, &l).0, -1);
    }

    #[test]
    fn degenerate_plot_maps_to_zero() {
        let l = EditorLayout::for_canvas(50.0, 320.0);
        assert_eq!(map_pointer(48.0, 5.0, &l), (15, 0.0));
    }
}
