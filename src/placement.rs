/// Tooltip placement for guided-tour hints.
///
/// Given the anchor element's rectangle, the tooltip size and the viewport,
/// pick the first side that fits (bottom, top, right, left) and clamp the
/// result so the tooltip never leaves the viewport. Pure geometry; the overlay
/// applies the returned coordinates as-is.
use serde::{Deserialize, Serialize};

/// Gap between the anchor edge and the tooltip, in CSS pixels.
const GAP: f64 = 12.0;

/// Default tooltip box used when the host does not report one.
pub const DEFAULT_TOOLTIP: Size = Size { width: 320.0, height: 140.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    fn right(&self) -> f64  { self.x + self.width }
    fn bottom(&self) -> f64 { self.y + self.height }
    fn center_x(&self) -> f64 { self.x + self.width / 2.0 }
    fn center_y(&self) -> f64 { self.y + self.height / 2.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width:  f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self { width: 1280.0, height: 800.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bottom,
    Top,
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub side: Side,
    pub x:    f64,
    pub y:    f64,
}

fn candidate(side: Side, anchor: &Rect, tip: Size) -> (f64, f64) {
    match side {
        Side::Bottom => (anchor.center_x() - tip.width / 2.0, anchor.bottom() + GAP),
        Side::Top    => (anchor.center_x() - tip.width / 2.0, anchor.y - GAP - tip.height),
        Side::Right  => (anchor.right() + GAP, anchor.center_y() - tip.height / 2.0),
        Side::Left   => (anchor.x - GAP - tip.width, anchor.center_y() - tip.height / 2.0),
    }
}

fn fits(side: Side, x: f64, y: f64, tip: Size, viewport: Size) -> bool {
    match side {
        Side::Bottom => y + tip.height <= viewport.height,
        Side::Top    => y >= 0.0,
        Side::Right  => x + tip.width <= viewport.width,
        Side::Left   => x >= 0.0,
    }
}

fn clamp(v: f64, extent: f64, limit: f64) -> f64 {
    v.min(limit - extent).max(0.0)
}

pub fn place(anchor: &Rect, tip: Size, viewport: Size) -> Placement {
    let side = [Side::Bottom, Side::Top, Side::Right, Side::Left]
        .into_iter()
        .find(|&s| {
            let (x, y) = candidate(s, anchor, tip);
            fits(s, x, y, tip, viewport)
        })
        .unwrap_or(Side::Bottom);

    let (x, y) = candidate(side, anchor, tip);
    Placement {
        side,
        x: clamp(x, tip.width, viewport.width),
        y: clamp(y, tip.height, viewport.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Size = Size { width: 1000.0, height: 800.0 };
    const TIP:  Size = Size { width: 200.0,  height: 100.0 };

    #[test]
    fn prefers_below_anchor() {
        let p = place(&Rect::new(400.0, 100.0, 200.0, 50.0), TIP, VIEW);
        assert_eq!(p.side, Side::Bottom);
        assert_eq!(p.x, 400.0);
        assert_eq!(p.y, 162.0);
    }

    #[test]
    fn flips_above_near_bottom_edge() {
        let p = place(&Rect::new(400.0, 700.0, 200.0, 50.0), TIP, VIEW);
        assert_eq!(p.side, Side::Top);
        assert_eq!(p.y, 700.0 - GAP - 100.0);
    }

    #[test]
    fn uses_right_for_full_height_anchor() {
        let p = place(&Rect::new(0.0, 0.0, 300.0, 800.0), TIP, VIEW);
        assert_eq!(p.side, Side::Right);
        assert_eq!(p.x, 312.0);
        assert_eq!(p.y, 350.0);
    }

    #[test]
    fn clamps_into_viewport() {
        // Anchor hugging the left edge: centred tooltip would start at x < 0
        let p = place(&Rect::new(0.0, 100.0, 40.0, 20.0), TIP, VIEW);
        assert_eq!(p.side, Side::Bottom);
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn falls_back_to_clamped_bottom_when_nothing_fits() {
        let tiny = Size { width: 150.0, height: 90.0 };
        let p = place(&Rect::new(0.0, 0.0, 150.0, 90.0), TIP, tiny);
        assert_eq!(p.side, Side::Bottom);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
    }
}
