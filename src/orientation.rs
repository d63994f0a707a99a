//! Buffer orientation: the eight symmetries of the square.
//!
//! Orientation maps between user coordinates and buffer-native coordinates at
//! the boundary of every drawing call, so a portrait display driven in
//! landscape (or mirrored) needs no changes to drawing code. Rotations are
//! counter-clockwise; the flip variants mirror horizontally after rotating.

use crate::geom::{Rectf, Recti, Vec2f, Vec2i};

/// One of the eight symmetries of the square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Upright = 0,
    RotCcw = 1,
    RotHalf = 2,
    RotCw = 3,
    FlipH = 4,
    RotCcwFlipH = 5,
    RotHalfFlipH = 6,
    RotCwFlipH = 7,
}

impl Orientation {
    /// Vertical flip, an alias within the dihedral group.
    pub const FLIP_V: Orientation = Orientation::RotHalfFlipH;

    /// All eight values, in enum order.
    pub const ALL: [Orientation; 8] = [
        Orientation::Upright,
        Orientation::RotCcw,
        Orientation::RotHalf,
        Orientation::RotCw,
        Orientation::FlipH,
        Orientation::RotCcwFlipH,
        Orientation::RotHalfFlipH,
        Orientation::RotCwFlipH,
    ];

    #[inline]
    pub fn from_index(v: u8) -> Orientation {
        Orientation::ALL[(v & 7) as usize]
    }

    /// True when the symmetry swaps the x and y axes.
    #[inline]
    pub const fn swaps_axes(self) -> bool {
        (self as u8) & 1 != 0
    }

    /// The symmetry whose composition with `self` is the identity.
    pub const fn inverse(self) -> Orientation {
        match self {
            Orientation::RotCcw => Orientation::RotCw,
            Orientation::RotCw => Orientation::RotCcw,
            // Half rotation and every flip variant are self-inverse.
            other => other,
        }
    }
}

/// Maps a float point from user space to buffer space for a `width`×`height`
/// buffer.
pub fn orient_vec2f(orientation: Orientation, width: i32, height: i32, v: Vec2f) -> Vec2f {
    let w = width as f32;
    let h = height as f32;
    match orientation {
        Orientation::Upright => v,
        Orientation::RotCcw => Vec2f::new(v.y, h - v.x),
        Orientation::RotHalf => Vec2f::new(w - v.x, h - v.y),
        Orientation::RotCw => Vec2f::new(w - v.y, v.x),
        Orientation::FlipH => Vec2f::new(w - v.x, v.y),
        Orientation::RotCcwFlipH => Vec2f::new(w - v.y, h - v.x),
        Orientation::RotHalfFlipH => Vec2f::new(v.x, h - v.y),
        Orientation::RotCwFlipH => Vec2f::new(v.y, v.x),
    }
}

/// Inverse of [`orient_vec2f`]. Axis-swapping orientations invert against the
/// swapped buffer dimensions.
pub fn unorient_vec2f(orientation: Orientation, width: i32, height: i32, v: Vec2f) -> Vec2f {
    let (w, h) = if orientation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };
    orient_vec2f(orientation.inverse(), w, h, v)
}

/// Maps an integer pixel coordinate from user space to buffer space. Integer
/// mapping indexes pixels, so the buffer dimension is decremented before
/// subtraction.
pub fn orient_vec2i(orientation: Orientation, width: i32, height: i32, v: Vec2i) -> Vec2i {
    let w = width - 1;
    let h = height - 1;
    match orientation {
        Orientation::Upright => v,
        Orientation::RotCcw => Vec2i::new(v.y, h - v.x),
        Orientation::RotHalf => Vec2i::new(w - v.x, h - v.y),
        Orientation::RotCw => Vec2i::new(w - v.y, v.x),
        Orientation::FlipH => Vec2i::new(w - v.x, v.y),
        Orientation::RotCcwFlipH => Vec2i::new(w - v.y, h - v.x),
        Orientation::RotHalfFlipH => Vec2i::new(v.x, h - v.y),
        Orientation::RotCwFlipH => Vec2i::new(v.y, v.x),
    }
}

/// Inverse of [`orient_vec2i`].
pub fn unorient_vec2i(orientation: Orientation, width: i32, height: i32, v: Vec2i) -> Vec2i {
    let (w, h) = if orientation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };
    orient_vec2i(orientation.inverse(), w, h, v)
}

/// Maps a float rectangle from user space to buffer space. The mapped width
/// or height may come out negative, representing mirrored content.
pub fn orient_rectf(orientation: Orientation, width: i32, height: i32, r: Rectf) -> Rectf {
    let w = width as f32;
    let h = height as f32;
    match orientation {
        Orientation::Upright => r,
        Orientation::RotCcw => Rectf::new(r.y, h - r.x, r.h, -r.w),
        Orientation::RotHalf => Rectf::new(w - r.x, h - r.y, -r.w, -r.h),
        Orientation::RotCw => Rectf::new(w - r.y, r.x, -r.h, r.w),
        Orientation::FlipH => Rectf::new(w - r.x, r.y, -r.w, r.h),
        Orientation::RotCcwFlipH => Rectf::new(w - r.y, h - r.x, -r.h, -r.w),
        Orientation::RotHalfFlipH => Rectf::new(r.x, h - r.y, r.w, -r.h),
        Orientation::RotCwFlipH => Rectf::new(r.y, r.x, r.h, r.w),
    }
}

/// Inverse of [`orient_rectf`].
pub fn unorient_rectf(orientation: Orientation, width: i32, height: i32, r: Rectf) -> Rectf {
    let (w, h) = if orientation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };
    orient_rectf(orientation.inverse(), w, h, r)
}

/// Maps an integer rectangle from user space to buffer space.
pub fn orient_recti(orientation: Orientation, width: i32, height: i32, r: Recti) -> Recti {
    let w = width;
    let h = height;
    match orientation {
        Orientation::Upright => r,
        Orientation::RotCcw => Recti::new(r.y, h - r.x, r.h, -r.w),
        Orientation::RotHalf => Recti::new(w - r.x, h - r.y, -r.w, -r.h),
        Orientation::RotCw => Recti::new(w - r.y, r.x, -r.h, r.w),
        Orientation::FlipH => Recti::new(w - r.x, r.y, -r.w, r.h),
        Orientation::RotCcwFlipH => Recti::new(w - r.y, h - r.x, -r.h, -r.w),
        Orientation::RotHalfFlipH => Recti::new(r.x, h - r.y, r.w, -r.h),
        Orientation::RotCwFlipH => Recti::new(r.y, r.x, r.h, r.w),
    }
}

/// Inverse of [`orient_recti`].
pub fn unorient_recti(orientation: Orientation, width: i32, height: i32, r: Recti) -> Recti {
    let (w, h) = if orientation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };
    orient_recti(orientation.inverse(), w, h, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: i32 = 20;
    const H: i32 = 10;

    #[test]
    fn upright_is_identity() {
        let v = Vec2i::new(3, 4);
        assert_eq!(orient_vec2i(Orientation::Upright, W, H, v), v);
    }

    #[test]
    fn ccw_then_inverse_is_identity_for_points() {
        for o in Orientation::ALL {
            for &(x, y) in &[(0, 0), (3, 4), (19, 9), (7, 0)] {
                let v = Vec2i::new(x, y);
                let mapped = orient_vec2i(o, W, H, v);
                let back = unorient_vec2i(o, W, H, mapped);
                assert_eq!(back, v, "orientation {o:?} point ({x},{y})");
            }
        }
    }

    #[test]
    fn float_points_round_trip() {
        for o in Orientation::ALL {
            let v = Vec2f::new(3.25, 7.5);
            let mapped = orient_vec2f(o, W, H, v);
            let back = unorient_vec2f(o, W, H, mapped);
            assert!((back.x - v.x).abs() < 1e-6 && (back.y - v.y).abs() < 1e-6, "{o:?}");
        }
    }

    #[test]
    fn rects_round_trip_as_areas() {
        for o in Orientation::ALL {
            let r = Recti::new(2, 3, 5, 4);
            let mapped = orient_recti(o, W, H, r);
            let back = unorient_recti(o, W, H, mapped).abs();
            assert_eq!(back, r, "orientation {o:?}");
        }
    }

    #[test]
    fn rotation_moves_the_origin_corner() {
        // CCW: the user origin lands on the bottom-left of the buffer.
        let v = orient_vec2i(Orientation::RotCcw, W, H, Vec2i::new(0, 0));
        assert_eq!(v, Vec2i::new(0, H - 1));
        // CW: the user origin lands on the top-right.
        let v = orient_vec2i(Orientation::RotCw, W, H, Vec2i::new(0, 0));
        assert_eq!(v, Vec2i::new(W - 1, 0));
    }

    #[test]
    fn inverse_is_an_involution_on_rotations() {
        assert_eq!(Orientation::RotCcw.inverse(), Orientation::RotCw);
        assert_eq!(Orientation::RotCw.inverse(), Orientation::RotCcw);
        assert_eq!(Orientation::RotHalf.inverse(), Orientation::RotHalf);
        assert_eq!(Orientation::FlipH.inverse(), Orientation::FlipH);
    }
}
