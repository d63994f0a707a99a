//! # Trama
//!
//! Trama is a software 2D rasterizer for embedded and resource-constrained
//! display systems. It draws shapes, images and bitmap text into a
//! caller-owned pixel buffer whose format is chosen at runtime from a fixed
//! set of palette, greyscale and packed-(A)RGB layouts, under a 2D affine
//! transform stack, a clip rectangle and one of the eight display
//! orientations.
//!
//! ## Features
//!
//! - **Shapes**: triangles, rectangles, lines, arcs, circles, beziers and
//!   ear-clipped polygons, filled or outlined.
//! - **Programmable shading**: a per-pixel [`Shader`] callback with promise
//!   flags the rasterizer uses to skip work it can prove unnecessary.
//! - **Text**: bitmap fonts with monospace and variable-pitch glyph ranges,
//!   alignment, UTF-8 cursor arithmetic, optional bilinear filtering.
//! - **Parallel rasterization**: an optional worker thread that draws the
//!   odd scanlines of every rect and triangle while the caller draws the
//!   even ones.
//! - **Widgets**: a small element tree (grids, buttons, textboxes,
//!   dropdowns) with layout, event routing and dirty-driven redraws.
//!
//! ## Getting started
//!
//! ```
//! use trama::{Canvas, Color, PixelFormat};
//!
//! let mut canvas = Canvas::new(320, 240, PixelFormat::Rgb565).unwrap();
//! canvas.background(Color::BLACK);
//! canvas.draw_circle(Color::rgb(255, 80, 0), 160.0, 120.0, 60.0);
//! canvas.draw_line(Color::WHITE, 0.0, 0.0, 319.0, 239.0);
//!
//! // Hand the bytes to the display driver.
//! let _frame: &[u8] = canvas.bytes();
//! ```
//!
//! Drawing calls go through the transform stack, so scenes compose the same
//! way they would in a vector API:
//!
//! ```
//! use trama::{Canvas, Color, Matrix2, PixelFormat};
//!
//! let mut canvas = Canvas::new(64, 64, PixelFormat::Argb8888).unwrap();
//! canvas.push_matrix();
//! canvas.apply_matrix(Matrix2::translate(32.0, 32.0));
//! canvas.apply_matrix(Matrix2::rotate(0.5));
//! canvas.draw_rect(Color::WHITE, -10.0, -10.0, 20.0, 20.0);
//! canvas.pop_matrix().unwrap();
//! ```

mod canvas;
mod color;
mod error;
mod fixed;
mod format;
mod geom;
mod image;
mod matrix;
mod multicore;
mod raster;
mod shader;
mod shapes;

pub mod gui;
pub mod orientation;
pub mod text;

pub use canvas::Canvas;
pub use color::Color;
pub use error::{Error, Result};
pub use fixed::Fixed;
pub use format::{closest_in_palette, FormatClass, FormatInfo, PixelFormat};
pub use geom::{Linef, Quadf, Rectf, Recti, Trif, Vec2f, Vec2i};
pub use image::TextureShader;
pub use matrix::Matrix2;
pub use multicore::{Multicore, Painter, SharedShader};
pub use orientation::Orientation;
pub use shader::{BaseShader, Promises, Shader, TintPromises};
pub use shapes::{transform_points, triangulate, vectorize_bezier, vectorize_bezier_part};
pub use text::{Font, GlyphMetrics, GlyphRange, RangeKind, TextAlign, TextLayout};
