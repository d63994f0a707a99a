//! Two-worker rasterization by scanline parity.
//!
//! A [`Multicore`] owns one helper thread behind a bounded task queue. During
//! a [`Painter`] session, parallelizable draws (rects and triangles, shaded
//! or not) enqueue their odd-scanline half for the worker and rasterize the
//! even half inline; the two halves touch disjoint rows, so no per-pixel
//! synchronization exists anywhere in the hot path. Operations that do not
//! partition by scanline parity (lines, background fills, scrolls, blits)
//! join with the worker first.
//!
//! Ordering is FIFO: tasks are processed in submission order, and a session
//! always ends with a join, so the canvas is fully rendered when the
//! `Painter` drops.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Sender};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::geom::{Linef, Quadf, Trif};
use crate::raster::{self, Paint, Scanlines};
use crate::shader::{Shader, ShaderCtx};

/// Queue capacity; submissions beyond it block up to [`SUBMIT_TIMEOUT`].
const QUEUE_CAPACITY: usize = 32;
/// How long a submission may wait for queue space before the draw falls back
/// to synchronous completion.
const SUBMIT_TIMEOUT: Duration = Duration::from_millis(100);

/// The parity split: the calling thread draws even scanlines, the worker odd
/// ones.
const FOREGROUND: Scanlines = Scanlines::Even;
const WORKER: Scanlines = Scanlines::Odd;

/// A shader handle that can cross the queue.
pub type SharedShader = Arc<dyn Shader + Send + Sync>;

/// Raw canvas pointer smuggled to the worker.
///
/// Safety contract, upheld by [`Painter`]: the canvas outlives every task
/// referencing it because the painter borrows it mutably for the whole
/// session and joins before releasing the borrow; the worker only writes
/// odd scanlines while the foreground writes even ones, so their pixel
/// writes never alias.
struct TaskCanvas(*mut Canvas);

unsafe impl Send for TaskCanvas {}

enum Task {
    Rect {
        canvas: TaskCanvas,
        color: Color,
        shader: Option<SharedShader>,
        uvs: Quadf,
        rect: [f32; 4],
    },
    Tri {
        canvas: TaskCanvas,
        color: Color,
        shader: Option<SharedShader>,
        uvs: Trif,
        coords: [f32; 6],
    },
    Stop,
}

struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

/// Handle to the helper raster worker.
///
/// # Examples
///
/// ```
/// use trama::{Canvas, Color, Multicore, PixelFormat};
///
/// let mut canvas = Canvas::new(64, 64, PixelFormat::Argb8888).unwrap();
/// let mut mc = Multicore::new();
/// {
///     let mut painter = mc.painter(&mut canvas);
///     painter.draw_rect(Color::WHITE, 8.0, 8.0, 48.0, 48.0);
/// } // joins here
/// assert_eq!(canvas.get_pixel(10, 11), Some(Color::WHITE));
/// ```
pub struct Multicore {
    sender: Sender<Task>,
    pending: Arc<Pending>,
    worker: Option<JoinHandle<()>>,
    /// Set after a submission timeout; the rest of the session runs
    /// synchronously.
    degraded: AtomicUsize,
}

impl Multicore {
    /// Spawns the helper worker.
    pub fn new() -> Multicore {
        let (sender, receiver) = bounded::<Task>(QUEUE_CAPACITY);
        let pending = Arc::new(Pending {
            count: Mutex::new(0),
            idle: Condvar::new(),
        });
        let worker_pending = Arc::clone(&pending);
        let worker = std::thread::Builder::new()
            .name("trama-raster".into())
            .spawn(move || {
                tracing::debug!("raster worker started");
                while let Ok(task) = receiver.recv() {
                    match task {
                        Task::Stop => break,
                        task => run_task(task),
                    }
                    let mut count = worker_pending.count.lock().unwrap();
                    *count -= 1;
                    if *count == 0 {
                        worker_pending.idle.notify_all();
                    }
                }
                tracing::debug!("raster worker stopped");
            })
            .expect("failed to spawn raster worker");

        Multicore {
            sender,
            pending,
            worker: Some(worker),
            degraded: AtomicUsize::new(0),
        }
    }

    /// Starts a drawing session on `canvas`. The canvas stays borrowed until
    /// the painter drops, which joins with the worker.
    pub fn painter<'a>(&'a mut self, canvas: &'a mut Canvas) -> Painter<'a> {
        Painter { mc: self, canvas }
    }

    /// Blocks until the queue is drained and the worker is idle.
    fn join(&self) {
        let mut count = self.pending.count.lock().unwrap();
        while *count != 0 {
            count = self.pending.idle.wait(count).unwrap();
        }
    }

    /// Tries to enqueue; on a full queue, degrades to synchronous drawing
    /// for this session and reports failure.
    fn submit(&self, task: Task) -> bool {
        if self.degraded.load(Ordering::Relaxed) != 0 {
            return false;
        }
        *self.pending.count.lock().unwrap() += 1;
        match self.sender.send_timeout(task, SUBMIT_TIMEOUT) {
            Ok(()) => true,
            Err(_) => {
                let mut count = self.pending.count.lock().unwrap();
                *count -= 1;
                if *count == 0 {
                    self.pending.idle.notify_all();
                }
                drop(count);
                tracing::warn!("raster queue full after {SUBMIT_TIMEOUT:?}; degrading to synchronous drawing");
                self.degraded.store(1, Ordering::Relaxed);
                false
            }
        }
    }
}

impl Default for Multicore {
    fn default() -> Self {
        Multicore::new()
    }
}

impl Drop for Multicore {
    fn drop(&mut self) {
        self.join();
        let _ = self.sender.send(Task::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_task(task: Task) {
    match task {
        Task::Rect {
            canvas,
            color,
            shader,
            uvs,
            rect: [x, y, w, h],
        } => {
            // SAFETY: see `TaskCanvas`; writes are confined to odd scanlines
            // and the painter keeps the canvas alive until join.
            let canvas = unsafe { &mut *canvas.0 };
            match shader {
                Some(shader) => {
                    let ctx = ShaderCtx::new(shader.as_ref(), color, canvas.is_palette());
                    raster::rect_shaded(canvas, &ctx, color, WORKER, x, y, w, h, &uvs);
                }
                None => {
                    let paint = Paint::select(canvas, color);
                    raster::rect_unshaded(canvas, &paint, WORKER, x, y, w, h);
                }
            }
        }
        Task::Tri {
            canvas,
            color,
            shader,
            uvs,
            coords,
        } => {
            // SAFETY: as above.
            let canvas = unsafe { &mut *canvas.0 };
            match shader {
                Some(shader) => {
                    let ctx = ShaderCtx::new(shader.as_ref(), color, canvas.is_palette());
                    raster::tri_shaded(
                        canvas,
                        &ctx,
                        color,
                        WORKER,
                        coords,
                        [uvs.x0, uvs.y0, uvs.x1, uvs.y1, uvs.x2, uvs.y2],
                    );
                }
                None => {
                    let paint = Paint::select(canvas, color);
                    raster::tri_unshaded(canvas, &paint, WORKER, coords);
                }
            }
        }
        Task::Stop => {}
    }
}

/// A drawing session that splits raster work with the helper worker.
///
/// Parallelizable draws run both halves concurrently; everything else joins
/// first and runs synchronously through the plain [`Canvas`] API.
pub struct Painter<'a> {
    mc: &'a mut Multicore,
    canvas: &'a mut Canvas,
}

impl Painter<'_> {
    /// Draws a filled rectangle, splitting scanlines with the worker.
    pub fn draw_rect(&mut self, color: Color, x: f32, y: f32, width: f32, height: f32) {
        if !self.canvas.drawable_color(color) {
            return;
        }
        let matrix = self.canvas.matrix();
        if !matrix.is_first_order() {
            // Rotated rects decompose into triangles.
            let quad = [
                matrix.apply(x, y),
                matrix.apply(x + width, y),
                matrix.apply(x + width, y + height),
                matrix.apply(x, y + height),
            ];
            self.tri_pair(color, None, quad, None);
            return;
        }
        let (tx, ty) = matrix.apply(x, y);
        let rect = crate::geom::Rectf::new(tx, ty, width * matrix.a0, height * matrix.b1);
        let rect = crate::orientation::orient_rectf(
            self.canvas.orientation(),
            self.canvas.raw_width(),
            self.canvas.raw_height(),
            rect,
        );
        self.canvas.mark_dirty_rect(
            (rect.x.min(rect.x + rect.w) - 0.5) as i32,
            (rect.y.min(rect.y + rect.h) - 0.5) as i32,
            rect.w.abs() as i32 + 1,
            rect.h.abs() as i32 + 1,
        );

        let canvas_ptr: *mut Canvas = &mut *self.canvas;
        let submitted = self.mc.submit(Task::Rect {
            canvas: TaskCanvas(canvas_ptr),
            color,
            shader: None,
            uvs: crate::geom::UNIT_QUAD_UVS,
            rect: [rect.x, rect.y, rect.w, rect.h],
        });
        let paint = Paint::select(self.canvas, color);
        if submitted {
            raster::rect_unshaded(self.canvas, &paint, FOREGROUND, rect.x, rect.y, rect.w, rect.h);
        } else {
            // Queued work may still touch these rows; wait it out, then draw
            // the whole shape here.
            self.mc.join();
            raster::rect_unshaded(self.canvas, &paint, Scanlines::All, rect.x, rect.y, rect.w, rect.h);
        }
    }

    /// Draws a shaded rectangle, splitting scanlines with the worker.
    pub fn shade_rect(
        &mut self,
        tint: Color,
        shader: &SharedShader,
        uvs: Option<&Quadf>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        let matrix = self.canvas.matrix();
        if !matrix.is_first_order() {
            let quad = [
                matrix.apply(x, y),
                matrix.apply(x + width, y),
                matrix.apply(x + width, y + height),
                matrix.apply(x, y + height),
            ];
            self.tri_pair(tint, Some(shader), quad, uvs);
            return;
        }
        let uvs = uvs.copied().unwrap_or(crate::geom::UNIT_QUAD_UVS);
        let (tx, ty) = matrix.apply(x, y);
        let rect = crate::geom::Rectf::new(tx, ty, width * matrix.a0, height * matrix.b1);
        let rect = crate::orientation::orient_rectf(
            self.canvas.orientation(),
            self.canvas.raw_width(),
            self.canvas.raw_height(),
            rect,
        );
        let uvs = if self.canvas.orientation().swaps_axes() {
            Quadf::new(uvs.x0, uvs.y0, uvs.x3, uvs.y3, uvs.x2, uvs.y2, uvs.x1, uvs.y1)
        } else {
            uvs
        };
        self.canvas.mark_dirty_rect(
            (rect.x.min(rect.x + rect.w) - 0.5) as i32,
            (rect.y.min(rect.y + rect.h) - 0.5) as i32,
            rect.w.abs() as i32 + 1,
            rect.h.abs() as i32 + 1,
        );

        let canvas_ptr: *mut Canvas = &mut *self.canvas;
        let submitted = self.mc.submit(Task::Rect {
            canvas: TaskCanvas(canvas_ptr),
            color: tint,
            shader: Some(Arc::clone(shader)),
            uvs,
            rect: [rect.x, rect.y, rect.w, rect.h],
        });
        let sl = if submitted {
            FOREGROUND
        } else {
            self.mc.join();
            Scanlines::All
        };
        let ctx = ShaderCtx::new(shader.as_ref(), tint, self.canvas.is_palette());
        raster::rect_shaded(self.canvas, &ctx, tint, sl, rect.x, rect.y, rect.w, rect.h, &uvs);
    }

    /// Draws a filled triangle, splitting scanlines with the worker.
    pub fn draw_tri(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
        if !self.canvas.drawable_color(color) {
            return;
        }
        let matrix = self.canvas.matrix();
        let quad = [
            matrix.apply(x0, y0),
            matrix.apply(x1, y1),
            matrix.apply(x2, y2),
        ];
        self.one_tri(color, None, quad, None);
    }

    /// Draws a shaded triangle, splitting scanlines with the worker.
    #[allow(clippy::too_many_arguments)]
    pub fn shade_tri(
        &mut self,
        tint: Color,
        shader: &SharedShader,
        uvs: Option<&Trif>,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) {
        let matrix = self.canvas.matrix();
        let quad = [
            matrix.apply(x0, y0),
            matrix.apply(x1, y1),
            matrix.apply(x2, y2),
        ];
        self.one_tri(tint, Some(shader), quad, uvs);
    }

    /// Draws a line. Lines do not split by parity, so this joins first.
    pub fn draw_line(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.join();
        self.canvas.draw_line(color, x0, y0, x1, y1);
    }

    /// Fills the background. Joins first.
    pub fn background(&mut self, color: Color) {
        self.join();
        self.canvas.background(color);
    }

    /// Scrolls the buffer. Joins first.
    pub fn scroll(&mut self, placeholder: Color, dx: i32, dy: i32) {
        self.join();
        self.canvas.scroll(placeholder, dx, dy);
    }

    /// Waits for the worker to finish all queued work, then yields direct
    /// canvas access for operations with no parallel path.
    pub fn canvas(&mut self) -> &mut Canvas {
        self.join();
        self.canvas
    }

    /// Blocks until the worker is idle and the queue is empty.
    pub fn join(&mut self) {
        self.mc.join();
    }

    fn one_tri(
        &mut self,
        color: Color,
        shader: Option<&SharedShader>,
        points: [(f32, f32); 3],
        uvs: Option<&Trif>,
    ) {
        let [(x0, y0), (x1, y1), (x2, y2)] = points;
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            self.canvas.record_error(crate::error::Error::InfiniteParam);
            return;
        }
        if (y0 == y1 && y1 == y2) || (x0 == x1 && x1 == x2) {
            return;
        }
        let o = self.canvas.orientation();
        let (w, h) = (self.canvas.raw_width(), self.canvas.raw_height());
        let map = |x: f32, y: f32| {
            let p = crate::orientation::orient_vec2f(o, w, h, crate::geom::Vec2f::new(x, y));
            (p.x, p.y)
        };
        let (x0, y0) = map(x0, y0);
        let (x1, y1) = map(x1, y1);
        let (x2, y2) = map(x2, y2);
        let coords = [x0, y0, x1, y1, x2, y2];
        for i in 0..3 {
            self.canvas
                .mark_dirty_point((coords[i * 2] - 0.5) as i32, (coords[i * 2 + 1] - 0.5) as i32);
            self.canvas
                .mark_dirty_point((coords[i * 2] + 0.5) as i32, (coords[i * 2 + 1] + 0.5) as i32);
        }
        let uvs = uvs.copied().unwrap_or(crate::geom::UNIT_TRI_UVS);

        let canvas_ptr: *mut Canvas = &mut *self.canvas;
        let submitted = self.mc.submit(Task::Tri {
            canvas: TaskCanvas(canvas_ptr),
            color,
            shader: shader.map(Arc::clone),
            uvs,
            coords,
        });
        let sl = if submitted {
            FOREGROUND
        } else {
            self.mc.join();
            Scanlines::All
        };
        match shader {
            Some(shader) => {
                let ctx = ShaderCtx::new(shader.as_ref(), color, self.canvas.is_palette());
                raster::tri_shaded(
                    self.canvas,
                    &ctx,
                    color,
                    sl,
                    coords,
                    [uvs.x0, uvs.y0, uvs.x1, uvs.y1, uvs.x2, uvs.y2],
                );
            }
            None => {
                let paint = Paint::select(self.canvas, color);
                raster::tri_unshaded(self.canvas, &paint, sl, coords);
            }
        }
    }

    /// Splits a transformed quad into two triangles, each parity-split.
    fn tri_pair(
        &mut self,
        color: Color,
        shader: Option<&SharedShader>,
        quad: [(f32, f32); 4],
        uvs: Option<&Quadf>,
    ) {
        let uvs = uvs.copied().unwrap_or(crate::geom::UNIT_QUAD_UVS);
        let tri_a_uv = Trif::new(uvs.x0, uvs.y0, uvs.x1, uvs.y1, uvs.x2, uvs.y2);
        let tri_b_uv = Trif::new(uvs.x0, uvs.y0, uvs.x2, uvs.y2, uvs.x3, uvs.y3);
        self.one_tri(color, shader, [quad[0], quad[1], quad[2]], Some(&tri_a_uv));
        self.one_tri(color, shader, [quad[0], quad[2], quad[3]], Some(&tri_b_uv));
    }

    /// Draws a shaded line. Lines do not split by parity, so this joins
    /// first.
    pub fn shade_line(
        &mut self,
        tint: Color,
        shader: &SharedShader,
        uvs: Option<&Linef>,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) {
        self.join();
        self.canvas.shade_line(tint, shader.as_ref(), uvs, x0, y0, x1, y1);
    }
}

impl Drop for Painter<'_> {
    fn drop(&mut self) {
        self.mc.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use crate::shader::{Promises, TintPromises};

    #[test]
    fn parallel_rect_matches_synchronous() {
        let mut reference = Canvas::new(32, 32, PixelFormat::Argb8888).unwrap();
        reference.simple_rect(Color::WHITE, 3.0, 4.0, 20.0, 17.0);

        let mut canvas = Canvas::new(32, 32, PixelFormat::Argb8888).unwrap();
        let mut mc = Multicore::new();
        {
            let mut painter = mc.painter(&mut canvas);
            painter.draw_rect(Color::WHITE, 3.0, 4.0, 20.0, 17.0);
        }
        assert_eq!(canvas.bytes(), reference.bytes());
    }

    #[test]
    fn parallel_tri_matches_synchronous() {
        let mut reference = Canvas::new(32, 32, PixelFormat::Argb8888).unwrap();
        reference.simple_tri(Color::WHITE, 1.0, 1.0, 30.0, 5.0, 10.0, 28.0);

        let mut canvas = Canvas::new(32, 32, PixelFormat::Argb8888).unwrap();
        let mut mc = Multicore::new();
        {
            let mut painter = mc.painter(&mut canvas);
            painter.draw_tri(Color::WHITE, 1.0, 1.0, 30.0, 5.0, 10.0, 28.0);
        }
        assert_eq!(canvas.bytes(), reference.bytes());
    }

    struct Gradient;
    impl Shader for Gradient {
        fn pixel(&self, _t: Color, _e: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
            Color::rgb((u * 255.0) as u8, (v * 255.0) as u8, 0)
        }
        fn promises(&self, _tint: Color) -> Promises {
            Promises::IGNORE_BASE | Promises::OPAQUE
        }
        fn alpha_promises(&self) -> TintPromises {
            TintPromises::both()
        }
    }

    #[test]
    fn parallel_shaded_rect_matches_synchronous() {
        let mut reference = Canvas::new(32, 32, PixelFormat::Argb8888).unwrap();
        reference.shade_rect(Color::WHITE, &Gradient, None, 2.0, 2.0, 28.0, 28.0);

        let mut canvas = Canvas::new(32, 32, PixelFormat::Argb8888).unwrap();
        let mut mc = Multicore::new();
        let shader: SharedShader = Arc::new(Gradient);
        {
            let mut painter = mc.painter(&mut canvas);
            painter.shade_rect(Color::WHITE, &shader, None, 2.0, 2.0, 28.0, 28.0);
        }
        assert_eq!(canvas.bytes(), reference.bytes());
    }

    #[test]
    fn many_draws_queue_and_join() {
        let mut canvas = Canvas::new(64, 64, PixelFormat::Argb8888).unwrap();
        let mut mc = Multicore::new();
        {
            let mut painter = mc.painter(&mut canvas);
            for i in 0..100 {
                let x = (i % 8) as f32 * 8.0;
                let y = (i / 8) as f32 * 4.0;
                painter.draw_rect(Color::rgb(i as u8, 0, 0), x, y, 8.0, 4.0);
            }
        }
        // All 100 rects landed; spot-check the last one.
        assert_eq!(canvas.get_pixel(25, 49), Some(Color::rgb(99, 0, 0)));
    }

    #[test]
    fn lines_join_before_drawing() {
        let mut canvas = Canvas::new(16, 16, PixelFormat::Argb8888).unwrap();
        let mut mc = Multicore::new();
        {
            let mut painter = mc.painter(&mut canvas);
            painter.draw_rect(Color::WHITE, 0.0, 0.0, 16.0, 16.0);
            painter.draw_line(Color::rgb(255, 0, 0), 0.0, 0.0, 15.0, 15.0);
        }
        assert_eq!(canvas.get_pixel(8, 8), Some(Color::rgb(255, 0, 0)));
        assert_eq!(canvas.get_pixel(8, 9), Some(Color::WHITE));
    }

    #[test]
    fn sessions_can_repeat() {
        let mut canvas = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        let mut mc = Multicore::new();
        for _ in 0..3 {
            let mut painter = mc.painter(&mut canvas);
            painter.draw_rect(Color::WHITE, 0.0, 0.0, 8.0, 8.0);
        }
        assert_eq!(canvas.get_pixel(7, 7), Some(Color::WHITE));
    }
}
