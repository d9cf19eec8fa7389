/*!
Reading back framebuffer pixels and comparing them with expected values.

Float probes accept a pixel when every channel differs from the expected value by strictly
less than the [`Tolerance`] of that channel. Integer probes require exact equality.

Every probe stops at the first pixel that doesn't match, prints a diagnostic on stdout and
returns `false`. Probes never terminate the test.

```no_run
# use piglit_util::probe::{self, Prober, Tolerance};
# fn example(ctxt: &std::rc::Rc<piglit_util::Context>) {
let mut pass = probe::probe_rect_rgba(ctxt, 0, 0, 32, 32, &[0.0, 1.0, 0.0, 1.0]);

// a looser prober for a test that blends twice
let prober = Prober::new(Tolerance::uniform(0.02));
pass &= prober.probe_pixel_rgb(ctxt, 40, 40, &[0.5, 0.5, 0.5]);
# }
```
*/
use std::fmt;

use smallvec::SmallVec;

use crate::backend::Facade;
use crate::context::Context;
use crate::gl;

/// Maximum difference accepted for each of the red, green, blue and alpha channels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerance {
    value: [f32; 4],
}

impl Tolerance {
    /// Builds a tolerance from one value per channel.
    pub fn new(value: [f32; 4]) -> Tolerance {
        Tolerance { value }
    }

    /// Builds a tolerance with the same value for every channel.
    pub fn uniform(value: f32) -> Tolerance {
        Tolerance { value: [value; 4] }
    }

    /// Derives the tolerance from the number of bits of each channel of the framebuffer.
    ///
    /// Channels with fewer than two bits can't be validated and accept anything.
    pub fn for_bits(bits: [u32; 4]) -> Tolerance {
        let mut value = [1.0; 4];
        for (value, &bits) in value.iter_mut().zip(bits.iter()) {
            if bits >= 2 {
                *value = 3.0 / (1u64 << bits.min(63)) as f32;
            }
        }

        Tolerance { value }
    }

    /// Returns the tolerance of a channel.
    #[inline]
    pub fn get(&self, channel: usize) -> f32 {
        self.value[channel]
    }

    /// Returns true if `observed` is close enough to `expected` for this channel.
    #[inline]
    pub fn accepts(&self, channel: usize, observed: f32, expected: f32) -> bool {
        (observed - expected).abs() < self.value[channel]
    }
}

impl Default for Tolerance {
    fn default() -> Tolerance {
        Tolerance::uniform(0.01)
    }
}

/// First pixel of a rectangle that didn't match.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch<T> {
    /// Absolute framebuffer coordinates of the pixel.
    pub x: i32,
    /// Absolute framebuffer coordinates of the pixel.
    pub y: i32,
    /// Channels that were read back.
    pub observed: SmallVec<[T; 4]>,
}

/// Compares one pixel with the expected value. Only the channels of `expected` are compared.
pub fn compare_pixels(observed: &[f32], expected: &[f32], tolerance: &Tolerance) -> bool {
    expected.iter().zip(observed.iter()).enumerate()
            .all(|(channel, (&e, &o))| tolerance.accepts(channel, o, e))
}

/// Compares every pixel of a read-back rectangle with the same expected color.
///
/// `pixels` holds `width * height` pixels of `expected.len()` channels each, bottom row
/// first, and `(x, y)` is the position of the rectangle in the framebuffer.
pub fn compare_rect(pixels: &[f32], x: i32, y: i32, width: u32, height: u32,
                    expected: &[f32], tolerance: &Tolerance) -> Option<Mismatch<f32>>
{
    find_mismatch(pixels, x, y, width, height, expected.len(),
                  |observed| compare_pixels(observed, expected, tolerance))
}

/// Same as `compare_rect` for integer pixels, which must match exactly.
pub fn compare_rect_exact<T>(pixels: &[T], x: i32, y: i32, width: u32, height: u32,
                             expected: &[T]) -> Option<Mismatch<T>>
    where T: Copy + PartialEq
{
    find_mismatch(pixels, x, y, width, height, expected.len(),
                  |observed| observed == expected)
}

/// Compares the left half of a read-back RGBA rectangle with its right half.
///
/// Returns the coordinates of the first left-half pixel that differs from its counterpart.
pub fn compare_halves(pixels: &[f32], x: i32, y: i32, width: u32, height: u32,
                      tolerance: &Tolerance) -> Option<(i32, i32)>
{
    let half = (width / 2) as usize;
    let width = width as usize;

    for row in 0 .. height as usize {
        for col in 0 .. half {
            let left = &pixels[(row * width + col) * 4 ..][.. 4];
            let right = &pixels[(row * width + col + half) * 4 ..][.. 4];

            if !compare_pixels(right, left, tolerance) {
                return Some((x + col as i32, y + row as i32));
            }
        }
    }

    None
}

fn find_mismatch<T, F>(pixels: &[T], x: i32, y: i32, width: u32, height: u32,
                       components: usize, mut matches: F) -> Option<Mismatch<T>>
    where T: Copy, F: FnMut(&[T]) -> bool
{
    let width = width as usize;

    for (index, observed) in pixels.chunks_exact(components)
                                   .take(width * height as usize)
                                   .enumerate()
    {
        if !matches(observed) {
            return Some(Mismatch {
                x: x + (index % width) as i32,
                y: y + (index / width) as i32,
                observed: observed.iter().cloned().collect(),
            });
        }
    }

    None
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    // integers ignore the precision
    values.iter().map(|v| format!("{:.6}", v)).collect::<Vec<_>>().join(" ")
}

fn report_mismatch<T: fmt::Display>(mismatch: &Mismatch<T>, expected: &[T]) {
    println!("Probe color at ({},{})", mismatch.x, mismatch.y);
    println!("  Expected: {}", join(expected));
    println!("  Observed: {}", join(&mismatch.observed));
}

/// Reads a rectangle of the current read framebuffer.
///
/// *Safety*: `ty` must describe `T` and `format` must have `components` channels.
unsafe fn read_pixels<T>(ctxt: &Context, x: i32, y: i32, width: u32, height: u32,
                         format: gl::types::GLenum, ty: gl::types::GLenum,
                         components: usize) -> Vec<T>
    where T: Copy + Default
{
    let mut data = vec![T::default(); width as usize * height as usize * components];

    let gl = ctxt.gl();
    gl.PixelStorei(gl::PACK_ALIGNMENT, 1);
    gl.ReadPixels(x, y, width as gl::types::GLsizei, height as gl::types::GLsizei,
                  format, ty, data.as_mut_ptr() as *mut _);

    data
}

/// Compares framebuffer pixels with a tolerance.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Prober {
    tolerance: Tolerance,
}

impl Prober {
    /// Builds a prober using the given tolerance.
    pub fn new(tolerance: Tolerance) -> Prober {
        Prober { tolerance }
    }

    /// Returns the tolerance of this prober.
    #[inline]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Probes one pixel against an RGB color.
    pub fn probe_pixel_rgb<F: ?Sized>(&self, facade: &F, x: i32, y: i32,
                                      expected: &[f32; 3]) -> bool
        where F: Facade
    {
        self.probe_rect(facade.get_context(), x, y, 1, 1, &expected[..])
    }

    /// Probes one pixel against an RGBA color.
    pub fn probe_pixel_rgba<F: ?Sized>(&self, facade: &F, x: i32, y: i32,
                                       expected: &[f32; 4]) -> bool
        where F: Facade
    {
        self.probe_rect(facade.get_context(), x, y, 1, 1, &expected[..])
    }

    /// Probes every pixel of a rectangle against an RGB color.
    pub fn probe_rect_rgb<F: ?Sized>(&self, facade: &F, x: i32, y: i32, width: u32,
                                     height: u32, expected: &[f32; 3]) -> bool
        where F: Facade
    {
        self.probe_rect(facade.get_context(), x, y, width, height, &expected[..])
    }

    /// Probes every pixel of a rectangle against an RGBA color.
    pub fn probe_rect_rgba<F: ?Sized>(&self, facade: &F, x: i32, y: i32, width: u32,
                                      height: u32, expected: &[f32; 4]) -> bool
        where F: Facade
    {
        self.probe_rect(facade.get_context(), x, y, width, height, &expected[..])
    }

    /// Checks that the left half of a rectangle has the same RGBA content as its right half.
    pub fn probe_rect_halves_equal_rgba<F: ?Sized>(&self, facade: &F, x: i32, y: i32,
                                                   width: u32, height: u32) -> bool
        where F: Facade
    {
        let pixels: Vec<f32> = unsafe {
            read_pixels(facade.get_context(), x, y, width, height, gl::RGBA, gl::FLOAT, 4)
        };

        match compare_halves(&pixels, x, y, width, height, &self.tolerance) {
            None => true,
            Some((px, py)) => {
                let left = ((py - y) as usize * width as usize + (px - x) as usize) * 4;
                let right = left + (width / 2) as usize * 4;
                println!("Probe color at ({},{})", px, py);
                println!("  Left: {}", join(&pixels[left .. left + 4]));
                println!("  Right: {}", join(&pixels[right .. right + 4]));
                false
            },
        }
    }

    fn probe_rect(&self, ctxt: &Context, x: i32, y: i32, width: u32, height: u32,
                  expected: &[f32]) -> bool
    {
        let format = if expected.len() == 3 { gl::RGB } else { gl::RGBA };
        let pixels: Vec<f32> = unsafe {
            read_pixels(ctxt, x, y, width, height, format, gl::FLOAT, expected.len())
        };

        match compare_rect(&pixels, x, y, width, height, expected, &self.tolerance) {
            None => true,
            Some(mismatch) => {
                report_mismatch(&mismatch, expected);
                false
            },
        }
    }
}

/// Probes one pixel against an RGB color with the default tolerance.
pub fn probe_pixel_rgb<F: ?Sized + Facade>(facade: &F, x: i32, y: i32,
                                           expected: &[f32; 3]) -> bool
{
    Prober::default().probe_pixel_rgb(facade, x, y, expected)
}

/// Probes one pixel against an RGBA color with the default tolerance.
pub fn probe_pixel_rgba<F: ?Sized + Facade>(facade: &F, x: i32, y: i32,
                                            expected: &[f32; 4]) -> bool
{
    Prober::default().probe_pixel_rgba(facade, x, y, expected)
}

/// Probes a rectangle against an RGB color with the default tolerance.
pub fn probe_rect_rgb<F: ?Sized + Facade>(facade: &F, x: i32, y: i32, width: u32,
                                          height: u32, expected: &[f32; 3]) -> bool
{
    Prober::default().probe_rect_rgb(facade, x, y, width, height, expected)
}

/// Probes a rectangle against an RGBA color with the default tolerance.
pub fn probe_rect_rgba<F: ?Sized + Facade>(facade: &F, x: i32, y: i32, width: u32,
                                           height: u32, expected: &[f32; 4]) -> bool
{
    Prober::default().probe_rect_rgba(facade, x, y, width, height, expected)
}

/// Compares the two halves of a rectangle with the default tolerance.
pub fn probe_rect_halves_equal_rgba<F: ?Sized + Facade>(facade: &F, x: i32, y: i32,
                                                        width: u32, height: u32) -> bool
{
    Prober::default().probe_rect_halves_equal_rgba(facade, x, y, width, height)
}

/// Probes one pixel of an integer color buffer.
pub fn probe_pixel_rgba_int<F: ?Sized + Facade>(facade: &F, x: i32, y: i32,
                                                expected: &[i32; 4]) -> bool
{
    probe_rect_rgba_int(facade, x, y, 1, 1, expected)
}

/// Probes a rectangle of an integer color buffer.
pub fn probe_rect_rgba_int<F: ?Sized + Facade>(facade: &F, x: i32, y: i32, width: u32,
                                               height: u32, expected: &[i32; 4]) -> bool
{
    probe_rect_exact(facade.get_context(), x, y, width, height, gl::INT, expected)
}

/// Probes one pixel of an unsigned integer color buffer.
pub fn probe_pixel_rgba_uint<F: ?Sized + Facade>(facade: &F, x: i32, y: i32,
                                                 expected: &[u32; 4]) -> bool
{
    probe_rect_rgba_uint(facade, x, y, 1, 1, expected)
}

/// Probes a rectangle of an unsigned integer color buffer.
pub fn probe_rect_rgba_uint<F: ?Sized + Facade>(facade: &F, x: i32, y: i32, width: u32,
                                                height: u32, expected: &[u32; 4]) -> bool
{
    probe_rect_exact(facade.get_context(), x, y, width, height, gl::UNSIGNED_INT, expected)
}

fn probe_rect_exact<T>(ctxt: &Context, x: i32, y: i32, width: u32, height: u32,
                       ty: gl::types::GLenum, expected: &[T; 4]) -> bool
    where T: Copy + Default + PartialEq + fmt::Display
{
    let pixels: Vec<T> = unsafe {
        read_pixels(ctxt, x, y, width, height, gl::RGBA_INTEGER, ty, 4)
    };

    match compare_rect_exact(&pixels, x, y, width, height, &expected[..]) {
        None => true,
        Some(mismatch) => {
            report_mismatch(&mismatch, &expected[..]);
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance() {
        let tolerance = Tolerance::default();
        assert!(tolerance.accepts(0, 0.505, 0.5));
        assert!(!tolerance.accepts(0, 0.52, 0.5));
        assert!(!tolerance.accepts(3, 0.0, 1.0));
    }

    #[test]
    fn tolerance_from_bits() {
        let tolerance = Tolerance::for_bits([8, 8, 8, 0]);
        assert_eq!(tolerance.get(0), 3.0 / 256.0);
        assert_eq!(tolerance.get(3), 1.0);
        assert!(tolerance.accepts(3, 0.0, 0.99));
    }

    #[test]
    fn rect_reports_first_mismatch() {
        let mut pixels = vec![0.0f32, 1.0, 0.0].repeat(6);
        pixels[4 * 3 + 1] = 0.5;
        pixels[5 * 3] = 0.5;

        let mismatch = compare_rect(&pixels, 10, 20, 3, 2, &[0.0, 1.0, 0.0],
                                    &Tolerance::default()).unwrap();

        assert_eq!((mismatch.x, mismatch.y), (11, 21));
        assert_eq!(&mismatch.observed[..], &[0.0, 0.5, 0.0]);
    }

    #[test]
    fn rect_matches() {
        let pixels = vec![0.25f32; 4 * 4];
        assert!(compare_rect(&pixels, 0, 0, 2, 2, &[0.25; 4], &Tolerance::default()).is_none());
    }

    #[test]
    fn exact_integers() {
        let pixels = [1i32, 2, 3, 4, 1, 2, 3, 5];
        let mismatch = compare_rect_exact(&pixels, 0, 0, 2, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!((mismatch.x, mismatch.y), (1, 0));
        assert_eq!(&mismatch.observed[..], &[1, 2, 3, 5]);
    }

    #[test]
    fn halves() {
        // 4x1 rectangle, left half [a, b], right half [a, c]
        let a = [0.1f32, 0.2, 0.3, 1.0];
        let b = [0.4f32, 0.5, 0.6, 1.0];
        let c = [0.4f32, 0.5, 0.7, 1.0];
        let pixels: Vec<f32> = [a, b, a, c].concat();

        assert_eq!(compare_halves(&pixels, 5, 5, 4, 1, &Tolerance::default()), Some((6, 5)));
        let pixels: Vec<f32> = [a, b, a, b].concat();
        assert_eq!(compare_halves(&pixels, 5, 5, 4, 1, &Tolerance::default()), None);
    }

    #[test]
    fn join_formats_like_printf() {
        assert_eq!(join(&[1.0f32, 0.5]), "1.000000 0.500000");
        assert_eq!(join(&[3i32, -4]), "3 -4");
    }
}
