use object_pool::{Pool, Reusable};
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::sample::Sample;

pub fn new_real_buffer<S: Sample>(size: usize) -> Vec<S> {
    vec![S::zero(); size]
}

pub fn new_wide_buffer(size: usize) -> Vec<f64> {
    vec![0.0; size]
}

pub fn new_complex_buffer(size: usize) -> Vec<Complex<f64>> {
    vec![Complex::zero(); size]
}

/// Copy `input` into the real parts of `output` and zero everything else.
pub fn copy_real_to_complex<S: Sample>(input: &[S], output: &mut [Complex<f64>]) {
    assert!(input.len() <= output.len());
    input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
        o.re = i.to_f64();
        o.im = 0.0;
    });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy the real parts of `input` into `output`.
pub fn copy_complex_to_real(input: &[Complex<f64>], output: &mut [f64]) {
    assert!(input.len() >= output.len());
    input
        .iter()
        .zip(output.iter_mut())
        .for_each(|(i, o)| *o = i.re);
}

/// `sum(a_i * b_i)`, accumulated front to back in sample arithmetic.
pub fn inner_product<S: Sample>(a: &[S], b: &[S]) -> S {
    a.iter()
        .zip(b)
        .fold(S::zero(), |acc, (&x, &y)| acc + x * y)
}

/// Sum of `arr`, accumulated front to back.
pub fn sum<S: Sample>(arr: &[S]) -> S {
    arr.iter().fold(S::zero(), |acc, &x| acc + x)
}

/// A pool of sample, `f64` and complex buffer objects. Buffers are dynamically
/// created as needed and reused if previously `Drop`ed. Buffers are never freed.
/// Instead buffers are kept in reserve and reused when a new buffer is requested.
///
/// A reused buffer keeps the contents it was dropped with.
///
/// ```rust
/// use pitch_tracker::utils::buffer::BufferPool;
///
/// let buffers = BufferPool::<f32>::new(3);
/// let mut buf1 = buffers.get_real_buffer();
/// buf1[0] = 5.5;
/// {
///     // Dropped at the end of the scope and handed out again below.
///     let mut buf2 = buffers.get_real_buffer();
///     buf2[1] = 6.6;
/// }
/// let buf3 = buffers.get_real_buffer();
/// assert_eq!(&buf3[..], &[0.0, 6.6, 0.0]);
/// assert_eq!(&buf1[..], &[5.5, 0.0, 0.0]);
/// ```
pub struct BufferPool<S> {
    real_buffers: Pool<Vec<S>>,
    wide_buffers: Pool<Vec<f64>>,
    complex_buffers: Pool<Vec<Complex<f64>>>,
    pub buffer_size: usize,
}

impl<S: Sample> BufferPool<S> {
    pub fn new(buffer_size: usize) -> Self {
        BufferPool {
            real_buffers: Pool::new(0, || new_real_buffer(buffer_size)),
            wide_buffers: Pool::new(0, || new_wide_buffer(buffer_size)),
            complex_buffers: Pool::new(0, || new_complex_buffer(buffer_size)),
            buffer_size,
        }
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_real_buffer(&self) -> Reusable<Vec<S>> {
        self.real_buffers.pull(|| new_real_buffer(self.buffer_size))
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_wide_buffer(&self) -> Reusable<Vec<f64>> {
        self.wide_buffers.pull(|| new_wide_buffer(self.buffer_size))
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_complex_buffer(&self) -> Reusable<Vec<Complex<f64>>> {
        self.complex_buffers
            .pull(|| new_complex_buffer(self.buffer_size))
    }
}
