//! Gradient and hessian buffers.

/// Per-row first and second order gradients of the loss.
#[derive(Clone, Debug)]
pub struct Gradients {
    grads: Vec<f32>,
    hess: Vec<f32>,
}

impl Gradients {
    pub fn new(n_rows: usize) -> Self {
        Self {
            grads: vec![0.0; n_rows],
            hess: vec![0.0; n_rows],
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.grads.len()
    }

    #[inline]
    pub fn grads(&self) -> &[f32] {
        &self.grads
    }

    #[inline]
    pub fn hess(&self) -> &[f32] {
        &self.hess
    }

    #[inline]
    pub fn get(&self, row: usize) -> (f32, f32) {
        (self.grads[row], self.hess[row])
    }

    /// Mutable access to both buffers at once.
    #[inline]
    pub fn pairs_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.grads, &mut self.hess)
    }

    /// Sum of gradients and hessians over all rows.
    pub fn sum(&self) -> (f64, f64) {
        self.grads
            .iter()
            .zip(&self.hess)
            .fold((0.0, 0.0), |(g, h), (&gi, &hi)| (g + gi as f64, h + hi as f64))
    }
}
