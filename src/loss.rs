use ndarray::{Array2, ArrayView2};

/// Trait defining the interface for loss functions
pub trait Loss {
    /// Compute the loss for a batch of predictions and targets
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32;

    /// Compute the gradient of the loss with respect to the predictions
    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32>;
}

/// Mean Squared Error, averaged over outputs and then over the batch.
pub struct MSE;

impl Loss for MSE {
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let diff = &predictions - &targets;
        (&diff * &diff).mean().unwrap_or(0.0)
    }

    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32> {
        let count = predictions.len().max(1) as f32;
        (&predictions - &targets) * (2.0 / count)
    }
}
