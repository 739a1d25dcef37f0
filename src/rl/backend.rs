//! Backend type aliases and device management
//!
//! # Backend Selection
//!
//! - **TrainingBackend**: Autodiff-enabled NdArray backend for training (CPU)
//! - **InferenceBackend**: Plain NdArray backend for evaluation (CPU)
//!
//! The Q-network is a single hidden layer over 11 features, so the CPU
//! NdArray backend is all it needs.

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend type for training (with autodiff)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend type for evaluation (without autodiff)
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
