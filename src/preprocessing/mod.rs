//! Data preparation: feature extraction, scaling, labeling and windowing.

mod features;
mod labeler;
mod normalizer;
mod processor;
mod windower;

pub use features::FeatureExtractor;
pub use labeler::{LabelConfig, Labeler};
pub use normalizer::MinMaxNormalizer;
pub use processor::DataProcessor;
pub use windower::{SequenceWindower, WindowIter};
