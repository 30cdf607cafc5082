pub mod geometry;

pub use hit_test::{FeatureRef, HitTester};
