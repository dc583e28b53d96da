mod is_valid;
mod sample_curve;

pub use is_valid::{IsValid, ValidationOptions, ValidityIssue};
pub use sample_curve::SampleCurve;
