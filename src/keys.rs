//! Lookup keys joining chromatogram results back to sample files.
//!
//! A result row in the document names its sample file by replicate name and
//! the Skyline-native file id. These keys are the join columns.

use std::fmt;

/// Identifies one sample file within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleFileKey {
    replicate: String,
    file_id: String,
}

impl SampleFileKey {
    /// Replicate name component.
    pub fn replicate(&self) -> &str {
        &self.replicate
    }

    /// Skyline-native sample file id component.
    pub fn file_id(&self) -> &str {
        &self.file_id
    }
}

impl fmt::Display for SampleFileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.replicate, self.file_id)
    }
}

/// Identifies one measurement: a sample file plus optional optimization step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptStepKey {
    sample_file: SampleFileKey,
    step: Option<i32>,
}

impl OptStepKey {
    /// Sample file component.
    pub fn sample_file(&self) -> &SampleFileKey {
        &self.sample_file
    }

    /// Optimization step, if the result belongs to an optimization series.
    pub fn step(&self) -> Option<i32> {
        self.step
    }
}

impl fmt::Display for OptStepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "{}_{}", self.sample_file, step),
            None => write!(f, "{}", self.sample_file),
        }
    }
}

/// Key for a sample file from its replicate name and source file id.
pub fn sample_file_key(replicate: &str, file_id: &str) -> SampleFileKey {
    SampleFileKey {
        replicate: replicate.to_string(),
        file_id: file_id.to_string(),
    }
}

/// Key for one measurement within a sample file.
pub fn opt_step_key(sample_file: &SampleFileKey, step: Option<i32>) -> OptStepKey {
    OptStepKey {
        sample_file: sample_file.clone(),
        step,
    }
}
