//! Annotation message for published tags.

use serde::Serialize;

/// Pipeline name variable set by the CI system.
pub const ENV_PIPELINE: &str = "BUILD_PIPELINE_NAME";
/// Job name variable set by the CI system.
pub const ENV_JOB: &str = "BUILD_JOB_NAME";
/// Build name variable set by the CI system.
pub const ENV_BUILD: &str = "BUILD_NAME";

/// Where a tag was published from. Cosmetic only; never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildMetadata {
    /// Pipeline that ran the publish.
    pub pipeline: String,
    /// Job within the pipeline.
    pub job: String,
    /// Build number or name.
    pub build: String,
}

impl BuildMetadata {
    /// Read the metadata from the process environment. Unset variables
    /// become empty strings.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the metadata through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            pipeline: lookup(ENV_PIPELINE).unwrap_or_default(),
            job: lookup(ENV_JOB).unwrap_or_default(),
            build: lookup(ENV_BUILD).unwrap_or_default(),
        }
    }

    /// The tag annotation message.
    pub fn message(&self) -> String {
        format!(
            "Pipeline: {}\nJob: {}\nBuild: {}",
            self.pipeline, self.job, self.build
        )
    }
}
