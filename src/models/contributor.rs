//! Contributor classification used by the e-invoice penalty grid.

use serde::{Deserialize, Serialize};

/// Fiscal size class of a taxpayer, as assigned by the tax authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorSize {
    /// Large taxpayer.
    Large,
    /// Medium taxpayer.
    Medium,
    /// Small taxpayer.
    Small,
    /// Micro taxpayer or individual.
    Micro,
}

impl ContributorSize {
    /// Every size class.
    pub const ALL: [ContributorSize; 4] = [
        ContributorSize::Large,
        ContributorSize::Medium,
        ContributorSize::Small,
        ContributorSize::Micro,
    ];
}
