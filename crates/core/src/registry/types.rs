//! Types for the job registry.

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobStatus};

/// Aggregate view of the job table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub total: usize,
    pub pending: usize,
    pub starting: usize,
    pub probing: usize,
    pub downloading: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Slots currently held by a live process.
    pub running_slots: usize,
    pub max_concurrent_jobs: usize,
}

impl RegistryStatus {
    pub(crate) fn count<'a>(
        jobs: impl Iterator<Item = &'a Job>,
        running_slots: usize,
        max_concurrent_jobs: usize,
    ) -> Self {
        let mut status = Self {
            running_slots,
            max_concurrent_jobs,
            ..Self::default()
        };
        for job in jobs {
            status.total += 1;
            match job.status {
                JobStatus::Pending => status.pending += 1,
                JobStatus::Starting => status.starting += 1,
                JobStatus::Probing => status.probing += 1,
                JobStatus::Downloading => status.downloading += 1,
                JobStatus::Processing => status.processing += 1,
                JobStatus::Completed => status.completed += 1,
                JobStatus::Failed => status.failed += 1,
                JobStatus::Cancelled => status.cancelled += 1,
            }
        }
        status
    }

    /// Jobs not yet in a terminal status.
    pub fn active(&self) -> usize {
        self.pending + self.starting + self.probing + self.downloading + self.processing
    }
}
