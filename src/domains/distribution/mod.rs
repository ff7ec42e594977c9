pub mod service;
pub mod types;

pub use service::{DistributionService, DistributionServiceImpl};
pub use types::{
    BulkTaskBatch, BulkTaskPreview, BulkTaskRequest, DistributionTask, NewPackageTemplate,
    PackageRef, PackageTemplate, TaskPriority, TaskStatus,
};
