pub mod beneficiary;
pub mod core;
pub mod distribution;

pub use beneficiary::{BeneficiaryService, BeneficiaryServiceImpl};
pub use distribution::{DistributionService, DistributionServiceImpl};
