pub mod geography;
pub mod query;
pub mod repository;
pub mod service;
pub mod types;

pub use geography::{geography_options, GeographyOptions};
pub use query::{query, query_at, BeneficiaryQuery, DateFilter, QueryResult, SortColumn, SortDirection};
pub use repository::{BeneficiaryRepository, InMemoryBeneficiaryRepository};
pub use service::{BeneficiaryService, BeneficiaryServiceImpl};
pub use types::{
    normalize_filter_value, Address, Beneficiary, BeneficiaryFilter, BeneficiaryStatistics,
    BeneficiaryStatus, BulkStatusUpdateResult, FilterField, IdentityStatus, NewBeneficiary,
    UpdateBeneficiary,
};
