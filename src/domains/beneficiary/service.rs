use crate::config::CoreConfig;
use crate::domains::beneficiary::geography::{geography_options, GeographyOptions};
use crate::domains::beneficiary::query::{execute, BeneficiaryQuery, QueryPlan, QueryResult};
use crate::domains::beneficiary::repository::BeneficiaryRepository;
use crate::domains::beneficiary::types::{
    Beneficiary, BeneficiaryFilter, BeneficiaryStatistics, BeneficiaryStatus, BulkStatusUpdateResult,
    NewBeneficiary, UpdateBeneficiary,
};
use crate::errors::{ServiceError, ServiceResult, ValidationError};
use crate::validation::Validate;
use async_trait::async_trait;
use chrono::Local;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining beneficiary service operations
#[async_trait]
pub trait BeneficiaryService: Send + Sync {
    async fn create_beneficiary(&self, new_beneficiary: NewBeneficiary) -> ServiceResult<Beneficiary>;

    async fn get_beneficiary(&self, id: Uuid) -> ServiceResult<Beneficiary>;

    async fn update_beneficiary(
        &self,
        id: Uuid,
        update_data: UpdateBeneficiary,
    ) -> ServiceResult<Beneficiary>;

    async fn delete_beneficiary(&self, id: Uuid) -> ServiceResult<()>;

    /// Run the list-page query against the current records
    async fn query_beneficiaries(&self, descriptor: &BeneficiaryQuery) -> ServiceResult<QueryResult>;

    async fn get_statistics(&self) -> ServiceResult<BeneficiaryStatistics>;

    /// Option lists for the cascading location selects
    async fn get_geography_options(&self, filter: &BeneficiaryFilter) -> ServiceResult<GeographyOptions>;

    async fn bulk_update_status(
        &self,
        ids: Vec<Uuid>,
        status: BeneficiaryStatus,
    ) -> ServiceResult<BulkStatusUpdateResult>;
}

/// Implementation of the beneficiary service
#[derive(Clone)]
pub struct BeneficiaryServiceImpl {
    repo: Arc<dyn BeneficiaryRepository + Send + Sync>,
    config: CoreConfig,
}

impl BeneficiaryServiceImpl {
    pub fn new(repo: Arc<dyn BeneficiaryRepository + Send + Sync>, config: CoreConfig) -> Self {
        Self { repo, config }
    }
}

#[async_trait]
impl BeneficiaryService for BeneficiaryServiceImpl {
    async fn create_beneficiary(&self, new_beneficiary: NewBeneficiary) -> ServiceResult<Beneficiary> {
        new_beneficiary.validate()?;

        let created = self.repo.create(new_beneficiary).await?;
        info!("registered beneficiary {}", created.id);
        Ok(created)
    }

    async fn get_beneficiary(&self, id: Uuid) -> ServiceResult<Beneficiary> {
        Ok(self.repo.find_by_id(id).await?)
    }

    async fn update_beneficiary(
        &self,
        id: Uuid,
        update_data: UpdateBeneficiary,
    ) -> ServiceResult<Beneficiary> {
        update_data.validate()?;

        let updated = self.repo.update(id, update_data).await?;
        info!("updated beneficiary {}", id);
        Ok(updated)
    }

    async fn delete_beneficiary(&self, id: Uuid) -> ServiceResult<()> {
        self.repo.delete(id).await?;
        info!("deleted beneficiary {}", id);
        Ok(())
    }

    async fn query_beneficiaries(&self, descriptor: &BeneficiaryQuery) -> ServiceResult<QueryResult> {
        let plan = QueryPlan::from_descriptor(descriptor, self.config.default_page_size).map_err(|e| {
            warn!("rejected beneficiary query: {}", e);
            e
        })?;
        let snapshot = self.repo.snapshot().await?;
        let result = execute(&snapshot, &plan, &Local::now());
        debug!(
            "query returned {} of {} matching ({} total)",
            result.items.len(),
            result.total_matching,
            result.total_all
        );
        Ok(result)
    }

    async fn get_statistics(&self) -> ServiceResult<BeneficiaryStatistics> {
        let snapshot = self.repo.snapshot().await?;
        Ok(BeneficiaryStatistics::from_records(&snapshot))
    }

    async fn get_geography_options(&self, filter: &BeneficiaryFilter) -> ServiceResult<GeographyOptions> {
        let snapshot = self.repo.snapshot().await?;
        Ok(geography_options(&snapshot, filter))
    }

    async fn bulk_update_status(
        &self,
        ids: Vec<Uuid>,
        status: BeneficiaryStatus,
    ) -> ServiceResult<BulkStatusUpdateResult> {
        if ids.is_empty() {
            return Err(ServiceError::from(ValidationError::required("beneficiary_ids")));
        }
        Ok(self.repo.update_status_batch(&ids, status).await?)
    }
}
