use crate::config::CoreConfig;
use crate::domains::beneficiary::query::search_stage;
use crate::domains::beneficiary::repository::BeneficiaryRepository;
use crate::domains::beneficiary::types::Beneficiary;
use crate::domains::distribution::types::{
    BulkTaskBatch, BulkTaskPreview, BulkTaskRequest, DistributionTask, NewPackageTemplate,
    PackageRef, PackageTemplate, TaskStatus,
};
use crate::errors::{DomainError, ServiceError, ServiceResult};
use crate::validation::Validate;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Trait defining bulk distribution operations
#[async_trait]
pub trait DistributionService: Send + Sync {
    async fn register_template(&self, new_template: NewPackageTemplate) -> ServiceResult<PackageTemplate>;

    /// Templates offered by one organization, in registration order
    async fn available_templates(&self, organization_id: Uuid) -> ServiceResult<Vec<PackageTemplate>>;

    /// Beneficiaries matching `term` that are not already selected
    async fn search_candidates(&self, term: &str, exclude: &[Uuid]) -> ServiceResult<Vec<Beneficiary>>;

    async fn preview(&self, request: &BulkTaskRequest) -> ServiceResult<BulkTaskPreview>;

    async fn create_tasks(&self, request: BulkTaskRequest) -> ServiceResult<BulkTaskBatch>;

    async fn list_tasks(&self, batch_id: &str) -> ServiceResult<Vec<DistributionTask>>;
}

/// Implementation of the distribution service
pub struct DistributionServiceImpl {
    beneficiary_repo: Arc<dyn BeneficiaryRepository + Send + Sync>,
    templates: RwLock<Vec<PackageTemplate>>,
    tasks: RwLock<Vec<DistributionTask>>,
    config: CoreConfig,
}

impl DistributionServiceImpl {
    pub fn new(beneficiary_repo: Arc<dyn BeneficiaryRepository + Send + Sync>, config: CoreConfig) -> Self {
        Self {
            beneficiary_repo,
            templates: RwLock::new(Vec::new()),
            tasks: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Resolve what the request delivers. A template must exist and belong to
    /// the requesting organization.
    async fn resolve_package(
        &self,
        request: &BulkTaskRequest,
        organization_id: Uuid,
    ) -> ServiceResult<(PackageRef, Option<PackageTemplate>)> {
        if let Some(template_id) = request.template_id {
            let templates = self.templates.read().await;
            let template = templates
                .iter()
                .find(|t| t.id == template_id)
                .cloned()
                .ok_or_else(|| DomainError::EntityNotFound("PackageTemplate".to_string(), template_id))?;
            if template.organization_id != organization_id {
                return Err(ServiceError::TaskRejected(format!(
                    "template {} does not belong to organization {}",
                    template_id, organization_id
                )));
            }
            let package = PackageRef::Template {
                template_id,
                name: template.name.clone(),
            };
            return Ok((package, Some(template)));
        }

        match request.package_code() {
            Some(code) => Ok((
                PackageRef::Code {
                    package_code: code.to_string(),
                },
                None,
            )),
            None => Err(ServiceError::TaskRejected("no package selected".to_string())),
        }
    }

    fn organization(request: &BulkTaskRequest) -> ServiceResult<Uuid> {
        request
            .organization_id
            .ok_or_else(|| ServiceError::TaskRejected("no organization selected".to_string()))
    }

    /// `TASK-<unix millis>`, bumped past any batch already created in the
    /// same millisecond
    fn next_batch_id(existing: &[DistributionTask], now_millis: i64) -> String {
        let mut millis = now_millis;
        loop {
            let candidate = format!("TASK-{}", millis);
            if !existing.iter().any(|t| t.batch_id == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }
}

#[async_trait]
impl DistributionService for DistributionServiceImpl {
    async fn register_template(&self, new_template: NewPackageTemplate) -> ServiceResult<PackageTemplate> {
        new_template.validate()?;

        let template = PackageTemplate::from_new(new_template);
        self.templates.write().await.push(template.clone());
        info!(
            "registered package template '{}' for organization {}",
            template.name, template.organization_id
        );
        Ok(template)
    }

    async fn available_templates(&self, organization_id: Uuid) -> ServiceResult<Vec<PackageTemplate>> {
        let templates = self.templates.read().await;
        Ok(templates
            .iter()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn search_candidates(&self, term: &str, exclude: &[Uuid]) -> ServiceResult<Vec<Beneficiary>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.beneficiary_repo.snapshot().await?;
        let all: Vec<&Beneficiary> = snapshot.iter().collect();
        let candidates: Vec<Beneficiary> = search_stage(all, Some(term))
            .into_iter()
            .filter(|b| !exclude.contains(&b.id))
            .take(self.config.candidate_search_limit)
            .cloned()
            .collect();

        debug!("candidate search '{}' returned {}", term, candidates.len());
        Ok(candidates)
    }

    async fn preview(&self, request: &BulkTaskRequest) -> ServiceResult<BulkTaskPreview> {
        request.validate()?;
        let organization_id = Self::organization(request)?;
        let (package, template) = self.resolve_package(request, organization_id).await?;

        let task_count = request.unique_beneficiary_ids().len();
        let count = Decimal::from(task_count as u64);

        Ok(BulkTaskPreview {
            task_count,
            package_name: package.display_name(),
            priority: request.priority,
            estimated_total_cost: template.as_ref().map(|t| t.estimated_cost * count),
            estimated_total_weight_kg: template.as_ref().map(|t| t.total_weight_kg * count),
        })
    }

    async fn create_tasks(&self, request: BulkTaskRequest) -> ServiceResult<BulkTaskBatch> {
        request.validate()?;
        let organization_id = Self::organization(&request)?;
        let (package, _) = self.resolve_package(&request, organization_id).await?;

        let ids = request.unique_beneficiary_ids();
        let found = self.beneficiary_repo.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !found.iter().any(|b| b.id == **id))
                .map(|id| id.to_string())
                .collect();
            warn!("bulk task request rejected, unknown beneficiaries: {}", missing.join(", "));
            return Err(ServiceError::TaskRejected(format!(
                "unknown beneficiaries: {}",
                missing.join(", ")
            )));
        }

        let created_at = Utc::now();
        let mut tasks = self.tasks.write().await;
        let batch_id = Self::next_batch_id(&tasks, created_at.timestamp_millis());

        let batch: Vec<DistributionTask> = ids
            .iter()
            .map(|beneficiary_id| DistributionTask {
                id: Uuid::new_v4(),
                batch_id: batch_id.clone(),
                beneficiary_id: *beneficiary_id,
                organization_id,
                package: package.clone(),
                priority: request.priority,
                status: TaskStatus::Pending,
                scheduled_date: request.scheduled_date,
                notes: request.notes.clone(),
                created_at,
            })
            .collect();
        tasks.extend(batch.iter().cloned());

        info!(
            "created batch {} with {} {} tasks ({})",
            batch_id,
            batch.len(),
            request.priority,
            package.display_name()
        );
        Ok(BulkTaskBatch {
            batch_id,
            created_at,
            tasks: batch,
        })
    }

    async fn list_tasks(&self, batch_id: &str) -> ServiceResult<Vec<DistributionTask>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.batch_id == batch_id).cloned().collect())
    }
}
