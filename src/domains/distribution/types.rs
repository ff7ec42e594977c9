use crate::errors::{DomainResult, ValidationError, DomainError};
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(TaskPriority::Normal),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a delivery task. Tasks are created `Pending`; later states are
/// set by the field team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Delivered,
    Failed,
}

/// Predefined package contents offered by an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageTemplate {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub estimated_cost: Decimal,
    pub total_weight_kg: Decimal,
    pub item_count: u32,
}

/// NewPackageTemplate DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPackageTemplate {
    pub organization_id: Uuid,
    pub name: String,
    pub estimated_cost: Decimal,
    pub total_weight_kg: Decimal,
    pub item_count: u32,
}

impl Validate for NewPackageTemplate {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.trim().to_string()))
            .required()
            .max_length(100)
            .validate()?;
        ValidationBuilder::new("estimated_cost", Some(self.estimated_cost))
            .min(Decimal::ZERO)
            .validate()?;
        ValidationBuilder::new("total_weight_kg", Some(self.total_weight_kg))
            .min(Decimal::ZERO)
            .validate()?;
        ValidationBuilder::new("item_count", Some(self.item_count))
            .min(1)
            .validate()
    }
}

impl PackageTemplate {
    pub fn from_new(new: NewPackageTemplate) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            name: new.name.trim().to_string(),
            estimated_cost: new.estimated_cost,
            total_weight_kg: new.total_weight_kg,
            item_count: new.item_count,
        }
    }
}

/// What a task delivers: a template, or a package identified only by code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageRef {
    Template { template_id: Uuid, name: String },
    Code { package_code: String },
}

impl PackageRef {
    pub fn display_name(&self) -> String {
        match self {
            PackageRef::Template { name, .. } => name.clone(),
            PackageRef::Code { package_code } => format!("Package code: {}", package_code),
        }
    }
}

/// Request to create one delivery task per selected beneficiary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkTaskRequest {
    pub beneficiary_ids: Vec<Uuid>,
    pub organization_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub package_code: Option<String>,
    pub priority: TaskPriority,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl BulkTaskRequest {
    /// Selected IDs with repeats removed, first occurrence kept
    pub fn unique_beneficiary_ids(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.beneficiary_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Non-blank package code, trimmed
    pub fn package_code(&self) -> Option<&str> {
        self.package_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

impl Validate for BulkTaskRequest {
    fn validate(&self) -> DomainResult<()> {
        if self.beneficiary_ids.is_empty() {
            return Err(DomainError::Validation(ValidationError::required("beneficiary_ids")));
        }
        if self.organization_id.is_none() {
            return Err(DomainError::Validation(ValidationError::required("organization_id")));
        }
        if self.template_id.is_none() && self.package_code().is_none() {
            return Err(DomainError::Validation(ValidationError::custom(
                "either template_id or package_code is required",
            )));
        }
        if let Some(notes) = &self.notes {
            ValidationBuilder::new("notes", Some(notes.clone()))
                .max_length(1000)
                .validate()?;
        }
        Ok(())
    }
}

/// Totals shown before the batch is confirmed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTaskPreview {
    pub task_count: usize,
    pub package_name: String,
    pub priority: TaskPriority,
    /// `None` when the package is given by code and has no known cost
    pub estimated_total_cost: Option<Decimal>,
    pub estimated_total_weight_kg: Option<Decimal>,
}

/// One package delivery assigned to one beneficiary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTask {
    pub id: Uuid,
    pub batch_id: String,
    pub beneficiary_id: Uuid,
    pub organization_id: Uuid,
    pub package: PackageRef,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tasks created together by one bulk request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTaskBatch {
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<DistributionTask>,
}
