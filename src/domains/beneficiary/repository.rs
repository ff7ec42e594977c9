use crate::domains::beneficiary::types::{
    Beneficiary, BeneficiaryStatus, BulkStatusUpdateResult, NewBeneficiary, UpdateBeneficiary,
};
use crate::domains::core::repository::{FindById, Repository};
use crate::errors::{DomainError, DomainResult, RepositoryError};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Trait defining beneficiary repository operations
#[async_trait]
pub trait BeneficiaryRepository:
    Repository<Beneficiary, NewBeneficiary, UpdateBeneficiary> + Send + Sync
{
    /// Copy of every record in insertion order, for the query pipeline
    async fn snapshot(&self) -> DomainResult<Vec<Beneficiary>>;

    /// Records for the given IDs in request order; unknown IDs are skipped
    async fn find_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Beneficiary>>;

    /// Move every listed record to `status`
    async fn update_status_batch(
        &self,
        ids: &[Uuid],
        status: BeneficiaryStatus,
    ) -> DomainResult<BulkStatusUpdateResult>;
}

/// Process-local store. Reads share the lock; every mutation holds the write
/// lock for its whole duration so a batch is applied atomically.
#[derive(Debug, Default)]
pub struct InMemoryBeneficiaryRepository {
    records: RwLock<Vec<Beneficiary>>,
}

impl InMemoryBeneficiaryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, keeping their order
    pub fn with_records(records: Vec<Beneficiary>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    fn ensure_unique_national_id(
        records: &[Beneficiary],
        national_id: &str,
        except: Option<Uuid>,
    ) -> DomainResult<()> {
        let taken = records
            .iter()
            .any(|b| b.national_id == national_id && Some(b.id) != except);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "national id {} is already registered",
                national_id
            ))
            .into());
        }
        Ok(())
    }

    fn not_found(id: Uuid) -> DomainError {
        DomainError::EntityNotFound("Beneficiary".to_string(), id)
    }
}

#[async_trait]
impl FindById<Beneficiary> for InMemoryBeneficiaryRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Beneficiary> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }
}

#[async_trait]
impl Repository<Beneficiary, NewBeneficiary, UpdateBeneficiary> for InMemoryBeneficiaryRepository {
    async fn find_all(&self) -> DomainResult<Vec<Beneficiary>> {
        Ok(self.records.read().await.clone())
    }

    async fn create(&self, dto: NewBeneficiary) -> DomainResult<Beneficiary> {
        let mut records = self.records.write().await;
        Self::ensure_unique_national_id(&records, &dto.national_id, None)?;

        let beneficiary = Beneficiary::from_new(dto, Utc::now());
        records.push(beneficiary.clone());
        debug!("stored beneficiary {} ({} records)", beneficiary.id, records.len());
        Ok(beneficiary)
    }

    async fn update(&self, id: Uuid, dto: UpdateBeneficiary) -> DomainResult<Beneficiary> {
        let mut records = self.records.write().await;
        if let Some(national_id) = dto.national_id.as_deref() {
            Self::ensure_unique_national_id(&records, national_id, Some(id))?;
        }

        let beneficiary = records
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        beneficiary.apply_update(dto, Utc::now());
        Ok(beneficiary.clone())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        records.remove(index);
        Ok(())
    }
}

#[async_trait]
impl BeneficiaryRepository for InMemoryBeneficiaryRepository {
    async fn snapshot(&self) -> DomainResult<Vec<Beneficiary>> {
        self.find_all().await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Beneficiary>> {
        let records = self.records.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| records.iter().find(|b| b.id == *id).cloned())
            .collect())
    }

    async fn update_status_batch(
        &self,
        ids: &[Uuid],
        status: BeneficiaryStatus,
    ) -> DomainResult<BulkStatusUpdateResult> {
        let mut records = self.records.write().await;
        let now = Utc::now();
        let mut result = BulkStatusUpdateResult {
            status: Some(status),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        for id in ids.iter().filter(|id| seen.insert(**id)) {
            match records.iter_mut().find(|b| b.id == *id) {
                None => result.not_found.push(*id),
                Some(b) if b.status == status => result.unchanged.push(*id),
                Some(b) => {
                    b.status = status;
                    b.updated_at = now;
                    result.updated.push(*id);
                }
            }
        }

        info!(
            "batch status -> {}: {} updated, {} unchanged, {} not found",
            status,
            result.updated.len(),
            result.unchanged.len(),
            result.not_found.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::beneficiary::types::Address;

    fn new_beneficiary(name: &str, national_id: &str) -> NewBeneficiary {
        NewBeneficiary {
            name: name.to_string(),
            national_id: national_id.to_string(),
            phone: "0591234567".to_string(),
            address: Address {
                governorate: "Gaza".to_string(),
                city: "Gaza City".to_string(),
                district: "Rimal".to_string(),
            },
            family_status: None,
            family_size: None,
            age_group: None,
            economic_level: None,
            displacement_status: None,
            profession: None,
            health_status: None,
            medical_condition: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryBeneficiaryRepository::new();
        let created = repo.create(new_beneficiary("Ahmad", "900111111")).await.unwrap();

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found, created);

        let missing = repo.find_by_id(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(DomainError::EntityNotFound(_, _))));
    }

    #[tokio::test]
    async fn test_duplicate_national_id_conflicts() {
        let repo = InMemoryBeneficiaryRepository::new();
        repo.create(new_beneficiary("Ahmad", "900111111")).await.unwrap();
        let sara = repo.create(new_beneficiary("Sara", "800111111")).await.unwrap();

        let duplicate = repo.create(new_beneficiary("Other", "900111111")).await;
        assert!(matches!(
            duplicate,
            Err(DomainError::Repository(RepositoryError::Conflict(_)))
        ));

        let update = UpdateBeneficiary {
            national_id: Some("900111111".to_string()),
            ..Default::default()
        };
        assert!(repo.update(sara.id, update).await.is_err());

        // Keeping one's own national id is not a conflict
        let update = UpdateBeneficiary {
            national_id: Some("800111111".to_string()),
            ..Default::default()
        };
        assert!(repo.update(sara.id, update).await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_keeps_insertion_order_and_delete() {
        let repo = InMemoryBeneficiaryRepository::new();
        let a = repo.create(new_beneficiary("Ahmad", "900111111")).await.unwrap();
        let b = repo.create(new_beneficiary("Sara", "800111111")).await.unwrap();
        let c = repo.create(new_beneficiary("Khaled", "700111111")).await.unwrap();

        let ids: Vec<Uuid> = repo.snapshot().await.unwrap().iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);

        repo.delete(b.id).await.unwrap();
        let ids: Vec<Uuid> = repo.snapshot().await.unwrap().iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert!(repo.delete(b.id).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_ids_keeps_request_order() {
        let repo = InMemoryBeneficiaryRepository::new();
        let a = repo.create(new_beneficiary("Ahmad", "900111111")).await.unwrap();
        let b = repo.create(new_beneficiary("Sara", "800111111")).await.unwrap();

        let found = repo.find_by_ids(&[b.id, Uuid::new_v4(), a.id]).await.unwrap();
        let names: Vec<&str> = found.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["Sara", "Ahmad"]);
    }

    #[tokio::test]
    async fn test_update_status_batch() {
        let repo = InMemoryBeneficiaryRepository::new();
        let a = repo.create(new_beneficiary("Ahmad", "900111111")).await.unwrap();
        let b = repo.create(new_beneficiary("Sara", "800111111")).await.unwrap();
        repo.update(
            b.id,
            UpdateBeneficiary {
                status: Some(BeneficiaryStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let ghost = Uuid::new_v4();

        let result = repo
            .update_status_batch(&[a.id, b.id, ghost, a.id], BeneficiaryStatus::Active)
            .await
            .unwrap();
        assert_eq!(result.updated, vec![a.id]);
        assert_eq!(result.unchanged, vec![b.id]);
        assert_eq!(result.not_found, vec![ghost]);

        let a = repo.find_by_id(a.id).await.unwrap();
        assert_eq!(a.status, BeneficiaryStatus::Active);
    }
}
