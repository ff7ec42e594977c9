use crate::errors::DomainResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for finding entities by ID
#[async_trait]
pub trait FindById<T> {
    /// Find an entity by ID; a missing record is `DomainError::EntityNotFound`
    async fn find_by_id(&self, id: Uuid) -> DomainResult<T>;
}

/// Generic repository trait for basic CRUD operations
#[async_trait]
pub trait Repository<T, CreateDto, UpdateDto>: FindById<T> {
    /// Find all entities, in insertion order
    async fn find_all(&self) -> DomainResult<Vec<T>>;

    /// Create a new entity
    async fn create(&self, dto: CreateDto) -> DomainResult<T>;

    /// Update an existing entity
    async fn update(&self, id: Uuid, dto: UpdateDto) -> DomainResult<T>;

    /// Remove an entity permanently
    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
