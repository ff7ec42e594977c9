use crate::config::CoreConfig;
use crate::domains::beneficiary::repository::{BeneficiaryRepository, InMemoryBeneficiaryRepository};
use crate::domains::beneficiary::service::{BeneficiaryService, BeneficiaryServiceImpl};
use crate::domains::distribution::service::{DistributionService, DistributionServiceImpl};
use crate::ffi::error::{FFIError, FFIResult};
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: tokio::sync::Mutex<()> = tokio::sync::Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    // Beneficiary Domain
    static ref BENEFICIARY_SERVICE: Mutex<Option<Arc<dyn BeneficiaryService>>> = Mutex::new(None);

    // Distribution Domain
    static ref DISTRIBUTION_SERVICE: Mutex<Option<Arc<dyn DistributionService>>> = Mutex::new(None);
}

// Beneficiary
pub fn get_beneficiary_service() -> FFIResult<Arc<dyn BeneficiaryService>> {
    BENEFICIARY_SERVICE.lock().map_err(|_| FFIError::internal("BENEFICIARY_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("BeneficiaryService not initialized".to_string()))
}

// Distribution
pub fn get_distribution_service() -> FFIResult<Arc<dyn DistributionService>> {
    DISTRIBUTION_SERVICE.lock().map_err(|_| FFIError::internal("DISTRIBUTION_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("DistributionService not initialized".to_string()))
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Initialize global services. Later calls are no-ops.
pub async fn initialize(config: CoreConfig) -> FFIResult<()> {
    // Acquire the async mutex to ensure single initialization
    let _guard = INIT_MUTEX.lock().await;

    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }

    let result = initialize_internal(config);

    // Mark as initialized only if successful
    if result.is_ok() {
        INITIALIZED.store(true, Ordering::Release);
    }

    result
}

fn initialize_internal(config: CoreConfig) -> FFIResult<()> {
    // Logging first, so the rest of start-up is visible
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_filter);
    }
    let _ = env_logger::try_init();

    config.validate()?;

    log::info!("Starting internal initialization");
    log::debug!(
        "default page size: {}, candidate search limit: {}",
        config.default_page_size,
        config.candidate_search_limit
    );

    let beneficiary_repo: Arc<dyn BeneficiaryRepository + Send + Sync> = Arc::new(InMemoryBeneficiaryRepository::new());
    let beneficiary_service: Arc<dyn BeneficiaryService> = Arc::new(BeneficiaryServiceImpl::new(
        beneficiary_repo.clone(),
        config.clone(),
    ));
    let distribution_service: Arc<dyn DistributionService> = Arc::new(DistributionServiceImpl::new(
        beneficiary_repo,
        config,
    ));

    *BENEFICIARY_SERVICE.lock().map_err(|_| FFIError::internal("BENEFICIARY_SERVICE lock poisoned".to_string()))? = Some(beneficiary_service);
    *DISTRIBUTION_SERVICE.lock().map_err(|_| FFIError::internal("DISTRIBUTION_SERVICE lock poisoned".to_string()))? = Some(distribution_service);

    log::info!("Initialization complete");
    Ok(())
}
