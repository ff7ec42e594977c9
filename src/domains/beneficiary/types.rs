use crate::errors::{DomainError, DomainResult};
use crate::validation::{common, Validate};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Enrollment status of a beneficiary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryStatus {
    Active,
    Pending,
    Suspended,
}

impl BeneficiaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeneficiaryStatus::Active => "active",
            BeneficiaryStatus::Pending => "pending",
            BeneficiaryStatus::Suspended => "suspended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BeneficiaryStatus::Active),
            "pending" => Some(BeneficiaryStatus::Pending),
            "suspended" => Some(BeneficiaryStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for BeneficiaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of identity document verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Verified,
    Pending,
    Rejected,
}

impl IdentityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityStatus::Verified => "verified",
            IdentityStatus::Pending => "pending",
            IdentityStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "verified" => Some(IdentityStatus::Verified),
            "pending" => Some(IdentityStatus::Pending),
            "rejected" => Some(IdentityStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured location. District belongs to city, city to governorate; that
/// hierarchy is a data-entry rule and is not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub governorate: String,
    pub city: String,
    pub district: String,
}

/// Beneficiary entity - a registered recipient of aid packages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: Uuid,
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub status: BeneficiaryStatus,
    pub identity_status: IdentityStatus,
    pub address: Address,
    pub family_status: Option<String>,
    pub family_size: Option<String>,
    pub age_group: Option<String>,
    pub economic_level: Option<String>,
    pub displacement_status: Option<String>,
    pub profession: Option<String>,
    pub health_status: Option<String>,
    pub medical_condition: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the beneficiary last received a package; `None` if never
    pub last_received: Option<DateTime<Utc>>,
}

impl Beneficiary {
    /// Build a new record from a validated DTO
    pub fn from_new(new: NewBeneficiary, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            national_id: new.national_id,
            phone: new.phone,
            status: BeneficiaryStatus::Pending,
            identity_status: IdentityStatus::Pending,
            address: new.address,
            family_status: new.family_status,
            family_size: new.family_size,
            age_group: new.age_group,
            economic_level: new.economic_level,
            displacement_status: new.displacement_status,
            profession: new.profession,
            health_status: new.health_status,
            medical_condition: new.medical_condition,
            created_at: now,
            updated_at: now,
            last_received: None,
        }
    }

    /// Value of a filterable field, as compared by the field-equality stage
    pub fn field_value(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Status => Some(self.status.as_str()),
            FilterField::IdentityStatus => Some(self.identity_status.as_str()),
            FilterField::Governorate => Some(self.address.governorate.as_str()),
            FilterField::City => Some(self.address.city.as_str()),
            FilterField::District => Some(self.address.district.as_str()),
            FilterField::FamilyStatus => self.family_status.as_deref(),
            FilterField::FamilySize => self.family_size.as_deref(),
            FilterField::AgeGroup => self.age_group.as_deref(),
            FilterField::EconomicLevel => self.economic_level.as_deref(),
            FilterField::DisplacementStatus => self.displacement_status.as_deref(),
            FilterField::Profession => self.profession.as_deref(),
            FilterField::HealthStatus => self.health_status.as_deref(),
            FilterField::MedicalCondition => self.medical_condition.as_deref(),
        }
    }

    /// Apply a validated partial update
    pub fn apply_update(&mut self, update: UpdateBeneficiary, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(national_id) = update.national_id {
            self.national_id = national_id;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(identity_status) = update.identity_status {
            self.identity_status = identity_status;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        macro_rules! set_if_some {
            ($($field:ident),*) => {
                $(if let Some(value) = update.$field {
                    self.$field = Some(value);
                })*
            };
        }
        set_if_some!(
            family_status,
            family_size,
            age_group,
            economic_level,
            displacement_status,
            profession,
            health_status,
            medical_condition,
            last_received
        );
        self.updated_at = now;
    }
}

/// Every field the field-equality and geography stages can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Status,
    IdentityStatus,
    Governorate,
    City,
    District,
    FamilyStatus,
    FamilySize,
    AgeGroup,
    EconomicLevel,
    DisplacementStatus,
    Profession,
    HealthStatus,
    MedicalCondition,
}

impl FilterField {
    pub const ALL: [FilterField; 13] = [
        FilterField::Status,
        FilterField::IdentityStatus,
        FilterField::Governorate,
        FilterField::City,
        FilterField::District,
        FilterField::FamilyStatus,
        FilterField::FamilySize,
        FilterField::AgeGroup,
        FilterField::EconomicLevel,
        FilterField::DisplacementStatus,
        FilterField::Profession,
        FilterField::HealthStatus,
        FilterField::MedicalCondition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Status => "status",
            FilterField::IdentityStatus => "identity_status",
            FilterField::Governorate => "governorate",
            FilterField::City => "city",
            FilterField::District => "district",
            FilterField::FamilyStatus => "family_status",
            FilterField::FamilySize => "family_size",
            FilterField::AgeGroup => "age_group",
            FilterField::EconomicLevel => "economic_level",
            FilterField::DisplacementStatus => "displacement_status",
            FilterField::Profession => "profession",
            FilterField::HealthStatus => "health_status",
            FilterField::MedicalCondition => "medical_condition",
        }
    }

    /// Parse a field name. Both the snake_case form and the camelCase form
    /// used by the web client are accepted; anything else is a caller error.
    pub fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "status" => Ok(FilterField::Status),
            "identity_status" | "identityStatus" => Ok(FilterField::IdentityStatus),
            "governorate" => Ok(FilterField::Governorate),
            "city" => Ok(FilterField::City),
            "district" => Ok(FilterField::District),
            "family_status" | "familyStatus" => Ok(FilterField::FamilyStatus),
            "family_size" | "familySize" => Ok(FilterField::FamilySize),
            "age_group" | "ageGroup" => Ok(FilterField::AgeGroup),
            "economic_level" | "economicLevel" => Ok(FilterField::EconomicLevel),
            "displacement_status" | "displacementStatus" => Ok(FilterField::DisplacementStatus),
            "profession" => Ok(FilterField::Profession),
            "health_status" | "healthStatus" => Ok(FilterField::HealthStatus),
            "medical_condition" | "medicalCondition" => Ok(FilterField::MedicalCondition),
            other => Err(DomainError::invalid_argument(format!(
                "unknown filter field '{}'",
                other
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Status => "Status",
            FilterField::IdentityStatus => "Identity Status",
            FilterField::Governorate => "Governorate",
            FilterField::City => "City",
            FilterField::District => "District",
            FilterField::FamilyStatus => "Family Status",
            FilterField::FamilySize => "Family Size",
            FilterField::AgeGroup => "Age Group",
            FilterField::EconomicLevel => "Economic Level",
            FilterField::DisplacementStatus => "Displacement Status",
            FilterField::Profession => "Profession",
            FilterField::HealthStatus => "Health Status",
            FilterField::MedicalCondition => "Medical Condition",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a raw dropdown selection to a constraint.
///
/// The web client encodes "no constraint" as an empty string or the literal
/// `"all"`. Both (and whitespace-only input) become `None`; every other value
/// is trimmed.
pub fn normalize_filter_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "all" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn deserialize_constraint<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(normalize_filter_value))
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<BeneficiaryStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match deserialize_constraint(deserializer)? {
        None => Ok(None),
        Some(v) => BeneficiaryStatus::from_str(&v)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unknown status '{}'", v))),
    }
}

fn deserialize_identity_status<'de, D>(deserializer: D) -> Result<Option<IdentityStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match deserialize_constraint(deserializer)? {
        None => Ok(None),
        Some(v) => IdentityStatus::from_str(&v)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unknown identity status '{}'", v))),
    }
}

/// Human-readable label for a coded classification value. Unknown codes and
/// free-text fields are returned unchanged.
pub fn display_value(field: FilterField, value: &str) -> String {
    let label = match (field, value) {
        (FilterField::Status, "active") => "Active",
        (FilterField::Status, "pending") => "Pending",
        (FilterField::Status, "suspended") => "Suspended",
        (FilterField::IdentityStatus, "verified") => "Verified",
        (FilterField::IdentityStatus, "pending") => "Pending Verification",
        (FilterField::IdentityStatus, "rejected") => "Rejected",
        (FilterField::FamilyStatus, "head_of_family") => "Head of Family",
        (FilterField::FamilyStatus, "spouse") => "Spouse",
        (FilterField::FamilyStatus, "child") => "Child",
        (FilterField::FamilyStatus, "orphan_guardian") => "Orphan Guardian",
        (FilterField::FamilyStatus, "family_with_orphans") => "Family with Orphans",
        (FilterField::FamilyStatus, "elderly") => "Elderly",
        (FilterField::FamilyStatus, "disabled") => "Person with Disability",
        (FilterField::FamilySize, "small") => "Small (1-3 members)",
        (FilterField::FamilySize, "medium") => "Medium (4-7 members)",
        (FilterField::FamilySize, "large") => "Large (8+ members)",
        (FilterField::AgeGroup, "child") => "Child (under 18)",
        (FilterField::AgeGroup, "adult") => "Adult (18-60)",
        (FilterField::AgeGroup, "elderly") => "Elderly (60+)",
        (FilterField::EconomicLevel, "very_poor") => "Very Poor",
        (FilterField::EconomicLevel, "poor") => "Poor",
        (FilterField::EconomicLevel, "moderate") => "Moderate",
        (FilterField::EconomicLevel, "good") => "Well-off",
        (FilterField::DisplacementStatus, "displaced") => "Displaced",
        (FilterField::DisplacementStatus, "not_displaced") => "Not Displaced",
        (FilterField::DisplacementStatus, "returnee") => "Returnee",
        (FilterField::HealthStatus, "has_medical") => "Has Medical Condition",
        (FilterField::HealthStatus, "diabetes") => "Diabetes",
        (FilterField::HealthStatus, "hypertension") => "Hypertension",
        (FilterField::HealthStatus, "disability") => "Disability",
        (FilterField::HealthStatus, "chronic") => "Chronic Illness",
        (FilterField::HealthStatus, "healthy") => "Healthy",
        _ => return value.to_string(),
    };
    label.to_string()
}

/// Equality constraints for the advanced filter panel. `None` means the field
/// is unconstrained.
///
/// When decoded from JSON, `""` and `"all"` mean no constraint, field names
/// may be snake_case or camelCase, and unknown names are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeneficiaryFilter {
    #[serde(deserialize_with = "deserialize_status")]
    pub status: Option<BeneficiaryStatus>,
    #[serde(alias = "identityStatus", deserialize_with = "deserialize_identity_status")]
    pub identity_status: Option<IdentityStatus>,
    #[serde(deserialize_with = "deserialize_constraint")]
    pub governorate: Option<String>,
    #[serde(deserialize_with = "deserialize_constraint")]
    pub city: Option<String>,
    #[serde(deserialize_with = "deserialize_constraint")]
    pub district: Option<String>,
    #[serde(alias = "familyStatus", deserialize_with = "deserialize_constraint")]
    pub family_status: Option<String>,
    #[serde(alias = "familySize", deserialize_with = "deserialize_constraint")]
    pub family_size: Option<String>,
    #[serde(alias = "ageGroup", deserialize_with = "deserialize_constraint")]
    pub age_group: Option<String>,
    #[serde(alias = "economicLevel", deserialize_with = "deserialize_constraint")]
    pub economic_level: Option<String>,
    #[serde(alias = "displacementStatus", deserialize_with = "deserialize_constraint")]
    pub displacement_status: Option<String>,
    #[serde(deserialize_with = "deserialize_constraint")]
    pub profession: Option<String>,
    #[serde(alias = "healthStatus", deserialize_with = "deserialize_constraint")]
    pub health_status: Option<String>,
    #[serde(alias = "medicalCondition", deserialize_with = "deserialize_constraint")]
    pub medical_condition: Option<String>,
}

/// One active constraint, ready for a filter chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilter {
    pub field: FilterField,
    pub label: String,
    pub value: String,
    pub display_value: String,
}

impl BeneficiaryFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from UI name/value pairs, normalizing sentinel values.
    /// Unknown field names and unknown status codes are rejected.
    pub fn from_selections(selections: &HashMap<String, String>) -> DomainResult<Self> {
        let mut filter = Self::default();
        for (name, value) in selections {
            let field = FilterField::from_str(name)?;
            filter.put(field, normalize_filter_value(value))?;
        }
        Ok(filter)
    }

    /// Current constraint for `field`
    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Status => self.status.as_ref().map(|s| s.as_str()),
            FilterField::IdentityStatus => self.identity_status.as_ref().map(|s| s.as_str()),
            FilterField::Governorate => self.governorate.as_deref(),
            FilterField::City => self.city.as_deref(),
            FilterField::District => self.district.as_deref(),
            FilterField::FamilyStatus => self.family_status.as_deref(),
            FilterField::FamilySize => self.family_size.as_deref(),
            FilterField::AgeGroup => self.age_group.as_deref(),
            FilterField::EconomicLevel => self.economic_level.as_deref(),
            FilterField::DisplacementStatus => self.displacement_status.as_deref(),
            FilterField::Profession => self.profession.as_deref(),
            FilterField::HealthStatus => self.health_status.as_deref(),
            FilterField::MedicalCondition => self.medical_condition.as_deref(),
        }
    }

    /// Change one constraint the way the filter panel does: selecting a new
    /// governorate clears city and district, selecting a new city clears
    /// district.
    pub fn set_field(&mut self, field: FilterField, value: Option<String>) -> DomainResult<()> {
        self.put(field, value)?;
        match field {
            FilterField::Governorate => {
                self.city = None;
                self.district = None;
            }
            FilterField::City => {
                self.district = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn put(&mut self, field: FilterField, value: Option<String>) -> DomainResult<()> {
        match field {
            FilterField::Status => {
                self.status = value
                    .map(|v| {
                        BeneficiaryStatus::from_str(&v).ok_or_else(|| {
                            DomainError::invalid_argument(format!("unknown status '{}'", v))
                        })
                    })
                    .transpose()?;
            }
            FilterField::IdentityStatus => {
                self.identity_status = value
                    .map(|v| {
                        IdentityStatus::from_str(&v).ok_or_else(|| {
                            DomainError::invalid_argument(format!("unknown identity status '{}'", v))
                        })
                    })
                    .transpose()?;
            }
            FilterField::Governorate => self.governorate = value,
            FilterField::City => self.city = value,
            FilterField::District => self.district = value,
            FilterField::FamilyStatus => self.family_status = value,
            FilterField::FamilySize => self.family_size = value,
            FilterField::AgeGroup => self.age_group = value,
            FilterField::EconomicLevel => self.economic_level = value,
            FilterField::DisplacementStatus => self.displacement_status = value,
            FilterField::Profession => self.profession = value,
            FilterField::HealthStatus => self.health_status = value,
            FilterField::MedicalCondition => self.medical_condition = value,
        }
        Ok(())
    }

    /// Present constraints in panel order
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        FilterField::ALL
            .iter()
            .filter_map(|field| {
                self.get(*field).map(|value| ActiveFilter {
                    field: *field,
                    label: field.label().to_string(),
                    value: value.to_string(),
                    display_value: display_value(*field, value),
                })
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        FilterField::ALL.iter().filter(|field| self.get(**field).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Record satisfies every present constraint
    pub fn matches(&self, beneficiary: &Beneficiary) -> bool {
        FilterField::ALL.iter().all(|field| match self.get(*field) {
            None => true,
            Some(expected) => beneficiary.field_value(*field) == Some(expected),
        })
    }
}

/// NewBeneficiary DTO - used when registering a beneficiary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBeneficiary {
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub address: Address,
    #[serde(default)]
    pub family_status: Option<String>,
    #[serde(default)]
    pub family_size: Option<String>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub economic_level: Option<String>,
    #[serde(default)]
    pub displacement_status: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub medical_condition: Option<String>,
}

fn validate_address(address: &Address) -> DomainResult<()> {
    common::validate_location_part(&address.governorate, "governorate")?;
    common::validate_location_part(&address.city, "city")?;
    common::validate_location_part(&address.district, "district")
}

impl Validate for NewBeneficiary {
    fn validate(&self) -> DomainResult<()> {
        common::validate_person_name(&self.name)?;
        common::validate_national_id(&self.national_id)?;
        common::validate_phone(&self.phone)?;
        validate_address(&self.address)
    }
}

/// UpdateBeneficiary DTO - only present fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateBeneficiary {
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub status: Option<BeneficiaryStatus>,
    pub identity_status: Option<IdentityStatus>,
    pub address: Option<Address>,
    pub family_status: Option<String>,
    pub family_size: Option<String>,
    pub age_group: Option<String>,
    pub economic_level: Option<String>,
    pub displacement_status: Option<String>,
    pub profession: Option<String>,
    pub health_status: Option<String>,
    pub medical_condition: Option<String>,
    pub last_received: Option<DateTime<Utc>>,
}

impl Validate for UpdateBeneficiary {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            common::validate_person_name(name)?;
        }
        if let Some(national_id) = &self.national_id {
            common::validate_national_id(national_id)?;
        }
        if let Some(phone) = &self.phone {
            common::validate_phone(phone)?;
        }
        if let Some(address) = &self.address {
            validate_address(address)?;
        }
        Ok(())
    }
}

/// Summary counts shown above the beneficiary list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryStatistics {
    pub total: u64,
    pub verified: u64,
    pub pending_verification: u64,
    pub rejected: u64,
    pub active: u64,
    pub pending: u64,
    pub suspended: u64,
}

impl BeneficiaryStatistics {
    pub fn from_records(beneficiaries: &[Beneficiary]) -> Self {
        beneficiaries.iter().fold(Self::default(), |mut stats, b| {
            stats.total += 1;
            match b.identity_status {
                IdentityStatus::Verified => stats.verified += 1,
                IdentityStatus::Pending => stats.pending_verification += 1,
                IdentityStatus::Rejected => stats.rejected += 1,
            }
            match b.status {
                BeneficiaryStatus::Active => stats.active += 1,
                BeneficiaryStatus::Pending => stats.pending += 1,
                BeneficiaryStatus::Suspended => stats.suspended += 1,
            }
            stats
        })
    }
}

/// Result of a batch status transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusUpdateResult {
    pub status: Option<BeneficiaryStatus>,
    /// Records whose status changed
    pub updated: Vec<Uuid>,
    /// Records already in the target status
    pub unchanged: Vec<Uuid>,
    pub not_found: Vec<Uuid>,
}
