use crate::domains::beneficiary::types::{Beneficiary, BeneficiaryFilter};
use serde::{Deserialize, Serialize};

/// Option lists for the cascading governorate -> city -> district selects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyOptions {
    pub governorates: Vec<String>,
    /// Cities of the selected governorate, or every city when none is selected
    pub cities: Vec<String>,
    /// Districts under the selected governorate and city
    pub districts: Vec<String>,
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Collect the distinct values, in first-seen order, that each geographic
/// select should offer given the current selections.
pub fn geography_options(beneficiaries: &[Beneficiary], filter: &BeneficiaryFilter) -> GeographyOptions {
    let mut options = GeographyOptions::default();

    let governorate = filter.governorate.as_deref();
    let city = filter.city.as_deref();

    for b in beneficiaries {
        let address = &b.address;
        push_unique(&mut options.governorates, &address.governorate);

        let in_governorate = governorate.map_or(true, |g| address.governorate == g);
        if in_governorate {
            push_unique(&mut options.cities, &address.city);
        }

        let in_city = city.map_or(true, |c| address.city == c);
        if in_governorate && in_city {
            push_unique(&mut options.districts, &address.district);
        }
    }

    options
}
