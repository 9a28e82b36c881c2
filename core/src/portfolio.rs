//! The in-memory mortgage table.
//!
//! Records are identified by position. Enrichment fills the optional
//! columns in place; records are never removed during a run.

use crate::{
    classifier::LoanRisk,
    error::RiskResult,
    loss::check_amount,
    record_source::RecordSource,
    types::{Coordinates, PropertyType, RowIndex},
};
use serde::{Deserialize, Serialize};

/// Raw input for one mortgage, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMortgage {
    pub address:        String,
    pub loan_amount:    f64,
    pub property_value: f64,
}

impl NewMortgage {
    pub fn new(address: impl Into<String>, loan_amount: f64, property_value: f64) -> Self {
        Self {
            address: address.into(),
            loan_amount,
            property_value,
        }
    }

    pub fn validate(&self) -> RiskResult<()> {
        check_amount("loan_amount", self.loan_amount)?;
        check_amount("property_value", self.property_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub address:            String,
    pub loan_amount:        f64,
    pub property_value:     f64,
    pub property_type:      PropertyType,
    /// Measured proximity in [0, 1]; drawn at random when absent.
    pub proximity_to_water: Option<f64>,
    pub latitude:           Option<f64>,
    pub longitude:          Option<f64>,
    pub flood_risk:         Option<f64>,
    pub loan_risk:          Option<LoanRisk>,
    pub loss_given_default: Option<f64>,
}

impl PropertyRecord {
    pub fn from_mortgage(mortgage: NewMortgage, property_type: PropertyType) -> Self {
        Self {
            address: mortgage.address,
            loan_amount: mortgage.loan_amount,
            property_value: mortgage.property_value,
            property_type,
            proximity_to_water: None,
            latitude: None,
            longitude: None,
            flood_risk: None,
            loan_risk: None,
            loss_given_default: None,
        }
    }

    /// Both coordinates, or nothing.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }

    pub fn set_coordinates(&mut self, coords: Option<Coordinates>) {
        self.latitude = coords.map(|c| c.latitude);
        self.longitude = coords.map(|c| c.longitude);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    records: Vec<PropertyRecord>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three sample mortgages used throughout the analysis.
    pub fn sample() -> Self {
        let mut portfolio = Self::new();
        for mortgage in sample_mortgages() {
            portfolio.records.push(PropertyRecord::from_mortgage(mortgage, PropertyType::Residential));
        }
        portfolio
    }

    pub fn from_mortgages(
        mortgages: impl IntoIterator<Item = NewMortgage>,
        property_type: PropertyType,
    ) -> RiskResult<Self> {
        let mut portfolio = Self::new();
        for mortgage in mortgages {
            portfolio.push(mortgage, property_type)?;
        }
        Ok(portfolio)
    }

    /// Append a record, returning its row index.
    pub fn push(&mut self, mortgage: NewMortgage, property_type: PropertyType) -> RiskResult<RowIndex> {
        mortgage.validate()?;
        self.records.push(PropertyRecord::from_mortgage(mortgage, property_type));
        Ok(self.records.len() - 1)
    }

    /// Drain a record source into the table. Returns how many were added.
    pub fn extend_from(
        &mut self,
        source: &mut dyn RecordSource,
        property_type: PropertyType,
    ) -> RiskResult<usize> {
        let mut added = 0;
        while let Some(mortgage) = source.next_mortgage()? {
            let row = self.push(mortgage, property_type)?;
            log::debug!("row={row} appended from {}", source.name());
            added += 1;
        }
        Ok(added)
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn get(&self, row: RowIndex) -> Option<&PropertyRecord> {
        self.records.get(row)
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [PropertyRecord] {
        &mut self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyRecord> {
        self.records.iter()
    }

    /// Records that can be placed on a map.
    pub fn located(&self) -> impl Iterator<Item = (&PropertyRecord, Coordinates)> {
        self.records
            .iter()
            .filter_map(|r| r.coordinates().map(|c| (r, c)))
    }
}

pub fn sample_mortgages() -> Vec<NewMortgage> {
    vec![
        NewMortgage::new("1 Town Square, Barking, IG11 7LU", 250_000.0, 300_000.0),
        NewMortgage::new("St Ives Road, Maidenhead, SL6 1RF", 400_000.0, 500_000.0),
        NewMortgage::new("Cardiff Bay, Cardiff, CF10", 175_000.0, 200_000.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;

    #[test]
    fn sample_has_three_unenriched_rows() {
        let portfolio = Portfolio::sample();
        assert_eq!(portfolio.len(), 3);
        assert!(portfolio.iter().all(|r| r.flood_risk.is_none() && r.latitude.is_none()));
        assert_eq!(portfolio.get(2).unwrap().address, "Cardiff Bay, Cardiff, CF10");
    }

    #[test]
    fn push_rejects_negative_amounts() {
        let mut portfolio = Portfolio::new();
        let err = portfolio
            .push(NewMortgage::new("x", -1.0, 10.0), PropertyType::Residential)
            .unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput { field: "loan_amount", .. }));
        assert!(portfolio.is_empty());
    }

    #[test]
    fn duplicate_addresses_are_allowed() {
        let mut portfolio = Portfolio::new();
        let a = portfolio.push(NewMortgage::new("Same St", 1.0, 2.0), PropertyType::Residential).unwrap();
        let b = portfolio.push(NewMortgage::new("Same St", 1.0, 2.0), PropertyType::Other).unwrap();
        assert_eq!((a, b), (0, 1));
    }

    #[test]
    fn half_coordinates_are_not_located() {
        let mut record = PropertyRecord::from_mortgage(NewMortgage::new("x", 1.0, 2.0), PropertyType::Residential);
        record.latitude = Some(51.0);
        assert!(record.coordinates().is_none());

        record.set_coordinates(Some(Coordinates::new(51.0, -3.0)));
        assert_eq!(record.coordinates(), Some(Coordinates::new(51.0, -3.0)));
    }
}
