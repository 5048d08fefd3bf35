//! Address master rows

use chrono::NaiveDate;

use crate::records::SqlValue;

crate::data_record! {
    pub struct Address in "fa_df_address" {
        site: "df0f4799-5d1a-4619-98a8-8daa905cb5b7",
        required: ["FIPS", "ZIP5", "AddressMasterID"],
    } {
        fips: String = "FIPS" => required_string,
        state: Option<String> = "State" => string,
        county: Option<String> = "County" => string,
        zip5: String = "ZIP5" => required_string,
        zip4: Option<String> = "ZIP4" => string,
        full_street_address: Option<String> = "FullStreetAddress" => string,
        pre_directional: Option<String> = "PreDirectional" => string,
        street_number: Option<String> = "StreetNumber" => string,
        street: Option<String> = "Street" => string,
        post_directional: Option<String> = "PostDirectional" => string,
        street_type: Option<String> = "StreetType" => string,
        unit_type: Option<String> = "UnitType" => string,
        unit_nbr: Option<String> = "UnitNbr" => string,
        vacant_indicator: Option<String> = "VacantIndicator" => string,
        non_usps_address_indicator: Option<String> = "NonUSPSAddressIndicator" => string,
        not_currently_deliverable: Option<String> = "NotCurrentlyDeliverable" => string,
        community_name: Option<String> = "CommunityName" => string,
        municipality: Option<String> = "Municipality" => string,
        postal_community: Option<String> = "PostalCommunity" => string,
        place_name: Option<String> = "PlaceName" => string,
        subdivision_name: Option<String> = "SubdivisionName" => string,
        latitude: Option<f64> = "Latitude" => f64,
        longitude: Option<f64> = "Longitude" => f64,
        property_class_id: Option<String> = "PropertyClassID" => string,
        address_type: Option<String> = "AddressType" => string,
        property_id: Option<i64> = "PropertyID" => i64,
        address_master_id: i64 = "AddressMasterID" => required_i64,
        last_update: Option<NaiveDate> = "LastUpdate" => date_int,
        effective_date: Option<NaiveDate> = "EffectiveDate" => date_int,
        expiration_date: Option<NaiveDate> = "ExpirationDate" => date_int,
        dpv_footnotes: Option<String> = "DPVFootnotes" => string,
        delivery_point_check_digit: Option<i32> = "DeliveryPointCheckDigit" => i32,
        delivery_point_code: Option<String> = "DeliveryPointCode" => string,
        dpv_count: Option<i32> = "DPVCount" => i32,
    }
}

impl Address {
    /// Columns written on insert: the declared ones plus the computed
    /// `location` point.
    pub fn insert_columns() -> Vec<&'static str> {
        let mut columns = Self::columns();
        columns.push("location");
        columns
    }

    /// Values aligned with [`Address::insert_columns`].
    pub fn insert_values(&mut self) -> Vec<SqlValue> {
        let mut values = self.sql_values();
        values.push(SqlValue::Point(self.longitude.zip(self.latitude)));
        values
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::records::Headers;

    #[test]
    fn test_location_needs_both_coordinates() {
        let headers = Headers::parse("FIPS|ZIP5|AddressMasterID|Latitude|Longitude|LastUpdate", '|');

        let mut record = Address::parse(&headers, &["06037", "90210", "12", "34.09", "-118.41", "20250102"]).unwrap();
        assert_eq!(record.last_update, NaiveDate::from_ymd_opt(2025, 1, 2));
        let values = record.insert_values();
        assert_eq!(values.len(), Address::insert_columns().len());
        assert_eq!(values.last(), Some(&SqlValue::Point(Some((-118.41, 34.09)))));

        let mut record = Address::parse(&headers, &["06037", "90210", "12", "34.09", "", ""]).unwrap();
        assert!(record.insert_values().last().unwrap().is_null());
    }

    #[test]
    fn test_required_address_fields() {
        let headers = Headers::parse("FIPS|ZIP5|AddressMasterID", '|');
        assert!(Address::parse(&headers, &["06037", "", "12"]).is_err());
        assert!(Address::parse(&headers, &["06037", "90210", ""]).is_err());
    }
}
