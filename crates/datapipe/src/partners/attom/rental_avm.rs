//! Rental valuation rows (`RENTALAVM`)

use chrono::NaiveDate;

crate::data_record! {
    pub struct RentalAvm in "ad_df_rental_avm" {
        site: "c338fdd0-3022-4895-ac02-b4051b7558e8",
        required: ["[ATTOM ID]"],
    } {
        attomid: i64 = "[ATTOM ID]" => required_i64,
        property_address_full: Option<String> = "PropertyAddressFull" => string,
        property_address_house_number: Option<String> = "PropertyAddressHouseNumber" => string,
        property_address_street_direction: Option<String> = "PropertyAddressStreetDirection" => string,
        property_address_street_name: Option<String> = "PropertyAddressStreetName" => string,
        property_address_street_suffix: Option<String> = "PropertyAddressStreetSuffix" => string,
        property_address_street_post_direction: Option<String> = "PropertyAddressStreetPostDirection" => string,
        property_address_unit_prefix: Option<String> = "PropertyAddressUnitPrefix" => string,
        property_address_unit_value: Option<String> = "PropertyAddressUnitValue" => string,
        property_address_city: Option<String> = "PropertyAddressCity" => string,
        property_address_state: Option<String> = "PropertyAddressState" => string,
        property_address_zip: Option<String> = "PropertyAddressZIP" => string,
        property_address_zip4: Option<String> = "PropertyAddressZIP4" => string,
        property_address_crrt: Option<String> = "PropertyAddressCRRT" => string,
        property_use_group: Option<String> = "PropertyUseGroup" => string,
        property_use_standardized: Option<i32> = "PropertyUseStandardized" => i32,
        estimated_rental_value: Option<i32> = "EstimatedRentalValue" => i32,
        estimated_min_rental_value: Option<i32> = "EstimatedMinRentalValue" => i32,
        estimated_max_rental_value: Option<i32> = "EstimatedMaxRentalValue" => i32,
        valuation_date: Option<NaiveDate> = "ValuationDate" => date_iso,
        publication_date: Option<NaiveDate> = "PublicationDate" => date_iso,
    }
}
