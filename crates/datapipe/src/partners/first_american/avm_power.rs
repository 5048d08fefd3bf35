//! AVM Power valuation rows

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

crate::data_record! {
    pub struct AvmPower in "fa_df_avm_power" {
        site: "f4394794-7611-4aea-92d4-98c1f9fa8abd",
        required: ["Fips", "PropertyID", "APN"],
    } {
        fips: String = "Fips" => required_string,
        property_id: i64 = "PropertyID" => required_i64,
        apn: String = "APN" => required_string,
        situs_full_street_address: Option<String> = "SitusFullStreetAddress" => string,
        situs_house_nbr: Option<String> = "SitusHouseNbr" => string,
        situs_house_nbr_suffix: Option<String> = "SitusHouseNbrSuffix" => string,
        situs_direction_left: Option<String> = "SitusDirectionLeft" => string,
        situs_street: Option<String> = "SitusStreet" => string,
        situs_mode: Option<String> = "SitusMode" => string,
        situs_direction_right: Option<String> = "SitusDirectionRight" => string,
        situs_unit_type: Option<String> = "SitusUnitType" => string,
        situs_unit_nbr: Option<String> = "SitusUnitNbr" => string,
        situs_city: Option<String> = "SitusCity" => string,
        situs_state: Option<String> = "SitusState" => string,
        zip5: Option<String> = "SitusZIP5" => string,
        zip4: Option<String> = "SitusZIP4" => string,
        situs_carrier_code: Option<String> = "SitusCarrierCode" => string,
        final_value: Option<BigDecimal> = "FinalValue" => decimal,
        high_value: Option<BigDecimal> = "HighValue" => decimal,
        low_value: Option<BigDecimal> = "LowValue" => decimal,
        confidence_score: Option<f64> = "ConfidenceScore" => f64,
        standard_deviation: Option<f64> = "StandardDeviation" => f64,
        valuation_date: Option<NaiveDate> = "ValuationDate" => date_int,
        comp1_property_id: Option<i64> = "Comp1PropertyID" => i64,
        comp2_property_id: Option<i64> = "Comp2PropertyID" => i64,
        comp3_property_id: Option<i64> = "Comp3PropertyID" => i64,
        comp4_property_id: Option<i64> = "Comp4PropertyID" => i64,
        comp5_property_id: Option<i64> = "Comp5PropertyID" => i64,
        comp6_property_id: Option<i64> = "Comp6PropertyID" => i64,
        comp7_property_id: Option<i64> = "Comp7PropertyID" => i64,
    }
}
