//! MLS listing analytics rows (`LISTINGANALYTICSCOMPLETE`)

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

crate::data_record! {
    pub struct Listing in "ad_df_listing" {
        site: "cfd46633-9eb3-4102-9777-fab5df0301b7",
        required: ["ATTOM ID", "MLSRecordID", "MLSListingID", "StatusChangeDate"],
    } {
        attom_id: i64 = "ATTOM ID" => required_i64,
        mls_record_id: i64 = "MLSRecordID" => required_i64,
        mls_listing_id: i64 = "MLSListingID" => required_i64,
        status_change_date: NaiveDate = "StatusChangeDate" => required_date_us,
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
        situs_county: Option<String> = "SitusCounty" => string,
        township: Option<String> = "Township" => string,
        mls_listing_address: Option<String> = "MLSListingAddress" => string,
        mls_listing_city: Option<String> = "MLSListingCity" => string,
        mls_listing_state: Option<String> = "MLSListingState" => string,
        mls_listing_zip: Option<String> = "MLSListingZip" => string,
        mls_listing_county_fips: Option<String> = "MLSListingCountyFIPS" => string,
        mls_number: Option<String> = "MLSNumber" => string,
        mls_source: Option<String> = "MLSSource" => string,
        listing_status: Option<String> = "ListingStatus" => string,
        mls_sold_date: Option<NaiveDate> = "MLSSoldDate" => date_us,
        mls_sold_price: Option<i32> = "MLSSoldPrice" => i32,
        assessor_last_sale_date: Option<NaiveDate> = "AssessorLastSaleDate" => date_iso,
        assessor_last_sale_amount: Option<String> = "AssessorLastSaleAmount" => string,
        market_value: Option<i32> = "MarketValue" => i32,
        market_value_date: Option<NaiveDate> = "MarketValueDate" => date_us,
        avg_market_price_per_sq_ft: Option<i32> = "AvgMarketPricePerSqFt" => i32,
        listing_date: Option<NaiveDate> = "ListingDate" => date_us,
        latest_listing_price: Option<i32> = "LatestListingPrice" => i32,
        previous_listing_price: Option<i32> = "PreviousListingPrice" => i32,
        latest_price_change_date: Option<NaiveDate> = "LatestPriceChangeDate" => date_us,
        pending_date: Option<NaiveDate> = "PendingDate" => date_us,
        special_listing_conditions: Option<String> = "SpecialListingConditions" => string,
        original_listing_date: Option<NaiveDate> = "OriginalListingDate" => date_us,
        original_listing_price: Option<i32> = "OriginalListingPrice" => i32,
        lease_option: Option<String> = "LeaseOption" => string,
        lease_term: Option<String> = "LeaseTerm" => string,
        lease_includes: Option<String> = "LeaseIncludes" => string,
        concessions: Option<String> = "Concessions" => string,
        concessions_amount: Option<i32> = "ConcessionsAmount" => i32,
        concessions_comments: Option<String> = "ConcessionsComments" => string,
        contingency_date: Option<NaiveDate> = "ContingencyDate" => date_iso,
        contingency_description: Option<String> = "ContingencyDescription" => string,
        mls_property_type: Option<String> = "MLSPropertyType" => string,
        mls_property_sub_type: Option<String> = "MLSPropertySubType" => string,
        attom_property_type: Option<String> = "ATTOMPropertyType" => string,
        attom_property_sub_type: Option<String> = "ATTOMPropertySubType" => string,
        ownership_description: Option<String> = "OwnershipDescription" => string,
        latitude: Option<f64> = "Latitude" => f64,
        longitude: Option<f64> = "Longitude" => f64,
        apn_formatted: Option<String> = "APNFormatted" => string,
        legal_description: Option<String> = "LegalDescription" => string,
        legal_subdivision: Option<String> = "LegalSubdivision" => string,
        days_on_market: Option<i32> = "DaysOnMarket" => i32,
        cumulative_days_on_market: Option<i32> = "CumulativeDaysOnMarket" => i32,
        listing_agent_full_name: Option<String> = "ListingAgentFullName" => string,
        listing_agent_mls_id: Option<String> = "ListingAgentMLSID" => string,
        listing_agent_state_license: Option<String> = "ListingAgentStateLicense" => string,
        listing_agent_aor: Option<String> = "ListingAgentAOR" => string,
        listing_agent_preferred_phone: Option<String> = "ListingAgentPreferredPhone" => string,
        listing_agent_email: Option<String> = "ListingAgentEmail" => string,
        listing_office_name: Option<String> = "ListingOfficeName" => string,
        listing_office_mls_id: Option<String> = "ListingOfficeMlsId" => string,
        listing_office_aor: Option<String> = "ListingOfficeAOR" => string,
        listing_office_phone: Option<String> = "ListingOfficePhone" => string,
        listing_office_email: Option<String> = "ListingOfficeEmail" => string,
        listing_co_agent_full_name: Option<String> = "ListingCoAgentFullName" => string,
        listing_co_agent_mls_id: Option<String> = "ListingCoAgentMLSID" => string,
        listing_co_agent_state_license: Option<String> = "ListingCoAgentStateLicense" => string,
        listing_co_agent_aor: Option<String> = "ListingCoAgentAOR" => string,
        listing_co_agent_preferred_phone: Option<String> = "ListingCoAgentPreferredPhone" => string,
        listing_co_agent_email: Option<String> = "ListingCoAgentEmail" => string,
        listing_co_agent_office_name: Option<String> = "ListingCoAgentOfficeName" => string,
        listing_co_agent_office_mls_id: Option<String> = "ListingCoAgentOfficeMlsId" => string,
        listing_co_agent_office_aor: Option<String> = "ListingCoAgentOfficeAOR" => string,
        listing_co_agent_office_phone: Option<String> = "ListingCoAgentOfficePhone" => string,
        listing_co_agent_office_email: Option<String> = "ListingCoAgentOfficeEmail" => string,
        buyer_agent_full_name: Option<String> = "BuyerAgentFullName" => string,
        buyer_agent_mls_id: Option<String> = "BuyerAgentMLSID" => string,
        buyer_agent_state_license: Option<String> = "BuyerAgentStateLicense" => string,
        buyer_agent_aor: Option<String> = "BuyerAgentAOR" => string,
        buyer_agent_preferred_phone: Option<String> = "BuyerAgentPreferredPhone" => string,
        buyer_agent_email: Option<String> = "BuyerAgentEmail" => string,
        buyer_office_name: Option<String> = "BuyerOfficeName" => string,
        buyer_office_mls_id: Option<String> = "BuyerOfficeMlsId" => string,
        buyer_office_aor: Option<String> = "BuyerOfficeAOR" => string,
        buyer_office_phone: Option<String> = "BuyerOfficePhone" => string,
        buyer_office_email: Option<String> = "BuyerOfficeEmail" => string,
        buyer_co_agent_full_name: Option<String> = "BuyerCoAgentFullName" => string,
        buyer_co_agent_mls_id: Option<String> = "BuyerCoAgentMLSID" => string,
        buyer_co_agent_state_license: Option<String> = "BuyerCoAgentStateLicense" => string,
        buyer_co_agent_aor: Option<String> = "BuyerCoAgentAOR" => string,
        buyer_co_agent_preferred_phone: Option<String> = "BuyerCoAgentPreferredPhone" => string,
        buyer_co_agent_email: Option<String> = "BuyerCoAgentEmail" => string,
        buyer_co_agent_office_name: Option<String> = "BuyerCoAgentOfficeName" => string,
        buyer_co_agent_office_mls_id: Option<String> = "BuyerCoAgentOfficeMlsId" => string,
        buyer_co_agent_office_aor: Option<String> = "BuyerCoAgentOfficeAOR" => string,
        buyer_co_agent_office_phone: Option<String> = "BuyerCoAgentOfficePhone" => string,
        buyer_co_agent_office_email: Option<String> = "BuyerCoAgentOfficeEmail" => string,
        public_listing_remarks: Option<String> = "PublicListingRemarks" => string,
        home_warranty_yn: Option<bool> = "HomeWarrantyYN" => yn,
        tax_year_assessed: Option<i32> = "TaxYearAssessed" => i32,
        tax_assessed_value_total: Option<i32> = "TaxAssessedValueTotal" => i32,
        tax_amount: Option<i32> = "TaxAmount" => i32,
        tax_annual_other: Option<i32> = "TaxAnnualOther" => i32,
        owner_name: Option<String> = "OwnerName" => string,
        owner_vesting: Option<String> = "OwnerVesting" => string,
        year_built: Option<i32> = "YearBuilt" => i32,
        year_built_effective: Option<i32> = "YearBuiltEffective" => i32,
        year_built_source: Option<String> = "YearBuiltSource" => string,
        new_construction_yn: Option<bool> = "NewConstructionYN" => yn,
        builder_name: Option<String> = "BuilderName" => string,
        additional_parcels_yn: Option<bool> = "AdditionalParcelsYN" => yn,
        number_of_lots: Option<i32> = "NumberOfLots" => i32,
        lot_size_square_feet: Option<f64> = "LotSizeSquareFeet" => f64,
        lot_size_acres: Option<f64> = "LotSizeAcres" => f64,
        lot_size_source: Option<String> = "LotSizeSource" => string,
        lot_dimensions: Option<String> = "LotDimensions" => string,
        lot_feature_list: Option<String> = "LotFeatureList" => string,
        frontage_length: Option<String> = "FrontageLength" => string,
        frontage_type: Option<String> = "FrontageType" => string,
        frontage_road_type: Option<String> = "FrontageRoadType" => string,
        living_area_square_feet: Option<i32> = "LivingAreaSquareFeet" => i32,
        living_area_source: Option<String> = "LivingAreaSource" => string,
        levels: Option<String> = "Levels" => string,
        stories: Option<BigDecimal> = "Stories" => decimal,
        building_stories_total: Option<BigDecimal> = "BuildingStoriesTotal" => decimal,
        building_keywords: Option<String> = "BuildingKeywords" => string,
        building_area_total: Option<i32> = "BuildingAreaTotal" => i32,
        number_of_units_total: Option<i32> = "NumberOfUnitsTotal" => i32_from_f64,
        number_of_buildings: Option<i32> = "NumberOfBuildings" => i32,
        property_attached_yn: Option<bool> = "PropertyAttachedYN" => yn,
        other_structures: Option<String> = "OtherStructures" => string,
        rooms_total: Option<i32> = "RoomsTotal" => i32,
        bedrooms_total: Option<i32> = "BedroomsTotal" => i32,
        bathrooms_full: Option<BigDecimal> = "BathroomsFull" => decimal,
        bathrooms_half: Option<i32> = "BathroomsHalf" => i32,
        bathrooms_quarter: Option<i32> = "BathroomsQuarter" => i32,
        bathrooms_three_quarters: Option<i32> = "BathroomsThreeQuarters" => i32,
        basement_features: Option<String> = "BasementFeatures" => string,
        below_grade_square_feet: Option<i32> = "BelowGradeSquareFeet" => i32,
        basement_total_sq_ft: Option<i32> = "BasementTotalSqFt" => i32,
        basement_finished_sq_ft: Option<i32> = "BasementFinishedSqFt" => i32,
        basement_unfinished_sq_ft: Option<i32> = "BasementUnfinishedSqFt" => i32,
        property_condition: Option<String> = "PropertyCondition" => string,
        repairs_yn: Option<bool> = "RepairsYN" => yn,
        repairs_description: Option<String> = "RepairsDescription" => string,
        disclosures: Option<String> = "Disclosures" => string,
        construction_materials: Option<String> = "ConstructionMaterials" => string,
        garage_yn: Option<bool> = "GarageYN" => yn,
        attached_garage_yn: Option<bool> = "AttachedGarageYN" => yn,
        garage_spaces: Option<BigDecimal> = "GarageSpaces" => decimal,
        carport_yn: Option<bool> = "CarportYN" => yn,
        carport_spaces: Option<f64> = "CarportSpaces" => f64,
        parking_features: Option<String> = "ParkingFeatures" => string,
        parking_other: Option<String> = "ParkingOther" => string,
        open_parking_spaces: Option<f64> = "OpenParkingSpaces" => f64,
        parking_total: Option<f64> = "ParkingTotal" => f64,
        pool_private_yn: Option<bool> = "PoolPrivateYN" => yn,
        pool_features: Option<String> = "PoolFeatures" => string,
        occupancy: Option<String> = "Occupancy" => string,
        view_yn: Option<bool> = "ViewYN" => yn,
        view_col: Option<String> = "View" => string,
        topography: Option<String> = "Topography" => string,
        heating_yn: Option<bool> = "HeatingYN" => yn,
        heating_features: Option<String> = "HeatingFeatures" => string,
        cooling_yn: Option<bool> = "CoolingYN" => yn,
        cooling: Option<String> = "Cooling" => string,
        fireplace_yn: Option<bool> = "FireplaceYN" => yn,
        fireplace: Option<String> = "Fireplace" => string,
        fireplace_number: Option<f64> = "FireplaceNumber" => f64,
        foundation_features: Option<String> = "FoundationFeatures" => string,
        roof: Option<String> = "Roof" => string,
        architectural_style_features: Option<String> = "ArchitecturalStyleFeatures" => string,
        patio_and_porch_features: Option<String> = "PatioAndPorchFeatures" => string,
        utilities: Option<String> = "Utilities" => string,
        electric_included: Option<bool> = "ElectricIncluded" => yn,
        electric_description: Option<String> = "ElectricDescription" => string,
        water_included: Option<bool> = "WaterIncluded" => yn,
        water_source: Option<String> = "WaterSource" => string,
        sewer: Option<String> = "Sewer" => string,
        gas_description: Option<String> = "GasDescription" => string,
        other_equipment_included: Option<String> = "OtherEquipmentIncluded" => string,
        laundry_features: Option<String> = "LaundryFeatures" => string,
        appliances: Option<String> = "Appliances" => string,
        interior_features: Option<String> = "InteriorFeatures" => string,
        exterior_features: Option<String> = "ExteriorFeatures" => string,
        fencing_features: Option<String> = "FencingFeatures" => string,
        pets_allowed: Option<String> = "PetsAllowed" => string,
        horse_zoning_yn: Option<bool> = "HorseZoningYN" => yn,
        senior_community_yn: Option<bool> = "SeniorCommunityYN" => yn,
        waterbody_name: Option<String> = "WaterbodyName" => string,
        waterfront_yn: Option<bool> = "WaterfrontYN" => yn,
        waterfront_features: Option<String> = "WaterfrontFeatures" => string,
        zoning_code: Option<String> = "ZoningCode" => string,
        zoning_description: Option<String> = "ZoningDescription" => string,
        current_use: Option<String> = "CurrentUse" => string,
        possible_use: Option<String> = "PossibleUse" => string,
        association_yn: Option<bool> = "AssociationYN" => yn,
        association1_name: Option<String> = "Association1Name" => string,
        association1_phone: Option<String> = "Association1Phone" => string,
        association1_fee: Option<i32> = "Association1Fee" => i32,
        association1_fee_frequency: Option<String> = "Association1FeeFrequency" => string,
        association2_name: Option<String> = "Association2Name" => string,
        association2_phone: Option<String> = "Association2Phone" => string,
        association2_fee: Option<i32> = "Association2Fee" => i32,
        association2_fee_frequency: Option<String> = "Association2FeeFrequency" => string,
        association_fee_includes: Option<String> = "AssociationFeeIncludes" => string,
        association_amenities: Option<String> = "AssociationAmenities" => string,
        school_elementary: Option<String> = "SchoolElementary" => string,
        school_elementary_district: Option<String> = "SchoolElementaryDistrict" => string,
        school_middle: Option<String> = "SchoolMiddle" => string,
        school_middle_district: Option<String> = "SchoolMiddleDistrict" => string,
        school_high: Option<String> = "SchoolHigh" => string,
        school_high_district: Option<String> = "SchoolHighDistrict" => string,
        green_verification_yn: Option<bool> = "GreenVerificationYN" => yn,
        green_building_verification_type: Option<String> = "GreenBuildingVerificationType" => string,
        green_energy_efficient: Option<String> = "GreenEnergyEfficient" => string,
        green_energy_generation: Option<String> = "GreenEnergyGeneration" => string,
        green_indoor_air_quality: Option<String> = "GreenIndoorAirQuality" => string,
        green_location: Option<String> = "GreenLocation" => string,
        green_sustainability: Option<String> = "GreenSustainability" => string,
        green_water_conservation: Option<String> = "GreenWaterConservation" => string,
        land_lease_yn: Option<bool> = "LandLeaseYN" => yn,
        land_lease_amount: Option<BigDecimal> = "LandLeaseAmount" => decimal,
        land_lease_amount_frequency: Option<String> = "LandLeaseAmountFrequency" => string,
        land_lease_expiration_date: Option<NaiveDate> = "LandLeaseExpirationDate" => date_us,
        cap_rate: Option<BigDecimal> = "CapRate" => decimal,
        gross_income: Option<BigDecimal> = "GrossIncome" => decimal,
        income_includes: Option<String> = "IncomeIncludes" => string,
        gross_scheduled_income: Option<BigDecimal> = "GrossScheduledIncome" => decimal,
        net_operating_income: Option<BigDecimal> = "NetOperatingIncome" => decimal,
        total_actual_rent: Option<BigDecimal> = "TotalActualRent" => decimal,
        existing_lease_type: Option<String> = "ExistingLeaseType" => string,
        financial_data_source: Option<String> = "FinancialDataSource" => string,
        rent_control_yn: Option<bool> = "RentControlYN" => yn,
        unit_type_description: Option<String> = "UnitTypeDescription" => string,
        unit_type_furnished: Option<String> = "UnitTypeFurnished" => string,
        number_of_units_leased: Option<f64> = "NumberOfUnitsLeased" => f64,
        number_of_units_mo_mo: Option<f64> = "NumberOfUnitsMoMo" => f64,
        number_of_units_vacant: Option<f64> = "NumberOfUnitsVacant" => f64,
        vacancy_allowance: Option<f64> = "VacancyAllowance" => f64,
        vacancy_allowance_rate: Option<f64> = "VacancyAllowanceRate" => f64,
        operating_expense: Option<BigDecimal> = "OperatingExpense" => decimal,
        cable_tv_expense: Option<BigDecimal> = "CableTvExpense" => decimal,
        electric_expense: Option<BigDecimal> = "ElectricExpense" => decimal,
        fuel_expense: Option<BigDecimal> = "FuelExpense" => decimal,
        furniture_replacement_expense: Option<BigDecimal> = "FurnitureReplacementExpense" => decimal,
        gardener_expense: Option<BigDecimal> = "GardenerExpense" => decimal,
        insurance_expense: Option<BigDecimal> = "InsuranceExpense" => decimal,
        operating_expense_includes: Option<String> = "OperatingExpenseIncludes" => string,
        licenses_expense: Option<BigDecimal> = "LicensesExpense" => decimal,
        maintenance_expense: Option<BigDecimal> = "MaintenanceExpense" => decimal,
        manager_expense: Option<BigDecimal> = "ManagerExpense" => decimal,
        new_taxes_expense: Option<BigDecimal> = "NewTaxesExpense" => decimal,
        other_expense: Option<BigDecimal> = "OtherExpense" => decimal,
        pest_control_expense: Option<BigDecimal> = "PestControlExpense" => decimal,
        pool_expense: Option<BigDecimal> = "PoolExpense" => decimal,
        professional_management_expense: Option<BigDecimal> = "ProfessionalManagementExpense" => decimal,
        supplies_expense: Option<BigDecimal> = "SuppliesExpense" => decimal,
        trash_expense: Option<BigDecimal> = "TrashExpense" => decimal,
        water_sewer_expense: Option<BigDecimal> = "WaterSewerExpense" => decimal,
        workmans_compensation_expense: Option<BigDecimal> = "WorkmansCompensationExpense" => decimal,
        owner_pays: Option<String> = "OwnerPays" => string,
        tenant_pays: Option<String> = "TenantPays" => string,
        listing_marketing_url: Option<String> = "ListingMarketingURL" => string,
        photos_count: Option<i32> = "PhotosCount" => i32,
        photo_key: Option<String> = "PhotoKey" => string,
        photo_url_prefix: Option<String> = "PhotoURLPrefix" => string,
        current_status: Option<bool> = "CurrentStatus" => yn,
    }
}

/// Listing file schema. `V20250417` added `CurrentStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingVersion {
    Original,
    V20250417,
}

impl ListingVersion {
    fn has_current_status(self) -> bool {
        matches!(self, ListingVersion::V20250417)
    }
}

impl Listing {
    const CURRENT_STATUS: &'static str = "current_status";

    pub fn versioned_columns(version: ListingVersion) -> Vec<&'static str> {
        let mut columns = Self::columns();
        if !version.has_current_status() {
            columns.retain(|c| *c != Self::CURRENT_STATUS);
        }
        columns
    }

    /// Values aligned with [`Listing::versioned_columns`].
    pub fn versioned_values(&mut self, version: ListingVersion) -> Vec<crate::records::SqlValue> {
        let mut values = self.sql_values();
        if !version.has_current_status() {
            // `current_status` is the last declared column.
            values.pop();
        }
        values
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::records::{Headers, SqlValue};

    fn parse(line: &str) -> Listing {
        let headers = Headers::parse(
            "ATTOM ID\tMLSRecordID\tMLSListingID\tStatusChangeDate\tCurrentStatus",
            '\t',
        );
        let fields: Vec<&str> = line.split('\t').collect();
        Listing::parse(&headers, &fields).unwrap()
    }

    #[test]
    fn test_current_status_only_in_new_schema() {
        let original = Listing::versioned_columns(ListingVersion::Original);
        let current = Listing::versioned_columns(ListingVersion::V20250417);
        assert_eq!(current.len(), original.len() + 1);
        assert_eq!(current.last(), Some(&"current_status"));
        assert!(!original.contains(&"current_status"));

        let mut record = parse("1\t2\t3\t04/17/2025\tY");
        assert_eq!(record.current_status, Some(true));
        assert_eq!(record.status_change_date, NaiveDate::from_ymd_opt(2025, 4, 17).unwrap());

        let values = record.versioned_values(ListingVersion::V20250417);
        assert_eq!(values.len(), current.len());
        assert_eq!(values.last(), Some(&SqlValue::Bool(Some(true))));
        assert_eq!(record.versioned_values(ListingVersion::Original).len(), original.len());
    }

    #[test]
    fn test_required_listing_fields() {
        let headers = Headers::parse("ATTOM ID\tMLSRecordID\tMLSListingID\tStatusChangeDate", '\t');
        assert!(Listing::parse(&headers, &["1", "", "3", "04/17/2025"]).is_err());
        assert!(Listing::parse(&headers, &["1", "2", "3", ""]).is_err());
    }
}
