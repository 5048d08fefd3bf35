//! Assessor rows from the annual and update directories

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use futures::future::BoxFuture;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::uuid;

use datapipe_common::{Code, Error, ErrorContext, Result, ResultExt};

use crate::records::{push_insert, BatchOutcome, DataRecord};
use crate::request::Request;

crate::data_record! {
    pub struct Assessor in "fa_df_assessor" {
        site: "7d525dc3-80c2-4c8b-bc6c-db291aa2cd83",
        required: ["FIPS", "PropertyID", "APN"],
    } {
        fips: String = "FIPS" => required_string,
        property_id: i64 = "PropertyID" => required_i64,
        apn: String = "APN" => required_string,
        apn_seq_nbr: Option<String> = "APNSeqNbr" => string,
        old_apn: Option<String> = "OldAPN" => string,
        old_apn_indicator: Option<String> = "OldApnIndicator" => string,
        tax_account_number: Option<String> = "TaxAccountNumber" => string,
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
        situs_zip5: Option<String> = "SitusZIP5" => string,
        situs_zip4: Option<String> = "SitusZIP4" => string,
        situs_carrier_code: Option<String> = "SitusCarrierCode" => string,
        situs_latitude: Option<f64> = "SitusLatitude" => f64,
        situs_longitude: Option<f64> = "SitusLongitude" => f64,
        situs_geo_status_code: Option<String> = "SitusGeoStatusCode" => string,
        property_class_id: Option<String> = "PropertyClassID" => string,
        land_use_code: Option<String> = "LandUseCode" => string,
        state_land_use_code: Option<String> = "StateLandUseCode" => string,
        county_land_use_code: Option<String> = "CountyLandUseCode" => string,
        zoning: Option<String> = "Zoning" => string,
        situs_census_tract: Option<String> = "SitusCensusTract" => string,
        situs_census_block: Option<i32> = "SitusCensusBlock" => i32,
        mobile_home_ind: Option<bool> = "MobileHomeInd" => yn_bool,
        timeshare_code: Option<bool> = "TimeshareCode" => yn_bool,
        school_district_name: Option<String> = "SchoolDistrictName" => string,
        lot_size_frontage_feet: Option<String> = "LotSizeFrontageFeet" => string,
        lot_size_depth_feet: Option<i32> = "LotSizeDepthFeet" => i32,
        lot_size_acres: Option<String> = "LotSizeAcres" => string,
        lot_size_sq_ft: Option<i32> = "LotSizeSqFt" => i32,
        owner1corp_ind: Option<bool> = "Owner1CorpInd" => yn_bool,
        owner1last_name: Option<String> = "Owner1LastName" => string,
        owner1first_name: Option<String> = "Owner1FirstName" => string,
        owner1middle_name: Option<String> = "Owner1MiddleName" => string,
        owner1suffix: Option<String> = "Owner1Suffix" => string,
        owner2corp_ind: Option<bool> = "Owner2CorpInd" => yn_bool,
        owner2last_name: Option<String> = "Owner2LastName" => string,
        owner2first_name: Option<String> = "Owner2FirstName" => string,
        owner2middle_name: Option<String> = "Owner2MiddleName" => string,
        owner2suffix: Option<String> = "Owner2Suffix" => string,
        owner_name1full: Option<String> = "OwnerNAME1FULL" => string,
        owner_name2full: Option<String> = "OwnerNAME2FULL" => string,
        owner_occupied: Option<bool> = "OwnerOccupied" => yn_bool,
        owner1ownership_rights: Option<String> = "Owner1OwnershipRights" => string,
        mailing_full_street_address: Option<String> = "MailingFullStreetAddress" => string,
        mailing_house_nbr: Option<String> = "MailingHouseNbr" => string,
        mailing_house_nbr_suffix: Option<String> = "MailingHouseNbrSuffix" => string,
        mailing_direction_left: Option<String> = "MailingDirectionLeft" => string,
        mailing_street: Option<String> = "MailingStreet" => string,
        mailing_mode: Option<String> = "MailingMode" => string,
        mailing_direction_right: Option<String> = "MailingDirectionRight" => string,
        mailing_unit_type: Option<String> = "MailingUnitType" => string,
        mailing_unit_nbr: Option<String> = "MailingUnitNbr" => string,
        mailing_city: Option<String> = "MailingCity" => string,
        mailing_state: Option<String> = "MailingState" => string,
        mailing_zip5: Option<String> = "MailingZIP5" => string,
        mailing_zip4: Option<String> = "MailingZIP4" => string,
        mailing_carrier_code: Option<String> = "MailingCarrierCode" => string,
        mailing_opt_out: Option<bool> = "MailingOptOut" => yn_bool,
        mailing_co_name: Option<String> = "MailingCOName" => string,
        mailing_foreign_address_ind: Option<String> = "MailingForeignAddressInd" => string,
        assd_total_value: Option<i32> = "AssdTotalValue" => i32,
        assd_land_value: Option<i32> = "AssdLandValue" => i32,
        assd_improvement_value: Option<i32> = "AssdImprovementValue" => i32,
        market_total_value: Option<i32> = "MarketTotalValue" => i32,
        market_value_land: Option<i32> = "MarketValueLand" => i32,
        market_value_improvement: Option<i32> = "MarketValueImprovement" => i32,
        tax_amt: Option<i64> = "TaxAmt" => i64,
        tax_year: Option<i32> = "TaxYear" => i32,
        tax_deliquent_year: Option<i32> = "TaxDeliquentYear" => i32,
        market_year: Option<i32> = "MarketYear" => i32,
        assd_year: Option<i32> = "AssdYear" => i32,
        tax_rate_code_area: Option<String> = "TaxRateCodeArea" => string,
        school_tax_district1code: Option<String> = "SchoolTaxDistrict1Code" => string,
        school_tax_district2code: Option<String> = "SchoolTaxDistrict2Code" => string,
        school_tax_district3code: Option<String> = "SchoolTaxDistrict3Code" => string,
        homestead_ind: Option<bool> = "HomesteadInd" => yn_bool,
        veteran_ind: Option<bool> = "VeteranInd" => yn_bool,
        disabled_ind: Option<bool> = "DisabledInd" => yn_bool,
        widow_ind: Option<bool> = "WidowInd" => yn_bool,
        senior_ind: Option<bool> = "SeniorInd" => yn_bool,
        school_college_ind: Option<bool> = "SchoolCollegeInd" => yn_bool,
        religious_ind: Option<bool> = "ReligiousInd" => yn_bool,
        welfare_ind: Option<bool> = "WelfareInd" => yn_bool,
        public_utility_ind: Option<bool> = "PublicUtilityInd" => yn_bool,
        cemetery_ind: Option<bool> = "CemeteryInd" => yn_bool,
        hospital_ind: Option<bool> = "HospitalInd" => yn_bool,
        library_ind: Option<bool> = "LibraryInd" => yn_bool,
        building_area: Option<BigDecimal> = "BuildingArea" => decimal,
        building_area_ind: Option<String> = "BuildingAreaInd" => string,
        sum_building_sq_ft: Option<BigDecimal> = "SumBuildingSqFt" => decimal,
        sum_living_area_sq_ft: Option<i32> = "SumLivingAreaSqFt" => i32,
        sum_ground_floor_sq_ft: Option<i32> = "SumGroundFloorSqFt" => i32,
        sum_gross_area_sq_ft: Option<i32> = "SumGrossAreaSqFt" => i32,
        sum_adj_area_sq_ft: Option<i32> = "SumAdjAreaSqFt" => i32,
        attic_sq_ft: Option<i32> = "AtticSqFt" => i32,
        attic_unfinished_sq_ft: Option<i32> = "AtticUnfinishedSqFt" => i32,
        attic_finished_sq_ft: Option<i32> = "AtticFinishedSqFt" => i32,
        sum_basement_sq_ft: Option<i32> = "SumBasementSqFt" => i32,
        basement_unfinished_sq_ft: Option<i32> = "BasementUnfinishedSqFt" => i32,
        basement_finished_sq_ft: Option<i32> = "BasementFinishedSqFt" => i32,
        sum_garage_sq_ft: Option<i32> = "SumGarageSqFt" => i32,
        garage_un_finished_sq_ft: Option<i32> = "GarageUnFinishedSqFt" => i32,
        garage_finished_sq_ft: Option<i32> = "GarageFinishedSqFt" => i32,
        year_built: Option<i32> = "YearBuilt" => i32,
        effective_year_built: Option<i32> = "EffectiveYearBuilt" => i32,
        bedrooms: Option<BigDecimal> = "Bedrooms" => decimal,
        total_rooms: Option<BigDecimal> = "TotalRooms" => decimal,
        bath_total_calc: Option<BigDecimal> = "BathTotalCalc" => decimal,
        bath_full: Option<BigDecimal> = "BathFull" => decimal,
        baths_partial_nbr: Option<BigDecimal> = "BathsPartialNbr" => decimal,
        bath_fixtures_nbr: Option<BigDecimal> = "BathFixturesNbr" => decimal,
        amenities: Option<String> = "Amenities" => string,
        air_conditioning_code: Option<i32> = "AirConditioningCode" => i32,
        basement_code: Option<i32> = "BasementCode" => i32,
        building_class_code: Option<i32> = "BuildingClassCode" => i32,
        building_condition_code: Option<i32> = "BuildingConditionCode" => i32,
        construction_type_code: Option<i32> = "ConstructionTypeCode" => i32,
        deck_ind: Option<bool> = "DeckInd" => yn_bool,
        exterior_walls_code: Option<i32> = "ExteriorWallsCode" => i32,
        interior_walls_code: Option<i32> = "InteriorWallsCode" => i32,
        fireplace_code: Option<i32> = "FireplaceCode" => i32,
        floor_cover_code: Option<String> = "FloorCoverCode" => string,
        garage: Option<i32> = "Garage" => i32,
        heat_code: Option<i32> = "HeatCode" => i32,
        heating_fuel_type_code: Option<i32> = "HeatingFuelTypeCode" => i32,
        site_influence_code: Option<String> = "SiteInfluenceCode" => string,
        garage_parking_nbr: Option<i32> = "GarageParkingNbr" => i32,
        driveway_code: Option<String> = "DrivewayCode" => string,
        other_rooms: Option<String> = "OtherRooms" => string,
        patio_code: Option<i32> = "PatioCode" => i32,
        pool_code: Option<i32> = "PoolCode" => i32,
        porch_code: Option<i32> = "PorchCode" => i32,
        building_quality_code: Option<i32> = "BuildingQualityCode" => i32,
        roof_cover_code: Option<i32> = "RoofCoverCode" => i32,
        roof_type_code: Option<i32> = "RoofTypeCode" => i32,
        sewer_code: Option<i32> = "SewerCode" => i32,
        stories_nbr_code: Option<i32> = "StoriesNbrCode" => i32,
        style_code: Option<i32> = "StyleCode" => i32,
        sum_residential_units: Option<BigDecimal> = "SumResidentialUnits" => decimal,
        sum_buildings_nbr: Option<BigDecimal> = "SumBuildingsNbr" => decimal,
        sum_commercial_units: Option<BigDecimal> = "SumCommercialUnits" => decimal,
        topography_code: Option<String> = "TopographyCode" => string,
        water_code: Option<i32> = "WaterCode" => i32,
        lot_code: Option<String> = "LotCode" => string,
        lot_nbr: Option<String> = "LotNbr" => string,
        land_lot: Option<String> = "LandLot" => string,
        block: Option<String> = "Block" => string,
        section: Option<String> = "Section" => string,
        district: Option<String> = "District" => string,
        legal_unit: Option<String> = "LegalUnit" => string,
        municipality: Option<String> = "Municipality" => string,
        subdivision_name: Option<String> = "SubdivisionName" => string,
        subdivision_phase_nbr: Option<String> = "SubdivisionPhaseNbr" => string,
        subdivision_tract_nbr: Option<String> = "SubdivisionTractNbr" => string,
        meridian: Option<String> = "Meridian" => string,
        assessors_map_ref: Option<String> = "AssessorsMapRef" => string,
        legal_description: Option<String> = "LegalDescription" => string,
        current_sale_transaction_id: Option<i64> = "CurrentSaleTransactionId" => i64,
        current_sale_doc_nbr: Option<String> = "CurrentSaleDocNbr" => string,
        current_sale_book: Option<String> = "CurrentSaleBook" => string,
        current_sale_page: Option<String> = "CurrentSalePage" => string,
        current_sale_recording_date: Option<NaiveDate> = "CurrentSaleRecordingDate" => date_int,
        current_sale_contract_date: Option<NaiveDate> = "CurrentSaleContractDate" => date_int,
        current_sale_document_type: Option<String> = "CurrentSaleDocumentType" => string,
        current_sales_price: Option<i32> = "CurrentSalesPrice" => i32,
        current_sales_price_code: Option<i32> = "CurrentSalesPriceCode" => i32,
        current_sale_buyer1full_name: Option<String> = "CurrentSaleBuyer1FullName" => string,
        current_sale_buyer2full_name: Option<String> = "CurrentSaleBuyer2FullName" => string,
        current_sale_seller1full_name: Option<String> = "CurrentSaleSeller1FullName" => string,
        current_sale_seller2full_name: Option<String> = "CurrentSaleSeller2FullName" => string,
        concurrent_mtg1doc_nbr: Option<String> = "ConcurrentMtg1DocNbr" => string,
        concurrent_mtg1book: Option<String> = "ConcurrentMtg1Book" => string,
        concurrent_mtg1page: Option<String> = "ConcurrentMtg1Page" => string,
        concurrent_mtg1recording_date: Option<NaiveDate> = "ConcurrentMtg1RecordingDate" => date_int,
        concurrent_mtg1loan_amt: Option<i32> = "ConcurrentMtg1LoanAmt" => i32,
        concurrent_mtg1lender: Option<String> = "ConcurrentMtg1Lender" => string,
        concurrent_mtg1term: Option<String> = "ConcurrentMtg1Term" => string,
        concurrent_mtg1interest_rate: Option<BigDecimal> = "ConcurrentMtg1InterestRate" => decimal,
        concurrent_mtg1loan_due_date: Option<NaiveDate> = "ConcurrentMtg1LoanDueDate" => date_int,
        concurrent_mtg1loan_type: Option<i32> = "ConcurrentMtg1LoanType" => i32,
        concurrent_mtg1type_financing: Option<String> = "ConcurrentMtg1TypeFinancing" => string,
        concurrent_mtg2doc_nbr: Option<String> = "ConcurrentMtg2DocNbr" => string,
        concurrent_mtg2book: Option<String> = "ConcurrentMtg2Book" => string,
        concurrent_mtg2page: Option<String> = "ConcurrentMtg2Page" => string,
        concurrent_mtg2recording_date: Option<NaiveDate> = "ConcurrentMtg2RecordingDate" => date_int,
        concurrent_mtg2loan_amt: Option<i32> = "ConcurrentMtg2LoanAmt" => i32,
        concurrent_mtg2lender: Option<String> = "ConcurrentMtg2Lender" => string,
        concurrent_mtg2term: Option<String> = "ConcurrentMtg2Term" => string,
        concurrent_mtg2interest_rate: Option<BigDecimal> = "ConcurrentMtg2InterestRate" => decimal,
        concurrent_mtg2loan_due_date: Option<NaiveDate> = "ConcurrentMtg2LoanDueDate" => date_int,
        concurrent_mtg2loan_type: Option<i32> = "ConcurrentMtg2LoanType" => i32,
        concurrent_mtg2typefinancing: Option<String> = "ConcurrentMtg2Typefinancing" => string,
        prev_sale_transaction_id: Option<i64> = "PrevSaleTransactionId" => i64,
        prev_sale_doc_nbr: Option<String> = "PrevSaleDocNbr" => string,
        prev_sale_book: Option<String> = "PrevSaleBook" => string,
        prev_sale_page: Option<String> = "PrevSalePage" => string,
        prev_sale_recording_date: Option<NaiveDate> = "PrevSaleRecordingDate" => date_int,
        prev_sale_contract_date: Option<NaiveDate> = "PrevSaleContractDate" => date_int,
        prev_sale_document_type: Option<String> = "PrevSaleDocumentType" => string,
        prev_sales_price: Option<i32> = "PrevSalesPrice" => i32,
        prev_sales_price_code: Option<i32> = "PrevSalesPriceCode" => i32,
        prev_sale_buyer1full_name: Option<String> = "PrevSaleBuyer1FullName" => string,
        prev_sale_buyer2full_name: Option<String> = "PrevSaleBuyer2FullName" => string,
        prev_sale_seller1full_name: Option<String> = "PrevSaleSeller1FullName" => string,
        prev_sale_seller2full_name: Option<String> = "PrevSaleSeller2FullName" => string,
        prev_mtg1doc_nbr: Option<String> = "PrevMtg1DocNbr" => string,
        prev_mtg1book: Option<String> = "PrevMtg1Book" => string,
        prev_mtg1page: Option<String> = "PrevMtg1Page" => string,
        prev_mtg1recording_date: Option<NaiveDate> = "PrevMtg1RecordingDate" => date_int,
        prev_mtg1loan_amt: Option<i32> = "PrevMtg1LoanAmt" => i32,
        prev_mtg1lender: Option<String> = "PrevMtg1Lender" => string,
        prev_mtg1term: Option<i32> = "PrevMtg1Term" => i32,
        prev_mtg1interest_rate: Option<BigDecimal> = "PrevMtg1InterestRate" => decimal,
        prev_mtg1loan_due_date: Option<NaiveDate> = "PrevMtg1LoanDueDate" => date_int,
        prev_mtg1loan_type: Option<i32> = "PrevMtg1LoanType" => i32,
        prev_mtg1type_financing: Option<String> = "PrevMtg1TypeFinancing" => string,
        total_open_lien_nbr: Option<i32> = "TotalOpenLienNbr" => i32,
        total_open_lien_amt: Option<i32> = "TotalOpenLienAmt" => i32,
        mtg1transaction_id: Option<i64> = "Mtg1TransactionId" => i64,
        mtg1recording_date: Option<NaiveDate> = "Mtg1RecordingDate" => date_int,
        mtg1loan_amt: Option<i32> = "Mtg1LoanAmt" => i32,
        mtg1lender: Option<String> = "Mtg1Lender" => string,
        mtg1private_lender: Option<bool> = "Mtg1PrivateLender" => yn_bool,
        mtg1term: Option<String> = "Mtg1Term" => string,
        mtg1loan_due_date: Option<NaiveDate> = "Mtg1LoanDueDate" => date_int,
        mtg1adj_rider: Option<bool> = "Mtg1AdjRider" => yn_bool,
        mtg1loan_type: Option<i32> = "Mtg1LoanType" => i32,
        mtg1type_financing: Option<String> = "Mtg1TypeFinancing" => string,
        mtg1lien_position: Option<i32> = "Mtg1LienPosition" => i32,
        mtg2transaction_id: Option<i64> = "Mtg2TransactionId" => i64,
        mtg2recording_date: Option<NaiveDate> = "Mtg2RecordingDate" => date_int,
        mtg2loan_amt: Option<i32> = "Mtg2LoanAmt" => i32,
        mtg2lender: Option<String> = "Mtg2Lender" => string,
        mtg2private_lender: Option<bool> = "Mtg2PrivateLender" => yn_bool,
        mtg2term: Option<String> = "Mtg2Term" => string,
        mtg2loan_due_date: Option<NaiveDate> = "Mtg2LoanDueDate" => date_int,
        mtg2adj_rider: Option<bool> = "Mtg2AdjRider" => yn_bool,
        mtg2loan_type: Option<i32> = "Mtg2LoanType" => i32,
        mtg2type_financing: Option<String> = "Mtg2TypeFinancing" => string,
        mtg2lien_position: Option<i32> = "Mtg2LienPosition" => i32,
        mtg3transaction_id: Option<i64> = "Mtg3TransactionId" => i64,
        mtg3recording_date: Option<NaiveDate> = "Mtg3RecordingDate" => date_int,
        mtg3loan_amt: Option<i32> = "Mtg3LoanAmt" => i32,
        mtg3lender: Option<String> = "Mtg3Lender" => string,
        mtg3private_lender: Option<bool> = "Mtg3PrivateLender" => yn_bool,
        mtg3term: Option<i32> = "Mtg3Term" => i32,
        mtg3loan_due_date: Option<NaiveDate> = "Mtg3LoanDueDate" => date_int,
        mtg3adj_rider: Option<bool> = "Mtg3AdjRider" => yn_bool,
        mtg3loan_type: Option<i32> = "Mtg3LoanType" => i32,
        mtg3type_financing: Option<String> = "Mtg3TypeFinancing" => string,
        mtg3lien_position: Option<i32> = "Mtg3LienPosition" => i32,
        mtg4transaction_id: Option<i64> = "Mtg4TransactionId" => i64,
        mtg4recording_date: Option<NaiveDate> = "Mtg4RecordingDate" => date_int,
        mtg4loan_amt: Option<i32> = "Mtg4LoanAmt" => i32,
        mtg4lender: Option<String> = "Mtg4Lender" => string,
        mtg4private_lender: Option<bool> = "Mtg4PrivateLender" => yn_bool,
        mtg4term: Option<i32> = "Mtg4Term" => i32,
        mtg4loan_due_date: Option<NaiveDate> = "Mtg4LoanDueDate" => date_int,
        mtg4adj_rider: Option<bool> = "Mtg4AdjRider" => yn_bool,
        mtg4loan_type: Option<i32> = "Mtg4LoanType" => i32,
        mtg4type_financing: Option<String> = "Mtg4TypeFinancing" => string,
        mtg4lien_position: Option<i32> = "Mtg4LienPosition" => i32,
        fa_time_stamp: Option<NaiveDate> = "FATimeStamp" => date_int,
        fa_record_type: Option<String> = "FARecordType" => string,
    }
}

/// Archive of replaced assessor rows
pub const HISTORY_TABLE: &str = "fa_assessor_history";

impl Assessor {
    /// `FARecordType` `D` marks a property as deleted.
    pub fn is_delete(&self) -> bool {
        self.fa_record_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("D"))
    }
}

/// Apply one batch of annual or update rows. Delete rows soft delete the
/// current row of their property; every other row moves the current row to
/// `fa_assessor_history` and inserts itself. One statement, inside the
/// loader's transaction.
pub fn load_batch<'a>(
    request: &'a Request,
    key: &'a str,
    records: &'a mut [DataRecord],
) -> BoxFuture<'a, Result<BatchOutcome>> {
    Box::pin(async move {
        if records.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let mut delete_ids = Vec::new();
        let mut insert_ids = Vec::new();
        let mut inserts = Vec::new();

        for record in records.iter_mut() {
            let DataRecord::FaAssessor(assessor) = &*record else {
                return Err(Error::internal(uuid!("55cfb2da-fb8f-4a33-961f-fa2be2f9a0cc"), "Unexpected record type.")
                    .with_meta("table", record.sql_table()));
            };

            if assessor.is_delete() {
                delete_ids.push(assessor.property_id);
            } else {
                insert_ids.push(assessor.property_id);
                inserts.push(record);
            }
        }

        let processed = (delete_ids.len() + insert_ids.len()) as u64;

        let mut builder = QueryBuilder::<Postgres>::new("WITH marked_records AS (UPDATE ");
        builder
            .push(Assessor::TABLE)
            .push(" SET am_deleted_at = now() WHERE property_id = ANY(")
            .push_bind(delete_ids)
            .push(")), deleted_records AS (DELETE FROM ")
            .push(Assessor::TABLE)
            .push(" WHERE property_id = ANY(")
            .push_bind(insert_ids)
            .push(") RETURNING *), archived_records AS (INSERT INTO ")
            .push(HISTORY_TABLE)
            .push(" SELECT *, now() AS am_archived_at FROM deleted_records)");

        if !inserts.is_empty() {
            builder.push(", inserted_records AS (");
            push_insert(&mut builder, Assessor::TABLE, &Assessor::columns(), inserts);
            builder.push(")");
        }
        builder.push(" SELECT count(*) FROM deleted_records");

        let row = request
            .fetch_one(key, builder.build())
            .await
            .forward(uuid!("0da9463d-9735-4bb8-94d7-d1484022257e"))?;
        let deleted: i64 = row.try_get(0).site(
            uuid!("3a990626-d13e-47b5-9234-8032302678b3"),
            Code::Unknown,
            "Failed to read archived row count.",
        )?;

        Ok(BatchOutcome {
            processed,
            deleted: deleted as u64,
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::records::Headers;

    #[test]
    fn test_record_type_marks_deletes() {
        let headers = Headers::parse("FIPS|PropertyID|APN|FARecordType", '|');
        let delete = Assessor::parse(&headers, &["06037", "42", "123-45", "d"]).unwrap();
        assert!(delete.is_delete());

        let update = Assessor::parse(&headers, &["06037", "42", "123-45", "U"]).unwrap();
        assert!(!update.is_delete());
        let blank = Assessor::parse(&headers, &["06037", "42", "123-45", ""]).unwrap();
        assert!(!blank.is_delete());
    }

    #[test]
    fn test_required_apn() {
        let headers = Headers::parse("FIPS|PropertyID|APN", '|');
        let err = Assessor::parse(&headers, &["06037", "42", ""]).unwrap_err();
        assert_eq!(err.code, datapipe_common::Code::InvalidArgument);
    }
}
