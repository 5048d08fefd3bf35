//! Tax assessor rows (`TAXASSESSOR`, `REFRESH_TAXASSESSOR`)

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use futures::future::BoxFuture;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::uuid;

use datapipe_common::{Code, ErrorContext, Result, ResultExt};

use crate::records::{push_insert, BatchOutcome, DataRecord};
use crate::request::Request;

crate::data_record! {
    pub struct Assessor in "ad_df_assessor" {
        site: "3797af94-778e-49db-a4d9-a7c9c62abefe",
        required: ["[ATTOM ID]"],
    } {
        attomid: i64 = "[ATTOM ID]" => required_i64,
        situs_state_code: Option<String> = "SitusStateCode" => string,
        situs_county: Option<String> = "SitusCounty" => string,
        property_jurisdiction_name: Option<String> = "PropertyJurisdictionName" => string,
        situs_state_county_fips: Option<String> = "SitusStateCountyFIPS" => string,
        combined_statistical_area: Option<String> = "CombinedStatisticalArea" => string,
        cbsa_name: Option<String> = "CBSAName" => string,
        cbsa_code: Option<i32> = "CBSACode" => i32,
        msa_name: Option<String> = "MSAName" => string,
        msa_code: Option<i32> = "MSACode" => i32,
        metropolitan_division: Option<String> = "MetropolitanDivision" => string,
        minor_civil_division_name: Option<String> = "MinorCivilDivisionName" => string,
        minor_civil_division_code: Option<i32> = "MinorCivilDivisionCode" => i32,
        neighborhood_code: Option<String> = "NeighborhoodCode" => string,
        census_fips_place_code: Option<String> = "CensusFIPSPlaceCode" => string,
        census_tract: Option<i32> = "CensusTract" => i32,
        census_block_group: Option<i32> = "CensusBlockGroup" => i32,
        census_block: Option<i32> = "CensusBlock" => i32,
        parcel_number_raw: Option<String> = "ParcelNumberRaw" => string,
        parcel_number_formatted: Option<String> = "ParcelNumberFormatted" => string,
        parcel_number_year_added: Option<i32> = "ParcelNumberYearAdded" => i32,
        parcel_number_alternate: Option<String> = "ParcelNumberAlternate" => string,
        parcel_map_book: Option<String> = "ParcelMapBook" => string,
        parcel_map_page: Option<String> = "ParcelMapPage" => string,
        parcel_number_year_change: Option<i32> = "ParcelNumberYearChange" => i32,
        parcel_number_previous: Option<String> = "ParcelNumberPrevious" => string,
        parcel_account_number: Option<String> = "ParcelAccountNumber" => string,
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
        property_address_info_privacy: Option<String> = "PropertyAddressInfoPrivacy" => string,
        congressional_district_house: Option<i32> = "CongressionalDistrictHouse" => i32,
        property_latitude: Option<f64> = "PropertyLatitude" => f64,
        property_longitude: Option<f64> = "PropertyLongitude" => f64,
        geo_quality: Option<i32> = "GeoQuality" => i32,
        legal_description: Option<String> = "LegalDescription" => string,
        legal_range: Option<String> = "LegalRange" => string,
        legal_township: Option<String> = "LegalTownship" => string,
        legal_section: Option<String> = "LegalSection" => string,
        legal_quarter: Option<String> = "LegalQuarter" => string,
        legal_quarter_quarter: Option<String> = "LegalQuarterQuarter" => string,
        legal_subdivision: Option<String> = "LegalSubdivision" => string,
        legal_phase: Option<String> = "LegalPhase" => string,
        legal_tract_number: Option<String> = "LegalTractNumber" => string,
        legal_block1: Option<String> = "LegalBlock1" => string,
        legal_block2: Option<String> = "LegalBlock2" => string,
        legal_lot_number1: Option<String> = "LegalLotNumber1" => string,
        legal_lot_number2: Option<String> = "LegalLotNumber2" => string,
        legal_lot_number3: Option<String> = "LegalLotNumber3" => string,
        legal_unit: Option<String> = "LegalUnit" => string,
        party_owner1name_full: Option<String> = "PartyOwner1NameFull" => string,
        party_owner1name_first: Option<String> = "PartyOwner1NameFirst" => string,
        party_owner1name_middle: Option<String> = "PartyOwner1NameMiddle" => string,
        party_owner1name_last: Option<String> = "PartyOwner1NameLast" => string,
        party_owner1name_suffix: Option<String> = "PartyOwner1NameSuffix" => string,
        trust_description: Option<String> = "TrustDescription" => string,
        company_flag: Option<bool> = "CompanyFlag" => yn_bool,
        party_owner2name_full: Option<String> = "PartyOwner2NameFull" => string,
        party_owner2name_first: Option<String> = "PartyOwner2NameFirst" => string,
        party_owner2name_middle: Option<String> = "PartyOwner2NameMiddle" => string,
        party_owner2name_last: Option<String> = "PartyOwner2NameLast" => string,
        party_owner2name_suffix: Option<String> = "PartyOwner2NameSuffix" => string,
        owner_type_description1: Option<String> = "OwnerTypeDescription1" => string,
        ownership_vesting_relation_code: Option<i32> = "OwnershipVestingRelationCode" => i32,
        party_owner3name_full: Option<String> = "PartyOwner3NameFull" => string,
        party_owner3name_first: Option<String> = "PartyOwner3NameFirst" => string,
        party_owner3name_middle: Option<String> = "PartyOwner3NameMiddle" => string,
        party_owner3name_last: Option<String> = "PartyOwner3NameLast" => string,
        party_owner3name_suffix: Option<String> = "PartyOwner3NameSuffix" => string,
        party_owner4name_full: Option<String> = "PartyOwner4NameFull" => string,
        party_owner4name_first: Option<String> = "PartyOwner4NameFirst" => string,
        party_owner4name_middle: Option<String> = "PartyOwner4NameMiddle" => string,
        party_owner4name_last: Option<String> = "PartyOwner4NameLast" => string,
        party_owner4name_suffix: Option<String> = "PartyOwner4NameSuffix" => string,
        owner_type_description2: Option<String> = "OwnerTypeDescription2" => string,
        contact_owner_mailing_county: Option<String> = "ContactOwnerMailingCounty" => string,
        contact_owner_mailing_fips: Option<String> = "ContactOwnerMailingFIPS" => string,
        contact_owner_mail_address_full: Option<String> = "ContactOwnerMailAddressFull" => string,
        contact_owner_mail_address_house_number: Option<String> = "ContactOwnerMailAddressHouseNumber" => string,
        contact_owner_mail_address_street_direction: Option<String> = "ContactOwnerMailAddressStreetDirection" => string,
        contact_owner_mail_address_street_name: Option<String> = "ContactOwnerMailAddressStreetName" => string,
        contact_owner_mail_address_street_suffix: Option<String> = "ContactOwnerMailAddressStreetSuffix" => string,
        contact_owner_mail_address_street_post_direction: Option<String> = "ContactOwnerMailAddressStreetPostDirection" => string,
        contact_owner_mail_address_unit_prefix: Option<String> = "ContactOwnerMailAddressUnitPrefix" => string,
        contact_owner_mail_address_unit: Option<String> = "ContactOwnerMailAddressUnit" => string,
        contact_owner_mail_address_city: Option<String> = "ContactOwnerMailAddressCity" => string,
        contact_owner_mail_address_state: Option<String> = "ContactOwnerMailAddressState" => string,
        contact_owner_mail_address_zip: Option<String> = "ContactOwnerMailAddressZIP" => string,
        contact_owner_mail_address_zip4: Option<String> = "ContactOwnerMailAddressZIP4" => string,
        contact_owner_mail_address_crrt: Option<String> = "ContactOwnerMailAddressCRRT" => string,
        contact_owner_mail_address_info_format: Option<String> = "ContactOwnerMailAddressInfoFormat" => string,
        contact_owner_mail_info_privacy: Option<String> = "ContactOwnerMailInfoPrivacy" => string,
        status_owner_occupied_flag: Option<bool> = "StatusOwnerOccupiedFlag" => yn_bool,
        deed_owner1name_full: Option<String> = "DeedOwner1NameFull" => string,
        deed_owner1name_first: Option<String> = "DeedOwner1NameFirst" => string,
        deed_owner1name_middle: Option<String> = "DeedOwner1NameMiddle" => string,
        deed_owner1name_last: Option<String> = "DeedOwner1NameLast" => string,
        deed_owner1name_suffix: Option<String> = "DeedOwner1NameSuffix" => string,
        deed_owner2name_full: Option<String> = "DeedOwner2NameFull" => string,
        deed_owner2name_first: Option<String> = "DeedOwner2NameFirst" => string,
        deed_owner2name_middle: Option<String> = "DeedOwner2NameMiddle" => string,
        deed_owner2name_last: Option<String> = "DeedOwner2NameLast" => string,
        deed_owner2name_suffix: Option<String> = "DeedOwner2NameSuffix" => string,
        deed_owner3name_full: Option<String> = "DeedOwner3NameFull" => string,
        deed_owner3name_first: Option<String> = "DeedOwner3NameFirst" => string,
        deed_owner3name_middle: Option<String> = "DeedOwner3NameMiddle" => string,
        deed_owner3name_last: Option<String> = "DeedOwner3NameLast" => string,
        deed_owner3name_suffix: Option<String> = "DeedOwner3NameSuffix" => string,
        deed_owner4name_full: Option<String> = "DeedOwner4NameFull" => string,
        deed_owner4name_first: Option<String> = "DeedOwner4NameFirst" => string,
        deed_owner4name_middle: Option<String> = "DeedOwner4NameMiddle" => string,
        deed_owner4name_last: Option<String> = "DeedOwner4NameLast" => string,
        deed_owner4name_suffix: Option<String> = "DeedOwner4NameSuffix" => string,
        tax_year_assessed: Option<i32> = "TaxYearAssessed" => i32,
        tax_assessed_value_total: Option<i32> = "TaxAssessedValueTotal" => i32,
        tax_assessed_value_improvements: Option<i32> = "TaxAssessedValueImprovements" => i32,
        tax_assessed_value_land: Option<i32> = "TaxAssessedValueLand" => i32,
        tax_assessed_improvements_perc: Option<BigDecimal> = "TaxAssessedImprovementsPerc" => decimal,
        previous_assessed_value: Option<i32> = "PreviousAssessedValue" => i32,
        tax_market_value_year: Option<i32> = "TaxMarketValueYear" => i32,
        tax_market_value_total: Option<i32> = "TaxMarketValueTotal" => i32,
        tax_market_value_improvements: Option<i32> = "TaxMarketValueImprovements" => i32,
        tax_market_value_land: Option<i32> = "TaxMarketValueLand" => i32,
        tax_market_improvements_perc: Option<BigDecimal> = "TaxMarketImprovementsPerc" => decimal,
        tax_fiscal_year: Option<i32> = "TaxFiscalYear" => i32,
        tax_rate_area: Option<String> = "TaxRateArea" => string,
        tax_billed_amount: Option<BigDecimal> = "TaxBilledAmount" => decimal,
        tax_delinquent_year: Option<i32> = "TaxDelinquentYear" => i32,
        last_assessor_tax_roll_update: Option<NaiveDate> = "LastAssessorTaxRollUpdate" => date_iso,
        assr_last_updated: Option<NaiveDate> = "AssrLastUpdated" => date_iso_or_sentinel,
        tax_exemption_homeowner_flag: Option<bool> = "TaxExemptionHomeownerFlag" => yn_bool,
        tax_exemption_disabled_flag: Option<bool> = "TaxExemptionDisabledFlag" => yn_bool,
        tax_exemption_senior_flag: Option<bool> = "TaxExemptionSeniorFlag" => yn_bool,
        tax_exemption_veteran_flag: Option<bool> = "TaxExemptionVeteranFlag" => yn_bool,
        tax_exemption_widow_flag: Option<bool> = "TaxExemptionWidowFlag" => yn_bool,
        tax_exemption_additional: Option<bool> = "TaxExemptionAdditional" => yn_bool,
        year_built: Option<i32> = "YearBuilt" => i32,
        year_built_effective: Option<i32> = "YearBuiltEffective" => i32,
        zoned_code_local: Option<String> = "ZonedCodeLocal" => string,
        property_use_muni: Option<String> = "PropertyUseMuni" => string,
        property_use_group: Option<String> = "PropertyUseGroup" => string,
        property_use_standardized: Option<i32> = "PropertyUseStandardized" => i32,
        assessor_last_sale_date: Option<NaiveDate> = "AssessorLastSaleDate" => date_iso,
        assessor_last_sale_amount: Option<i32> = "AssessorLastSaleAmount" => i32,
        assessor_prior_sale_date: Option<NaiveDate> = "AssessorPriorSaleDate" => date_iso,
        assessor_prior_sale_amount: Option<i32> = "AssessorPriorSaleAmount" => i32,
        last_ownership_transfer_date: Option<NaiveDate> = "LastOwnershipTransferDate" => date_iso,
        last_ownership_transfer_document_number: Option<String> = "LastOwnershipTransferDocumentNumber" => string,
        last_ownership_transfer_transaction_id: Option<i64> = "LastOwnershipTransferTransactionID" => i64,
        deed_last_sale_document_book: Option<String> = "DeedLastSaleDocumentBook" => string,
        deed_last_sale_document_page: Option<String> = "DeedLastSaleDocumentPage" => string,
        deed_last_document_number: Option<String> = "DeedLastDocumentNumber" => string,
        deed_last_sale_date: Option<NaiveDate> = "DeedLastSaleDate" => date_iso,
        deed_last_sale_price: Option<i32> = "DeedLastSalePrice" => i32,
        deed_last_sale_transaction_id: Option<i64> = "DeedLastSaleTransactionID" => i64,
        area_building: Option<i32> = "AreaBuilding" => i32,
        area_building_definition_code: Option<i32> = "AreaBuildingDefinitionCode" => i32,
        area_gross: Option<i32> = "AreaGross" => i32,
        area1st_floor: Option<i32> = "Area1stFloor" => i32,
        area2nd_floor: Option<i32> = "Area2ndFloor" => i32,
        area_upper_floors: Option<i32> = "AreaUpperFloors" => i32,
        area_lot_acres: Option<f64> = "AreaLotAcres" => f64,
        area_lot_sf: Option<BigDecimal> = "AreaLotSF" => decimal,
        area_lot_depth: Option<BigDecimal> = "AreaLotDepth" => decimal,
        area_lot_width: Option<BigDecimal> = "AreaLotWidth" => decimal,
        rooms_attic_area: Option<i32> = "RoomsAtticArea" => i32,
        rooms_attic_flag: Option<bool> = "RoomsAtticFlag" => yn_bool,
        rooms_basement_area: Option<i32> = "RoomsBasementArea" => i32,
        rooms_basement_area_finished: Option<i32> = "RoomsBasementAreaFinished" => i32,
        rooms_basement_area_unfinished: Option<i32> = "RoomsBasementAreaUnfinished" => i32,
        parking_garage: Option<i32> = "ParkingGarage" => i32,
        parking_garage_area: Option<i32> = "ParkingGarageArea" => i32,
        parking_carport: Option<bool> = "ParkingCarport" => yn_bool,
        parking_carport_area: Option<i32> = "ParkingCarportArea" => i32,
        hvac_cooling_detail: Option<i32> = "HVACCoolingDetail" => i32,
        hvac_heating_detail: Option<i32> = "HVACHeatingDetail" => i32,
        hvac_heating_fuel: Option<i32> = "HVACHeatingFuel" => i32,
        utilities_sewage_usage: Option<i32> = "UtilitiesSewageUsage" => i32,
        utilities_water_source: Option<i32> = "UtilitiesWaterSource" => i32,
        utilities_mobile_home_hookup_flag: Option<bool> = "UtilitiesMobileHomeHookupFlag" => yn_bool,
        foundation: Option<i32> = "Foundation" => i32,
        construction: Option<i32> = "Construction" => i32,
        interior_structure: Option<i32> = "InteriorStructure" => i32,
        plumbing_fixtures_count: Option<i32> = "PlumbingFixturesCount" => i32,
        construction_fire_resistance_class: Option<i32> = "ConstructionFireResistanceClass" => i32,
        safety_fire_sprinklers_flag: Option<bool> = "SafetyFireSprinklersFlag" => yn_bool,
        flooring_material_primary: Option<i32> = "FlooringMaterialPrimary" => i32,
        bath_count: Option<BigDecimal> = "BathCount" => decimal,
        bath_partial_count: Option<i32> = "BathPartialCount" => i32,
        bedrooms_count: Option<i32> = "BedroomsCount" => i32,
        rooms_count: Option<i32> = "RoomsCount" => i32,
        stories_count: Option<i32> = "StoriesCount" => i32,
        units_count: Option<i32> = "UnitsCount" => i32,
        rooms_bonus_room_flag: Option<bool> = "RoomsBonusRoomFlag" => yn_bool,
        rooms_breakfast_nook_flag: Option<bool> = "RoomsBreakfastNookFlag" => yn_bool,
        rooms_cellar_flag: Option<bool> = "RoomsCellarFlag" => yn_bool,
        rooms_cellar_wine_flag: Option<bool> = "RoomsCellarWineFlag" => yn_bool,
        rooms_exercise_flag: Option<bool> = "RoomsExerciseFlag" => yn_bool,
        rooms_family_code: Option<bool> = "RoomsFamilyCode" => yn_bool,
        rooms_game_flag: Option<bool> = "RoomsGameFlag" => yn_bool,
        rooms_great_flag: Option<bool> = "RoomsGreatFlag" => yn_bool,
        rooms_hobby_flag: Option<bool> = "RoomsHobbyFlag" => yn_bool,
        rooms_laundry_flag: Option<bool> = "RoomsLaundryFlag" => yn_bool,
        rooms_media_flag: Option<bool> = "RoomsMediaFlag" => yn_bool,
        rooms_mud_flag: Option<bool> = "RoomsMudFlag" => yn_bool,
        rooms_office_area: Option<i32> = "RoomsOfficeArea" => i32,
        rooms_office_flag: Option<bool> = "RoomsOfficeFlag" => yn_bool,
        rooms_safe_room_flag: Option<bool> = "RoomsSafeRoomFlag" => yn_bool,
        rooms_sitting_flag: Option<bool> = "RoomsSittingFlag" => yn_bool,
        rooms_storm_shelter: Option<bool> = "RoomsStormShelter" => yn_bool,
        rooms_study_flag: Option<bool> = "RoomsStudyFlag" => yn_bool,
        rooms_sunroom_flag: Option<bool> = "RoomsSunroomFlag" => yn_bool,
        rooms_utility_area: Option<i32> = "RoomsUtilityArea" => i32,
        rooms_utility_code: Option<bool> = "RoomsUtilityCode" => yn_bool,
        fireplace: Option<i32> = "Fireplace" => i32,
        fireplace_count: Option<i32> = "FireplaceCount" => i32,
        accessability_elevator_flag: Option<bool> = "AccessabilityElevatorFlag" => yn_bool,
        accessability_handicap_flag: Option<bool> = "AccessabilityHandicapFlag" => yn_bool,
        escalator_flag: Option<bool> = "EscalatorFlag" => yn_bool,
        central_vacuum_flag: Option<bool> = "CentralVacuumFlag" => yn_bool,
        content_intercom_flag: Option<bool> = "ContentIntercomFlag" => yn_bool,
        content_sound_system_flag: Option<bool> = "ContentSoundSystemFlag" => yn_bool,
        wet_bar_flag: Option<bool> = "WetBarFlag" => yn_bool,
        security_alarm_flag: Option<bool> = "SecurityAlarmFlag" => yn_bool,
        structure_style: Option<i32> = "StructureStyle" => i32,
        exterior1code: Option<String> = "Exterior1Code" => string,
        roof_material: Option<i32> = "RoofMaterial" => i32,
        roof_construction: Option<i32> = "RoofConstruction" => i32,
        content_storm_shutter_flag: Option<bool> = "ContentStormShutterFlag" => yn_bool,
        content_overhead_door_flag: Option<bool> = "ContentOverheadDoorFlag" => yn_bool,
        view_description: Option<String> = "ViewDescription" => string,
        porch_code: Option<String> = "PorchCode" => string,
        porch_area: Option<i32> = "PorchArea" => i32,
        patio_area: Option<i32> = "PatioArea" => i32,
        deck_flag: Option<bool> = "DeckFlag" => yn_bool,
        deck_area: Option<i32> = "DeckArea" => i32,
        feature_balcony_flag: Option<bool> = "FeatureBalconyFlag" => yn_bool,
        balcony_area: Option<i32> = "BalconyArea" => i32,
        breezeway_flag: Option<bool> = "BreezewayFlag" => yn_bool,
        parking_rv_parking_flag: Option<bool> = "ParkingRVParkingFlag" => yn_bool,
        parking_space_count: Option<i32> = "ParkingSpaceCount" => i32,
        driveway_area: Option<i32> = "DrivewayArea" => i32,
        driveway_material: Option<String> = "DrivewayMaterial" => string,
        pool: Option<i32> = "Pool" => i32,
        pool_area: Option<i32> = "PoolArea" => i32,
        content_sauna_flag: Option<bool> = "ContentSaunaFlag" => yn_bool,
        topography_code: Option<i32> = "TopographyCode" => i32,
        fence_code: Option<bool> = "FenceCode" => yn_bool,
        fence_area: Option<i32> = "FenceArea" => i32,
        courtyard_flag: Option<bool> = "CourtyardFlag" => yn_bool,
        courtyard_area: Option<i32> = "CourtyardArea" => i32,
        arbor_pergola_flag: Option<bool> = "ArborPergolaFlag" => yn_bool,
        sprinklers_flag: Option<bool> = "SprinklersFlag" => yn_bool,
        golf_course_green_flag: Option<bool> = "GolfCourseGreenFlag" => yn_bool,
        tennis_court_flag: Option<bool> = "TennisCourtFlag" => yn_bool,
        sports_court_flag: Option<bool> = "SportsCourtFlag" => yn_bool,
        arena_flag: Option<bool> = "ArenaFlag" => yn_bool,
        water_feature_flag: Option<bool> = "WaterFeatureFlag" => yn_bool,
        pond_flag: Option<bool> = "PondFlag" => yn_bool,
        boat_lift_flag: Option<bool> = "BoatLiftFlag" => yn_bool,
        buildings_count: Option<i32> = "BuildingsCount" => i32,
        bath_house_area: Option<i32> = "BathHouseArea" => i32,
        bath_house_flag: Option<bool> = "BathHouseFlag" => yn_bool,
        boat_access_flag: Option<bool> = "BoatAccessFlag" => yn_bool,
        boat_house_area: Option<i32> = "BoatHouseArea" => i32,
        boat_house_flag: Option<bool> = "BoatHouseFlag" => yn_bool,
        cabin_area: Option<i32> = "CabinArea" => i32,
        cabin_flag: Option<bool> = "CabinFlag" => yn_bool,
        canopy_area: Option<i32> = "CanopyArea" => i32,
        canopy_flag: Option<bool> = "CanopyFlag" => yn_bool,
        gazebo_area: Option<i32> = "GazeboArea" => i32,
        gazebo_flag: Option<bool> = "GazeboFlag" => yn_bool,
        grainery_area: Option<i32> = "GraineryArea" => i32,
        grainery_flag: Option<bool> = "GraineryFlag" => yn_bool,
        green_house_area: Option<i32> = "GreenHouseArea" => i32,
        green_house_flag: Option<bool> = "GreenHouseFlag" => yn_bool,
        guest_house_area: Option<i32> = "GuestHouseArea" => i32,
        guest_house_flag: Option<bool> = "GuestHouseFlag" => yn_bool,
        kennel_area: Option<i32> = "KennelArea" => i32,
        kennel_flag: Option<bool> = "KennelFlag" => yn_bool,
        lean_to_area: Option<i32> = "LeanToArea" => i32,
        lean_to_flag: Option<bool> = "LeanToFlag" => yn_bool,
        loading_platform_area: Option<i32> = "LoadingPlatformArea" => i32,
        loading_platform_flag: Option<bool> = "LoadingPlatformFlag" => yn_bool,
        milk_house_area: Option<i32> = "MilkHouseArea" => i32,
        milk_house_flag: Option<bool> = "MilkHouseFlag" => yn_bool,
        outdoor_kitchen_fireplace_flag: Option<bool> = "OutdoorKitchenFireplaceFlag" => yn_bool,
        pool_house_area: Option<i32> = "PoolHouseArea" => i32,
        pool_house_flag: Option<bool> = "PoolHouseFlag" => yn_bool,
        poultry_house_area: Option<i32> = "PoultryHouseArea" => i32,
        poultry_house_flag: Option<bool> = "PoultryHouseFlag" => yn_bool,
        quonset_area: Option<i32> = "QuonsetArea" => i32,
        quonset_flag: Option<bool> = "QuonsetFlag" => yn_bool,
        shed_area: Option<i32> = "ShedArea" => i32,
        shed_code: Option<bool> = "ShedCode" => yn_bool,
        silo_area: Option<i32> = "SiloArea" => i32,
        silo_flag: Option<bool> = "SiloFlag" => yn_bool,
        stable_area: Option<i32> = "StableArea" => i32,
        stable_flag: Option<bool> = "StableFlag" => yn_bool,
        storage_building_area: Option<i32> = "StorageBuildingArea" => i32,
        storage_building_flag: Option<bool> = "StorageBuildingFlag" => yn_bool,
        utility_building_area: Option<i32> = "UtilityBuildingArea" => i32,
        utility_building_flag: Option<bool> = "UtilityBuildingFlag" => yn_bool,
        pole_structure_area: Option<i32> = "PoleStructureArea" => i32,
        pole_structure_flag: Option<bool> = "PoleStructureFlag" => yn_bool,
        community_rec_room_flag: Option<bool> = "CommunityRecRoomFlag" => yn_bool,
        publication_date: Option<NaiveDate> = "PublicationDate" => date_iso,
        parcel_shell_record: Option<bool> = "ParcelShellRecord" => yn_bool,
    }
}

/// Replace the current rows of every property in the batch. Existing rows
/// are moved to `ad_assessor_history` and the new rows inserted, all in one
/// statement. Runs inside the loader's transaction.
pub fn load_batch<'a>(
    request: &'a Request,
    key: &'a str,
    records: &'a mut [DataRecord],
) -> BoxFuture<'a, Result<BatchOutcome>> {
    Box::pin(async move {
        if records.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let ids: Vec<i64> = records.iter().filter_map(DataRecord::key).collect();
        let processed = records.len() as u64;

        let mut builder = QueryBuilder::<Postgres>::new("WITH deleted_records AS (DELETE FROM ");
        builder
            .push(Assessor::TABLE)
            .push(" WHERE attomid = ANY(")
            .push_bind(ids)
            .push(") RETURNING *), archived_records AS (INSERT INTO ")
            .push(HISTORY_TABLE)
            .push(" SELECT *, now() AS am_archived_at FROM deleted_records), inserted_records AS (");
        push_insert(&mut builder, Assessor::TABLE, &Assessor::columns(), records.iter_mut());
        builder.push(") SELECT count(*) FROM deleted_records");

        let row = request
            .fetch_one(key, builder.build())
            .await
            .forward(uuid!("55465913-1055-4a3b-82e7-4e3d095ded70"))?;
        let deleted: i64 = row.try_get(0).site(
            uuid!("bcc19f1e-23d3-4f93-9518-c6806d80b7c0"),
            Code::Unknown,
            "Failed to read archived row count.",
        )?;

        Ok(BatchOutcome {
            processed,
            deleted: deleted as u64,
        })
    })
}

/// Archive of replaced assessor rows
pub const HISTORY_TABLE: &str = "ad_assessor_history";
