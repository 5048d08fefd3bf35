//! Deed and mortgage recorder rows (`RECORDER`, `REFRESH_RECORDER`)

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

crate::data_record! {
    pub struct Recorder in "ad_df_recorder" {
        site: "fa856803-3c10-49a8-866e-3b01ad6de2a3",
        required: ["TransactionID", "[ATTOM ID]"],
    } {
        transaction_id: i64 = "TransactionID" => required_i64,
        attomid: i64 = "[ATTOM ID]" => required_i64,
        document_recording_state_code: Option<String> = "DocumentRecordingStateCode" => string,
        document_recording_county_name: Option<String> = "DocumentRecordingCountyName" => string,
        document_recording_jurisdiction_name: Option<String> = "DocumentRecordingJurisdictionName" => string,
        document_recording_county_fi_ps: Option<String> = "DocumentRecordingCountyFIPs" => string,
        document_type_code: Option<String> = "DocumentTypeCode" => string,
        document_number_formatted: Option<String> = "DocumentNumberFormatted" => string,
        document_number_legacy: Option<String> = "DocumentNumberLegacy" => string,
        instrument_number: Option<String> = "InstrumentNumber" => string,
        book: Option<String> = "Book" => string,
        page: Option<String> = "Page" => string,
        instrument_date: Option<NaiveDate> = "InstrumentDate" => date_iso,
        recording_date: Option<NaiveDate> = "RecordingDate" => date_iso,
        transaction_type: Option<String> = "TransactionType" => string,
        transfer_info_purchase_type_code: Option<i32> = "TransferInfoPurchaseTypeCode" => i32,
        foreclosure_auction_sale: Option<bool> = "ForeclosureAuctionSale" => yn_bool,
        transfer_info_distress_circumstance_code: Option<i32> = "TransferInfoDistressCircumstanceCode" => i32,
        quitclaim_flag: Option<bool> = "QuitclaimFlag" => yn_bool,
        transfer_info_multi_parcel_flag: Option<i32> = "TransferInfoMultiParcelFlag" => i32,
        arms_length_flag: Option<i32> = "ArmsLengthFlag" => i32,
        partial_interest: Option<String> = "PartialInterest" => string,
        transfer_amount: Option<BigDecimal> = "TransferAmount" => decimal,
        transfer_amount_info_accuracy: Option<String> = "TransferAmountInfoAccuracy" => string,
        transfer_tax_total: Option<BigDecimal> = "TransferTaxTotal" => decimal,
        transfer_tax_city: Option<BigDecimal> = "TransferTaxCity" => decimal,
        transfer_tax_county: Option<BigDecimal> = "TransferTaxCounty" => decimal,
        grantor1name_full: Option<String> = "Grantor1NameFull" => string,
        grantor1name_first: Option<String> = "Grantor1NameFirst" => string,
        grantor1name_middle: Option<String> = "Grantor1NameMiddle" => string,
        grantor1name_last: Option<String> = "Grantor1NameLast" => string,
        grantor1name_suffix: Option<String> = "Grantor1NameSuffix" => string,
        grantor1info_entity_classification: Option<String> = "Grantor1InfoEntityClassification" => string,
        grantor1info_owner_type: Option<String> = "Grantor1InfoOwnerType" => string,
        grantor2name_full: Option<String> = "Grantor2NameFull" => string,
        grantor2name_first: Option<String> = "Grantor2NameFirst" => string,
        grantor2name_middle: Option<String> = "Grantor2NameMiddle" => string,
        grantor2name_last: Option<String> = "Grantor2NameLast" => string,
        grantor2name_suffix: Option<String> = "Grantor2NameSuffix" => string,
        grantor2info_entity_classification: Option<String> = "Grantor2InfoEntityClassification" => string,
        grantor2info_owner_type: Option<String> = "Grantor2InfoOwnerType" => string,
        grantor3name_full: Option<String> = "Grantor3NameFull" => string,
        grantor3name_first: Option<String> = "Grantor3NameFirst" => string,
        grantor3name_middle: Option<String> = "Grantor3NameMiddle" => string,
        grantor3name_last: Option<String> = "Grantor3NameLast" => string,
        grantor3name_suffix: Option<String> = "Grantor3NameSuffix" => string,
        grantor3info_entity_classification: Option<String> = "Grantor3InfoEntityClassification" => string,
        grantor4name_full: Option<String> = "Grantor4NameFull" => string,
        grantor4name_first: Option<String> = "Grantor4NameFirst" => string,
        grantor4name_middle: Option<String> = "Grantor4NameMiddle" => string,
        grantor4name_last: Option<String> = "Grantor4NameLast" => string,
        grantor4name_suffix: Option<String> = "Grantor4NameSuffix" => string,
        grantor4info_entity_classification: Option<String> = "Grantor4InfoEntityClassification" => string,
        grantor_address_full: Option<String> = "GrantorAddressFull" => string,
        grantor_address_house_number: Option<String> = "GrantorAddressHouseNumber" => string,
        grantor_address_street_direction: Option<String> = "GrantorAddressStreetDirection" => string,
        grantor_address_street_name: Option<String> = "GrantorAddressStreetName" => string,
        grantor_address_street_suffix: Option<String> = "GrantorAddressStreetSuffix" => string,
        grantor_address_street_post_direction: Option<String> = "GrantorAddressStreetPostDirection" => string,
        grantor_address_unit_prefix: Option<String> = "GrantorAddressUnitPrefix" => string,
        grantor_address_unit_value: Option<String> = "GrantorAddressUnitValue" => string,
        grantor_address_city: Option<String> = "GrantorAddressCity" => string,
        grantor_address_state: Option<String> = "GrantorAddressState" => string,
        grantor_address_zip: Option<String> = "GrantorAddressZIP" => string,
        grantor_address_zip4: Option<String> = "GrantorAddressZIP4" => string,
        grantor_address_crrt: Option<String> = "GrantorAddressCRRT" => string,
        grantor_address_info_format: Option<String> = "GrantorAddressInfoFormat" => string,
        grantor_address_info_privacy: Option<bool> = "GrantorAddressInfoPrivacy" => yn_bool,
        grantee1name_full: Option<String> = "Grantee1NameFull" => string,
        grantee1name_first: Option<String> = "Grantee1NameFirst" => string,
        grantee1name_middle: Option<String> = "Grantee1NameMiddle" => string,
        grantee1name_last: Option<String> = "Grantee1NameLast" => string,
        grantee1name_suffix: Option<String> = "Grantee1NameSuffix" => string,
        grantee1info_entity_classification: Option<String> = "Grantee1InfoEntityClassification" => string,
        grantee1info_owner_type: Option<String> = "Grantee1InfoOwnerType" => string,
        grantee2name_full: Option<String> = "Grantee2NameFull" => string,
        grantee2name_first: Option<String> = "Grantee2NameFirst" => string,
        grantee2name_middle: Option<String> = "Grantee2NameMiddle" => string,
        grantee2name_last: Option<String> = "Grantee2NameLast" => string,
        grantee2name_suffix: Option<String> = "Grantee2NameSuffix" => string,
        grantee2info_entity_classification: Option<String> = "Grantee2InfoEntityClassification" => string,
        grantee_info_vesting1: Option<String> = "GranteeInfoVesting1" => string,
        grantee3name_full: Option<String> = "Grantee3NameFull" => string,
        grantee3name_first: Option<String> = "Grantee3NameFirst" => string,
        grantee3name_middle: Option<String> = "Grantee3NameMiddle" => string,
        grantee3name_last: Option<String> = "Grantee3NameLast" => string,
        grantee3name_suffix: Option<String> = "Grantee3NameSuffix" => string,
        grantee3info_entity_classification: Option<String> = "Grantee3InfoEntityClassification" => string,
        grantee4name_full: Option<String> = "Grantee4NameFull" => string,
        grantee4name_first: Option<String> = "Grantee4NameFirst" => string,
        grantee4name_middle: Option<String> = "Grantee4NameMiddle" => string,
        grantee4name_last: Option<String> = "Grantee4NameLast" => string,
        grantee4name_suffix: Option<String> = "Grantee4NameSuffix" => string,
        grantee4info_entity_classification: Option<String> = "Grantee4InfoEntityClassification" => string,
        grantee_mail_care_of_name: Option<String> = "GranteeMailCareOfName" => string,
        grantee_info_entity_count: Option<i32> = "GranteeInfoEntityCount" => i32,
        grantee_info_vesting2: Option<String> = "GranteeInfoVesting2" => string,
        grantee_investor_flag: Option<bool> = "GranteeInvestorFlag" => yn_bool,
        grantee_mail_address_full: Option<String> = "GranteeMailAddressFull" => string,
        grantee_mail_address_house_number: Option<String> = "GranteeMailAddressHouseNumber" => string,
        grantee_mail_address_street_direction: Option<String> = "GranteeMailAddressStreetDirection" => string,
        grantee_mail_address_street_name: Option<String> = "GranteeMailAddressStreetName" => string,
        grantee_mail_address_street_suffix: Option<String> = "GranteeMailAddressStreetSuffix" => string,
        grantee_mail_address_street_post_direction: Option<String> = "GranteeMailAddressStreetPostDirection" => string,
        grantee_mail_address_unit_prefix: Option<String> = "GranteeMailAddressUnitPrefix" => string,
        grantee_mail_address_unit_value: Option<String> = "GranteeMailAddressUnitValue" => string,
        grantee_mail_address_city: Option<String> = "GranteeMailAddressCity" => string,
        grantee_mail_address_state: Option<String> = "GranteeMailAddressState" => string,
        grantee_mail_address_zip: Option<String> = "GranteeMailAddressZIP" => string,
        grantee_mail_address_zip4: Option<String> = "GranteeMailAddressZIP4" => string,
        grantee_mail_address_crrt: Option<String> = "GranteeMailAddressCRRT" => string,
        grantee_mail_address_info_format: Option<String> = "GranteeMailAddressInfoFormat" => string,
        grantee_mail_address_info_privacy: Option<bool> = "GranteeMailAddressInfoPrivacy" => yn_bool,
        grantee_grantor_owner_relationship_code: Option<String> = "GranteeGrantorOwnerRelationshipCode" => string,
        title_company_standardized_code: Option<String> = "TitleCompanyStandardizedCode" => string,
        title_company_standardized_name: Option<String> = "TitleCompanyStandardizedName" => string,
        title_company_raw: Option<String> = "TitleCompanyRaw" => string,
        legal_description_part1: Option<String> = "LegalDescriptionPart1" => string,
        legal_description_part2: Option<String> = "LegalDescriptionPart2" => string,
        legal_description_part3: Option<String> = "LegalDescriptionPart3" => string,
        legal_description_part4: Option<String> = "LegalDescriptionPart4" => string,
        legal_range: Option<String> = "LegalRange" => string,
        legal_township: Option<String> = "LegalTownship" => string,
        legal_section: Option<String> = "LegalSection" => string,
        legal_district: Option<String> = "LegalDistrict" => string,
        legal_sub_division: Option<String> = "LegalSubDivision" => string,
        legal_tract: Option<String> = "LegalTract" => string,
        legal_block: Option<String> = "LegalBlock" => string,
        legal_lot: Option<String> = "LegalLot" => string,
        legal_unit: Option<String> = "LegalUnit" => string,
        legal_plat_map_book: Option<String> = "LegalPlatMapBook" => string,
        legal_plat_map_page: Option<String> = "LegalPlatMapPage" => string,
        apn_formatted: Option<String> = "APNFormatted" => string,
        apn_original: Option<String> = "APNOriginal" => string,
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
        property_address_info_format: Option<String> = "PropertyAddressInfoFormat" => string,
        property_address_info_privacy: Option<bool> = "PropertyAddressInfoPrivacy" => yn_bool,
        recorder_map_reference: Option<String> = "RecorderMapReference" => string,
        property_use_group: Option<String> = "PropertyUseGroup" => string,
        property_use_standardized: Option<String> = "PropertyUseStandardized" => string,
        mortgage1document_number_formatted: Option<String> = "Mortgage1DocumentNumberFormatted" => string,
        mortgage1document_number_legacy: Option<String> = "Mortgage1DocumentNumberLegacy" => string,
        mortgage1instrument_number: Option<String> = "Mortgage1InstrumentNumber" => string,
        mortgage1book: Option<String> = "Mortgage1Book" => string,
        mortgage1page: Option<String> = "Mortgage1Page" => string,
        mortgage1recording_date: Option<NaiveDate> = "Mortgage1RecordingDate" => date_iso,
        mortgage1type: Option<String> = "Mortgage1Type" => string,
        mortgage1amount: Option<i32> = "Mortgage1Amount" => i32,
        mortgage1lender_code: Option<i32> = "Mortgage1LenderCode" => i32,
        mortgage1lender_name_full_standardized: Option<String> = "Mortgage1LenderNameFullStandardized" => string,
        mortgage1lender_name_first: Option<String> = "Mortgage1LenderNameFirst" => string,
        mortgage1lender_name_last: Option<String> = "Mortgage1LenderNameLast" => string,
        mortgage1lender_address: Option<String> = "Mortgage1LenderAddress" => string,
        mortgage1lender_address_city: Option<String> = "Mortgage1LenderAddressCity" => string,
        mortgage1lender_address_state: Option<String> = "Mortgage1LenderAddressState" => string,
        mortgage1lender_address_zip: Option<String> = "Mortgage1LenderAddressZIP" => string,
        mortgage1lender_address_zip4: Option<String> = "Mortgage1LenderAddressZIP4" => string,
        mortgage1lender_info_entity_classification: Option<String> = "Mortgage1LenderInfoEntityClassification" => string,
        mortgage1lender_info_seller_carry_back_flag: Option<bool> = "Mortgage1LenderInfoSellerCarryBackFlag" => yn_bool,
        mortgage1term: Option<i32> = "Mortgage1Term" => i32,
        mortgage1term_type: Option<String> = "Mortgage1TermType" => string,
        mortgage1term_date: Option<NaiveDate> = "Mortgage1TermDate" => date_iso,
        mortgage1info_prepayment_penalty_flag: Option<bool> = "Mortgage1InfoPrepaymentPenaltyFlag" => yn_bool,
        mortgage1info_prepayment_term: Option<String> = "Mortgage1InfoPrepaymentTerm" => string,
        mortgage1interest_rate_type: Option<String> = "Mortgage1InterestRateType" => string,
        mortgage1interest_rate: Option<BigDecimal> = "Mortgage1InterestRate" => decimal,
        mortgage1interest_type_initial: Option<String> = "Mortgage1InterestTypeInitial" => string,
        mortgage1fixed_step_conversion_rate: Option<String> = "Mortgage1FixedStepConversionRate" => string,
        mortgage1document_info_rider_adjustable_rate_flag: Option<bool> = "Mortgage1DocumentInfoRiderAdjustableRateFlag" => yn_bool,
        mortgage1info_interest_type_change_year: Option<i32> = "Mortgage1InfoInterestTypeChangeYear" => i32,
        mortgage1info_interest_type_change_month: Option<i32> = "Mortgage1InfoInterestTypeChangeMonth" => i32,
        mortgage1info_interest_type_change_day: Option<i32> = "Mortgage1InfoInterestTypeChangeDay" => i32,
        mortgage1interest_rate_min_first_change_rate_conversion: Option<BigDecimal> = "Mortgage1InterestRateMinFirstChangeRateConversion" => decimal,
        mortgage1interest_rate_max_first_change_rate_conversion: Option<BigDecimal> = "Mortgage1InterestRateMaxFirstChangeRateConversion" => decimal,
        mortgage1interest_change_frequency: Option<String> = "Mortgage1InterestChangeFrequency" => string,
        mortgage1interest_margin: Option<i32> = "Mortgage1InterestMargin" => i32,
        mortgage1interest_index: Option<BigDecimal> = "Mortgage1InterestIndex" => decimal,
        mortgage1interest_rate_max: Option<BigDecimal> = "Mortgage1InterestRateMax" => decimal,
        mortgage1adjustable_rate_index: Option<String> = "Mortgage1AdjustableRateIndex" => string,
        mortgage1interest_only_flag: Option<bool> = "Mortgage1InterestOnlyFlag" => yn_bool,
        mortgage1interest_only_period: Option<String> = "Mortgage1InterestOnlyPeriod" => string,
        mortgage2document_number_formatted: Option<String> = "Mortgage2DocumentNumberFormatted" => string,
        mortgage2document_number_legacy: Option<String> = "Mortgage2DocumentNumberLegacy" => string,
        mortgage2instrument_number: Option<String> = "Mortgage2InstrumentNumber" => string,
        mortgage2book: Option<String> = "Mortgage2Book" => string,
        mortgage2page: Option<String> = "Mortgage2Page" => string,
        mortgage2recording_date: Option<NaiveDate> = "Mortgage2RecordingDate" => date_iso,
        mortgage2type: Option<String> = "Mortgage2Type" => string,
        mortgage2amount: Option<i32> = "Mortgage2Amount" => i32,
        mortgage2lender_code: Option<i32> = "Mortgage2LenderCode" => i32,
        mortgage2lender_name_full_standardized: Option<String> = "Mortgage2LenderNameFullStandardized" => string,
        mortgage2lender_name_first: Option<String> = "Mortgage2LenderNameFirst" => string,
        mortgage2lender_name_last: Option<String> = "Mortgage2LenderNameLast" => string,
        mortgage2lender_address: Option<String> = "Mortgage2LenderAddress" => string,
        mortgage2lender_address_city: Option<String> = "Mortgage2LenderAddressCity" => string,
        mortgage2lender_address_state: Option<String> = "Mortgage2LenderAddressState" => string,
        mortgage2lender_address_zip: Option<String> = "Mortgage2LenderAddressZIP" => string,
        mortgage2lender_address_zip4: Option<String> = "Mortgage2LenderAddressZIP4" => string,
        mortgage2lender_info_entity_classification: Option<String> = "Mortgage2LenderInfoEntityClassification" => string,
        mortgage2lender_info_seller_carry_back_flag: Option<bool> = "Mortgage2LenderInfoSellerCarryBackFlag" => yn_bool,
        mortgage2term: Option<i32> = "Mortgage2Term" => i32,
        mortgage2term_type: Option<String> = "Mortgage2TermType" => string,
        mortgage2term_date: Option<NaiveDate> = "Mortgage2TermDate" => date_iso,
        mortgage2info_prepayment_penalty_flag: Option<bool> = "Mortgage2InfoPrepaymentPenaltyFlag" => yn_bool,
        mortgage2info_prepayment_term: Option<String> = "Mortgage2InfoPrepaymentTerm" => string,
        mortgage2interest_rate_type: Option<String> = "Mortgage2InterestRateType" => string,
        mortgage2interest_rate: Option<BigDecimal> = "Mortgage2InterestRate" => decimal,
        mortgage2interest_type_initial: Option<String> = "Mortgage2InterestTypeInitial" => string,
        mortgage2fixed_step_conversion_rate: Option<String> = "Mortgage2FixedStepConversionRate" => string,
        mortgage2document_info_rider_adjustable_rate_flag: Option<bool> = "Mortgage2DocumentInfoRiderAdjustableRateFlag" => yn_bool,
        mortgage2info_interest_type_change_year: Option<i32> = "Mortgage2InfoInterestTypeChangeYear" => i32,
        mortgage2info_interest_type_change_month: Option<i32> = "Mortgage2InfoInterestTypeChangeMonth" => i32,
        mortgage2info_interest_type_change_day: Option<i32> = "Mortgage2InfoInterestTypeChangeDay" => i32,
        mortgage2interest_rate_min_first_change_rate_conversion: Option<BigDecimal> = "Mortgage2InterestRateMinFirstChangeRateConversion" => decimal,
        mortgage2interest_rate_max_first_change_rate_conversion: Option<BigDecimal> = "Mortgage2InterestRateMaxFirstChangeRateConversion" => decimal,
        mortgage2interest_change_frequency: Option<String> = "Mortgage2InterestChangeFrequency" => string,
        mortgage2interest_margin: Option<i32> = "Mortgage2InterestMargin" => i32,
        mortgage2interest_index: Option<BigDecimal> = "Mortgage2InterestIndex" => decimal,
        mortgage2interest_rate_max: Option<BigDecimal> = "Mortgage2InterestRateMax" => decimal,
        mortgage2adjustable_rate_index: Option<String> = "Mortgage2AdjustableRateIndex" => string,
        mortgage2interest_only_flag: Option<bool> = "Mortgage2InterestOnlyFlag" => yn_bool,
        mortgage2interest_only_period: Option<String> = "Mortgage2InterestOnlyPeriod" => string,
        transfer_info_purchase_down_payment: Option<i32> = "TransferInfoPurchaseDownPayment" => i32,
        transfer_info_purchase_loan_to_value: Option<BigDecimal> = "TransferInfoPurchaseLoanToValue" => decimal,
        last_updated: Option<NaiveDate> = "LastUpdated" => date_iso,
        publication_date: Option<NaiveDate> = "PublicationDate" => date_iso,
    }
}
