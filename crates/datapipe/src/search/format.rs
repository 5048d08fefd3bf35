//! Display casing for address parts

const DIRECTIONALS: &[&str] = &[
    "n", "s", "e", "w", "ne", "nw", "se", "sw", "north", "south", "east", "west", "northeast", "northwest",
    "southeast", "southwest",
];

const LOWERCASE_PARTICLES: &[&str] = &["de", "del", "la", "las", "los", "von", "van", "der"];

/// Title case: a letter is uppercased when it starts the word or follows a
/// separator other than an apostrophe.
fn title(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut boundary = true;
    for c in word.chars() {
        if boundary && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        boundary = !c.is_alphanumeric() && c != '\'';
    }
    out
}

/// Proper-case a street, city or similar address part.
pub fn format_address_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let input = if input.to_uppercase() == input {
        input.to_lowercase()
    } else {
        input.to_string()
    };

    input
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();

            if DIRECTIONALS.contains(&lower.as_str()) {
                if i > 0 {
                    lower
                } else {
                    title(&lower)
                }
            } else if LOWERCASE_PARTICLES.contains(&lower.as_str()) {
                lower
            } else if let Some(rest) = lower.strip_prefix("mc") {
                format!("Mc{}", title(rest))
            } else if let Some(rest) = lower.strip_prefix("mac") {
                format!("Mac{}", title(rest))
            } else if let Some(pos) = lower.find("o'") {
                format!("O'{}", title(&lower[pos + 2..]))
            } else {
                title(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full name of a state or territory code; unknown codes come back uppercased.
pub fn state_full_name(code: &str) -> String {
    let code = code.to_uppercase();
    let name = match code.as_str() {
        "AL" => "Alabama",
        "AK" => "Alaska",
        "AZ" => "Arizona",
        "AR" => "Arkansas",
        "CA" => "California",
        "CO" => "Colorado",
        "CT" => "Connecticut",
        "DE" => "Delaware",
        "FL" => "Florida",
        "GA" => "Georgia",
        "HI" => "Hawaii",
        "ID" => "Idaho",
        "IL" => "Illinois",
        "IN" => "Indiana",
        "IA" => "Iowa",
        "KS" => "Kansas",
        "KY" => "Kentucky",
        "LA" => "Louisiana",
        "ME" => "Maine",
        "MD" => "Maryland",
        "MA" => "Massachusetts",
        "MI" => "Michigan",
        "MN" => "Minnesota",
        "MS" => "Mississippi",
        "MO" => "Missouri",
        "MT" => "Montana",
        "NE" => "Nebraska",
        "NV" => "Nevada",
        "NH" => "New Hampshire",
        "NJ" => "New Jersey",
        "NM" => "New Mexico",
        "NY" => "New York",
        "NC" => "North Carolina",
        "ND" => "North Dakota",
        "OH" => "Ohio",
        "OK" => "Oklahoma",
        "OR" => "Oregon",
        "PA" => "Pennsylvania",
        "RI" => "Rhode Island",
        "SC" => "South Carolina",
        "SD" => "South Dakota",
        "TN" => "Tennessee",
        "TX" => "Texas",
        "UT" => "Utah",
        "VT" => "Vermont",
        "VA" => "Virginia",
        "WA" => "Washington",
        "WV" => "West Virginia",
        "WI" => "Wisconsin",
        "WY" => "Wyoming",
        "AS" => "American Samoa",
        "DC" => "District of Columbia",
        "FM" => "Federated States of Micronesia",
        "GU" => "Guam",
        "MH" => "Marshall Islands",
        "MP" => "Northern Mariana Islands",
        "PW" => "Palau",
        "PR" => "Puerto Rico",
        "VI" => "Virgin Islands",
        "AA" => "Armed Forces Americas",
        "AE" => "Armed Forces Europe",
        "AP" => "Armed Forces Pacific",
        _ => return code,
    };
    name.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_input_is_title_cased() {
        assert_eq!(format_address_text("MAIN STREET"), "Main Street");
        assert_eq!(format_address_text("123RD"), "123rd");
    }

    #[test]
    fn test_directionals() {
        assert_eq!(format_address_text("NORTH MAIN"), "North Main");
        assert_eq!(format_address_text("MAIN NW"), "Main nw");
        assert_eq!(format_address_text("sw"), "Sw");
    }

    #[test]
    fn test_particles_and_prefixes() {
        assert_eq!(format_address_text("CAMINO DEL MAR"), "Camino del Mar");
        assert_eq!(format_address_text("MCKEE RD"), "McKee Rd");
        assert_eq!(format_address_text("MACARTHUR BLVD"), "MacArthur Blvd");
        assert_eq!(format_address_text("O'BRIEN WAY"), "O'Brien Way");
    }

    #[test]
    fn test_mixed_case_input_keeps_words() {
        assert_eq!(format_address_text("los Angeles"), "los Angeles");
        assert_eq!(format_address_text(""), "");
        assert_eq!(format_address_text("  ST   CLAIR  "), "St Clair");
    }

    #[test]
    fn test_state_full_name() {
        assert_eq!(state_full_name("ca"), "California");
        assert_eq!(state_full_name("PR"), "Puerto Rico");
        assert_eq!(state_full_name("ae"), "Armed Forces Europe");
        assert_eq!(state_full_name("zz"), "ZZ");
    }
}
