pub mod preparedness {
    /// Energy requirement per person per day.
    pub const KCAL_PER_PERSON_PER_DAY: f64 = 2000.0;

    /// Drinking/cooking water requirement per person per day, in litres.
    pub const LITRES_PER_PERSON_PER_DAY: f64 = 3.0;

    pub const SHORT_HORIZON_DAYS: f64 = 3.0;

    pub const FULL_HORIZON_DAYS: f64 = 7.0;

    /// Category names that must all be stocked for the readiness check to
    /// consider the household equipped, matched exactly against category
    /// names (not item names).
    pub const REQUIRED_CATEGORIES: &[&str] = &["Førstehjelp", "Gassbrenner"];

    pub const MSG_NO_MEMBERS: &str = "Husstanden har ingen medlemmer";
    pub const MSG_BELOW_3_DAYS: &str = "Lageret dekker ikke 3 dager med mat og vann";
    pub const MSG_BELOW_7_DAYS: &str = "Lageret dekker ikke 7 dager med mat og vann";
    pub const MSG_COVERED: &str = "Lageret dekker minst 7 dager med mat og vann";
}

pub mod join_code {
    pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    pub const LENGTH: usize = 8;

    pub const MAX_ATTEMPTS: u32 = 1000;

    // TODO: confirm the intended lifetime with product; this literal
    // evaluates to ~2.4 hours, not 24 hours.
    pub const TTL_MS: i64 = 24 * 60 * 60 * 100;
}

/// The recommended self-preparedness supplies checked against household
/// inventories. Matching is a case-insensitive substring test on item
/// names; entries flagged per-person require one unit per household member.
pub const ESSENTIAL_SUPPLIES: &[(&str, bool)] = &[
    ("varme klær", true),
    ("pledd", true),
    ("dyne", true),
    ("sovepose", true),
    ("førstehjelp", false),
    ("lommelykt", false),
    ("stearinlys", false),
    ("fyrstikker", false),
    ("gassbrenner", false),
    ("brennstoff", false),
    ("dab-radio", false),
    ("batterier", false),
    ("jodtabletter", false),
    ("våtservietter", false),
    ("kontanter", false),
];

pub mod email_token {
    pub const VERIFY_PURPOSE: &str = "verify-email";

    pub const RESET_PURPOSE: &str = "reset-password";

    pub const TTL_HOURS: i64 = 24;
}

pub mod news {
    /// Articles older than this are removed by the expiry sweep.
    pub const MAX_AGE_DAYS: i64 = 30;
}
