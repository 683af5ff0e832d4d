//! # Provider — Built-In Offline Metadata Provider
//!
//! A self-contained [`MetadataProvider`](crate::MetadataProvider) backed by a
//! small static region table, so the analyzer works without a network or an
//! external telephony library. Coverage is deliberately narrow: the regions
//! the generator ships profiles for, plus the NANP and the UK for variety.
//! Display strings are in the target locale (Spanish), matching what the
//! analyzer's records expect from any provider.
//!
//! Parsing accepts `+<country code><national number>` with spaces, hyphens,
//! dots, and parentheses as separators; everything downstream operates on the
//! canonical `+<digits>` form that `parse` returns.

use crate::{MetadataProvider, ParseFailure, ParsedNumber, ProviderFault};

struct Region {
    /// Calling-code digits, without the leading `+`.
    code: &'static str,
    name: &'static str,
    /// Exact national-number digit count considered valid.
    valid_national_len: usize,
    /// Leading digits a valid national number may start with (empty = any
    /// nonzero digit).
    valid_leading: &'static [u8],
    mobile_prefixes: &'static [&'static str],
    toll_free_prefixes: &'static [&'static str],
    premium_prefixes: &'static [&'static str],
    /// Region where mobile and fixed numbers are indistinguishable by prefix.
    fixed_or_mobile: bool,
    /// Longest-prefix carrier table over the national number.
    carriers: &'static [(&'static str, &'static str)],
    time_zones: &'static [&'static str],
}

static REGIONS: &[Region] = &[
    Region {
        code: "34",
        name: "España",
        valid_national_len: 9,
        valid_leading: b"6789",
        mobile_prefixes: &["6", "7"],
        toll_free_prefixes: &["800", "900"],
        premium_prefixes: &["803", "806", "807", "905"],
        fixed_or_mobile: false,
        carriers: &[
            ("60", "Movistar"),
            ("61", "Movistar"),
            ("62", "Vodafone"),
            ("63", "Orange"),
            ("64", "Yoigo"),
            ("65", "Vodafone"),
            ("66", "Orange"),
            ("67", "Movistar"),
            ("68", "Vodafone"),
            ("69", "Movistar"),
            ("7", "Digi"),
        ],
        time_zones: &["Atlantic/Canary", "Europe/Madrid"],
    },
    Region {
        code: "54",
        name: "Argentina",
        valid_national_len: 10,
        valid_leading: &[],
        mobile_prefixes: &["9"],
        toll_free_prefixes: &["800"],
        premium_prefixes: &["600"],
        fixed_or_mobile: false,
        carriers: &[("911", "Movistar"), ("9", "Personal")],
        time_zones: &["America/Argentina/Buenos_Aires"],
    },
    Region {
        code: "52",
        name: "México",
        valid_national_len: 10,
        valid_leading: &[],
        mobile_prefixes: &[],
        toll_free_prefixes: &["800"],
        premium_prefixes: &["900"],
        fixed_or_mobile: true,
        carriers: &[("55", "Telcel"), ("33", "Telcel"), ("81", "AT&T")],
        time_zones: &["America/Mexico_City"],
    },
    Region {
        code: "57",
        name: "Colombia",
        valid_national_len: 10,
        valid_leading: &[],
        mobile_prefixes: &["3"],
        toll_free_prefixes: &["800"],
        premium_prefixes: &[],
        fixed_or_mobile: false,
        carriers: &[("30", "Claro"), ("31", "Tigo"), ("32", "Movistar")],
        time_zones: &["America/Bogota"],
    },
    Region {
        code: "44",
        name: "Reino Unido",
        valid_national_len: 10,
        valid_leading: &[],
        mobile_prefixes: &["7"],
        toll_free_prefixes: &["800", "808"],
        premium_prefixes: &["9"],
        fixed_or_mobile: false,
        carriers: &[("77", "Vodafone"), ("79", "O2")],
        time_zones: &["Europe/London"],
    },
    Region {
        code: "1",
        name: "Estados Unidos",
        valid_national_len: 10,
        valid_leading: b"23456789",
        mobile_prefixes: &[],
        toll_free_prefixes: &["800", "833", "844", "855", "866", "877", "888"],
        premium_prefixes: &["900"],
        fixed_or_mobile: true,
        carriers: &[],
        time_zones: &[
            "America/New_York",
            "America/Chicago",
            "America/Denver",
            "America/Los_Angeles",
        ],
    },
];

/// Longest calling-code match over the full digit string.
fn match_region(digits: &str) -> Option<&'static Region> {
    REGIONS
        .iter()
        .filter(|r| digits.starts_with(r.code))
        .max_by_key(|r| r.code.len())
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '(' | ')' | '.')
}

/// Space-separated groups of three digits, remainder on the last group.
fn grouped(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        OfflineProvider
    }

    /// Split a canonical `+<digits>` string into its region and national
    /// number. Only strings produced by [`parse`](MetadataProvider::parse)
    /// are canonical; anything else is a caller bug surfaced as a fault.
    fn split_canonical<'c>(
        &self,
        canonical: &'c str,
    ) -> Result<(&'static Region, &'c str), ProviderFault> {
        let not_canonical = || ProviderFault {
            message: format!("{:?} is not a canonical +<digits> number", canonical),
        };
        let digits = canonical.strip_prefix('+').ok_or_else(not_canonical)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(not_canonical());
        }
        let region = match_region(digits).ok_or_else(|| ProviderFault {
            message: format!("no metadata for calling code of {:?}", canonical),
        })?;
        let national = &digits[region.code.len()..];
        if national.is_empty() {
            return Err(not_canonical());
        }
        Ok((region, national))
    }
}

impl MetadataProvider for OfflineProvider {
    fn parse(&self, raw: &str) -> Result<ParsedNumber, ParseFailure> {
        let trimmed = raw.trim();
        let rest = trimmed.strip_prefix('+').ok_or_else(|| ParseFailure {
            reason: "missing international prefix (expected +<country code>...)".into(),
        })?;

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if !is_separator(c) {
                return Err(ParseFailure {
                    reason: format!("unexpected character {:?}", c),
                });
            }
        }
        if digits.is_empty() {
            return Err(ParseFailure {
                reason: "no digits after '+'".into(),
            });
        }

        let region = match_region(&digits).ok_or_else(|| ParseFailure {
            reason: "unrecognized country calling code".into(),
        })?;
        let national = &digits[region.code.len()..];
        if national.is_empty() {
            return Err(ParseFailure {
                reason: format!("no national number after +{}", region.code),
            });
        }

        let national_fmt = grouped(national);
        Ok(ParsedNumber {
            canonical: format!("+{}", digits),
            international: format!("+{} {}", region.code, national_fmt),
            national: national_fmt,
            calling_code: region
                .code
                .parse()
                .expect("region table calling codes are numeric"),
        })
    }

    fn is_valid(&self, canonical: &str) -> Result<bool, ProviderFault> {
        let (region, national) = self.split_canonical(canonical)?;
        if national.len() != region.valid_national_len {
            return Ok(false);
        }
        let leading = national.as_bytes()[0];
        if leading == b'0' {
            return Ok(false);
        }
        Ok(region.valid_leading.is_empty() || region.valid_leading.contains(&leading))
    }

    fn is_possible(&self, canonical: &str) -> Result<bool, ProviderFault> {
        let (region, national) = self.split_canonical(canonical)?;
        Ok(national.len() >= 4 && region.code.len() + national.len() <= 15)
    }

    fn number_type(&self, canonical: &str) -> Result<String, ProviderFault> {
        let (region, national) = self.split_canonical(canonical)?;
        if national.len() != region.valid_national_len {
            return Ok("unknown".into());
        }
        let starts = |prefixes: &[&str]| prefixes.iter().any(|p| national.starts_with(p));
        let label = if starts(region.toll_free_prefixes) {
            "toll_free"
        } else if starts(region.premium_prefixes) {
            "premium_rate"
        } else if starts(region.mobile_prefixes) {
            "mobile"
        } else if region.fixed_or_mobile {
            "fixed_line_or_mobile"
        } else {
            "fixed_line"
        };
        Ok(label.into())
    }

    fn country_for(&self, canonical: &str) -> Result<String, ProviderFault> {
        let (region, _) = self.split_canonical(canonical)?;
        Ok(region.name.into())
    }

    fn carrier_for(&self, canonical: &str) -> Result<String, ProviderFault> {
        let (region, national) = self.split_canonical(canonical)?;
        let carrier = region
            .carriers
            .iter()
            .filter(|(prefix, _)| national.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, name)| *name)
            .unwrap_or("");
        Ok(carrier.into())
    }

    fn time_zones_for(&self, canonical: &str) -> Result<Vec<String>, ProviderFault> {
        let (region, _) = self.split_canonical(canonical)?;
        Ok(region.time_zones.iter().map(|z| z.to_string()).collect())
    }
}
