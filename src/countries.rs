//! # Countries — Generation Profiles per Country
//!
//! Loads per-country generation parameters (international prefix, area codes,
//! local-number digit length) from a JSON file keyed by display name, falling
//! back to a built-in default table when the file is absent. Profiles are
//! validated at load time and read-only afterwards.
//!
//! ## Config Format
//!
//! ```json
//! {
//!   "España": { "prefix": "+34", "area_codes": [91, 93], "phone_length": 8 }
//! }
//! ```
//!
//! `phone_length` may be omitted (defaults to 8). Invalid profiles — empty
//! area-code lists, a zero area code, a malformed prefix, or a length outside
//! 1..=15 — are rejected at load rather than discovered mid-generation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Generation parameters for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    /// International prefix, `+` followed by digits (e.g. `+34`).
    pub prefix: String,
    /// Area codes drawn uniformly at random, with replacement across calls.
    pub area_codes: Vec<u32>,
    /// Digit count of the local number (no leading zero).
    #[serde(default = "default_phone_length")]
    pub phone_length: u32,
}

fn default_phone_length() -> u32 {
    8
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("cannot read country config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("country config {} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("country {name:?}: prefix {prefix:?} must be '+' followed by digits")]
    BadPrefix { name: String, prefix: String },
    #[error("country {name:?}: area code list is empty")]
    EmptyAreaCodes { name: String },
    #[error("country {name:?}: area codes must be positive")]
    ZeroAreaCode { name: String },
    #[error("country {name:?}: phone_length {len} outside 1..=15")]
    BadPhoneLength { name: String, len: u32 },
}

/// Read-only registry of country profiles for the process lifetime.
#[derive(Debug, Clone)]
pub struct CountryStore {
    profiles: BTreeMap<String, CountryProfile>,
}

impl CountryStore {
    /// Load profiles from `path`, or fall back to the built-in table when the
    /// file does not exist. A file that exists but fails to parse or validate
    /// is an error — silent fallback would mask typos in a real config.
    pub fn load_or_default(path: &Path) -> Result<Self, ProfileError> {
        if !path.exists() {
            info!(path = %path.display(), "country config not found, using built-in table");
            return Ok(Self::builtin());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profiles: BTreeMap<String, CountryProfile> =
            serde_json::from_str(&raw).map_err(|source| ProfileError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_profiles(profiles)
    }

    /// Validate and wrap an already-deserialized profile map.
    pub fn from_profiles(
        profiles: BTreeMap<String, CountryProfile>,
    ) -> Result<Self, ProfileError> {
        for (name, profile) in &profiles {
            validate(name, profile)?;
        }
        Ok(CountryStore { profiles })
    }

    /// The default table shipped with the binary.
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "Argentina".to_string(),
            CountryProfile {
                prefix: "+54".into(),
                area_codes: vec![92325],
                phone_length: 8,
            },
        );
        profiles.insert(
            "México".to_string(),
            CountryProfile {
                prefix: "+52".into(),
                area_codes: vec![55, 33, 81, 777, 662, 999, 222, 333, 442],
                phone_length: 8,
            },
        );
        profiles.insert(
            "España".to_string(),
            CountryProfile {
                prefix: "+34".into(),
                area_codes: vec![91, 93, 95, 96, 98, 81, 82, 92],
                phone_length: 8,
            },
        );
        profiles.insert(
            "Colombia".to_string(),
            CountryProfile {
                prefix: "+57".into(),
                area_codes: vec![1, 2, 3, 4, 5, 7, 8, 9],
                phone_length: 8,
            },
        );
        CountryStore { profiles }
    }

    pub fn get(&self, country: &str) -> Option<&CountryProfile> {
        self.profiles.get(country)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.profiles.contains_key(country)
    }

    /// Country display names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate(name: &str, profile: &CountryProfile) -> Result<(), ProfileError> {
    let digits = profile.prefix.strip_prefix('+');
    match digits {
        Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => {}
        _ => {
            return Err(ProfileError::BadPrefix {
                name: name.to_string(),
                prefix: profile.prefix.clone(),
            })
        }
    }
    if profile.area_codes.is_empty() {
        return Err(ProfileError::EmptyAreaCodes {
            name: name.to_string(),
        });
    }
    if profile.area_codes.contains(&0) {
        return Err(ProfileError::ZeroAreaCode {
            name: name.to_string(),
        });
    }
    if profile.phone_length == 0 || profile.phone_length > 15 {
        return Err(ProfileError::BadPhoneLength {
            name: name.to_string(),
            len: profile.phone_length,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_table_has_original_countries() {
        let store = CountryStore::builtin();
        for country in ["Argentina", "México", "España", "Colombia"] {
            assert!(store.contains(country), "missing {}", country);
        }
        let spain = store.get("España").unwrap();
        assert_eq!(spain.prefix, "+34");
        assert_eq!(spain.phone_length, 8);
        assert!(spain.area_codes.contains(&91));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let store = CountryStore::load_or_default(&dir.path().join("nope.json")).unwrap();
        assert_eq!(store.len(), CountryStore::builtin().len());
    }

    #[test]
    fn loads_profiles_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br#"{"Testland": {"prefix": "+999", "area_codes": [12, 34], "phone_length": 6}}"#,
        )
        .unwrap();

        let store = CountryStore::load_or_default(&path).unwrap();
        assert_eq!(store.len(), 1);
        let p = store.get("Testland").unwrap();
        assert_eq!(p.prefix, "+999");
        assert_eq!(p.area_codes, vec![12, 34]);
        assert_eq!(p.phone_length, 6);
    }

    #[test]
    fn phone_length_defaults_to_eight() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.json");
        std::fs::write(&path, r#"{"Testland": {"prefix": "+1", "area_codes": [5]}}"#).unwrap();

        let store = CountryStore::load_or_default(&path).unwrap();
        assert_eq!(store.get("Testland").unwrap().phone_length, 8);
    }

    #[test]
    fn malformed_json_is_an_error_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = CountryStore::load_or_default(&path).unwrap_err();
        assert!(matches!(err, ProfileError::Json { .. }));
    }

    #[test]
    fn empty_area_codes_rejected() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "X".to_string(),
            CountryProfile {
                prefix: "+1".into(),
                area_codes: vec![],
                phone_length: 8,
            },
        );
        let err = CountryStore::from_profiles(profiles).unwrap_err();
        assert!(matches!(err, ProfileError::EmptyAreaCodes { .. }));
    }

    #[test]
    fn zero_area_code_rejected() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "X".to_string(),
            CountryProfile {
                prefix: "+1".into(),
                area_codes: vec![91, 0],
                phone_length: 8,
            },
        );
        let err = CountryStore::from_profiles(profiles).unwrap_err();
        assert!(matches!(err, ProfileError::ZeroAreaCode { .. }));
    }

    #[test]
    fn bad_prefix_rejected() {
        for prefix in ["34", "+", "+3a", ""] {
            let mut profiles = BTreeMap::new();
            profiles.insert(
                "X".to_string(),
                CountryProfile {
                    prefix: prefix.into(),
                    area_codes: vec![91],
                    phone_length: 8,
                },
            );
            let err = CountryStore::from_profiles(profiles).unwrap_err();
            assert!(
                matches!(err, ProfileError::BadPrefix { .. }),
                "prefix {:?} should be rejected",
                prefix
            );
        }
    }

    #[test]
    fn phone_length_bounds_enforced() {
        for len in [0u32, 16, 100] {
            let mut profiles = BTreeMap::new();
            profiles.insert(
                "X".to_string(),
                CountryProfile {
                    prefix: "+1".into(),
                    area_codes: vec![91],
                    phone_length: len,
                },
            );
            let err = CountryStore::from_profiles(profiles).unwrap_err();
            assert!(
                matches!(err, ProfileError::BadPhoneLength { .. }),
                "length {} should be rejected",
                len
            );
        }
    }

    #[test]
    fn names_are_sorted() {
        let store = CountryStore::builtin();
        let names: Vec<&str> = store.names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
