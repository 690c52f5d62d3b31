//! Personality type codes

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// One of the 16 four-letter personality codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PersonalityType {
    Enfp,
    Enfj,
    Entp,
    Entj,
    Infp,
    Infj,
    Intp,
    Intj,
    Esfp,
    Esfj,
    Estp,
    Estj,
    Isfp,
    Isfj,
    Istp,
    Istj,
}

impl PersonalityType {
    pub const ALL: [PersonalityType; 16] = [
        PersonalityType::Enfp,
        PersonalityType::Enfj,
        PersonalityType::Entp,
        PersonalityType::Entj,
        PersonalityType::Infp,
        PersonalityType::Infj,
        PersonalityType::Intp,
        PersonalityType::Intj,
        PersonalityType::Esfp,
        PersonalityType::Esfj,
        PersonalityType::Estp,
        PersonalityType::Estj,
        PersonalityType::Isfp,
        PersonalityType::Isfj,
        PersonalityType::Istp,
        PersonalityType::Istj,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PersonalityType::Enfp => "ENFP",
            PersonalityType::Enfj => "ENFJ",
            PersonalityType::Entp => "ENTP",
            PersonalityType::Entj => "ENTJ",
            PersonalityType::Infp => "INFP",
            PersonalityType::Infj => "INFJ",
            PersonalityType::Intp => "INTP",
            PersonalityType::Intj => "INTJ",
            PersonalityType::Esfp => "ESFP",
            PersonalityType::Esfj => "ESFJ",
            PersonalityType::Estp => "ESTP",
            PersonalityType::Estj => "ESTJ",
            PersonalityType::Isfp => "ISFP",
            PersonalityType::Isfj => "ISFJ",
            PersonalityType::Istp => "ISTP",
            PersonalityType::Istj => "ISTJ",
        }
    }

    /// Offset into the 28-day personal cycle.
    pub fn cycle_offset(&self) -> i64 {
        match self {
            PersonalityType::Enfp => 0,
            PersonalityType::Enfj => 3,
            PersonalityType::Entp => 6,
            PersonalityType::Entj => 9,
            PersonalityType::Infp => 12,
            PersonalityType::Infj => 15,
            PersonalityType::Intp => 18,
            PersonalityType::Intj => 21,
            PersonalityType::Esfp => 1,
            PersonalityType::Esfj => 4,
            PersonalityType::Estp => 7,
            PersonalityType::Estj => 10,
            PersonalityType::Isfp => 13,
            PersonalityType::Isfj => 16,
            PersonalityType::Istp => 19,
            PersonalityType::Istj => 22,
        }
    }
}

impl AsRef<str> for PersonalityType {
    fn as_ref(&self) -> &str {
        self.code()
    }
}

impl Display for PersonalityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PersonalityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        PersonalityType::ALL
            .into_iter()
            .find(|t| t.code() == upper)
            .ok_or_else(|| anyhow::anyhow!("Invalid personality type: {}", s))
    }
}

impl TryFrom<String> for PersonalityType {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PersonalityType> for String {
    fn from(value: PersonalityType) -> Self {
        value.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("intj".parse::<PersonalityType>().unwrap(), PersonalityType::Intj);
        assert_eq!(" EnFp ".parse::<PersonalityType>().unwrap(), PersonalityType::Enfp);
        assert!("XXXX".parse::<PersonalityType>().is_err());
        assert!("".parse::<PersonalityType>().is_err());
    }

    #[test]
    fn test_codes_and_offsets_are_distinct() {
        let codes: HashSet<_> = PersonalityType::ALL.iter().map(|t| t.code()).collect();
        let offsets: HashSet<_> = PersonalityType::ALL.iter().map(|t| t.cycle_offset()).collect();
        assert_eq!(codes.len(), 16);
        assert_eq!(offsets.len(), 16);
        assert!(offsets.iter().all(|o| (0..=22).contains(o)));
    }

    #[test]
    fn test_serde_uses_code_string() {
        let json = serde_json::to_string(&PersonalityType::Istj).unwrap();
        assert_eq!(json, "\"ISTJ\"");
        let parsed: PersonalityType = serde_json::from_str("\"isfp\"").unwrap();
        assert_eq!(parsed, PersonalityType::Isfp);
        assert!(serde_json::from_str::<PersonalityType>("\"ABCD\"").is_err());
    }
}
