//! Reserved words of the expression language.
//!
//! Keywords are not parsed on their own: [`parse_identifier`](super::token)
//! reads a full word first and then checks it against [`Keyword`], so a
//! variable such as `android` is never split into `and` + `roid`.

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    And,
    Or,
    Not,
    #[strum(to_string = "True", serialize = "true")]
    True,
    #[strum(to_string = "False", serialize = "false")]
    False,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_both_boolean_spellings() {
        assert_eq!(Keyword::from_str("True").unwrap(), Keyword::True);
        assert_eq!(Keyword::from_str("true").unwrap(), Keyword::True);
        assert_eq!(Keyword::from_str("false").unwrap(), Keyword::False);
        assert_eq!(Keyword::True.to_string(), "True");
    }

    #[test]
    fn test_keywords_round_trip_through_display() {
        for keyword in Keyword::iter() {
            assert_eq!(Keyword::from_str(&keyword.to_string()).unwrap(), keyword);
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(Keyword::from_str("AND").is_err());
    }
}
