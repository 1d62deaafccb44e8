//! Identifier types for job-board records.
//!
//! Rows in the relational store are keyed by `SQLite` integer rowids. Each table gets its own
//! transparent newtype so a job id can never be passed where a user id is expected.

use core::fmt;
use core::str::FromStr;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Declare an integer row id newtype with a consistent API.
macro_rules! define_row_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw row id.
            #[inline]
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Extract the raw row id.
            #[inline]
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

define_row_id!(
    /// Identifier of a user account (job seeker or recruiter).
    UserId
);

define_row_id!(
    /// Identifier of a job posting.
    JobId
);

define_row_id!(
    /// Identifier of a skill vocabulary entry.
    SkillId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: JobId = " 42 ".parse().unwrap();
        assert_eq!(id, JobId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(), 7);
    }
}
