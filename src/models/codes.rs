//! Enumerations stored as `SMALLINT` codes.
//!
//! On the wire they serialize as snake_case names; in the database as the
//! numeric code listed next to each variant.

use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::SmallInt;
use std::io::Write;

macro_rules! smallint_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
            diesel::AsExpression,
            diesel::FromSqlRow,
        )]
        #[diesel(sql_type = SmallInt)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> i16 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn from_code(code: i16) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl ToSql<SmallInt, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(&self.code().to_be_bytes())?;
                Ok(serialize::IsNull::No)
            }
        }

        impl FromSql<SmallInt, Pg> for $name {
            fn from_sql(
                bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
            ) -> deserialize::Result<Self> {
                let code = <i16 as FromSql<SmallInt, Pg>>::from_sql(bytes)?;
                $name::from_code(code).ok_or_else(|| {
                    format!("Unrecognized {} code: {}", stringify!($name), code).into()
                })
            }
        }
    };
}

smallint_enum! {
    UserRole {
        Normal = 1,
        Vip = 2,
        Admin = 3,
        Distributor = 4,
    }
}

smallint_enum! {
    /// Kind of balance change recorded in `credit_records`
    CreditRecordType {
        Recharge = 1,
        Consumption = 2,
        Reward = 3,
        Expired = 4,
        Refund = 5,
    }
}

smallint_enum! {
    /// What one unit of a priced service measures
    ServiceUnit {
        Count = 1,
        Minute = 2,
        Char = 3,
        Second = 4,
        Token = 5,
    }
}

smallint_enum! {
    TemplateType {
        Wechat = 1,
        Unified = 2,
        Custom = 3,
    }
}

smallint_enum! {
    TemplateStatus {
        Draft = 0,
        Published = 1,
        Disabled = 2,
        Deleted = 3,
    }
}

smallint_enum! {
    Visibility {
        Private = 0,
        Public = 1,
        Shared = 2,
    }
}

smallint_enum! {
    PriceType {
        Free = 0,
        Paid = 1,
        VipOnly = 2,
    }
}

smallint_enum! {
    CommissionStatus {
        Pending = 0,
        Issued = 1,
        Withdrawn = 2,
        Rejected = 3,
        Applying = 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_code(role.code()), Some(*role));
        }
        for status in CommissionStatus::ALL {
            assert_eq!(CommissionStatus::from_code(status.code()), Some(*status));
        }
    }

    #[test]
    fn test_fixed_codes() {
        assert_eq!(UserRole::Admin.code(), 3);
        assert_eq!(CreditRecordType::Refund.code(), 5);
        assert_eq!(TemplateStatus::Deleted.code(), 3);
        assert_eq!(Visibility::Shared.code(), 2);
        assert_eq!(UserRole::from_code(0), None);
    }

    #[test]
    fn test_wire_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&PriceType::VipOnly).unwrap(), "\"vip_only\"");
        let parsed: CreditRecordType = serde_json::from_str("\"consumption\"").unwrap();
        assert_eq!(parsed, CreditRecordType::Consumption);
    }
}
