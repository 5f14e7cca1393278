use serde::{Deserialize, Serialize};

pub type UserId = i32;
pub type HouseholdId = i32;
pub type ItemId = i32;
pub type ZoneId = i32;

/// Account privilege level, stored as a lowercase string column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Unknown strings fall back to the least-privileged role.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "superadmin" => Self::Superadmin,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }

    #[must_use]
    pub const fn is_superadmin(self) -> bool {
        matches!(self, Self::Superadmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Admin, Role::Superadmin] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn test_unknown_role_is_user() {
        assert_eq!(Role::parse("root"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }
}
