use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Staff capabilities the dashboard gates its screens on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    #[serde(rename = "reservations.view")]
    ViewReservations,
    #[serde(rename = "reservations.confirm_payment")]
    ConfirmPayment,
    #[serde(rename = "reservations.cancel")]
    CancelReservation,
    #[serde(rename = "front_desk.check_in")]
    CheckIn,
    #[serde(rename = "front_desk.check_out")]
    CheckOut,
    #[serde(rename = "housekeeping.update")]
    UpdateHousekeeping,
    #[serde(rename = "inventory.view")]
    ViewInventory,
    #[serde(rename = "folio.view")]
    ViewFolio,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ViewReservations,
        Permission::ConfirmPayment,
        Permission::CancelReservation,
        Permission::CheckIn,
        Permission::CheckOut,
        Permission::UpdateHousekeeping,
        Permission::ViewInventory,
        Permission::ViewFolio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewReservations => "reservations.view",
            Permission::ConfirmPayment => "reservations.confirm_payment",
            Permission::CancelReservation => "reservations.cancel",
            Permission::CheckIn => "front_desk.check_in",
            Permission::CheckOut => "front_desk.check_out",
            Permission::UpdateHousekeeping => "housekeeping.update",
            Permission::ViewInventory => "inventory.view",
            Permission::ViewFolio => "folio.view",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Role → permission table, built once at startup from configuration.
///
/// `"*"` in a role's list grants every permission.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    roles: HashMap<String, BTreeSet<Permission>>,
}

impl AccessPolicy {
    pub fn from_roles(roles: &HashMap<String, Vec<String>>) -> CoreResult<Self> {
        let mut table = HashMap::with_capacity(roles.len());

        for (role, names) in roles {
            let mut granted = BTreeSet::new();
            for name in names {
                if name == "*" {
                    granted.extend(Permission::ALL);
                    continue;
                }
                let permission = name.parse::<Permission>().map_err(|permission| {
                    CoreError::UnknownPermission {
                        role: role.clone(),
                        permission,
                    }
                })?;
                granted.insert(permission);
            }
            table.insert(role.to_lowercase(), granted);
        }

        Ok(Self { roles: table })
    }

    /// Role names are matched case-insensitively; unknown roles get nothing.
    pub fn is_allowed(&self, role: &str, permission: Permission) -> bool {
        self.roles
            .get(&role.to_lowercase())
            .is_some_and(|granted| granted.contains(&permission))
    }

    pub fn permissions_for(&self, role: &str) -> Option<Vec<Permission>> {
        self.roles
            .get(&role.to_lowercase())
            .map(|granted| granted.iter().copied().collect())
    }
}
