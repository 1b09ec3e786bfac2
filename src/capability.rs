//! Role capabilities.
//!
//! Which routes each role may reach, built once at startup and queried at
//! render time. Menus and route guards both ask this map instead of
//! hard-coding role checks inline.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::schema::Role;

/// Route identifiers the clients navigate by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteId {
    Dashboard,
    Appointments,
    MedicalRecords,
    Notifications,
    Profile,
    Instructions,
    ManageUsers,
    ManagePlans,
}

/// Role → permitted routes.
pub struct CapabilityMap {
    capabilities: HashMap<Role, HashSet<RouteId>>,
}

impl CapabilityMap {
    /// The platform's default capability assignment.
    pub fn with_defaults() -> Self {
        use RouteId::*;

        let mut capabilities = HashMap::new();
        capabilities.insert(
            Role::Patient,
            HashSet::from([Dashboard, Appointments, MedicalRecords, Notifications, Profile]),
        );
        capabilities.insert(
            Role::Doctor,
            HashSet::from([Dashboard, Appointments, Instructions, Notifications, Profile]),
        );
        capabilities.insert(
            Role::Admin,
            HashSet::from([
                Dashboard,
                Appointments,
                MedicalRecords,
                Instructions,
                Notifications,
                Profile,
                ManageUsers,
                ManagePlans,
            ]),
        );
        Self { capabilities }
    }

    /// Whether `role` may reach `route`.
    pub fn permits(&self, role: Role, route: RouteId) -> bool {
        self.capabilities
            .get(&role)
            .is_some_and(|routes| routes.contains(&route))
    }

    /// The routes `role` may reach. This is what menu rendering iterates.
    pub fn routes_for(&self, role: Role) -> HashSet<RouteId> {
        self.capabilities.get(&role).cloned().unwrap_or_default()
    }

    /// Grant an additional route to a role.
    pub fn grant(&mut self, role: Role, route: RouteId) {
        self.capabilities.entry(role).or_default().insert(route);
    }
}

impl Default for CapabilityMap {
    fn default() -> Self {
        Self::with_defaults()
    }
}
