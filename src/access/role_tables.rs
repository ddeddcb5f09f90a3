use crate::constants::*;
use crate::RoleId;

const FRONT_DESK_TABLES: &[&str] = &[
    ROOMS,
    ROOM_TYPES,
    RESERVATIONS,
    GUESTS,
    FOLIOS,
    FOLIO_CHARGES,
    PAYMENTS,
    HOUSEKEEPING_TASKS,
    GUEST_REQUESTS,
    GUEST_MESSAGES,
    STAFF_NOTIFICATIONS,
];

const HOUSEKEEPING_TABLES: &[&str] = &[ROOMS, HOUSEKEEPING_TASKS, RESERVATIONS];

const MAINTENANCE_TABLES: &[&str] = &[ROOMS, MAINTENANCE_REQUESTS, STAFF_NOTIFICATIONS];

const POS_TABLES: &[&str] = &[
    MENU_ITEMS,
    MENU_CATEGORIES,
    POS_ORDERS,
    POS_PAYMENTS,
    QR_ORDERS,
    STAFF_NOTIFICATIONS,
];

/// Tables a role is operationally allowed to observe.
///
/// Static lookup; an unknown role observes nothing, which leaves the
/// pipeline idle.
pub fn tables_for(role: &RoleId) -> &'static [&'static str] {
    match role {
        RoleId::Owner | RoleId::Manager | RoleId::SuperAdmin => ALL_TABLES,
        RoleId::FrontDesk => FRONT_DESK_TABLES,
        RoleId::Housekeeping => HOUSEKEEPING_TABLES,
        RoleId::Maintenance => MAINTENANCE_TABLES,
        RoleId::Pos => POS_TABLES,
        RoleId::Unknown(_) => &[],
    }
}

/// Union of every known table group, used when role filtering is disabled
pub fn all_tables() -> &'static [&'static str] {
    ALL_TABLES
}

/// Tables to subscribe for a role under the given filtering mode
pub fn subscribed_tables(
    role: &RoleId,
    role_filtering: bool,
) -> &'static [&'static str] {
    if role_filtering {
        tables_for(role)
    } else {
        all_tables()
    }
}
