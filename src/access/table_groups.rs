use crate::constants::*;
use crate::DebounceTier;
use crate::QueryKey;

/// How one table's changes propagate into the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableGroup {
    /// Logical query names that semantically depend on the table
    pub queries: &'static [&'static str],
    pub tier: DebounceTier,
}

/// Fan-out table; hand-maintained, checked by `every_known_table_has_a_group`.
pub fn group_for(table: &str) -> Option<TableGroup> {
    use DebounceTier::*;

    let group = |queries: &'static [&'static str], tier: DebounceTier| TableGroup { queries, tier };

    Some(match table {
        ROOMS => group(&[Q_ROOMS, Q_ROOM_AVAILABILITY, Q_ROOM_TYPES], Instant),
        RESERVATIONS => group(&[Q_RESERVATIONS, Q_ROOM_AVAILABILITY, Q_ROOMS, Q_OVERVIEW], Instant),
        ROOM_TYPES => group(&[Q_ROOM_TYPES, Q_ROOM_AVAILABILITY], Normal),
        GUESTS => group(&[Q_GUESTS, Q_RESERVATIONS], Normal),

        PAYMENTS => group(&[Q_PAYMENTS, Q_FOLIOS, Q_BILLING, Q_ROOMS, Q_OVERVIEW], Slow),
        FOLIOS => group(&[Q_FOLIOS, Q_BILLING, Q_PAYMENTS], Slow),
        FOLIO_CHARGES => group(&[Q_FOLIO_CHARGES, Q_FOLIOS, Q_BILLING], Slow),

        HOUSEKEEPING_TASKS => group(&[Q_HOUSEKEEPING_TASKS, Q_HOUSEKEEPING_STATS, Q_ROOMS], Fast),
        MAINTENANCE_REQUESTS => group(&[Q_MAINTENANCE_REQUESTS, Q_ROOMS], Normal),
        STAFF_NOTIFICATIONS => group(&[Q_STAFF_NOTIFICATIONS], Fast),

        GUEST_REQUESTS => group(&[Q_GUEST_REQUESTS, Q_STAFF_NOTIFICATIONS, Q_OVERVIEW], Fast),
        QR_ORDERS => group(&[Q_QR_ORDERS, Q_POS_ORDERS, Q_KITCHEN_QUEUE], Fast),
        GUEST_MESSAGES => group(&[Q_GUEST_MESSAGES], Fast),

        MENU_ITEMS => group(&[Q_MENU_ITEMS, Q_MENU], Normal),
        MENU_CATEGORIES => group(&[Q_MENU], Normal),
        POS_ORDERS => group(&[Q_POS_ORDERS, Q_KITCHEN_QUEUE], Fast),
        POS_PAYMENTS => group(&[Q_POS_PAYMENTS, Q_POS_ORDERS, Q_BILLING], Slow),

        _ => return None,
    })
}

/// Cache keys to invalidate for a change on `table`, plus the tier to use.
///
/// A table with no group entry invalidates only its own key at NORMAL tier.
pub fn query_keys_for(
    table: &str,
    tenant_id: &str,
) -> (Vec<QueryKey>, DebounceTier) {
    match group_for(table) {
        Some(group) => (
            group
                .queries
                .iter()
                .map(|name| QueryKey::new(*name, tenant_id))
                .collect(),
            group.tier,
        ),
        None => (vec![QueryKey::new(table, tenant_id)], DebounceTier::Normal),
    }
}

/// Keys refreshed proactively when the host comes back online
pub fn critical_query_keys(tenant_id: &str) -> Vec<QueryKey> {
    CRITICAL_QUERIES
        .iter()
        .map(|name| QueryKey::new(*name, tenant_id))
        .collect()
}
