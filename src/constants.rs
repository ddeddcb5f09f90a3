// -
// Backend table names observed by the realtime layer

pub const ROOMS: &str = "rooms";
pub const ROOM_TYPES: &str = "room_types";
pub const RESERVATIONS: &str = "reservations";
pub const GUESTS: &str = "guests";

/// Billing
pub const FOLIOS: &str = "folios";
pub const FOLIO_CHARGES: &str = "folio_charges";
pub const PAYMENTS: &str = "payments";

/// Operations
pub const HOUSEKEEPING_TASKS: &str = "housekeeping_tasks";
pub const MAINTENANCE_REQUESTS: &str = "maintenance_requests";
pub const STAFF_NOTIFICATIONS: &str = "staff_notifications";

/// QR guest self-service
pub const GUEST_REQUESTS: &str = "qr_requests";
pub const QR_ORDERS: &str = "qr_orders";
pub const GUEST_MESSAGES: &str = "guest_messages";

/// Point of sale
pub const MENU_ITEMS: &str = "menu_items";
pub const MENU_CATEGORIES: &str = "menu_categories";
pub const POS_ORDERS: &str = "pos_orders";
pub const POS_PAYMENTS: &str = "pos_payments";

pub const ALL_TABLES: &[&str] = &[
    ROOMS,
    ROOM_TYPES,
    RESERVATIONS,
    GUESTS,
    FOLIOS,
    FOLIO_CHARGES,
    PAYMENTS,
    HOUSEKEEPING_TASKS,
    MAINTENANCE_REQUESTS,
    STAFF_NOTIFICATIONS,
    GUEST_REQUESTS,
    QR_ORDERS,
    GUEST_MESSAGES,
    MENU_ITEMS,
    MENU_CATEGORIES,
    POS_ORDERS,
    POS_PAYMENTS,
];

/// Tables that are never coalesced: latency sensitive, and each insert
/// triggers a user-facing notification.
pub const DEFAULT_COALESCE_ALLOW_LIST: &[&str] = &[
    GUEST_REQUESTS,
    QR_ORDERS,
    GUEST_MESSAGES,
    STAFF_NOTIFICATIONS,
    PAYMENTS,
    POS_ORDERS,
];

// -
// Logical query names used as the first segment of a cache key

pub const Q_ROOMS: &str = "rooms";
pub const Q_ROOM_AVAILABILITY: &str = "room-availability";
pub const Q_ROOM_TYPES: &str = "room-types";
pub const Q_RESERVATIONS: &str = "reservations";
pub const Q_GUESTS: &str = "guests";
pub const Q_OVERVIEW: &str = "overview";
pub const Q_FOLIOS: &str = "folios";
pub const Q_FOLIO_CHARGES: &str = "folio-charges";
pub const Q_PAYMENTS: &str = "payments";
pub const Q_BILLING: &str = "billing";
pub const Q_HOUSEKEEPING_TASKS: &str = "housekeeping-tasks";
pub const Q_HOUSEKEEPING_STATS: &str = "housekeeping-stats";
pub const Q_MAINTENANCE_REQUESTS: &str = "maintenance-requests";
pub const Q_STAFF_NOTIFICATIONS: &str = "staff-notifications";
pub const Q_GUEST_REQUESTS: &str = "qr-requests";
pub const Q_QR_ORDERS: &str = "qr-orders";
pub const Q_GUEST_MESSAGES: &str = "guest-messages";
pub const Q_MENU: &str = "menu";
pub const Q_MENU_ITEMS: &str = "menu-items";
pub const Q_POS_ORDERS: &str = "pos-orders";
pub const Q_POS_PAYMENTS: &str = "pos-payments";
pub const Q_KITCHEN_QUEUE: &str = "kitchen-queue";

/// Invalidated proactively when the host comes back online: the queries most
/// likely to be stale after an outage.
pub const CRITICAL_QUERIES: &[&str] = &[
    Q_ROOMS,
    Q_RESERVATIONS,
    Q_ROOM_AVAILABILITY,
    Q_GUEST_REQUESTS,
    Q_STAFF_NOTIFICATIONS,
    Q_OVERVIEW,
];

/// Server-side filter column carrying the tenant id on every row
pub(crate) const TENANT_COLUMN: &str = "tenant_id";

/// Persisted value meaning "notification permission granted"
pub(crate) const PERMISSION_GRANTED: &str = "granted";

/// Upper bound for every configured delay, timeout and backoff (one day).
/// Timer wheels reject deadlines this far out long before `u64` overflows.
pub const MAX_DELAY_MS: u64 = 24 * 60 * 60 * 1000;
