/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of items shown per section on the home overview
pub const HOME_SECTION_SIZE: i64 = 5;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - manages announcements and reads the activity log
pub const ROLE_ADMIN: &str = "admin";

/// Staff role - uploads and edits documents
pub const ROLE_STAFF: &str = "staff";

// =============================================================================
// HEADERS
// =============================================================================

/// Header carrying the shared key of the external automation tool
pub const API_KEY_HEADER: &str = "x-api-key";
