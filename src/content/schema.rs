/// Catalog layout version. JSON catalogs and the `content_meta` table in a
/// content database must both carry this value.
pub const CONTENT_SCHEMA_VERSION: u32 = 1;

/// Version tag of the shipped content pack.
pub const CONTENT_VERSION: &str = "core-1.0.0";

/// Locale content text is authored in.
pub const DEFAULT_LOCALE: &str = "en";
