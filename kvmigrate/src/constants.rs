//! Shared constants for the migration.

/// Name of the configuration file searched for from the working directory upwards.
pub const CONFIG_FILENAME: &str = ".kvmigrate.toml";

/// Target used when neither the command line nor the configuration names one.
pub const DEFAULT_TARGET: &str = "supabase/functions/server/index.tsx";

/// Receiver whose calls get wrapped.
pub const DEFAULT_RECEIVER: &str = "kv";

/// Receiver that adds retry behaviour around the original one.
pub const DEFAULT_WRAPPER: &str = "kvWithRetry";

/// Text that must precede the call for it to be rewritten.
pub const DEFAULT_PREFIX: &str = "await ";

/// Methods rewritten by default, in display order.
pub const DEFAULT_METHODS: [&str; 6] = ["get", "set", "del", "mget", "mset", "getByPrefix"];

/// Delimiter that must follow the method name.
pub const CALL_DELIMITER: &str = "(";
