//! Internal constants for diagram rendering.

/// Public `PlantUML` server, used when no other server is configured.
pub const DEFAULT_SERVER_URL: &str = "https://www.plantuml.com/plantuml";

/// Symbols of the `PlantUML` text encoding, in 6-bit value order.
pub(crate) const PLANTUML_ALPHABET: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// JVM flag keeping `PlantUML` from touching a display.
pub(crate) const HEADLESS_FLAG: &str = "-Djava.awt.headless=true";
