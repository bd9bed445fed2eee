//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Every constant has an entry in [`crate::explain`].

// ── Reader (malformed input) ────────────────────────────────────────────

/// Input ended while more characters were required.
pub const READER_UNEXPECTED_END: &str = "MCF1001";
/// A specific character was required at this position.
pub const READER_EXPECTED_CHAR: &str = "MCF1002";
/// An integer was required at this position.
pub const READER_EXPECTED_INT: &str = "MCF1003";
/// A decimal number was required at this position.
pub const READER_EXPECTED_FLOAT: &str = "MCF1004";
/// `true` or `false` was required at this position.
pub const READER_EXPECTED_BOOL: &str = "MCF1005";
/// A quoted string was not closed before the end of the line.
pub const READER_UNTERMINATED_QUOTE: &str = "MCF1006";
/// A backslash escape inside a quoted string is not valid.
pub const READER_INVALID_ESCAPE: &str = "MCF1007";

// ── Tree dispatch ───────────────────────────────────────────────────────

/// Text remains after a command that accepts no further arguments.
pub const TRAILING_INPUT: &str = "MCF1101";
/// No alternative of the current command node accepted the text.
pub const EXPECTED_ALTERNATIVE: &str = "MCF1102";
/// The line ended before the command was complete.
pub const INCOMPLETE_COMMAND: &str = "MCF1103";
/// Arguments must be separated by a single space.
pub const EXPECTED_SEPARATOR: &str = "MCF1104";
/// A literal keyword did not match (never reported).
pub const LITERAL_MISMATCH: &str = "MCF1105";
/// The command tree names an argument parser this engine does not implement.
pub const UNSUPPORTED_PARSER: &str = "MCF1106";
/// The line is longer than the configured maximum and was not analyzed.
pub const LINE_TOO_LONG: &str = "MCF1107";
/// A redirect in the command tree points at a node that does not exist.
pub const INVALID_REDIRECT: &str = "MCF1108";

// ── Arguments ───────────────────────────────────────────────────────────

/// A number lies outside the range allowed by the argument.
pub const NUMBER_OUT_OF_RANGE: &str = "MCF1201";
/// A string argument was required.
pub const EXPECTED_STRING: &str = "MCF1202";
/// A resource location is malformed.
pub const INVALID_RESOURCE_LOCATION: &str = "MCF1203";
/// A resource location is not present in the argument's registry.
pub const UNKNOWN_REGISTRY_ENTRY: &str = "MCF1204";
/// A referenced function or function tag is not defined by any datapack.
pub const UNKNOWN_FUNCTION: &str = "MCF1205";
/// An entity selector or player name is malformed.
pub const INVALID_SELECTOR: &str = "MCF1206";
/// An entity selector option is not recognized.
pub const UNKNOWN_SELECTOR_OPTION: &str = "MCF1207";

// ── Structured data (SNBT) ──────────────────────────────────────────────

/// A data value was required at this position.
pub const NBT_EXPECTED_VALUE: &str = "MCF1301";
/// A compound key was required at this position.
pub const NBT_EXPECTED_KEY: &str = "MCF1302";
/// A compound declares the same key twice.
pub const NBT_DUPLICATE_KEY: &str = "MCF1303";
/// A list mixes elements of different types.
pub const NBT_MIXED_LIST: &str = "MCF1304";
/// A typed array is malformed or contains an element of the wrong type.
pub const NBT_INVALID_ARRAY: &str = "MCF1305";
/// Data is nested deeper than the configured maximum.
pub const NBT_TOO_DEEP: &str = "MCF1306";
/// A compound value was required but another type was given.
pub const NBT_EXPECTED_COMPOUND: &str = "MCF1307";

// ── File level ──────────────────────────────────────────────────────────

/// The document is not located inside a datapack's functions folder.
pub const FILE_OUTSIDE_DATAPACK: &str = "MCF1401";

/// Every diagnostic code, in declaration order.
pub const ALL: &[&str] = &[
    READER_UNEXPECTED_END,
    READER_EXPECTED_CHAR,
    READER_EXPECTED_INT,
    READER_EXPECTED_FLOAT,
    READER_EXPECTED_BOOL,
    READER_UNTERMINATED_QUOTE,
    READER_INVALID_ESCAPE,
    TRAILING_INPUT,
    EXPECTED_ALTERNATIVE,
    INCOMPLETE_COMMAND,
    EXPECTED_SEPARATOR,
    LITERAL_MISMATCH,
    UNSUPPORTED_PARSER,
    LINE_TOO_LONG,
    INVALID_REDIRECT,
    NUMBER_OUT_OF_RANGE,
    EXPECTED_STRING,
    INVALID_RESOURCE_LOCATION,
    UNKNOWN_REGISTRY_ENTRY,
    UNKNOWN_FUNCTION,
    INVALID_SELECTOR,
    UNKNOWN_SELECTOR_OPTION,
    NBT_EXPECTED_VALUE,
    NBT_EXPECTED_KEY,
    NBT_DUPLICATE_KEY,
    NBT_MIXED_LIST,
    NBT_INVALID_ARRAY,
    NBT_TOO_DEEP,
    NBT_EXPECTED_COMPOUND,
    FILE_OUTSIDE_DATAPACK,
];
