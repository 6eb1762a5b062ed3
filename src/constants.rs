//! Fixed constants and the reference instance.
//!
//! Anchor offsets are 0-indexed and inclusive. The reference spans below were
//! checked against the ciphertext itself: each span covers exactly as many
//! letters as its plaintext, and no two spans overlap.

/// Number of letters in the alphabet; residues live in `0..ALPHABET_LEN`.
pub const ALPHABET_LEN: u8 = 26;

/// Uppercase alphabet in residue order (`A` = 0).
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The 97-letter reference ciphertext.
pub const REFERENCE_CIPHERTEXT: &str =
    "OBKRUOXOGHULBSOLIFBBWFLRVQQPRNGKSSOTWTQSJQSSEKZZWATJKLUDIAWINFBNYPVTTMZFPKWGDKZXTJCDIGKUHUAUEKCAR";

/// Length of the reference ciphertext.
pub const REFERENCE_LEN: usize = 97;

/// Reference anchors as `(label, start, end, plaintext)`.
pub const REFERENCE_ANCHORS: [(&str, usize, usize, &str); 4] = [
    ("EAST", 21, 24, "EAST"),
    ("NORTHEAST", 25, 33, "NORTHEAST"),
    ("BERLIN", 63, 68, "BERLIN"),
    ("CLOCK", 69, 73, "CLOCK"),
];

/// Number of classes produced by the reference classifier.
pub const REFERENCE_CLASSES: usize = 6;

/// Smallest period searched by default.
pub const DEFAULT_PERIOD_MIN: usize = 10;

/// Largest period searched by default (inclusive).
pub const DEFAULT_PERIOD_MAX: usize = 22;

/// Default number of null samples.
pub const DEFAULT_NULL_SAMPLES: usize = 10_000;

/// Default pre-registered gate threshold on Holm-adjusted p-values.
pub const DEFAULT_GATE_ALPHA: f64 = 0.01;

/// Default master seed for null generation.
pub const DEFAULT_MASTER_SEED: u64 = 0x4B34_0097;

/// Common English function words used by [`crate::scoring::FunctionWordCount`].
pub const FUNCTION_WORDS: &[&str] = &[
    "THE", "AND", "OF", "TO", "IN", "IS", "IT", "THAT", "WAS", "FOR", "ON", "AS", "WITH", "BY",
    "AT", "FROM", "BUT", "NOT", "OR", "AN", "BE", "HE", "HIS", "THIS", "WHICH", "ARE", "HAD",
    "WERE", "THERE", "WE",
];

/// Small English lexicon used by [`crate::scoring::WordCoverage::common_english`].
pub const COMMON_WORDS: &[&str] = &[
    "THE", "AND", "THAT", "HAVE", "FOR", "NOT", "WITH", "YOU", "THIS", "BUT", "HIS", "FROM",
    "THEY", "SAY", "HER", "SHE", "WILL", "ONE", "ALL", "WOULD", "THERE", "THEIR", "WHAT", "OUT",
    "ABOUT", "WHO", "GET", "WHICH", "WHEN", "MAKE", "CAN", "LIKE", "TIME", "JUST", "HIM",
    "KNOW", "TAKE", "PEOPLE", "INTO", "YEAR", "YOUR", "GOOD", "SOME", "COULD", "THEM", "SEE",
    "OTHER", "THAN", "THEN", "NOW", "LOOK", "ONLY", "COME", "ITS", "OVER", "THINK", "ALSO",
    "BACK", "AFTER", "USE", "TWO", "HOW", "OUR", "WORK", "FIRST", "WELL", "WAY", "EVEN", "NEW",
    "WANT", "BECAUSE", "ANY", "THESE", "GIVE", "DAY", "MOST", "EAST", "WEST", "NORTH", "SOUTH",
    "NORTHEAST", "BERLIN", "CLOCK", "WALL", "UNDER", "GROUND", "LAYER", "SHADOW", "LIGHT",
    "SLOWLY", "DESPERATELY", "BURIED", "LOCATION", "MESSAGE", "SECRET", "HIDDEN", "WORLD",
    "INTERPRETATION", "POSITION", "DEGREES", "MINUTES", "SECONDS",
];
