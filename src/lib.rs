// Enable cfg badges on docs.rs (optional but nice)
#![cfg_attr(docsrs, feature(doc_cfg))]

//! High-performance Chinese text converter using dictionary-based FMM segmentation.
//!
//! This crate provides efficient segment-based conversion between Simplified and Traditional
//! Chinese (plus Taiwan/Hong Kong/Japanese Shinjitai variants). It uses dictionary-based
//! matching with maximum word length control and supports multistage translation via multiple
//! dictionaries. Parallel processing is enabled for large input texts.
//!
//! This crate ships **no dictionary data** of its own: an [`OpenCC`] converter is built from
//! dictionaries you supply, either as plaintext lexicon files ([`OpenCC::from_dicts`]) or a
//! CBOR bundle ([`OpenCC::from_cbor`]).
//!
//! # Example
//! ```no_run
//! use opencc_fmmseg::OpenCC;
//!
//! // `from_dicts` reads the sixteen dictionary slots from plaintext files under `dicts/`.
//! let opencc = OpenCC::from_dicts("dicts", Some("s2t"));
//! let output = opencc.convert("汉字转换测试", false);
//! println!("{output}");
//! ```
//!
//! See [README](https://github.com/laisuk/opencc-fmmseg) for more usage examples.
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::iter::Iterator;
use std::sync::Mutex;

/// Delimiters helper for splitting and matching delimiters.
pub mod delimiter_set;
/// Bridge helper for conversion plan and core converter functions.
mod dict_refs;
/// Dictionary utilities for managing multiple lexicons.
pub mod dictionary_lib;

use crate::delimiter_set::is_delimiter;
pub use crate::dict_refs::DictRefs;
use crate::dictionary_lib::dictionary_maxlength::UnionKey;
use crate::dictionary_lib::StarterUnion;
use crate::dictionary_lib::DictMaxLen;
use dictionary_lib::DictionaryMaxlength;

/// Thread-safe holder for the last error message (if any).
static LAST_ERROR: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

/// Regular expression used to strip ASCII punctuation/whitespace/Latin/digits before
/// [`OpenCC::zho_check`] inspects a prefix of the text. The trailing `著` is intentionally
/// included: upstream over-strips this character, and that quirk is preserved here for
/// behavioral parity rather than "fixed".
static STRIP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!-/:-@\[-`{-~\t\n\v\f\r 0-9A-Za-z_著]").unwrap());

/// The sixteen supported conversion configuration tags, in the order they appear in
/// documentation and dispatch tables.
const SUPPORTED_CONFIGS: &[&str] = &[
    "s2t", "s2tw", "s2twp", "s2hk", "t2s", "t2tw", "t2twp", "t2hk", "tw2s", "tw2sp", "tw2t",
    "tw2tp", "hk2s", "hk2t", "jp2t", "t2jp",
];

/// Central interface for performing dictionary-based conversion with segmentation.
///
/// `OpenCC` holds a dictionary bundle, a parallelism toggle, and an **active configuration
/// tag** (one of [`SUPPORTED_CONFIGS`]) selected at construction time and mutable via
/// [`set_config`](Self::set_config). [`convert`](Self::convert) dispatches on this stored
/// configuration, so a single instance behaves like a converter fixed to one conversion
/// direction until reconfigured.
pub struct OpenCC {
    /// Dictionary storage with length metadata for maximum matching.
    dictionary: DictionaryMaxlength,
    /// Flag indicator for parallelism
    is_parallel: bool,
    /// Active conversion configuration tag (always one of [`SUPPORTED_CONFIGS`]).
    config: String,
}

/// Iterates viable phrase lengths in **descending order** using a starter bitmask,
/// stopping early if the callback returns `true`.
///
/// # Parameters
/// - `mask`: 64-bit mask encoding which lengths are possible for the current starter:
///   bit `n` (0-based) set ⇒ length `n + 1` is present. Bit 63 means exactly length 64 —
///   there is no "length ≥ 64" bucket, since `cap_here` is always clamped to 64 by callers.
/// - `cap_here`: Effective cap at the current position, already clamped to `1..=64`
///   (`min(global_max, remaining_chars, 64)`).
/// - `f(len)`: Callback invoked for each candidate length, from longest to shortest.
///   If it returns `true`, iteration stops immediately.
///
/// # Notes
/// - Empty mask or `cap_here == 0` yields no iterations.
/// - This helper is typically used inside [`OpenCC::convert_by_union`] to drive
///   the "longest-first" FMM probing loop.
/// - Internally, it uses `leading_zeros` to walk set bits from high→low.
///
/// # Example
/// ```ignore
/// // mask with bit 0 (len=1), bit 2 (len=3)
/// let mask = (1u64 << 0) | (1u64 << 2);
///
/// let mut seen = Vec::new();
/// for_each_len_dec(mask, 5, |len| { seen.push(len); false });
/// assert_eq!(seen, vec![3, 1]);
/// ```
#[inline(always)]
fn for_each_len_dec(mask: u64, cap_here: usize, mut f: impl FnMut(usize) -> bool) {
    if mask == 0 || cap_here == 0 {
        return;
    }
    let limit = cap_here.min(64);
    // Bitmask for [1..=limit]; shift-safe when limit==64.
    let range_mask = if limit == 64 {
        !0u64
    } else {
        (1u64 << limit) - 1
    };
    let mut m = mask & range_mask;
    // Highest-set-bit iteration.
    while m != 0 {
        let bit_pos = 63 - m.leading_zeros() as usize; // 0-based
        let len = bit_pos + 1; // map to length
        if f(len) {
            return;
        }
        m &= !(1u64 << bit_pos); // clear highest bit
    }
}

impl OpenCC {
    /// Creates a new `OpenCC` instance with an empty dictionary and the given configuration.
    ///
    /// This crate ships no dictionary data, so an instance built this way has nothing to
    /// convert with — every lookup simply misses and characters pass through unchanged.
    /// It exists for testing, placeholder scenarios, and as the fallback target when
    /// [`from_dicts`](Self::from_dicts) or [`from_cbor`](Self::from_cbor) fail to load.
    /// Real usage should go through one of those two constructors.
    ///
    /// # Arguments
    /// * `config` — an optional configuration tag (see [`supported_configs`](Self::supported_configs)).
    ///   `None` defaults to `"s2t"`. An unrecognized tag falls back to `"s2t"` and records
    ///   a last-error message.
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::new(Some("t2s"));
    /// assert_eq!(cc.get_config(), "t2s");
    /// ```
    pub fn new(config: Option<&str>) -> Self {
        let mut cc = OpenCC {
            dictionary: DictionaryMaxlength::default(),
            is_parallel: true,
            config: "s2t".to_string(),
        };
        if let Some(tag) = config {
            cc.set_config(tag);
        }
        cc
    }

    /// Creates an `OpenCC` instance by loading the sixteen dictionary slots from plaintext
    /// lexicon files under `base_dir` (see [`DictionaryMaxlength::from_dicts`]).
    ///
    /// # Arguments
    /// * `base_dir` — directory containing the standard dictionary `.txt` files.
    /// * `config` — an optional configuration tag, same semantics as [`new`](Self::new).
    ///
    /// # Panics
    /// Never panics. If loading fails, an empty dictionary is substituted and the error
    /// is recorded via [`set_last_error`](Self::set_last_error).
    ///
    /// # Example
    /// ```no_run
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::from_dicts("dicts", Some("s2t"));
    /// println!("{}", cc.convert("汉字", false));
    /// ```
    pub fn from_dicts(base_dir: &str, config: Option<&str>) -> Self {
        let dictionary = DictionaryMaxlength::from_dicts(base_dir).unwrap_or_else(|err| {
            Self::set_last_error(&format!("Failed to create dictionary: {}", err));
            DictionaryMaxlength::default()
        });

        let mut cc = OpenCC {
            dictionary,
            is_parallel: true,
            config: "s2t".to_string(),
        };
        if let Some(tag) = config {
            cc.set_config(tag);
        }
        cc
    }

    /// Creates an `OpenCC` instance by loading dictionaries from an external CBOR file
    /// (see [`DictionaryMaxlength::deserialize_from_cbor`]).
    ///
    /// # Arguments
    /// * `filename` — path to a `.cbor` file containing a serialized `DictionaryMaxlength`.
    /// * `config` — an optional configuration tag, same semantics as [`new`](Self::new).
    ///
    /// # Errors
    /// If deserialization fails, the dictionary is defaulted and the error is stored
    /// via [`set_last_error`](Self::set_last_error).
    ///
    /// # Example
    /// ```no_run
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::from_cbor("./dicts.s2t.cbor", Some("s2t"));
    /// println!("{}", cc.convert("汉字", false));
    /// ```
    pub fn from_cbor(filename: &str, config: Option<&str>) -> Self {
        let dictionary =
            DictionaryMaxlength::deserialize_from_cbor(filename).unwrap_or_else(|err| {
                Self::set_last_error(&format!("Failed to create dictionary: {}", err));
                DictionaryMaxlength::default()
            });

        let mut cc = OpenCC {
            dictionary,
            is_parallel: true,
            config: "s2t".to_string(),
        };
        if let Some(tag) = config {
            cc.set_config(tag);
        }
        cc
    }

    /// Creates an `OpenCC` instance by loading dictionaries from an external JSON file
    /// (see [`DictionaryMaxlength::load_json`]).
    ///
    /// # Arguments
    /// * `filename` — path to a `.json` file produced by [`DictionaryMaxlength::save_json`].
    /// * `config` — an optional configuration tag, same semantics as [`new`](Self::new).
    ///
    /// # Errors
    /// If deserialization fails, the dictionary is defaulted and the error is stored
    /// via [`set_last_error`](Self::set_last_error).
    ///
    /// # Example
    /// ```no_run
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::from_json("./dicts.s2t.json", Some("s2t"));
    /// println!("{}", cc.convert("汉字", false));
    /// ```
    pub fn from_json(filename: &str, config: Option<&str>) -> Self {
        let dictionary = DictionaryMaxlength::load_json(filename).unwrap_or_else(|err| {
            Self::set_last_error(&format!("Failed to create dictionary: {}", err));
            DictionaryMaxlength::default()
        });

        let mut cc = OpenCC {
            dictionary,
            is_parallel: true,
            config: "s2t".to_string(),
        };
        if let Some(tag) = config {
            cc.set_config(tag);
        }
        cc
    }

    /// Returns the list of supported configuration tags.
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// assert!(OpenCC::supported_configs().contains(&"s2t"));
    /// assert_eq!(OpenCC::supported_configs().len(), 16);
    /// ```
    pub fn supported_configs() -> &'static [&'static str] {
        SUPPORTED_CONFIGS
    }

    /// Returns the currently active configuration tag.
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::new(Some("s2tw"));
    /// assert_eq!(cc.get_config(), "s2tw");
    /// ```
    pub fn get_config(&self) -> &str {
        &self.config
    }

    /// Sets the active configuration tag used by [`convert`](Self::convert).
    ///
    /// An unrecognized tag is rejected: the configuration falls back to `"s2t"` and a
    /// last-error message is recorded, mirroring the fallback behavior of the
    /// constructors.
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// let mut cc = OpenCC::new(None);
    /// cc.set_config("t2s");
    /// assert_eq!(cc.get_config(), "t2s");
    ///
    /// cc.set_config("bogus");
    /// assert_eq!(cc.get_config(), "s2t");
    /// assert!(OpenCC::get_last_error().is_some());
    /// ```
    pub fn set_config(&mut self, config: &str) {
        let normalized = config.to_lowercase();
        if SUPPORTED_CONFIGS.contains(&normalized.as_str()) {
            self.config = normalized;
        } else {
            Self::set_last_error(&format!("Invalid config: {}", config));
            self.config = "s2t".to_string();
        }
    }

    /// Splits a slice of characters into a list of index ranges based on delimiter boundaries.
    ///
    /// This function identifies ranges within the character slice where the content is segmented
    /// by delimiters (e.g., punctuation, spaces). Each range is defined as `start..end` where `end` is exclusive.
    ///
    /// # Parameters
    /// - `chars`: The input slice of characters to be split.
    /// - `inclusive`: If `true`, each segment includes the delimiter at the end.
    ///                If `false`, the delimiter is split into its own range.
    ///
    /// # Behavior
    /// - If `inclusive == true`: a delimiter at position `i` causes a range from `start..i+1`.
    /// - If `inclusive == false`: two ranges are emitted: `start..i` (content) and `i..i+1` (delimiter).
    /// - If there is trailing content after the last delimiter, it is included as the final range.
    ///
    /// # Returns
    /// A vector of `std::ops::Range<usize>` representing all segment boundaries.
    fn get_chars_range(&self, chars: &[char], inclusive: bool) -> Vec<std::ops::Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, ch) in chars.iter().enumerate() {
            if is_delimiter(*ch) {
                if inclusive {
                    ranges.push(start..i + 1);
                } else {
                    if i > start {
                        ranges.push(start..i);
                    }
                    ranges.push(i..i + 1);
                }
                start = i + 1;
            }
        }

        if start < chars.len() {
            ranges.push(start..chars.len());
        }

        ranges
    }

    /// Internal bridge that drives FMM conversion using a precomputed **starter union**.
    ///
    /// Splits `text` into delimiter‑aware segments, then converts each segment independently via
    /// [`convert_by_union`](Self::convert_by_union). A single prebuilt [`StarterUnion`] (for the
    /// given `dictionaries`) is reused across all segments **once per call**.
    ///
    /// If `max_word_length` exceeds 64 — a dictionary slot advertising a key longer than this
    /// engine's starter-index bit width can represent — this falls back to the **legacy scanner**
    /// ([`convert_by`](Self::convert_by)) for the whole call and records a warning, since the
    /// union's bitmasks cannot prune lengths past 64 correctly.
    ///
    /// # Pipeline
    /// 1. Collect input into `Vec<char>` (parallel or sequential).
    /// 2. Compute non‑delimited ranges with [`get_chars_range`](Self::get_chars_range).
    /// 3. For each range, call [`convert_by_union`](Self::convert_by_union) with the prebuilt union.
    /// 4. Concatenate results in the original order (delimiters preserved).
    ///
    /// # Parallelism
    /// If `self.is_parallel` is `true`:
    /// - Input chars are collected using a parallel iterator.
    /// - Each segment is converted in parallel (`into_par_iter()`), and results are combined
    ///   with an order-preserving `reduce`, so output is byte-identical to the serial path.
    #[inline]
    fn segment_replace_with_union(
        &self,
        text: &str,
        dictionaries: &[&DictMaxLen],
        max_word_length: usize,
        union: &StarterUnion,
    ) -> String {
        let chars: Vec<char> = if self.is_parallel {
            text.par_chars().collect()
        } else {
            text.chars().collect()
        };

        let ranges = self.get_chars_range(&chars, false);

        if max_word_length > 64 {
            log::warn!(
                "dictionary round advertises max word length {} (> 64); falling back to the legacy scanner for this round",
                max_word_length
            );
            Self::set_last_error(&format!(
                "Index build error: max word length {} exceeds the 64-length starter index cap; using legacy scanner",
                max_word_length
            ));

            return if self.is_parallel {
                ranges
                    .into_par_iter()
                    .with_min_len(8)
                    .map(|r| self.convert_by(&chars[r], dictionaries, max_word_length))
                    .reduce(String::new, |mut a, b| {
                        a.push_str(&b);
                        a
                    })
            } else {
                let mut out = String::with_capacity(text.len());
                for r in ranges {
                    out.push_str(&self.convert_by(&chars[r], dictionaries, max_word_length));
                }
                out
            };
        }

        if self.is_parallel {
            ranges
                .into_par_iter()
                .with_min_len(8)
                .map(|r| self.convert_by_union(&chars[r], dictionaries, max_word_length, union))
                .reduce(String::new, |mut a, b| {
                    a.push_str(&b);
                    a
                })
        } else {
            // Serial path: avoid growth copies
            let mut out = String::with_capacity(text.len());
            for r in ranges {
                out.push_str(&self.convert_by_union(
                    &chars[r],
                    dictionaries,
                    max_word_length,
                    union,
                ));
            }
            out
        }
    }

    /// Core dictionary‑matching routine (FMM) optimized by a precomputed **starter union**.
    ///
    /// This is the tightest loop of the segment‑replacement engine. It scans a delimiter‑free
    /// `&[char]` left‑to‑right using **Forward Maximum Matching (FMM)**, while a prebuilt
    /// [`StarterUnion`] (bitmasks + per‑starter caps) prunes impossible lengths before any
    /// per‑dictionary lookup.
    ///
    /// Compared to `convert_by()`:
    /// - Uses `union.bmp_mask/cap` (BMP) and `union.astral_mask/cap` (astral) to **prune lengths**
    ///   before probing dictionaries.
    /// - Tries viable lengths in **descending order** via [`for_each_len_dec`]; the first hit wins.
    ///
    /// # Matching strategy
    /// For each `start_pos`:
    /// 1. Compute `cap_here = min(max_word_length, remaining, 64, union_cap_for_starter)`.
    /// 2. Enumerate **only viable lengths** (longest → shortest) using the union's bitmask/cap.
    /// 3. For each viable `length`, probe each dictionary **only if** that dict can host such a key
    ///    (checked against `dict.max_len` and the dict's own per‑starter cap).
    /// 4. On the first match, emit replacement and advance by `length`.
    /// 5. If no match, emit the current char and advance by 1.
    ///
    /// # Requirements
    /// - `union` **must** be built from the same set/content of `dictionaries` (rebuild if they change).
    /// - Each [`DictMaxLen`] has populated starter indexes
    ///   (e.g., via [`DictMaxLen::build_from_pairs`] or `populate_starter_indexes`).
    #[inline(always)]
    pub fn convert_by_union(
        &self,
        text_chars: &[char],
        dictionaries: &[&DictMaxLen],
        max_word_length: usize,
        union: &StarterUnion,
    ) -> String {
        if text_chars.is_empty() {
            return String::new();
        }

        let text_length = text_chars.len();
        if text_length == 1 && is_delimiter(text_chars[0]) {
            return text_chars[0].to_string();
        }

        let is_multy_dicts = dictionaries.len() > 1;
        let mut result = String::with_capacity(text_length * 4);
        let mut start_pos = 0;

        while start_pos < text_length {
            let c0 = text_chars[start_pos];
            let u0 = c0 as u32;
            let rem = text_length - start_pos;
            let global_cap = max_word_length.min(rem).min(64);

            // Pull precomputed mask + cap
            let (mask, cap_u8) = if u0 <= 0xFFFF {
                let idx = u0 as usize;
                (union.bmp_mask[idx], union.bmp_cap[idx])
            } else {
                (
                    *union.astral_mask.get(&c0).unwrap_or(&0),
                    *union.astral_cap.get(&c0).unwrap_or(&0),
                )
            };

            if mask == 0 || cap_u8 == 0 {
                result.push(c0);
                start_pos += 1;
                continue;
            }

            let cap_here = global_cap.min(cap_u8 as usize);
            let mut matched = false;

            let text_ptr = text_chars.as_ptr();

            for_each_len_dec(mask, cap_here, |length| {
                // precompute once per length
                let cap_bit = length - 1;
                // sentinel: no slice yet
                let mut data_ptr: *const char = std::ptr::null();
                let mut data_len: usize = 0;

                for &dict in dictionaries {
                    if !dict.has_key_len(length) {
                        continue;
                    }
                    // per-dict starter gate (uses DictMaxLen fields):
                    if is_multy_dicts && !dict.starter_allows_dict(c0, length, cap_bit) {
                        continue;
                    }
                    // Build the slice once per `length`
                    if data_ptr.is_null() {
                        debug_assert!(start_pos < text_length);
                        debug_assert!(length <= text_length - start_pos);
                        data_ptr = unsafe { text_ptr.add(start_pos) };
                        data_len = length;
                    }

                    // Materialize the fat slice only here
                    let slice: &[char] = unsafe { std::slice::from_raw_parts(data_ptr, data_len) };

                    if let Some(val) = dict.map.get(slice) {
                        result.push_str(val);
                        start_pos += length;
                        matched = true;
                        return true;
                    }
                }

                false
            });

            if !matched {
                result.push(c0);
                start_pos += 1;
            }
        }

        result
    }

    /// Converts text using the given dictionaries with **greedy maximum-match**,
    /// without relying on a precomputed [`StarterUnion`].
    ///
    /// # Algorithm
    ///
    /// - At each position, tries the longest possible slice (up to `max_word_length`).
    /// - Scans dictionaries in order; if a match is found, emits the mapped value
    ///   and advances by that length.
    /// - If no dictionary matches, emits the current character as-is and advances by 1.
    ///
    /// # Role
    ///
    /// This is the reference oracle used to verify the indexed scanner's output
    /// ([`convert_by_union`](Self::convert_by_union)) and the fallback used when a round's
    /// dictionaries advertise a key length the starter index cannot represent (> 64).
    /// It is also used directly by [`st`](Self::st)/[`ts`](Self::ts), the single-round,
    /// character-only helpers behind [`zho_check`](Self::zho_check).
    fn convert_by(
        &self,
        text_chars: &[char],
        dictionaries: &[&DictMaxLen],
        max_word_length: usize,
    ) -> String {
        if text_chars.is_empty() {
            return String::new();
        }

        let text_length = text_chars.len();
        if text_length == 1 && is_delimiter(text_chars[0]) {
            return text_chars[0].to_string();
        }

        let mut result = String::with_capacity(text_length * 4);
        let mut start_pos = 0;

        while start_pos < text_length {
            let max_length = max_word_length.min(text_length - start_pos);
            let mut best_match_length = 0usize;
            let mut best_match: &str = "";

            // greedy: try longest length first
            for length in (1..=max_length).rev() {
                let candidate = &text_chars[start_pos..start_pos + length];

                for dictionary in dictionaries {
                    if !dictionary.has_key_len(length) {
                        continue;
                    }
                    if let Some(value) = dictionary.map.get(candidate) {
                        best_match_length = length;
                        best_match = value;
                        break;
                    }
                }

                if best_match_length > 0 {
                    break;
                }
            }

            if best_match_length == 0 {
                // no dictionary hit: emit single char and move on
                result.push(text_chars[start_pos]);
                start_pos += 1;
                continue;
            }

            result.push_str(best_match);
            start_pos += best_match_length;
        }

        result
    }

    /// Returns whether parallel segment conversion is currently enabled.
    ///
    /// When parallel mode is enabled, the converter will use Rayon to process
    /// segmented text concurrently. This can improve performance on large inputs
    /// but may introduce overhead on small strings.
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::new(None);
    /// assert_eq!(cc.get_parallel(), true);
    /// ```
    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }

    /// Sets whether to enable or disable parallel segment conversion.
    ///
    /// This controls whether Rayon parallel iterators will be used during
    /// segment replacement. Set this to `false` if you want to reduce CPU usage
    /// or avoid background threading (e.g., in UI applications), or to get a
    /// deterministic single-threaded reference run for testing.
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// let mut cc = OpenCC::new(None);
    /// cc.set_parallel(false);
    /// assert!(!cc.get_parallel());
    /// ```
    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    /// Simplified → Traditional Chinese (character + phrase dictionaries, one round).
    fn s2t(&self, input: &str) -> String {
        let round_1: [&DictMaxLen; 2] = [&self.dictionary.st_phrases, &self.dictionary.st_characters];
        let union = self.dictionary.union_for(UnionKey::S2T);

        DictRefs::new(&round_1, union).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Traditional → Simplified Chinese (character + phrase dictionaries, one round).
    fn t2s(&self, input: &str) -> String {
        let round_1: [&DictMaxLen; 2] = [&self.dictionary.ts_phrases, &self.dictionary.ts_characters];
        let union = self.dictionary.union_for(UnionKey::T2S);

        DictRefs::new(&round_1, union).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Simplified → Traditional (Taiwan) Chinese: S→T, then Taiwan variants.
    fn s2tw(&self, input: &str) -> String {
        let round_1: [&DictMaxLen; 2] = [&self.dictionary.st_phrases, &self.dictionary.st_characters];
        let u1 = self.dictionary.union_for(UnionKey::S2T);
        let round_2 = [&self.dictionary.tw_variants];
        let u2 = self.dictionary.union_for(UnionKey::TwVariantsOnly);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Taiwanese → Simplified Chinese: Taiwan-variant reversal, then T→S.
    fn tw2s(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.tw_variants_rev_phrases,
            &self.dictionary.tw_variants_rev,
        ];
        let round_2: [&DictMaxLen; 2] = [&self.dictionary.ts_phrases, &self.dictionary.ts_characters];

        let u1 = self.dictionary.union_for(UnionKey::TwRevPair);
        let u2 = self.dictionary.union_for(UnionKey::T2S);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Simplified → Traditional (Taiwan) Chinese with idiom phrases: S→T, TW phrases, TW variants.
    fn s2twp(&self, input: &str) -> String {
        let round_1: [&DictMaxLen; 2] = [&self.dictionary.st_phrases, &self.dictionary.st_characters];
        let u1 = self.dictionary.union_for(UnionKey::S2T);

        let round_2 = [&self.dictionary.tw_phrases];
        let u2 = self.dictionary.union_for(UnionKey::TwPhrasesOnly);

        let round_3 = [&self.dictionary.tw_variants];
        let u3 = self.dictionary.union_for(UnionKey::TwVariantsOnly);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .with_round_3(&round_3, u3)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Taiwanese → Simplified Chinese with idiom phrases: TW phrase/variant reversal, then T→S.
    fn tw2sp(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.tw_phrases_rev,
            &self.dictionary.tw_variants_rev_phrases,
            &self.dictionary.tw_variants_rev,
        ];
        let u1 = self.dictionary.union_for(UnionKey::Tw2SpR1TwRevTriple);

        let round_2: [&DictMaxLen; 2] = [&self.dictionary.ts_phrases, &self.dictionary.ts_characters];
        let u2 = self.dictionary.union_for(UnionKey::T2S);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Simplified → Traditional (Hong Kong) Chinese: S→T, then HK variants.
    fn s2hk(&self, input: &str) -> String {
        let round_1: [&DictMaxLen; 2] = [&self.dictionary.st_phrases, &self.dictionary.st_characters];
        let u1 = self.dictionary.union_for(UnionKey::S2T);
        let round_2 = [&self.dictionary.hk_variants];
        let u2 = self.dictionary.union_for(UnionKey::HkVariantsOnly);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Hong Kong → Simplified Chinese: HK-variant reversal, then T→S.
    fn hk2s(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.hk_variants_rev_phrases,
            &self.dictionary.hk_variants_rev,
        ];
        let u1 = self.dictionary.union_for(UnionKey::HkRevPair);
        let round_2: [&DictMaxLen; 2] = [&self.dictionary.ts_phrases, &self.dictionary.ts_characters];
        let u2 = self.dictionary.union_for(UnionKey::T2S);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Traditional → Traditional (Taiwan) Chinese: Taiwan variants, one round.
    fn t2tw(&self, input: &str) -> String {
        let round_1 = [&self.dictionary.tw_variants];
        let u1 = self.dictionary.union_for(UnionKey::TwVariantsOnly);

        DictRefs::new(&round_1, u1).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Traditional → Traditional (Taiwan) Chinese with idiom phrases.
    fn t2twp(&self, input: &str) -> String {
        let round_1 = [&self.dictionary.tw_phrases];
        let u1 = self.dictionary.union_for(UnionKey::TwPhrasesOnly);
        let round_2 = [&self.dictionary.tw_variants];
        let u2 = self.dictionary.union_for(UnionKey::TwVariantsOnly);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Traditional (Taiwan) → Traditional Chinese.
    fn tw2t(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.tw_variants_rev_phrases,
            &self.dictionary.tw_variants_rev,
        ];
        let u1 = self.dictionary.union_for(UnionKey::TwRevPair);

        DictRefs::new(&round_1, u1).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Traditional (Taiwan) → Traditional Chinese with idiom phrases.
    fn tw2tp(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.tw_variants_rev_phrases,
            &self.dictionary.tw_variants_rev,
        ];
        let u1 = self.dictionary.union_for(UnionKey::TwRevPair);

        let round_2 = [&self.dictionary.tw_phrases_rev];
        let u2 = self.dictionary.union_for(UnionKey::TwPhrasesRevOnly);

        DictRefs::new(&round_1, u1)
            .with_round_2(&round_2, u2)
            .apply_segment_replace(input, |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            })
    }

    /// Traditional → Traditional (Hong Kong) Chinese.
    fn t2hk(&self, input: &str) -> String {
        let round_1 = [&self.dictionary.hk_variants];
        let u1 = self.dictionary.union_for(UnionKey::HkVariantsOnly);

        DictRefs::new(&round_1, u1).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Traditional (Hong Kong) → Traditional Chinese.
    fn hk2t(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.hk_variants_rev_phrases,
            &self.dictionary.hk_variants_rev,
        ];
        let u1 = self.dictionary.union_for(UnionKey::HkRevPair);

        DictRefs::new(&round_1, u1).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Traditional Chinese (Kyūjitai) → Japanese Shinjitai.
    fn t2jp(&self, input: &str) -> String {
        let round_1 = [&self.dictionary.jp_variants];
        let u1 = self.dictionary.union_for(UnionKey::JpVariantsOnly);

        DictRefs::new(&round_1, u1).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Japanese Shinjitai → Traditional Chinese (Kyūjitai).
    fn jp2t(&self, input: &str) -> String {
        let round_1 = [
            &self.dictionary.jps_phrases,
            &self.dictionary.jps_characters,
            &self.dictionary.jp_variants_rev,
        ];
        let u1 = self.dictionary.union_for(UnionKey::JpRevTriple);

        DictRefs::new(&round_1, u1).apply_segment_replace(
            input,
            |input, refs, max_len, union| {
                self.segment_replace_with_union(input, refs, max_len, union)
            },
        )
    }

    /// Converts `input` using this converter's **active configuration**
    /// (see [`get_config`](Self::get_config)/[`set_config`](Self::set_config)).
    ///
    /// This is the primary entry point for text transformation. It supports Simplified ↔
    /// Traditional, Taiwan, Hong Kong, and Japanese Shinjitai/Kyūjitai variants, applying
    /// an optional punctuation pass as a fixed post-step.
    ///
    /// Supported configurations (set via [`set_config`](Self::set_config) or a constructor):
    ///
    /// | Config     | Description                               |
    /// |------------|-------------------------------------------|
    /// | `s2t`      | Simplified Chinese → Traditional Chinese  |
    /// | `s2tw`     | Simplified Chinese → Traditional (Taiwan) |
    /// | `s2twp`    | Simplified → Taiwanese with phrases       |
    /// | `s2hk`     | Simplified Chinese → Traditional (HK)     |
    /// | `t2s`      | Traditional Chinese → Simplified Chinese  |
    /// | `t2tw`     | Traditional → Taiwanese                   |
    /// | `t2twp`    | Traditional → Taiwanese with phrases      |
    /// | `t2hk`     | Traditional → Hong Kong                   |
    /// | `tw2s`     | Taiwanese → Simplified Chinese            |
    /// | `tw2sp`    | Taiwanese → Simplified (with phrases)     |
    /// | `tw2t`     | Taiwanese → Traditional Chinese           |
    /// | `tw2tp`    | Taiwanese → Traditional (with phrases)    |
    /// | `hk2s`     | Hong Kong → Simplified Chinese            |
    /// | `hk2t`     | Hong Kong → Traditional Chinese           |
    /// | `jp2t`     | Japanese Shinjitai → Traditional Chinese  |
    /// | `t2jp`     | Traditional Chinese → Japanese Shinjitai  |
    ///
    /// # Arguments
    ///
    /// * `input` — the input text.
    /// * `punctuation` — whether to also apply the punctuation pass (§4.10). Ignored
    ///   (never applied) for the two Japanese configs (`t2jp`, `jp2t`).
    ///
    /// # Returns
    ///
    /// The converted text. Empty input yields empty output and records a last-error
    /// message rather than performing any conversion work.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use opencc_fmmseg::OpenCC;
    ///
    /// let converter = OpenCC::from_dicts("dicts", Some("s2t"));
    /// let traditional = converter.convert("汉字转换测试", false);
    /// println!("{traditional}");
    /// ```
    ///
    /// # See Also
    /// - [`zho_check`](Self::zho_check) for script detection
    /// - [`DictionaryMaxlength`] for dictionary internals
    pub fn convert(&self, input: &str, punctuation: bool) -> String {
        if input.is_empty() {
            Self::set_last_error("Input text is empty");
            return String::new();
        }

        let config = self.config.clone();
        self.convert_with_config(input, &config, punctuation)
    }

    /// Internal dispatcher: runs the named conversion pipeline for `config`, then applies
    /// the punctuation post-step when requested and applicable.
    fn convert_with_config(&self, input: &str, config: &str, punctuation: bool) -> String {
        let config_lc = config.to_lowercase();
        let output = match config_lc.as_str() {
            "s2t" => self.s2t(input),
            "s2tw" => self.s2tw(input),
            "s2twp" => self.s2twp(input),
            "s2hk" => self.s2hk(input),
            "t2s" => self.t2s(input),
            "t2tw" => self.t2tw(input),
            "t2twp" => self.t2twp(input),
            "t2hk" => self.t2hk(input),
            "tw2s" => self.tw2s(input),
            "tw2sp" => self.tw2sp(input),
            "tw2t" => self.tw2t(input),
            "tw2tp" => self.tw2tp(input),
            "hk2s" => self.hk2s(input),
            "hk2t" => self.hk2t(input),
            "jp2t" => self.jp2t(input),
            "t2jp" => self.t2jp(input),
            _ => {
                Self::set_last_error(format!("Invalid config: {}", config).as_str());
                return format!("Invalid config: {}", config);
            }
        };

        let is_japanese = config_lc == "t2jp" || config_lc == "jp2t";
        if punctuation && !is_japanese {
            Self::convert_punctuation(&output, &config_lc)
        } else {
            output
        }
    }

    /// Internal: Applies a fast character-level Simplified-to-Traditional conversion.
    ///
    /// This method performs a low-overhead transformation using only the `st_characters`
    /// dictionary, mapping each character in the input string to its Traditional form
    /// if available.
    ///
    /// Designed for high-speed single-pass checks (e.g., used in `zho_check()`).
    /// Supports parallel character collection if `is_parallel` is enabled.
    fn st(&self, input: &str) -> String {
        let dict_refs = [&self.dictionary.st_characters];
        let chars: Vec<char> = if self.is_parallel {
            input.par_chars().collect()
        } else {
            input.chars().collect()
        };
        self.convert_by(&chars, &dict_refs, 1)
    }

    /// Internal: Applies a fast character-level Traditional-to-Simplified conversion.
    ///
    /// Uses only the `ts_characters` dictionary to map Traditional characters to
    /// their Simplified form, one-by-one. Optimized for script detection or fast filters.
    fn ts(&self, input: &str) -> String {
        let dict_refs = [&self.dictionary.ts_characters];
        let chars: Vec<char> = if self.is_parallel {
            input.par_chars().collect()
        } else {
            input.chars().collect()
        };
        self.convert_by(&chars, &dict_refs, 1)
    }

    /// Detects the likely Chinese script type of the input text.
    ///
    /// Strips ASCII punctuation/whitespace/Latin/digits (and, matching upstream, the
    /// character `著`) from `text`, takes the first 100 Unicode **scalar values** of the
    /// stripped text, and compares that prefix against its single-round, character-only
    /// `ts`/`st` conversions.
    ///
    /// Returns:
    /// - `1` if the input text appears to be Traditional Chinese (changes under `ts`).
    /// - `2` if the input text appears to be Simplified Chinese (changes under `st`).
    /// - `0` if the input is empty or doesn't clearly match either.
    ///
    /// # Examples
    /// ```no_run
    /// use opencc_fmmseg::OpenCC;
    /// let cc = OpenCC::from_dicts("dicts", None);
    /// assert_eq!(cc.zho_check("漢字"), 1); // Traditional
    /// assert_eq!(cc.zho_check("汉字"), 2); // Simplified
    /// assert_eq!(cc.zho_check("hello"), 0); // Neither
    /// ```
    pub fn zho_check(&self, input: &str) -> i32 {
        if input.is_empty() {
            return 0;
        }

        let stripped = STRIP_REGEX.replace_all(input, "");
        let prefix: String = stripped.chars().take(100).collect();

        match (prefix != self.ts(&prefix), prefix != self.st(&prefix)) {
            (true, _) => 1,
            (_, true) => 2,
            _ => 0,
        }
    }

    /// Applies the fixed punctuation post-step: a one-to-one scalar translation between
    /// curly quotation marks and CJK corner/white corner brackets.
    ///
    /// For configs whose source is Simplified (tag starts with `s`): `“ ” ‘ ’` → `「 」 『 』`.
    /// For every other non-Japanese config (source is Traditional/Taiwan/Hong Kong): the
    /// inverse mapping. Never called for `t2jp`/`jp2t` — callers gate on that in
    /// [`convert_with_config`](Self::convert_with_config).
    fn convert_punctuation(text: &str, config: &str) -> String {
        let mut s2t_punctuation_chars: FxHashMap<&str, &str> = FxHashMap::default();
        s2t_punctuation_chars.insert("\u{201C}", "\u{300C}"); // “ -> 「
        s2t_punctuation_chars.insert("\u{201D}", "\u{300D}"); // ” -> 」
        s2t_punctuation_chars.insert("\u{2018}", "\u{300E}"); // ‘ -> 『
        s2t_punctuation_chars.insert("\u{2019}", "\u{300F}"); // ’ -> 』

        let t2s_punctuation_chars: FxHashMap<&str, &str> = s2t_punctuation_chars
            .iter()
            .map(|(&k, &v)| (v, k))
            .collect();

        let mapping = if config.starts_with('s') {
            &s2t_punctuation_chars
        } else {
            &t2s_punctuation_chars
        };

        let pattern = mapping
            .keys()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let regex = Regex::new(&pattern).unwrap();

        regex
            .replace_all(text, |caps: &regex::Captures| {
                mapping[caps.get(0).unwrap().as_str()]
            })
            .into_owned()
    }

    /// Records an error message as the most recent runtime error.
    ///
    /// This is used internally to store non-panic errors, such as failed dictionary loading
    /// or invalid conversion configurations. It allows safe retrieval via [`get_last_error()`](Self::get_last_error)
    /// without throwing exceptions or returning `Result<T, E>` from core APIs.
    pub fn set_last_error(err_msg: &str) {
        let mut last_error = LAST_ERROR.lock().unwrap();
        *last_error = Some(err_msg.to_string());
    }

    /// Retrieves the most recently recorded error message, if any.
    ///
    /// This can be used by consumers after calling `convert()` or dictionary loaders
    /// to inspect whether any non-fatal errors occurred (e.g., fallback to default dict).
    ///
    /// # Example
    /// ```rust
    /// use opencc_fmmseg::OpenCC;
    /// if let Some(err) = OpenCC::get_last_error() {
    ///     eprintln!("warning: {err}");
    /// }
    /// ```
    pub fn get_last_error() -> Option<String> {
        let last_error = LAST_ERROR.lock().unwrap();
        last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary_lib::DictMaxLen;

    fn build_dict(pairs: &[(&str, &str)]) -> DictMaxLen {
        DictMaxLen::build_from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    fn test_dictionary() -> DictionaryMaxlength {
        let mut d = DictionaryMaxlength::default();
        d.st_characters = build_dict(&[("汉", "漢"), ("字", "字"), ("转", "轉"), ("换", "換")]);
        d.st_phrases = build_dict(&[("转换", "轉換")]);
        d.ts_characters = build_dict(&[("漢", "汉"), ("字", "字"), ("轉", "转"), ("換", "换")]);
        d.ts_phrases = build_dict(&[("轉換", "转换")]);
        d
    }

    #[test]
    fn convert_dispatches_on_stored_config() {
        let mut cc = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: false,
            config: "s2t".to_string(),
        };
        assert_eq!(cc.convert("汉字转换", false), "漢字轉換");

        cc.set_config("t2s");
        assert_eq!(cc.convert("漢字轉換", false), "汉字转换");
    }

    #[test]
    fn convert_applies_punctuation_post_step_for_non_japanese_configs() {
        let cc = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: false,
            config: "s2t".to_string(),
        };
        let out = cc.convert("\u{201C}汉字\u{201D}", true);
        assert_eq!(out, "\u{300C}漢字\u{300D}");
    }

    #[test]
    fn convert_never_applies_punctuation_for_japanese_configs() {
        let mut dict = DictionaryMaxlength::default();
        dict.jp_variants = build_dict(&[("号", "號")]);
        let cc = OpenCC {
            dictionary: dict,
            is_parallel: false,
            config: "t2jp".to_string(),
        };
        let out = cc.convert("\u{201C}号\u{201D}", true);
        assert_eq!(out, "\u{201C}號\u{201D}");
    }

    #[test]
    fn empty_input_yields_empty_output_and_records_error() {
        let cc = OpenCC::new(Some("s2t"));
        assert_eq!(cc.convert("", false), "");
        assert_eq!(OpenCC::get_last_error().as_deref(), Some("Input text is empty"));
    }

    #[test]
    fn unknown_config_falls_back_to_s2t_and_records_error() {
        let mut cc = OpenCC::new(None);
        cc.set_config("nonsense");
        assert_eq!(cc.get_config(), "s2t");
        assert!(OpenCC::get_last_error().is_some());
    }

    #[test]
    fn indexed_and_legacy_scanners_agree() {
        let cc = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: false,
            config: "s2t".to_string(),
        };
        let dicts = [&cc.dictionary.st_phrases, &cc.dictionary.st_characters];
        let union = StarterUnion::build(&dicts);

        for input in ["汉字转换", "转换汉字，转换", "", "没有匹配"] {
            let chars: Vec<char> = input.chars().collect();
            let indexed = cc.convert_by_union(&chars, &dicts, 16, &union);
            let legacy = cc.convert_by(&chars, &dicts, 16);
            assert_eq!(indexed, legacy, "mismatch for input {:?}", input);
        }
    }

    #[test]
    fn parallel_and_serial_paths_agree() {
        let base = "汉字转换测试，".repeat(2000);
        let mut serial = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: false,
            config: "s2t".to_string(),
        };
        serial.set_parallel(false);
        let mut parallel = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: true,
            config: "s2t".to_string(),
        };
        parallel.set_parallel(true);

        assert_eq!(serial.convert(&base, false), parallel.convert(&base, false));
    }

    #[test]
    fn zho_check_detects_traditional_simplified_and_neither() {
        let cc = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: false,
            config: "s2t".to_string(),
        };
        assert_eq!(cc.zho_check("漢字"), 1);
        assert_eq!(cc.zho_check("汉字"), 2);
        assert_eq!(cc.zho_check("hello123"), 0);
        assert_eq!(cc.zho_check(""), 0);
    }

    #[test]
    fn empty_and_all_delimiter_segments_round_trip() {
        let cc = OpenCC {
            dictionary: test_dictionary(),
            is_parallel: false,
            config: "s2t".to_string(),
        };
        assert_eq!(cc.convert_by(&[], &[&cc.dictionary.st_characters], 4), "");
        let delimiters: Vec<char> = "，。！？".chars().collect();
        let dicts = [&cc.dictionary.st_characters];
        let union = StarterUnion::build(&dicts);
        for &c in &delimiters {
            assert_eq!(cc.convert_by_union(&[c], &dicts, 4, &union), c.to_string());
        }
    }
}
