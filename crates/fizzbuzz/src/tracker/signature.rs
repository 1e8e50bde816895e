use crate::{Error, Result, generate};
use core::{fmt, num::NonZeroU64, str::FromStr};

/// The identity of a generation request: both divisors, the limit and both
/// labels.
///
/// Two signatures are equal only when all five fields are equal. Labels are
/// compared byte for byte, without trimming or case-folding.
///
/// The canonical text form, produced by [`fmt::Display`] and parsed by
/// [`FromStr`], joins the five fields with commas:
///
/// ```
/// use core::num::NonZeroU64;
/// use fizzbuzz::RequestSignature;
///
/// let signature = RequestSignature::new(
///     NonZeroU64::new(3).unwrap(),
///     NonZeroU64::new(5).unwrap(),
///     15,
///     "fizz",
///     "buzz",
/// );
/// assert_eq!(signature.to_string(), "3,5,15,fizz,buzz");
/// assert_eq!("3,5,15,fizz,buzz".parse(), Ok(signature));
/// ```
///
/// The text form cannot represent a first label that contains a comma: the
/// first four commas are taken as separators, so any later commas stay in
/// the second label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestSignature {
    #[cfg_attr(feature = "serde", serde(rename = "int1"))]
    divisor1: NonZeroU64,
    #[cfg_attr(feature = "serde", serde(rename = "int2"))]
    divisor2: NonZeroU64,
    limit: u64,
    #[cfg_attr(feature = "serde", serde(rename = "str1"))]
    label1: String,
    #[cfg_attr(feature = "serde", serde(rename = "str2"))]
    label2: String,
}

impl RequestSignature {
    /// Creates a signature from the five request parameters.
    ///
    /// Both labels must be non-empty: a signature with an empty label has no
    /// readable text form. Validating labels is the caller's job; debug
    /// builds assert it.
    pub fn new(
        divisor1: NonZeroU64,
        divisor2: NonZeroU64,
        limit: u64,
        label1: impl Into<String>,
        label2: impl Into<String>,
    ) -> Self {
        let label1 = label1.into();
        let label2 = label2.into();
        debug_assert!(
            !label1.is_empty() && !label2.is_empty(),
            "signature labels must be non-empty"
        );
        Self {
            divisor1,
            divisor2,
            limit,
            label1,
            label2,
        }
    }

    /// First divisor (`int1`).
    pub const fn divisor1(&self) -> NonZeroU64 {
        self.divisor1
    }

    /// Second divisor (`int2`).
    pub const fn divisor2(&self) -> NonZeroU64 {
        self.divisor2
    }

    /// Sequence length (`limit`).
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Label for multiples of the first divisor (`str1`).
    pub fn label1(&self) -> &str {
        &self.label1
    }

    /// Label for multiples of the second divisor (`str2`).
    pub fn label2(&self) -> &str {
        &self.label2
    }

    /// Generates the sequence this signature describes.
    ///
    /// Equivalent to calling [`generate`] with the signature's fields.
    pub fn generate(&self) -> Vec<String> {
        generate(
            self.divisor1,
            self.divisor2,
            self.limit,
            &self.label1,
            &self.label2,
        )
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.divisor1, self.divisor2, self.limit, self.label1, self.label2
        )
    }
}

impl FromStr for RequestSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(5, ',');
        let mut next = |field: &str| {
            parts
                .next()
                .ok_or_else(|| Error::malformed(format!("missing field `{field}`")))
        };

        let divisor1 = next("int1")?;
        let divisor2 = next("int2")?;
        let limit = next("limit")?;
        let label1 = next("str1")?;
        let label2 = next("str2")?;

        let divisor = |field: &str, raw: &str| {
            raw.parse::<NonZeroU64>()
                .map_err(|e| Error::malformed(format!("invalid `{field}` ({raw:?}): {e}")))
        };
        let divisor1 = divisor("int1", divisor1)?;
        let divisor2 = divisor("int2", divisor2)?;
        let limit = limit
            .parse::<u64>()
            .map_err(|e| Error::malformed(format!("invalid `limit` ({limit:?}): {e}")))?;

        if label1.is_empty() {
            return Err(Error::malformed("empty `str1`"));
        }
        if label2.is_empty() {
            return Err(Error::malformed("empty `str2`"));
        }

        Ok(Self::new(divisor1, divisor2, limit, label1, label2))
    }
}
