use stagecfg_core::{ConversionError, ValueKind};
use url::Url;

/// A type with a built-in conversion from a raw configuration string.
///
/// The set of implementors is the closed set named by [`ValueKind`]; any
/// other target type goes through a caller-supplied converter instead.
pub trait StageValue: Sized {
    const KIND: ValueKind;

    fn coerce(raw: &str) -> Result<Self, ConversionError>;

    /// How a default of this type is stored. Only strings are kept raw.
    fn into_default(self) -> Fallback<Self> {
        Fallback::Typed(self)
    }
}

/// Default value held by a resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback<T> {
    /// Treated as if it had been found in a source, then converted.
    Raw(String),
    /// Returned as-is without conversion.
    Typed(T),
}

impl<T> Fallback<T> {
    /// Carry the default over to another target type. A typed default
    /// belongs to the old type and is dropped.
    pub(crate) fn retype<N>(self) -> Option<Fallback<N>> {
        match self {
            Fallback::Raw(raw) => Some(Fallback::Raw(raw)),
            Fallback::Typed(_) => None,
        }
    }
}

impl StageValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.to_string())
    }

    fn into_default(self) -> Fallback<Self> {
        Fallback::Raw(self)
    }
}

impl StageValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    /// `"true"` (any case) and `"1"` are true; everything else is false.
    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.eq_ignore_ascii_case("true") || raw == "1")
    }
}

impl StageValue for i32 {
    const KIND: ValueKind = ValueKind::Int32;

    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.parse()?)
    }
}

impl StageValue for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.parse()?)
    }
}

/// Surrounding whitespace and one trailing `f`/`F`/`d`/`D` type suffix are
/// accepted on floating point values (`" 1.5f"` reads as 1.5).
fn parse_float<F: std::str::FromStr<Err = std::num::ParseFloatError>>(
    raw: &str,
) -> Result<F, ConversionError> {
    let trimmed = raw.trim_ascii();
    match trimmed.parse() {
        Ok(value) => Ok(value),
        Err(e) => match trimmed.strip_suffix(['f', 'F', 'd', 'D']) {
            Some(literal) => Ok(literal.parse()?),
            None => Err(e.into()),
        },
    }
}

impl StageValue for f32 {
    const KIND: ValueKind = ValueKind::Float32;

    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        parse_float(raw)
    }
}

impl StageValue for f64 {
    const KIND: ValueKind = ValueKind::Float64;

    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        parse_float(raw)
    }
}

impl StageValue for Url {
    const KIND: ValueKind = ValueKind::Url;

    fn coerce(raw: &str) -> Result<Self, ConversionError> {
        Ok(Url::parse(raw)?)
    }
}
