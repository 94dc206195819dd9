use std::fmt;
use std::sync::Arc;

use stagecfg_core::{BoxError, ConversionError, Result, StageError, ValueKind};
use tracing::debug;

use crate::config::StageConfig;
use crate::value::{Fallback, StageValue};

type CustomConverter<T> = Arc<dyn Fn(&str) -> std::result::Result<T, BoxError> + Send + Sync>;

enum Conversion<T> {
    BuiltIn(fn(&str) -> std::result::Result<T, ConversionError>),
    Custom(CustomConverter<T>),
}

/// Per-key lookup descriptor.
///
/// Every builder step consumes the descriptor and returns a new one, so a
/// retyped resolver never aliases the one it was built from. Values are
/// looked up again on every call to [`Resolver::value`]; nothing is cached.
pub struct Resolver<'a, T> {
    config: &'a StageConfig,
    key: String,
    kind: ValueKind,
    default: Option<Fallback<T>>,
    conversion: Conversion<T>,
}

impl<'a> Resolver<'a, String> {
    pub(crate) fn new(config: &'a StageConfig, key: impl Into<String>) -> Self {
        Self {
            config,
            key: key.into(),
            kind: ValueKind::String,
            default: None,
            conversion: Conversion::BuiltIn(String::coerce),
        }
    }
}

impl<'a, T> Resolver<'a, T> {
    /// Rebind to a type with a built-in conversion.
    pub fn as_type<N: StageValue>(self) -> Resolver<'a, N> {
        Resolver {
            config: self.config,
            key: self.key,
            kind: N::KIND,
            default: self.default.and_then(Fallback::retype),
            conversion: Conversion::BuiltIn(N::coerce),
        }
    }

    /// Rebind to any type, converting with `converter` instead of the
    /// built-in coercion.
    pub fn as_with<N, F, E>(self, converter: F) -> Resolver<'a, N>
    where
        F: Fn(&str) -> std::result::Result<N, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let custom: CustomConverter<N> =
            Arc::new(move |raw: &str| -> std::result::Result<N, BoxError> {
                converter(raw).map_err(Into::into)
            });
        Resolver {
            config: self.config,
            key: self.key,
            kind: ValueKind::Custom,
            default: self.default.and_then(Fallback::retype),
            conversion: Conversion::Custom(custom),
        }
    }

    /// Set the value used when no source defines the key.
    ///
    /// A `String` default is converted exactly like a found value; any
    /// other default is returned unconverted.
    pub fn with_default(self, value: T) -> Self
    where
        T: StageValue,
    {
        self.with_fallback(value.into_default())
    }

    /// Default given as a raw string, converted like a found value.
    pub fn with_raw_default(self, raw: impl Into<String>) -> Self {
        self.with_fallback(Fallback::Raw(raw.into()))
    }

    /// Default returned as-is, for any target type.
    pub fn with_typed_default(self, value: T) -> Self {
        self.with_fallback(Fallback::Typed(value))
    }

    fn with_fallback(self, default: Fallback<T>) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&Fallback<T>> {
        self.default.as_ref()
    }

    /// The raw string for the key: stage first, then the fallback source.
    pub fn raw_value(&self) -> Option<String> {
        if let Some(raw) = self.config.stage().get(&self.key) {
            debug!(key = %self.key, stage = self.config.name(), "resolved from stage");
            return Some(raw.to_string());
        }
        let raw = self.config.fallback().get(&self.key);
        if raw.is_some() {
            debug!(key = %self.key, "resolved from fallback properties");
        }
        raw
    }

    /// Whether any source defines the key. Defaults are not considered.
    pub fn has_value(&self) -> bool {
        self.raw_value().is_some()
    }

    /// Resolve and convert the value.
    pub fn value(&self) -> Result<T>
    where
        T: Clone,
    {
        let raw = match self.raw_value() {
            Some(raw) => raw,
            None => match &self.default {
                Some(Fallback::Raw(raw)) => {
                    debug!(key = %self.key, "using raw default");
                    raw.clone()
                }
                Some(Fallback::Typed(value)) => {
                    debug!(key = %self.key, "using typed default");
                    return Ok(value.clone());
                }
                None => {
                    return Err(StageError::MissingConfiguration {
                        key: self.key.clone(),
                    });
                }
            },
        };
        self.convert(&raw)
    }

    /// Like [`Resolver::value`], but a missing key yields `None`.
    /// Conversion failures are still reported.
    pub fn optional_value(&self) -> Result<Option<T>>
    where
        T: Clone,
    {
        match self.value() {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like [`Resolver::value`], but a missing key yields `fallback`.
    pub fn value_or(&self, fallback: T) -> Result<T>
    where
        T: Clone,
    {
        Ok(self.optional_value()?.unwrap_or(fallback))
    }

    fn convert(&self, raw: &str) -> Result<T> {
        let converted = match &self.conversion {
            Conversion::BuiltIn(coerce) => coerce(raw),
            Conversion::Custom(converter) => converter(raw).map_err(ConversionError::Custom),
        };
        converted.map_err(|source| StageError::Conversion {
            key: self.key.clone(),
            kind: self.kind,
            source,
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolver<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("stage", &self.config.name())
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}
