//! Argument conversion between caller values and driver values.

use std::sync::Arc;

use crate::chain::InterceptorChain;
use crate::context::Context;
use crate::driver::ValueChecker;
use crate::error::InterceptError;
use crate::types::{NamedValue, Value};

/// The conversion strategy resolved for a wrap point.
///
/// Resolution happens once, when the owning proxy is built, and follows a
/// fixed precedence: statement-level checker, else connection-level
/// checker, else the default widening table. It is never re-evaluated per
/// call.
#[derive(Clone)]
pub(crate) enum Conversion {
    Checker(Arc<dyn ValueChecker>),
    Default,
}

impl Conversion {
    pub(crate) fn resolve(
        stmt_checker: Option<Arc<dyn ValueChecker>>,
        conn_checker: Option<Arc<dyn ValueChecker>>,
    ) -> Self {
        match stmt_checker.or(conn_checker) {
            Some(checker) => Conversion::Checker(checker),
            None => Conversion::Default,
        }
    }
}

/// Widen a caller-side value to its canonical driver representation.
///
/// This is the platform's standard coercion table: signed and unsigned
/// integers widen to `Int`, `Float32` widens to `Float`, canonical values
/// pass through unchanged. `UInt64` values beyond `i64::MAX` have no
/// canonical representation and are rejected.
///
/// # Errors
///
/// Returns [`InterceptError::Conversion`] when the value cannot be
/// represented.
pub fn default_convert(value: &Value) -> Result<Value, InterceptError> {
    match value {
        Value::Int8(v) => Ok(Value::Int(i64::from(*v))),
        Value::Int16(v) => Ok(Value::Int(i64::from(*v))),
        Value::Int32(v) => Ok(Value::Int(i64::from(*v))),
        Value::UInt8(v) => Ok(Value::Int(i64::from(*v))),
        Value::UInt16(v) => Ok(Value::Int(i64::from(*v))),
        Value::UInt32(v) => Ok(Value::Int(i64::from(*v))),
        Value::UInt64(v) => i64::try_from(*v).map(Value::Int).map_err(|_| {
            InterceptError::Conversion(format!(
                "unsigned value {v} overflows the driver integer range"
            ))
        }),
        Value::Float32(v) => Ok(Value::Float(f64::from(*v))),
        other => Ok(other.clone()),
    }
}

/// Convert every argument through the chain's value-check override, then
/// the resolved strategy.
pub(crate) fn convert_args(
    chain: &InterceptorChain,
    conversion: &Conversion,
    ctx: &Context,
    args: &[NamedValue],
) -> Result<Vec<NamedValue>, InterceptError> {
    let mut converted = Vec::with_capacity(args.len());
    for arg in args {
        let value = match chain.value_check(ctx, arg) {
            Some(result) => result?,
            None => match conversion {
                Conversion::Checker(checker) => checker.check(arg)?,
                Conversion::Default => default_convert(&arg.value)?,
            },
        };
        converted.push(NamedValue {
            name: arg.name.clone(),
            ordinal: arg.ordinal,
            value,
        });
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_to_int64() {
        assert_eq!(default_convert(&Value::Int8(-3)).unwrap(), Value::Int(-3));
        assert_eq!(default_convert(&Value::Int16(9)).unwrap(), Value::Int(9));
        assert_eq!(default_convert(&Value::Int32(1)).unwrap(), Value::Int(1));
        assert_eq!(default_convert(&Value::UInt8(255)).unwrap(), Value::Int(255));
        assert_eq!(
            default_convert(&Value::UInt32(u32::MAX)).unwrap(),
            Value::Int(i64::from(u32::MAX))
        );
    }

    #[test]
    fn float32_widens_to_float64() {
        assert_eq!(
            default_convert(&Value::Float32(1.5)).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn canonical_values_pass_through() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(42),
            Value::Float(2.5),
            Value::Text("t".into()),
            Value::Blob(vec![1, 2]),
        ] {
            assert_eq!(default_convert(&value).unwrap(), value);
        }
    }

    #[test]
    fn uint64_overflow_is_a_conversion_error() {
        let in_range = Value::UInt64(42);
        assert_eq!(default_convert(&in_range).unwrap(), Value::Int(42));

        let err = default_convert(&Value::UInt64(u64::MAX)).unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn resolution_prefers_the_statement_checker() {
        struct Marker(&'static str);
        impl ValueChecker for Marker {
            fn check(&self, _arg: &NamedValue) -> Result<Value, InterceptError> {
                Ok(Value::Text(self.0.into()))
            }
        }

        let stmt: Arc<dyn ValueChecker> = Arc::new(Marker("stmt"));
        let conn: Arc<dyn ValueChecker> = Arc::new(Marker("conn"));
        let arg = NamedValue::positional(1, Value::Int(0));

        match Conversion::resolve(Some(stmt.clone()), Some(conn.clone())) {
            Conversion::Checker(c) => {
                assert_eq!(c.check(&arg).unwrap(), Value::Text("stmt".into()));
            }
            Conversion::Default => panic!("expected a checker"),
        }
        match Conversion::resolve(None, Some(conn)) {
            Conversion::Checker(c) => {
                assert_eq!(c.check(&arg).unwrap(), Value::Text("conn".into()));
            }
            Conversion::Default => panic!("expected a checker"),
        }
        assert!(matches!(
            Conversion::resolve(None, None),
            Conversion::Default
        ));
    }
}
