//! Conversion of libSQL values into recorded parameter values.

use qperf_core::ParamValue;

#[must_use]
pub fn to_param_value(value: &libsql::Value) -> ParamValue {
    match value {
        libsql::Value::Null => ParamValue::Null,
        libsql::Value::Integer(i) => ParamValue::Integer(*i),
        libsql::Value::Real(r) => ParamValue::Real(*r),
        libsql::Value::Text(s) => ParamValue::Text(s.clone()),
        libsql::Value::Blob(b) => ParamValue::Blob(b.clone()),
    }
}

#[must_use]
pub fn to_param_values(values: &[libsql::Value]) -> Vec<ParamValue> {
    values.iter().map(to_param_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_variant_maps() {
        let values = vec![
            libsql::Value::Null,
            libsql::Value::Integer(7),
            libsql::Value::Real(1.5),
            libsql::Value::Text("abc".into()),
            libsql::Value::Blob(vec![0xab]),
        ];
        assert_eq!(
            to_param_values(&values),
            vec![
                ParamValue::Null,
                ParamValue::Integer(7),
                ParamValue::Real(1.5),
                ParamValue::Text("abc".into()),
                ParamValue::Blob(vec![0xab]),
            ]
        );
    }
}
