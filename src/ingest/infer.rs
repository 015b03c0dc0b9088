use arrow::datatypes::DataType;

/// Cell contents treated as a missing value.
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}

/// Raw cell → trimmed value, or None when the cell is missing.
pub fn present(raw: &str) -> Option<&str> {
    if is_missing(raw) {
        None
    } else {
        Some(raw.trim())
    }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Running dtype vote for one column, fed one cell at a time.
///
/// Integers win over floats, floats over booleans, and anything else falls
/// back to Utf8. A column without a single present value is Float64.
#[derive(Debug, Clone)]
pub struct TypeInference {
    any: bool,
    all_int: bool,
    all_float: bool,
    all_bool: bool,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self {
            any: false,
            all_int: true,
            all_float: true,
            all_bool: true,
        }
    }
}

impl TypeInference {
    pub fn observe(&mut self, raw: &str) {
        if !(self.all_int || self.all_float || self.all_bool) {
            return;
        }
        let Some(value) = present(raw) else {
            return;
        };
        self.any = true;
        self.all_int = self.all_int && value.parse::<i64>().is_ok();
        self.all_float = self.all_float && value.parse::<f64>().is_ok();
        self.all_bool = self.all_bool && parse_bool(value).is_some();
    }

    pub fn finish(&self) -> DataType {
        if !self.any {
            DataType::Float64
        } else if self.all_int {
            DataType::Int64
        } else if self.all_float {
            DataType::Float64
        } else if self.all_bool {
            DataType::Boolean
        } else {
            DataType::Utf8
        }
    }
}
