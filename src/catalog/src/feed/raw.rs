use serde_json::{Map, Value};

use crate::constants::{ATTRIBUTE_PREFIX, PLAN_CODE_KEY, REGIONS_KEY, TERM_KEY};
use crate::normalizer::parse_cost;
use crate::skip::SkipReason;

/// Prices of one plan in one region. Absent means not sold there, or
/// bundled in another offer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalPrice {
    /// Scalar region value or the `value` key of the map.
    pub generic: Option<f64>,
    pub hourly: Option<f64>,
    pub monthly: Option<f64>,
    pub linux_hourly: Option<f64>,
    pub linux_monthly: Option<f64>,
    pub windows_hourly: Option<f64>,
    pub windows_monthly: Option<f64>,
}

impl RegionalPrice {
    pub fn from_value(value: &Value) -> Result<Self, SkipReason> {
        let mut price = RegionalPrice::default();
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    let slot = match key.as_str() {
                        "value" => &mut price.generic,
                        "hourly" => &mut price.hourly,
                        "monthly" => &mut price.monthly,
                        "linux.hourly" => &mut price.linux_hourly,
                        "linux.monthly" => &mut price.linux_monthly,
                        "windows.hourly" => &mut price.windows_hourly,
                        "windows.monthly" => &mut price.windows_monthly,
                        _ => continue,
                    };
                    *slot = cost_of(v)?;
                }
            }
            other => price.generic = cost_of(other)?,
        }
        Ok(price)
    }

    /// Linux prices, the generic keys standing in when no `linux.*` key is set.
    pub fn linux(&self) -> (Option<f64>, Option<f64>) {
        if self.linux_hourly.is_some() || self.linux_monthly.is_some() {
            (self.linux_hourly, self.linux_monthly)
        } else {
            (self.hourly.or(self.generic), self.monthly)
        }
    }

    pub fn windows(&self) -> (Option<f64>, Option<f64>) {
        (self.windows_hourly, self.windows_monthly)
    }

    /// Hourly and monthly prices of a plan without OS variants.
    pub fn terms(&self) -> (Option<f64>, Option<f64>) {
        (self.hourly, self.monthly)
    }

    /// Single price of a storage offer.
    pub fn flat(&self) -> Option<f64> {
        self.generic.or(self.monthly)
    }

    pub fn is_empty(&self) -> bool {
        *self == RegionalPrice::default()
    }
}

/// Numeric feed value: a JSON number or a localized string.
pub fn cost_of(value: &Value) -> Result<Option<f64>, SkipReason> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => parse_cost(s),
        other => Err(SkipReason::MalformedNumber(other.to_string())),
    }
}

/// One flat object of the bulk price feed, split into its fixed parts.
///
/// Attribute positions are kept as an ordered list so the decoders never see
/// the raw key names.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub plan_code: String,
    pub term: Option<String>,
    pub attributes: Vec<Option<String>>,
    /// Lower-cased region key and its prices.
    pub regions: Vec<(String, RegionalPrice)>,
}

impl RawRecord {
    pub fn from_value(value: &Value) -> Result<Self, SkipReason> {
        let map = value.as_object().ok_or(SkipReason::Unclassifiable)?;
        let plan_code = map
            .get(PLAN_CODE_KEY)
            .and_then(Value::as_str)
            .ok_or(SkipReason::Unclassifiable)?
            .to_string();
        let term = map.get(TERM_KEY).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            plan_code,
            term,
            attributes: attributes_of(map),
            regions: regions_of(map)?,
        })
    }

    pub fn attribute(&self, index: usize) -> Option<&str> {
        self.attributes.get(index).and_then(|a| a.as_deref())
    }

    pub fn has_attribute(&self, index: usize) -> bool {
        self.attribute(index).is_some()
    }

    pub fn require(&self, index: usize) -> Result<&str, SkipReason> {
        self.attribute(index)
            .ok_or(SkipReason::MissingAttribute(index))
    }
}

fn attributes_of(map: &Map<String, Value>) -> Vec<Option<String>> {
    let mut attributes: Vec<Option<String>> = Vec::new();
    for (key, value) in map {
        let Some(index) = key
            .strip_prefix(ATTRIBUTE_PREFIX)
            .and_then(|i| i.parse::<usize>().ok())
        else {
            continue;
        };
        let text = match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        if attributes.len() <= index {
            attributes.resize(index + 1, None);
        }
        attributes[index] = text;
    }
    attributes
}

fn is_reserved(key: &str) -> bool {
    key == PLAN_CODE_KEY || key == TERM_KEY || key == REGIONS_KEY || key.starts_with(ATTRIBUTE_PREFIX)
}

fn regions_of(map: &Map<String, Value>) -> Result<Vec<(String, RegionalPrice)>, SkipReason> {
    map.iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, value)| Ok((key.to_lowercase(), RegionalPrice::from_value(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_is_split() {
        let record = RawRecord::from_value(&json!({
            "planCode": "b2-7.consumption",
            "term": "hour",
            "regions": "GRA7,SBG5",
            "attr-0": "b2-7",
            "attr-1": "7 GB",
            "attr-3": " ",
            "GRA7": {"hourly": "0.0681", "monthly": "26.40"},
            "SBG5": {"linux.hourly": 0.07, "windows.hourly": "Included"}
        }))
        .unwrap();

        assert_eq!(record.plan_code, "b2-7.consumption");
        assert_eq!(record.term.as_deref(), Some("hour"));
        assert_eq!(record.attribute(0), Some("b2-7"));
        assert_eq!(record.attribute(2), None);
        assert_eq!(record.require(3), Err(SkipReason::MissingAttribute(3)));
        assert_eq!(record.regions.len(), 2);

        let (code, gra) = &record.regions[0];
        assert_eq!(code, "gra7");
        assert_eq!(gra.linux(), (Some(0.0681), Some(26.4)));

        let (_, sbg) = &record.regions[1];
        assert_eq!(sbg.linux(), (Some(0.07), None));
        assert_eq!(sbg.windows(), (None, None));
    }

    #[test]
    fn test_scalar_region_is_generic() {
        let price = RegionalPrice::from_value(&json!("0,04 €")).unwrap();
        assert_eq!(price.flat(), Some(0.04));
        assert_eq!(price.linux(), (Some(0.04), None));
        assert!(RegionalPrice::from_value(&json!("Included")).unwrap().is_empty());
    }

    #[test]
    fn test_value_map() {
        let price =
            RegionalPrice::from_value(&json!({"value": 0.04, "currencyCode": "EUR"})).unwrap();
        assert_eq!(price.generic, Some(0.04));
        assert_eq!(price.terms(), (None, None));
    }

    #[test]
    fn test_malformed_region_price() {
        let err = RawRecord::from_value(&json!({"planCode": "x", "gra": {"hourly": "n/a"}}));
        assert_eq!(err, Err(SkipReason::MalformedNumber("n/a".into())));
        assert_eq!(
            RawRecord::from_value(&json!({"attr-0": "x"})),
            Err(SkipReason::Unclassifiable)
        );
    }
}
