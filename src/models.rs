use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};

/// Filters applied to the fare dataset. Absent values mean "unbounded".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl FilterCriteria {
    /// Whether no filter is set at all.
    pub fn is_unbounded(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.origin.is_none()
            && self.destination.is_none()
    }

    /// Wire representation for `POST /api/data`. Absent values become empty strings.
    pub fn to_request(&self) -> DataRequest {
        DataRequest {
            start_date: format_date(self.start_date),
            end_date: format_date(self.end_date),
            origin: self.origin.clone().unwrap_or_default(),
            destination: self.destination.clone().unwrap_or_default(),
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Body of `POST /api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub start_date: String,
    pub end_date: String,
    pub origin: String,
    pub destination: String,
}

/// Body of `POST /api/insights`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest<'a> {
    pub filtered_data: &'a [FareRecord],
}

/// One observation of price and bookings for a route on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareRecord {
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    #[serde(deserialize_with = "non_negative_price")]
    pub price: f64,
    pub bookings: u32,
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = f64::deserialize(deserializer)?;
    if price < 0.0 {
        return Err(de::Error::custom(format!(
            "price must not be negative, got {}",
            price
        )));
    }
    Ok(price)
}

impl FareRecord {
    /// The (origin, destination) pair identifying this record's route.
    pub fn route_key(&self) -> (&str, &str) {
        (&self.origin, &self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrendPoint {
    pub date: NaiveDate,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Display label, e.g. "Sydney to Melbourne".
    pub route: String,
    pub bookings: u64,
    pub avg_price: f64,
}

impl RouteSummary {
    /// Price as shown in the route table, e.g. `$199.50`.
    pub fn formatted_price(&self) -> String {
        format!("${:.2}", self.avg_price)
    }
}

/// Response of `POST /api/data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub price_trends: Vec<PriceTrendPoint>,
    pub popular_routes: Vec<RouteSummary>,
    pub raw_data: Vec<FareRecord>,
}

impl FetchResult {
    /// Chart series as (labels, values).
    pub fn trend_series(&self) -> (Vec<String>, Vec<f64>) {
        self.price_trends
            .iter()
            .map(|p| (p.date.format("%Y-%m-%d").to_string(), p.avg_price))
            .unzip()
    }
}

/// Response of `POST /api/insights`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub text: String,
}
