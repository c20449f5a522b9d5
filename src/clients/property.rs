//! Property lookup client — queries the upstream real-estate data API by
//! address and reshapes the sprawling raw record into the fields the wizard
//! actually uses.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UpstreamError;

const SERVICE: &str = "property lookup";

/// Upstream requests are abandoned after this long.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Most photos a reshaped record carries.
const MAX_PHOTOS: usize = 20;

/// Search request — at least one of `address` or `zipcode` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

impl AddressQuery {
    pub fn is_searchable(&self) -> bool {
        let filled = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.address) || filled(&self.zipcode)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub full: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEvent {
    pub date: Option<String>,
    pub event: Option<String>,
    pub price: Option<f64>,
    pub price_change_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxYear {
    pub year: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    pub agent_name: Option<String>,
    pub broker_name: Option<String>,
    pub mls_name: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    pub grades: String,
    pub distance: f64,
    pub rating: Option<f64>,
}

/// The normalized property record returned by the lookup proxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub zpid: u64,
    pub mls_id: Option<String>,
    pub address: PropertyAddress,

    pub price: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<u64>,
    pub lot_size: Option<String>,
    pub year_built: Option<i64>,
    pub home_type: String,

    pub home_status: String,
    pub days_on_market: Option<i64>,

    pub estimated_value: Option<f64>,
    pub price_history: Vec<PriceEvent>,
    pub tax_history: Vec<TaxYear>,
    pub monthly_hoa_fee: Option<u64>,
    pub property_tax_rate: Option<f64>,

    pub photos: Vec<String>,
    pub virtual_tour_url: Option<String>,
    pub description: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub attribution: Attribution,
    pub schools: Vec<School>,
}

/// Pull a monthly fee out of strings like `"$480 monthly"`.
fn extract_hoa_fee(fee: Option<&str>) -> Option<u64> {
    static FEE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\$([0-9,]+)").expect("fee regex is valid"));
    let captures = FEE_RE.captures(fee?)?;
    captures[1].replace(',', "").parse().ok()
}

/// Pick one URL per photo, preferring the largest webp rendition, capped at
/// [`MAX_PHOTOS`].
fn extract_photos(raw: Option<&Value>) -> Vec<String> {
    let Some(photos) = raw.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    photos
        .iter()
        .take(MAX_PHOTOS)
        .filter_map(|photo| {
            if let Some(mixed) = photo.get("mixedSources") {
                let sources = mixed
                    .get("webp")
                    .and_then(|v| v.as_array())
                    .filter(|a| !a.is_empty())
                    .or_else(|| mixed.get("jpeg").and_then(|v| v.as_array()))?;
                return sources.last()?.get("url")?.as_str().map(String::from);
            }
            photo.get("url")?.as_str().map(String::from)
        })
        .collect()
}

/// Reshape the raw upstream record into a [`PropertyRecord`].
pub fn transform_property(raw: &Value) -> PropertyRecord {
    let str_field = |v: Option<&Value>| v.and_then(|v| v.as_str()).map(String::from);
    let reso = raw.get("resoFacts");

    PropertyRecord {
        zpid: raw.get("zpid").and_then(|v| v.as_u64()).unwrap_or(0),
        mls_id: str_field(raw.pointer("/attributionInfo/mlsId")),
        address: PropertyAddress {
            street: str_field(raw.get("streetAddress")).unwrap_or_default(),
            city: str_field(raw.get("city")).unwrap_or_default(),
            state: str_field(raw.get("state")).unwrap_or_default(),
            zipcode: str_field(raw.get("zipcode")).unwrap_or_default(),
            full: str_field(raw.get("abbreviatedAddress")).unwrap_or_default(),
        },
        price: raw.get("price").and_then(|v| v.as_f64()),
        bedrooms: raw.get("bedrooms").and_then(|v| v.as_f64()),
        bathrooms: raw.get("bathrooms").and_then(|v| v.as_f64()),
        square_feet: raw.get("livingArea").and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }),
        lot_size: reso.and_then(|r| str_field(r.get("lotSize"))),
        year_built: raw.get("yearBuilt").and_then(|v| v.as_i64()),
        home_type: str_field(raw.get("homeType")).unwrap_or_else(|| "Unknown".to_string()),
        home_status: str_field(raw.get("homeStatus")).unwrap_or_else(|| "UNKNOWN".to_string()),
        days_on_market: raw.get("daysOnZillow").and_then(|v| v.as_i64()),
        estimated_value: raw.get("zestimate").and_then(|v| v.as_f64()),
        price_history: raw
            .get("priceHistory")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|item| PriceEvent {
                        date: str_field(item.get("date")),
                        event: str_field(item.get("event")),
                        price: item.get("price").and_then(|v| v.as_f64()),
                        price_change_rate: item.get("priceChangeRate").and_then(|v| v.as_f64()),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        tax_history: raw
            .get("taxHistory")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|item| TaxYear {
                        year: item.get("year").and_then(|v| v.as_i64()).unwrap_or(0),
                        value: item.get("value").and_then(|v| v.as_f64()).unwrap_or(0.0),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        monthly_hoa_fee: extract_hoa_fee(reso.and_then(|r| r.get("hoaFee")).and_then(|v| v.as_str())),
        property_tax_rate: raw.get("propertyTaxRate").and_then(|v| v.as_f64()),
        photos: extract_photos(raw.get("originalPhotos")),
        virtual_tour_url: reso.and_then(|r| str_field(r.get("virtualTour"))),
        description: str_field(raw.get("description")),
        latitude: raw.get("latitude").and_then(|v| v.as_f64()),
        longitude: raw.get("longitude").and_then(|v| v.as_f64()),
        attribution: Attribution {
            agent_name: str_field(raw.pointer("/attributionInfo/agentName")),
            broker_name: str_field(raw.pointer("/attributionInfo/brokerName")),
            mls_name: str_field(raw.pointer("/attributionInfo/mlsName")),
            last_updated: str_field(raw.pointer("/attributionInfo/lastUpdated")),
        },
        schools: raw
            .get("schools")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|item| School {
                        name: str_field(item.get("name")).unwrap_or_default(),
                        grades: str_field(item.get("grades")).unwrap_or_default(),
                        distance: item.get("distance").and_then(|v| v.as_f64()).unwrap_or(0.0),
                        rating: item.get("rating").and_then(|v| v.as_f64()),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// HTTP client for the upstream real-estate data API.
pub struct PropertyClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl PropertyClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            timeout: LOOKUP_TIMEOUT,
        }
    }

    /// Look up a property by address and reshape the response.
    pub async fn lookup(&self, query: &AddressQuery) -> Result<PropertyRecord, UpstreamError> {
        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout {
                        service: SERVICE.to_string(),
                    }
                } else {
                    UpstreamError::Transport {
                        service: SERVICE.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UpstreamError::Transport {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            // Surface the upstream's own message when it sent one.
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error"))
                        .and_then(|m| m.as_str())
                        .map(String::from)
                })
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(UpstreamError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let raw: Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: format!("Could not parse response as JSON: {e}"),
            })?;

        if let Some(error) = raw.get("error").and_then(|v| v.as_str()) {
            return Err(UpstreamError::NotFound {
                service: SERVICE.to_string(),
                detail: error.to_string(),
            });
        }
        if raw.get("zpid").and_then(|v| v.as_u64()).is_none() {
            return Err(UpstreamError::NotFound {
                service: SERVICE.to_string(),
                detail: "No property data returned for the given address".to_string(),
            });
        }

        Ok(transform_property(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_needs_address_or_zipcode() {
        assert!(!AddressQuery::default().is_searchable());
        assert!(!AddressQuery {
            city: Some("Seattle".into()),
            state: Some("WA".into()),
            ..Default::default()
        }
        .is_searchable());
        assert!(AddressQuery {
            address: Some("123 Main St".into()),
            ..Default::default()
        }
        .is_searchable());
        assert!(AddressQuery {
            zipcode: Some("98101".into()),
            ..Default::default()
        }
        .is_searchable());
    }

    #[test]
    fn hoa_fee_parsing() {
        assert_eq!(extract_hoa_fee(Some("$480 monthly")), Some(480));
        assert_eq!(extract_hoa_fee(Some("$1,250 monthly")), Some(1250));
        assert_eq!(extract_hoa_fee(Some("no fee")), None);
        assert_eq!(extract_hoa_fee(None), None);
    }

    #[test]
    fn photos_prefer_largest_webp_rendition() {
        let raw = json!([
            {
                "mixedSources": {
                    "webp": [
                        {"url": "https://p.example.com/small.webp"},
                        {"url": "https://p.example.com/large.webp"}
                    ],
                    "jpeg": [{"url": "https://p.example.com/large.jpg"}]
                }
            },
            {"mixedSources": {"jpeg": [{"url": "https://p.example.com/only.jpg"}]}},
            {"url": "https://p.example.com/legacy.jpg"}
        ]);
        assert_eq!(
            extract_photos(Some(&raw)),
            vec![
                "https://p.example.com/large.webp",
                "https://p.example.com/only.jpg",
                "https://p.example.com/legacy.jpg",
            ]
        );
    }

    #[test]
    fn photos_are_capped() {
        let many: Vec<Value> = (0..40)
            .map(|i| json!({"url": format!("https://p.example.com/{i}.jpg")}))
            .collect();
        let raw = Value::Array(many);
        assert_eq!(extract_photos(Some(&raw)).len(), MAX_PHOTOS);
    }

    #[test]
    fn transform_fills_defaults_for_sparse_records() {
        let record = transform_property(&json!({"zpid": 48749425}));
        assert_eq!(record.zpid, 48749425);
        assert_eq!(record.home_type, "Unknown");
        assert_eq!(record.home_status, "UNKNOWN");
        assert!(record.mls_id.is_none());
        assert!(record.photos.is_empty());
        assert!(record.schools.is_empty());
    }

    #[test]
    fn transform_extracts_core_fields() {
        let raw = json!({
            "zpid": 48749425,
            "streetAddress": "123 Main St",
            "city": "Seattle",
            "state": "WA",
            "zipcode": "98101",
            "abbreviatedAddress": "123 Main St, Seattle, WA 98101",
            "price": 750000,
            "bedrooms": 3,
            "bathrooms": 2.5,
            "livingArea": "1850",
            "yearBuilt": 1984,
            "homeType": "SINGLE_FAMILY",
            "homeStatus": "FOR_SALE",
            "zestimate": 762000,
            "resoFacts": {"hoaFee": "$55 monthly", "lotSize": "4,800 sqft"},
            "attributionInfo": {"mlsId": "2254520", "agentName": "Pat Agent"},
            "taxHistory": [{"year": 2024, "value": 680000}],
            "schools": [{"name": "Main Elementary", "grades": "K-5", "distance": 0.4, "rating": 8}]
        });
        let record = transform_property(&raw);
        assert_eq!(record.mls_id.as_deref(), Some("2254520"));
        assert_eq!(record.address.full, "123 Main St, Seattle, WA 98101");
        assert_eq!(record.square_feet, Some(1850));
        assert_eq!(record.monthly_hoa_fee, Some(55));
        assert_eq!(record.tax_history[0].year, 2024);
        assert_eq!(record.schools[0].rating, Some(8.0));
        assert_eq!(record.attribution.agent_name.as_deref(), Some("Pat Agent"));
    }
}
