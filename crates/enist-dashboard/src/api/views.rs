//! HTML pages rendered with askama.

use crate::error::DashboardError;
use crate::session::{FlashLevel, FlashMessage};
use askama::Template;
use axum::response::Html;
use lookup_client::{IpReport, LookupResult, PhoneReport};

/// Flash message as shown in the page header.
pub struct FlashView {
    pub class: &'static str,
    pub message: String,
}

impl From<FlashMessage> for FlashView {
    fn from(flash: FlashMessage) -> Self {
        let class = match flash.level {
            FlashLevel::Success => "flash-success",
            FlashLevel::Info => "flash-info",
            FlashLevel::Error => "flash-error",
        };
        Self {
            class,
            message: flash.message,
        }
    }
}

pub fn flash_views(flashes: Vec<FlashMessage>) -> Vec<FlashView> {
    flashes.into_iter().map(FlashView::from).collect()
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<FlashView>,
    pub logged_in: bool,
    pub next: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub flashes: Vec<FlashView>,
    pub logged_in: bool,
    pub phone: String,
    pub ip: String,
    pub result: Option<ResultView>,
    pub logo_available: bool,
    pub default_logo_text: String,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub flashes: Vec<FlashView>,
    pub logged_in: bool,
    pub google_maps_api_key: String,
    pub ip_geolocation_api: String,
}

/// Render a page into an HTML response body.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, DashboardError> {
    Ok(Html(template.render()?))
}

/// Lookup result flattened for display.
pub struct ResultView {
    pub phone: Option<PhoneView>,
    pub ip: Option<IpView>,
}

pub struct PhoneView {
    pub raw: String,
    pub error: Option<String>,
    pub e164: String,
    pub valid: bool,
    pub country: String,
    pub carrier: String,
    pub timezones: String,
    pub coordinates: Option<String>,
}

pub struct IpView {
    pub error: Option<String>,
    pub fields: Vec<IpField>,
}

pub struct IpField {
    pub key: String,
    pub value: String,
}

impl From<&LookupResult> for ResultView {
    fn from(result: &LookupResult) -> Self {
        Self {
            phone: result.phone.as_ref().map(PhoneView::from),
            ip: result.ip_info.as_ref().map(IpView::from),
        }
    }
}

impl From<&PhoneReport> for PhoneView {
    fn from(report: &PhoneReport) -> Self {
        match report {
            PhoneReport::Parsed {
                raw,
                details,
                coordinates,
            } => Self {
                raw: raw.clone(),
                error: None,
                e164: details.e164.clone(),
                valid: details.valid,
                country: details.country.clone(),
                carrier: details.carrier.clone(),
                timezones: details.timezones.join(", "),
                coordinates: coordinates.map(|c| format!("{:.6}, {:.6}", c.lat, c.lng)),
            },
            PhoneReport::Failed { raw, error } => Self {
                raw: raw.clone(),
                error: Some(error.clone()),
                e164: String::new(),
                valid: false,
                country: String::new(),
                carrier: String::new(),
                timezones: String::new(),
                coordinates: None,
            },
        }
    }
}

impl From<&IpReport> for IpView {
    fn from(report: &IpReport) -> Self {
        match report {
            IpReport::Error { error } => Self {
                error: Some(error.clone()),
                fields: Vec::new(),
            },
            IpReport::Record(record) => Self {
                error: None,
                fields: record
                    .iter()
                    .map(|(key, value)| IpField {
                        key: key.clone(),
                        value: match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        },
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookup_client::Coordinates;

    #[test]
    fn test_failed_phone_view() {
        let view = PhoneView::from(&PhoneReport::Failed {
            raw: "notaphone".into(),
            error: "Phone parse error: not a number".into(),
        });

        assert_eq!(view.raw, "notaphone");
        assert!(view.error.is_some());
        assert!(view.coordinates.is_none());
    }

    #[test]
    fn test_ip_record_fields_keep_strings_unquoted() {
        let mut record = serde_json::Map::new();
        record.insert("city".into(), "Mountain View".into());
        record.insert("anycast".into(), true.into());

        let view = IpView::from(&IpReport::Record(record));
        let city = view.fields.iter().find(|f| f.key == "city").unwrap();
        let anycast = view.fields.iter().find(|f| f.key == "anycast").unwrap();

        assert_eq!(city.value, "Mountain View");
        assert_eq!(anycast.value, "true");
    }

    #[test]
    fn test_dashboard_escapes_input() {
        let page = DashboardTemplate {
            flashes: vec![],
            logged_in: true,
            phone: "<script>".into(),
            ip: String::new(),
            result: Some(ResultView {
                phone: Some(PhoneView::from(&PhoneReport::Failed {
                    raw: "<script>".into(),
                    error: "bad".into(),
                })),
                ip: None,
            }),
            logo_available: false,
            default_logo_text: "TNEH".into(),
        };

        let html = page.render().unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_coordinates_formatting() {
        let details = lookup_client::analyze_phone("+14155552671").unwrap();
        let view = PhoneView::from(&PhoneReport::Parsed {
            raw: "+14155552671".into(),
            details,
            coordinates: Some(Coordinates {
                lat: 37.09024,
                lng: -95.712891,
            }),
        });

        assert_eq!(view.coordinates.as_deref(), Some("37.090240, -95.712891"));
        assert!(view.valid);
    }
}
