use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use couponapi_coupons::MIN_DISCOUNT_VALUE;
use couponapi_infra::{CouponView, CreateCoupon};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/coupons`.
///
/// Every field is optional at the JSON level so that missing fields turn into
/// per-field validation messages instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_value: Option<Decimal>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub published: Option<bool>,
}

/// Field name -> message, in field order.
pub type FieldErrors = BTreeMap<&'static str, String>;

impl CreateCouponRequest {
    /// Check presence and shape, then hand over to the service input.
    ///
    /// Business rules (code length after normalization, etc.) are not checked
    /// here; the entity owns them.
    pub fn validate(self, now: DateTime<Utc>) -> Result<CreateCoupon, FieldErrors> {
        let mut errors = FieldErrors::new();

        let code = required_text(self.code, "code", "Code is required", &mut errors);
        let description = required_text(
            self.description,
            "description",
            "Description is required",
            &mut errors,
        );

        match self.discount_value {
            None => {
                errors.insert("discountValue", "Discount value is required".to_string());
            }
            Some(v) if v < MIN_DISCOUNT_VALUE => {
                errors.insert("discountValue", "Minimum discount value is 0.5".to_string());
            }
            Some(_) => {}
        }

        match self.expiration_date {
            None => {
                errors.insert("expirationDate", "Expiration date is required".to_string());
            }
            Some(at) if at <= now => {
                errors.insert(
                    "expirationDate",
                    "Expiration date must be in the future".to_string(),
                );
            }
            Some(_) => {}
        }

        match (code, description, self.discount_value, self.expiration_date) {
            (Some(code), Some(description), Some(discount_value), Some(expiration_date))
                if errors.is_empty() =>
            {
                Ok(CreateCoupon {
                    code,
                    description,
                    discount_value,
                    expiration_date,
                    published: self.published,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    message: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.insert(field, message.to_string());
            None
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Response body of a created coupon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub id: String,
    pub code: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_value: Decimal,
    pub expiration_date: DateTime<Utc>,
    pub published: bool,
}

impl From<CouponView> for CouponResponse {
    fn from(view: CouponView) -> Self {
        Self {
            id: view.id.to_string(),
            code: view.code,
            description: view.description,
            discount_value: view.discount_value,
            expiration_date: view.expiration_date,
            published: view.published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn full(now: DateTime<Utc>) -> CreateCouponRequest {
        CreateCouponRequest {
            code: Some("ABC-123".to_string()),
            description: Some("Test".to_string()),
            discount_value: Some(Decimal::new(5, 1)),
            expiration_date: Some(now + Duration::hours(1)),
            published: None,
        }
    }

    #[test]
    fn complete_request_passes_through_unchanged() {
        let now = Utc::now();
        let input = full(now).validate(now).unwrap();
        assert_eq!(input.code, "ABC-123");
        assert_eq!(input.published, None);
    }

    #[test]
    fn empty_request_reports_every_required_field() {
        let errors = CreateCouponRequest::default().validate(Utc::now()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["code"], "Code is required");
        assert_eq!(errors["description"], "Description is required");
        assert_eq!(errors["discountValue"], "Discount value is required");
        assert_eq!(errors["expirationDate"], "Expiration date is required");
    }

    #[test]
    fn blank_code_is_missing() {
        let now = Utc::now();
        let mut req = full(now);
        req.code = Some("   ".to_string());
        let errors = req.validate(now).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["code"], "Code is required");
    }

    #[test]
    fn low_discount_and_past_date_are_shape_errors() {
        let now = Utc::now();
        let mut req = full(now);
        req.discount_value = Some(Decimal::new(4, 1));
        req.expiration_date = Some(now);
        let errors = req.validate(now).unwrap_err();
        assert_eq!(errors["discountValue"], "Minimum discount value is 0.5");
        assert_eq!(errors["expirationDate"], "Expiration date must be in the future");
    }

    #[test]
    fn request_deserializes_from_camel_case_json() {
        let req: CreateCouponRequest = serde_json::from_value(serde_json::json!({
            "code": "ABC123",
            "description": "x",
            "discountValue": 0.8,
            "expirationDate": "2099-01-01T00:00:00Z",
            "published": true
        }))
        .unwrap();
        assert_eq!(req.discount_value, Some(Decimal::new(8, 1)));
        assert_eq!(req.published, Some(true));
    }

    #[test]
    fn response_serializes_discount_as_number_without_status() {
        let body = serde_json::to_value(CouponResponse {
            id: "id".to_string(),
            code: "ABC123".to_string(),
            description: "x".to_string(),
            discount_value: Decimal::new(5, 1),
            expiration_date: Utc::now(),
            published: true,
        })
        .unwrap();
        assert_eq!(body["discountValue"], serde_json::json!(0.5));
        assert!(body.get("status").is_none());
        assert!(body.get("deletedAt").is_none());
    }
}
