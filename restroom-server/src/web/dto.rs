//! Request and response DTOs.
//!
//! Request bodies deserialize into all-`Option` structs and are validated
//! explicitly, so a missing field yields the Korean message the clients
//! expect instead of a serde parse error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::ApiError;
use crate::domain::{
    ApprovalStatus, Coordinate, EditStatus, RatingScore, Role, Toilet, ToiletSource, User,
};
use crate::store::{NewUserToilet, UpdateToilet};

/// Loose email shape check: one `@` with a dot somewhere after it.
fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}

/// Wraps a field's value in `Some` so that an absent field (`None` via
/// `default`) can be told apart from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

// ---- auth ----

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl RegisterRequest {
    /// Normalized (email, password, name).
    pub fn validate(self) -> Result<(String, String, String), ApiError> {
        let (Some(email), Some(password), Some(name)) =
            (present(&self.email), self.password, present(&self.name))
        else {
            return Err(ApiError::bad_request("이메일, 비밀번호, 이름이 모두 필요합니다."));
        };
        let email = email.to_lowercase();
        if !valid_email(&email) {
            return Err(ApiError::bad_request("올바른 이메일 형식이 아닙니다."));
        }
        if password.chars().count() < 6 {
            return Err(ApiError::bad_request("비밀번호는 최소 6자 이상이어야 합니다."));
        }
        Ok((email, password, name))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let (Some(email), Some(password)) = (present(&self.email), self.password) else {
            return Err(ApiError::bad_request("이메일과 비밀번호가 필요합니다."));
        };
        Ok((email.to_lowercase(), password))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl ChangePasswordRequest {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let (Some(current), Some(new)) = (self.current_password, self.new_password) else {
            return Err(ApiError::bad_request("현재 비밀번호와 새 비밀번호가 필요합니다."));
        };
        if new.chars().count() < 6 {
            return Err(ApiError::bad_request("새 비밀번호는 최소 6자 이상이어야 합니다."));
        }
        Ok((current, new))
    }
}

/// Account as exposed on the wire; never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

// ---- toilets ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateToiletRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_password: Option<bool>,
    pub password_hint: Option<String>,
    pub creator_id: Option<String>,
}

impl CreateToiletRequest {
    pub fn validate(self) -> Result<NewUserToilet, ApiError> {
        let (Some(name), Some(address), Some(latitude), Some(longitude)) = (
            present(&self.name),
            present(&self.address),
            self.latitude,
            self.longitude,
        ) else {
            return Err(ApiError::bad_request(
                "필수 정보가 누락되었습니다. (이름, 주소, 위도, 경도, 타입 필요)",
            ));
        };
        let coordinate = Coordinate::new(latitude, longitude)
            .map_err(|_| ApiError::bad_request("올바르지 않은 좌표입니다."))?;
        Ok(NewUserToilet {
            name,
            address,
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            has_password: self.has_password.unwrap_or(false),
            password_hint: present(&self.password_hint),
            creator_id: present(&self.creator_id),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateToiletRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_password: Option<bool>,
    // Absent means "leave the hint alone"; an explicit null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub password_hint: Option<Option<String>>,
}

impl UpdateToiletRequest {
    pub fn validate(self) -> Result<UpdateToilet, ApiError> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                Coordinate::new(lat, lon)
                    .map_err(|_| ApiError::bad_request("올바르지 않은 좌표입니다."))?;
            }
            (None, None) => {}
            // One half of a coordinate is never meaningful.
            _ => return Err(ApiError::bad_request("올바르지 않은 좌표입니다.")),
        }
        Ok(UpdateToilet {
            name: present(&self.name),
            address: present(&self.address),
            latitude: self.latitude,
            longitude: self.longitude,
            has_password: self.has_password,
            password_hint: self.password_hint,
        })
    }
}

/// Full restroom record on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToiletDto {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub source: ToiletSource,
    pub status: ApprovalStatus,
    pub has_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Toilet> for ToiletDto {
    fn from(toilet: Toilet) -> Self {
        Self {
            id: toilet.id,
            name: toilet.name,
            address: toilet.address,
            latitude: toilet.coordinate.latitude(),
            longitude: toilet.coordinate.longitude(),
            source: toilet.source,
            status: toilet.status,
            has_password: toilet.has_password,
            password_hint: toilet.password_hint,
            creator_id: toilet.creator_id,
            is_active: toilet.is_active,
            created_at: toilet.created_at,
            updated_at: toilet.updated_at,
        }
    }
}

// ---- ratings ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub user_id: Option<String>,
    pub rating: Option<f64>,
}

impl RateRequest {
    pub fn validate(self) -> Result<(String, RatingScore), ApiError> {
        let (Some(user_id), Some(rating)) = (present(&self.user_id), self.rating) else {
            return Err(ApiError::bad_request("사용자 ID와 별점이 필요합니다."));
        };
        let score = RatingScore::from_f64(rating)
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok((user_id, score))
    }
}

// ---- edit requests ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEditRequest {
    pub user_id: Option<String>,
    pub reason: Option<String>,
    pub description: Option<String>,
}

impl CreateEditRequest {
    pub fn validate(self) -> Result<(String, String, Option<String>), ApiError> {
        let (Some(user_id), Some(reason)) = (present(&self.user_id), present(&self.reason)) else {
            return Err(ApiError::bad_request("사용자 ID와 수정 사유가 필요합니다."));
        };
        Ok((user_id, reason, present(&self.description)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEditRequest {
    pub status: Option<String>,
    pub admin_response: Option<String>,
}

impl ResolveEditRequest {
    pub fn validate(self) -> Result<(EditStatus, Option<String>), ApiError> {
        let status = self
            .status
            .as_deref()
            .and_then(EditStatus::parse)
            .filter(|s| *s != EditStatus::Pending)
            .ok_or_else(|| {
                ApiError::bad_request("상태는 \"approved\" 또는 \"rejected\"여야 합니다.")
            })?;
        Ok((status, present(&self.admin_response)))
    }
}

// ---- queries ----

#[derive(Debug, Deserialize)]
pub struct StationQuery {
    pub station: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilterQuery {
    pub status: Option<String>,
}

impl StatusFilterQuery {
    /// `None` when no filter was given; an unknown status string is a 400.
    pub fn parse(&self) -> Result<Option<EditStatus>, ApiError> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => EditStatus::parse(s).map(Some).ok_or_else(|| {
                ApiError::bad_request("상태는 \"pending\", \"approved\" 또는 \"rejected\"여야 합니다.")
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("a.b+c@sub.example.co.kr"));
        assert!(!valid_email("a@example"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("a b@example.com"));
        assert!(!valid_email("example.com"));
    }

    #[test]
    fn register_requires_all_fields() {
        let req = RegisterRequest {
            email: Some("a@example.com".to_owned()),
            password: Some("password123".to_owned()),
            name: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.message, "이메일, 비밀번호, 이름이 모두 필요합니다.");
    }

    #[test]
    fn register_normalizes_email_case() {
        let req = RegisterRequest {
            email: Some("  A@Example.COM ".to_owned()),
            password: Some("password123".to_owned()),
            name: Some("테스터".to_owned()),
        };
        let (email, _, _) = req.validate().unwrap();
        assert_eq!(email, "a@example.com");
    }

    #[test]
    fn register_rejects_short_password() {
        let req = RegisterRequest {
            email: Some("a@example.com".to_owned()),
            password: Some("12345".to_owned()),
            name: Some("테스터".to_owned()),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.message, "비밀번호는 최소 6자 이상이어야 합니다.");
    }

    #[test]
    fn create_toilet_requires_the_core_fields() {
        let body = r#"{ "name": "우리동네 화장실", "address": "서울시 어딘가" }"#;
        let req: CreateToiletRequest = serde_json::from_str(body).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.message.starts_with("필수 정보가 누락되었습니다."));
    }

    #[test]
    fn create_toilet_rejects_bad_coordinates() {
        let body = r#"{
            "name": "우리동네 화장실", "address": "서울시 어딘가",
            "latitude": 95.0, "longitude": 127.0
        }"#;
        let req: CreateToiletRequest = serde_json::from_str(body).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.message, "올바르지 않은 좌표입니다.");
    }

    #[test]
    fn empty_name_counts_as_missing() {
        let body = r#"{
            "name": "   ", "address": "서울시 어딘가",
            "latitude": 37.5, "longitude": 127.0
        }"#;
        let req: CreateToiletRequest = serde_json::from_str(body).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rate_request_rejects_fractional_scores() {
        let req = RateRequest {
            user_id: Some("user-1".to_owned()),
            rating: Some(3.5),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.message, "별점은 1-5점 사이의 정수여야 합니다.");
    }

    #[test]
    fn resolve_rejects_pending_and_unknown_statuses() {
        for status in ["pending", "nonsense"] {
            let req = ResolveEditRequest {
                status: Some(status.to_owned()),
                admin_response: None,
            };
            assert!(req.validate().is_err());
        }
        let req = ResolveEditRequest {
            status: Some("approved".to_owned()),
            admin_response: Some("수정했습니다".to_owned()),
        };
        let (status, response) = req.validate().unwrap();
        assert_eq!(status, EditStatus::Approved);
        assert_eq!(response.as_deref(), Some("수정했습니다"));
    }

    #[test]
    fn password_hint_null_clears_but_absent_keeps() {
        let req: UpdateToiletRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.password_hint, None);

        let req: UpdateToiletRequest =
            serde_json::from_str(r#"{ "passwordHint": null }"#).unwrap();
        assert_eq!(req.password_hint, Some(None));

        let req: UpdateToiletRequest =
            serde_json::from_str(r#"{ "passwordHint": "1234" }"#).unwrap();
        assert_eq!(req.password_hint, Some(Some("1234".to_owned())));
    }

    #[test]
    fn half_a_coordinate_is_rejected_on_update() {
        let body = r#"{ "latitude": 37.5 }"#;
        let req: UpdateToiletRequest = serde_json::from_str(body).unwrap();
        assert!(req.validate().is_err());
    }
}
