use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::users::UserPatch;

/// Keeps an explicit `null` distinguishable from an absent key.
fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

/// `""` clears a nullable text field the same way `null` does.
fn nullable_text(v: Option<Option<String>>) -> Option<Option<String>> {
    v.map(|inner| inner.filter(|s| !s.is_empty()))
}

/// Non-null text: `null` and `""` leave the stored value alone.
fn required_text(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// Accepts a non-negative integer (or an integral float), or a string holding
/// an integer. `null` and `""` clear the age.
pub(crate) fn parse_age(v: Value) -> Result<Option<i32>, ApiError> {
    let invalid = || ApiError::validation("Invalid age");
    let age = match v {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<i32>().map_err(|_| invalid())?,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                // Clients that send every number as a double: 34.0 is 34.
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                    .map(|f| f as i64)
            })
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    if age < 0 {
        return Err(invalid());
    }
    Ok(Some(age))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn into_patch(self) -> Result<UserPatch, ApiError> {
        let age = self.age.map(parse_age).transpose()?;
        Ok(UserPatch {
            name: self.name,
            age,
            gender: nullable_text(self.gender),
            contact: nullable_text(self.contact),
            address: nullable_text(self.address),
            language: required_text(self.language),
            ..Default::default()
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthUpdateRequest {
    #[serde(default, deserialize_with = "present")]
    pub blood_group: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub blood_pressure: Option<Option<String>>,
}

impl HealthUpdateRequest {
    pub fn into_patch(self) -> UserPatch {
        UserPatch {
            blood_group: nullable_text(self.blood_group),
            blood_pressure: nullable_text(self.blood_pressure),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageRequest {
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub msg: &'static str,
    pub language: String,
}
