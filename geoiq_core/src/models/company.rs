//! Company and brand records with their form and update payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{
    validate_description, validate_hex_color, validate_mission_statement, validate_name,
    validate_non_empty_list, validate_url, FormValidation, Validatable, ValidationResult,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "coreKPIs")]
    pub core_kpis: Vec<String>,
    pub mission_statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(custom(function = "validate_description"))]
    pub description: String,

    #[serde(default)]
    pub industry: String,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(rename = "coreKPIs")]
    #[validate(custom(function = "validate_non_empty_list"))]
    pub core_kpis: Vec<String>,

    #[validate(custom(function = "validate_mission_statement"))]
    pub mission_statement: String,

    #[serde(default)]
    pub target_audience: Option<String>,
}

/// Partial company update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "coreKPIs", default, skip_serializing_if = "Option::is_none")]
    pub core_kpis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub description: String,
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub status: BrandStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BrandForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(custom(function = "validate_description"))]
    pub description: String,

    #[validate(custom(function = "validate_non_empty_list"))]
    pub benefits: Vec<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub target_audience: Option<String>,

    /// Defaults to [`BrandStatus::Active`] when omitted.
    #[serde(default)]
    pub status: Option<BrandStatus>,
}

/// Partial brand update. `status` only changes when it is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BrandStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAndBrands {
    pub company: Option<Company>,
    pub brands: Vec<Brand>,
}

/// Next `updated_at` for a record: never earlier than, nor equal to, the
/// previous one, so the latest write always carries the greatest stamp.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

fn check_optional_color(result: &mut ValidationResult, color: Option<&str>) {
    if let Some(color) = color {
        if let Err(e) = validate_hex_color(color) {
            result.add_error("color", &e.message.unwrap_or_default());
        }
    }
}

fn check_optional_website(result: &mut ValidationResult, website: Option<&str>) {
    if let Some(website) = website.filter(|w| !w.trim().is_empty()) {
        if let Err(e) = validate_url(website) {
            result.add_error("website", &e.message.unwrap_or_default());
        }
    }
}

impl FormValidation for CompanyForm {
    fn validate_form(&self) -> ValidationResult {
        let mut result = self.validate_comprehensive();
        result.rename_field("coreKpis", "coreKPIs");
        check_optional_website(&mut result, self.website.as_deref());
        result
    }
}

impl FormValidation for CompanyUpdate {
    fn validate_form(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        if let Some(Err(e)) = self.name.as_deref().map(validate_name) {
            result.add_error("name", &e.message.unwrap_or_default());
        }
        if let Some(Err(e)) = self.description.as_deref().map(validate_description) {
            result.add_error("description", &e.message.unwrap_or_default());
        }
        if let Some(Err(e)) = self.core_kpis.as_deref().map(validate_non_empty_list) {
            result.add_error("coreKPIs", &e.message.unwrap_or_default());
        }
        if let Some(Err(e)) = self
            .mission_statement
            .as_deref()
            .map(validate_mission_statement)
        {
            result.add_error("missionStatement", &e.message.unwrap_or_default());
        }
        check_optional_website(&mut result, self.website.as_deref());

        result
    }
}

impl FormValidation for BrandForm {
    fn validate_form(&self) -> ValidationResult {
        let mut result = self.validate_comprehensive();
        check_optional_color(&mut result, self.color.as_deref());
        check_optional_website(&mut result, self.website.as_deref());
        result
    }
}

impl FormValidation for BrandUpdate {
    fn validate_form(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        if let Some(Err(e)) = self.name.as_deref().map(validate_name) {
            result.add_error("name", &e.message.unwrap_or_default());
        }
        if let Some(Err(e)) = self.description.as_deref().map(validate_description) {
            result.add_error("description", &e.message.unwrap_or_default());
        }
        if let Some(Err(e)) = self.benefits.as_deref().map(validate_non_empty_list) {
            result.add_error("benefits", &e.message.unwrap_or_default());
        }
        check_optional_color(&mut result, self.color.as_deref());
        check_optional_website(&mut result, self.website.as_deref());

        result
    }
}

impl Company {
    pub fn from_form(form: CompanyForm, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: form.name.trim().to_string(),
            description: form.description,
            industry: form.industry,
            website: form.website,
            core_kpis: form.core_kpis,
            mission_statement: form.mission_statement,
            target_audience: form.target_audience,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every form field, keeping identity and creation time.
    pub fn replace_with(&mut self, form: CompanyForm, now: DateTime<Utc>) {
        self.name = form.name.trim().to_string();
        self.description = form.description;
        self.industry = form.industry;
        self.website = form.website;
        self.core_kpis = form.core_kpis;
        self.mission_statement = form.mission_statement;
        self.target_audience = form.target_audience;
        self.updated_at = next_updated_at(self.updated_at, now);
    }

    pub fn apply_update(&mut self, update: CompanyUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(industry) = update.industry {
            self.industry = industry;
        }
        if let Some(website) = update.website {
            self.website = Some(website);
        }
        if let Some(core_kpis) = update.core_kpis {
            self.core_kpis = core_kpis;
        }
        if let Some(mission_statement) = update.mission_statement {
            self.mission_statement = mission_statement;
        }
        if let Some(target_audience) = update.target_audience {
            self.target_audience = Some(target_audience);
        }
        self.updated_at = next_updated_at(self.updated_at, now);
    }
}

impl Brand {
    pub fn from_form(form: BrandForm, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: form.name.trim().to_string(),
            description: form.description,
            benefits: form.benefits,
            color: form.color,
            website: form.website,
            target_audience: form.target_audience,
            status: form.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: BrandUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(benefits) = update.benefits {
            self.benefits = benefits;
        }
        if let Some(color) = update.color {
            self.color = Some(color);
        }
        if let Some(website) = update.website {
            self.website = Some(website);
        }
        if let Some(target_audience) = update.target_audience {
            self.target_audience = Some(target_audience);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = next_updated_at(self.updated_at, now);
    }

    pub fn is_active(&self) -> bool {
        self.status == BrandStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_brand_form() -> BrandForm {
        BrandForm {
            name: "Acme Cloud".to_string(),
            description: "Managed cloud hosting for teams.".to_string(),
            benefits: vec!["Fast setup".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_short_company_name_is_rejected() {
        let form = CompanyForm {
            name: "A".to_string(),
            ..Default::default()
        };
        let result = form.validate_form();
        assert!(!result.is_valid);
        assert!(result.has_error("name"));
    }

    #[test]
    fn test_valid_company_form() {
        let form = CompanyForm {
            name: "Acme Inc".to_string(),
            description: "A sufficiently long description.".to_string(),
            core_kpis: vec!["MRR".to_string()],
            mission_statement: "A mission statement that is long enough.".to_string(),
            ..Default::default()
        };
        let result = form.validate_form();
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn test_brand_color_rules() {
        let mut form = valid_brand_form();
        form.color = Some("#ABC123".to_string());
        assert!(form.validate_form().is_valid);

        form.color = Some("ABC123".to_string());
        assert!(form.validate_form().has_error("color"));

        form.color = Some("#ZZZZZZ".to_string());
        assert!(form.validate_form().has_error("color"));
    }

    #[test]
    fn test_brand_requires_benefit() {
        let mut form = valid_brand_form();
        form.benefits.clear();
        assert!(form.validate_form().has_error("benefits"));
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        let update = BrandUpdate {
            status: Some(BrandStatus::Inactive),
            ..Default::default()
        };
        assert!(update.validate_form().is_valid);

        let update = BrandUpdate {
            description: Some("short".to_string()),
            ..Default::default()
        };
        let result = update.validate_form();
        assert!(result.has_error("description"));
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_status_defaults_to_active_and_survives_updates() {
        let now = Utc::now();
        let mut brand = Brand::from_form(valid_brand_form(), now);
        assert_eq!(brand.status, BrandStatus::Active);

        brand.apply_update(
            BrandUpdate {
                name: Some("Acme Edge".to_string()),
                ..Default::default()
            },
            now,
        );
        assert_eq!(brand.status, BrandStatus::Active);
        assert!(brand.updated_at > brand.created_at);

        brand.apply_update(
            BrandUpdate {
                status: Some(BrandStatus::Draft),
                ..Default::default()
            },
            now,
        );
        assert_eq!(brand.status, BrandStatus::Draft);
    }

    #[test]
    fn test_wire_field_names() {
        let company = Company::from_form(
            CompanyForm {
                name: "Acme Inc".to_string(),
                core_kpis: vec!["MRR".to_string()],
                ..Default::default()
            },
            Utc::now(),
        );
        let value = serde_json::to_value(&company).unwrap();
        assert!(value.get("coreKPIs").is_some());
        assert!(value.get("missionStatement").is_some());
        assert!(value.get("createdAt").unwrap().is_string());
    }
}
