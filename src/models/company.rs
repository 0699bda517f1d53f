// src/models/company.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'companies' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,

    /// Unique company name.
    pub name: String,

    /// Tax identification number.
    pub tax_id: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Soft-delete flag.
    pub is_active: bool,
}

/// DTO for creating a company.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 18))]
    pub tax_id: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// DTO for partial company updates. Fields are optional.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 18))]
    pub tax_id: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,
}
