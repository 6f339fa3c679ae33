use miasi_core::catalog::{FieldId, FormField, InputKind, SelectOption, System};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListSystemsResponse {
    pub systems: Vec<System>,
}

/// A required form field as presented to end users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldInfo {
    pub id: FieldId,

    /// Key to use in the submission payload
    pub name: String,

    pub display_name: String,

    pub input_kind: InputKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<String>,

    /// Options of a `select` field, empty otherwise
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl From<FormField> for FieldInfo {
    fn from(field: FormField) -> Self {
        let options = field.options();
        Self {
            id: field.id,
            name: field.name,
            display_name: field.display_name,
            input_kind: field.input_kind,
            description: field.description,
            order: field.order,
            validation_rule: field.validation_rule,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemDetailResponse {
    pub system: System,

    /// Required fields, in the order they should be asked for
    pub fields: Vec<FieldInfo>,
}
