//! Demonstration catalog.
//!
//! Five systems covering every pipeline path: a plain calculator with
//! single-advice knowledge, sex-restricted equations, a `select` field, a
//! system without equations and a multi-advice system.

use super::{Catalog, Equation, FormField, InputKind, Knowledge, System, SystemFormLink};

const POSITIVE_NUMBER_RULE: &str = r"^[0-9]+(\.[0-9]+)?$";

const BMR_MALE: &str = "66 + (13.7 * weight) + (500 * height) - (5.8 * age)";
const BMR_FEMALE: &str = "655 + (9.6 * weight) + (180 * height) - (4.7 * age)";

pub fn sample_catalog() -> Catalog {
    Catalog {
        systems: vec![
            system(
                1,
                "BMI_Calculator",
                "BMI Calculator",
                "Check your body mass index",
                false,
            ),
            system(
                2,
                "BMR_Calculator",
                "BMR Calculator",
                "Estimate your basal metabolic rate",
                false,
            ),
            system(
                3,
                "AMR_Calculator",
                "AMR Calculator",
                "Estimate your daily calorie needs including activity",
                false,
            ),
            system(
                4,
                "Test_No_Equations",
                "System without equations",
                "Test",
                false,
            ),
            system(
                5,
                "Test_Many_Advices",
                "System with many advices",
                "Test",
                true,
            ),
        ],
        fields: vec![
            number_field(1, "height", "Height", "Height in meters"),
            number_field(2, "weight", "Weight", "Weight in kilograms"),
            number_field(3, "age", "Age", "Age in full years"),
            FormField {
                id: 4,
                name: "sex".to_string(),
                display_name: "Sex".to_string(),
                input_kind: InputKind::Sex,
                description: Some("Choose your sex".to_string()),
                order: Some(4),
                validation_rule: None,
                select_labels: Vec::new(),
                select_values: Vec::new(),
            },
            FormField {
                id: 5,
                name: "activity_level".to_string(),
                display_name: "Activity level".to_string(),
                input_kind: InputKind::Select,
                description: Some("Choose your activity level".to_string()),
                order: Some(5),
                validation_rule: None,
                select_labels: [
                    "Sedentary",
                    "Lightly active",
                    "Moderately active",
                    "Active",
                    "Very active",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                select_values: ["1", "1.2", "1.4", "1.6", "1.8"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        ],
        links: [
            (1, 1),
            (1, 2),
            (2, 1),
            (2, 2),
            (2, 3),
            (2, 4),
            (3, 1),
            (3, 2),
            (3, 3),
            (3, 4),
            (3, 5),
            (5, 1),
            (5, 2),
        ]
        .iter()
        .map(|&(system_id, field_id)| SystemFormLink {
            system_id,
            field_id,
        })
        .collect(),
        equations: vec![
            equation(1, 1, "BMI", "Body Mass Index", "weight / (height ** 2)", None),
            equation(2, 2, "BMR_Male", "Basal Metabolic Rate - Male", BMR_MALE, Some(1)),
            equation(
                3,
                2,
                "BMR_Female",
                "Basal Metabolic Rate - Female",
                BMR_FEMALE,
                Some(0),
            ),
            equation(
                4,
                3,
                "AMR",
                "Active Metabolic Rate - Female",
                &format!("round(({}) * activity_level)", BMR_FEMALE),
                Some(0),
            ),
            equation(
                5,
                3,
                "AMR",
                "Active Metabolic Rate - Male",
                &format!("round(({}) * activity_level)", BMR_MALE),
                Some(1),
            ),
        ],
        knowledge: vec![
            knowledge(
                1,
                1,
                "0 <= BMI < 18.5",
                "Your weight is too low. Consider consulting a dietitian.",
            ),
            knowledge(
                2,
                1,
                "18.5 <= BMI < 25",
                "Your weight is normal. Keep up a healthy lifestyle!",
            ),
            knowledge(
                3,
                1,
                "25 <= BMI < 30",
                "You are overweight. Consider more physical activity and consulting a dietitian.",
            ),
            knowledge(
                4,
                1,
                "BMI >= 30",
                "You are obese. Consult a doctor and a dietitian.",
            ),
            knowledge(5, 5, "height == 0", "Advice 1"),
            knowledge(6, 5, "weight == 0", "Advice 2"),
        ],
    }
}

fn system(id: i64, name: &str, display_name: &str, description: &str, multi: bool) -> System {
    System {
        id,
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: Some(description.to_string()),
        multi_advice: multi,
    }
}

fn number_field(id: i64, name: &str, display_name: &str, description: &str) -> FormField {
    FormField {
        id,
        name: name.to_string(),
        display_name: display_name.to_string(),
        input_kind: InputKind::Number,
        description: Some(description.to_string()),
        order: Some(id as i32),
        validation_rule: Some(POSITIVE_NUMBER_RULE.to_string()),
        select_labels: Vec::new(),
        select_values: Vec::new(),
    }
}

fn equation(
    id: i64,
    system_id: i64,
    name: &str,
    display_name: &str,
    formula: &str,
    sex: Option<i64>,
) -> Equation {
    Equation {
        id,
        system_id,
        name: name.to_string(),
        display_name: display_name.to_string(),
        formula: formula.to_string(),
        sex,
        is_internal: false,
        description: None,
    }
}

fn knowledge(id: i64, system_id: i64, condition: &str, advice: &str) -> Knowledge {
    Knowledge {
        id,
        system_id,
        condition: condition.to_string(),
        advice: advice.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_is_consistent() {
        let catalog = sample_catalog();
        for link in &catalog.links {
            assert!(catalog.system(link.system_id).is_ok());
            assert!(catalog.fields.iter().any(|f| f.id == link.field_id));
        }
        for field in &catalog.fields {
            assert_eq!(field.select_labels.len(), field.select_values.len());
        }
        assert!(catalog.equations(4).is_empty());
        assert!(catalog.system(5).unwrap().multi_advice);
    }
}
