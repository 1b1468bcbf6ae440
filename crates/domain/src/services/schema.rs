//! Form schema generation and answer validation.
//!
//! A schema is derived from a template at fill time. Each active question
//! becomes one required field whose rule follows its input type.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Answer, AnswerInput, InputType, QuestionStatus, Template};
use shared::text::fold;
use shared::validation::{is_valid_email, parse_amount, parse_date};

/// Validation rule applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    RequiredString,
    NonNegativeNumber,
    Email,
    NonEmptySelection,
    NonEmptyDate,
}

impl From<InputType> for FieldRule {
    fn from(input_type: InputType) -> Self {
        match input_type {
            InputType::Text | InputType::Tel => FieldRule::RequiredString,
            InputType::Number => FieldRule::NonNegativeNumber,
            InputType::Email => FieldRule::Email,
            InputType::Select | InputType::Radio => FieldRule::NonEmptySelection,
            InputType::Date => FieldRule::NonEmptyDate,
        }
    }
}

/// One field of a generated form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldSchema {
    pub question_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_type: InputType,
    pub options: Vec<String>,
    pub rule: FieldRule,
}

/// Generated schema for filling a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FormSchema {
    pub template_id: Uuid,
    pub template_title: String,
    pub fields: Vec<FieldSchema>,
}

/// A validation failure on one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<Uuid>,
    pub field: String,
    pub message: String,
}

/// Every field error found in one submission.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Submission has {} invalid field(s)", .0.len())]
pub struct SchemaErrors(pub Vec<FieldError>);

impl FieldSchema {
    /// Checks one trimmed answer, returning the value to store.
    fn check(&self, answer: &str) -> Result<String, String> {
        if answer.is_empty() {
            return Err(match self.rule {
                FieldRule::NonEmptySelection => "An option must be selected".to_string(),
                FieldRule::NonEmptyDate => "A date is required".to_string(),
                _ => "This field is required".to_string(),
            });
        }

        match self.rule {
            FieldRule::RequiredString => Ok(answer.to_string()),
            FieldRule::NonNegativeNumber => match parse_amount(answer) {
                Some(v) if v >= 0.0 => Ok(answer.to_string()),
                Some(_) => Err("Must be zero or greater".to_string()),
                None => Err("Must be a number".to_string()),
            },
            FieldRule::Email => {
                if is_valid_email(answer) {
                    Ok(answer.to_string())
                } else {
                    Err("Must be a valid email address".to_string())
                }
            }
            FieldRule::NonEmptySelection => {
                let folded = fold(answer);
                self.options
                    .iter()
                    .find(|o| fold(o) == folded)
                    .cloned()
                    .ok_or_else(|| format!("'{}' is not one of the available options", answer))
            }
            FieldRule::NonEmptyDate => parse_date(answer)
                .map(|_| answer.to_string())
                .ok_or_else(|| "Must be a date (YYYY-MM-DD or DD/MM/YYYY)".to_string()),
        }
    }
}

impl FormSchema {
    /// Builds the schema of a template. Inactive questions are not asked.
    pub fn from_template(template: &Template) -> Self {
        let mut questions: Vec<_> = template.questions.iter().collect();
        questions.sort_by_key(|q| q.position);

        let fields = questions
            .into_iter()
            .filter(|q| q.status == QuestionStatus::Active)
            .map(|q| FieldSchema {
                question_id: q.question_id,
                title: q.title.clone(),
                description: q.description.clone(),
                input_type: q.input_type,
                options: q.options.clone(),
                rule: FieldRule::from(q.input_type),
            })
            .collect();

        Self {
            template_id: template.id,
            template_title: template.title.clone(),
            fields,
        }
    }

    /// Validates posted answers against the schema.
    ///
    /// Answers come back in field order with the question title snapshotted.
    /// All problems are reported together, one per field.
    pub fn validate(&self, answers: &[AnswerInput]) -> Result<Vec<Answer>, SchemaErrors> {
        let mut errors = Vec::new();
        let mut posted: HashMap<Uuid, &str> = HashMap::with_capacity(answers.len());
        let mut duplicated = HashSet::new();

        let known: HashSet<Uuid> = self.fields.iter().map(|f| f.question_id).collect();

        for input in answers {
            if !known.contains(&input.question_id) {
                errors.push(FieldError {
                    question_id: Some(input.question_id),
                    field: input.question_id.to_string(),
                    message: "Question is not part of this template".to_string(),
                });
                continue;
            }
            if posted.insert(input.question_id, input.answer.trim()).is_some()
                && duplicated.insert(input.question_id)
            {
                errors.push(FieldError {
                    question_id: Some(input.question_id),
                    field: input.question_id.to_string(),
                    message: "Question was answered more than once".to_string(),
                });
            }
        }

        let mut validated = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if duplicated.contains(&field.question_id) {
                continue;
            }
            let raw = posted.get(&field.question_id).copied().unwrap_or("");
            match field.check(raw) {
                Ok(answer) => validated.push(Answer {
                    question_id: field.question_id,
                    question_title: field.title.clone(),
                    answer,
                }),
                Err(message) => errors.push(FieldError {
                    question_id: Some(field.question_id),
                    field: field.title.clone(),
                    message,
                }),
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(SchemaErrors(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemplateQuestion;
    use chrono::Utc;

    fn field(position: i32, title: &str, input_type: InputType, options: &[&str]) -> TemplateQuestion {
        TemplateQuestion {
            question_id: Uuid::new_v4(),
            position,
            title: title.to_string(),
            description: None,
            input_type,
            options: options.iter().map(|s| s.to_string()).collect(),
            status: QuestionStatus::Active,
        }
    }

    fn template(questions: Vec<TemplateQuestion>) -> Template {
        Template {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            title: "Crédito pessoal".to_string(),
            description: None,
            model_type: None,
            is_default: false,
            questions,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input(question: &FieldSchema, answer: &str) -> AnswerInput {
        AnswerInput {
            question_id: question.question_id,
            answer: answer.to_string(),
        }
    }

    fn sample_schema() -> FormSchema {
        FormSchema::from_template(&template(vec![
            field(0, "Nome do Cliente", InputType::Text, &[]),
            field(1, "Email", InputType::Email, &[]),
            field(2, "Data", InputType::Date, &[]),
            field(3, "Banco", InputType::Select, &["CGD", "Millennium BCP"]),
            field(4, "Valor", InputType::Number, &[]),
        ]))
    }

    #[test]
    fn test_rule_mapping() {
        assert_eq!(FieldRule::from(InputType::Text), FieldRule::RequiredString);
        assert_eq!(FieldRule::from(InputType::Tel), FieldRule::RequiredString);
        assert_eq!(FieldRule::from(InputType::Number), FieldRule::NonNegativeNumber);
        assert_eq!(FieldRule::from(InputType::Email), FieldRule::Email);
        assert_eq!(FieldRule::from(InputType::Select), FieldRule::NonEmptySelection);
        assert_eq!(FieldRule::from(InputType::Radio), FieldRule::NonEmptySelection);
        assert_eq!(FieldRule::from(InputType::Date), FieldRule::NonEmptyDate);
    }

    #[test]
    fn test_from_template_orders_and_skips_inactive() {
        let mut inactive = field(0, "Morada", InputType::Text, &[]);
        inactive.status = QuestionStatus::Inactive;
        let schema = FormSchema::from_template(&template(vec![
            field(2, "Valor", InputType::Number, &[]),
            inactive,
            field(1, "Banco", InputType::Select, &["CGD"]),
        ]));

        let titles: Vec<&str> = schema.fields.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Banco", "Valor"]);
    }

    #[test]
    fn test_valid_submission() {
        let schema = sample_schema();
        let f = &schema.fields;
        let answers = vec![
            input(&f[4], "1.234,56 €"),
            input(&f[0], "  Maria Silva "),
            input(&f[1], "maria@example.pt"),
            input(&f[2], "01/03/2024"),
            input(&f[3], "millennium bcp"),
        ];

        let validated = schema.validate(&answers).unwrap();

        assert_eq!(validated.len(), 5);
        assert_eq!(validated[0].question_title, "Nome do Cliente");
        assert_eq!(validated[0].answer, "Maria Silva");
        assert_eq!(validated[3].answer, "Millennium BCP");
        assert_eq!(validated[4].answer, "1.234,56 €");
    }

    #[test]
    fn test_errors_are_collected_per_field() {
        let schema = sample_schema();
        let f = &schema.fields;
        let answers = vec![
            input(&f[0], "   "),
            input(&f[1], "not-an-email"),
            input(&f[2], "2024-13-01"),
            input(&f[3], "Novo Banco"),
            input(&f[4], "-10"),
        ];

        let errors = schema.validate(&answers).unwrap_err();

        let fields: Vec<&str> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["Nome do Cliente", "Email", "Data", "Banco", "Valor"]);
        assert_eq!(errors.0[4].message, "Must be zero or greater");
    }

    #[test]
    fn test_missing_answers_are_required() {
        let schema = sample_schema();
        let errors = schema.validate(&[]).unwrap_err();
        assert_eq!(errors.0.len(), schema.fields.len());
        assert_eq!(errors.0[3].message, "An option must be selected");
    }

    #[test]
    fn test_unknown_and_duplicate_questions() {
        let schema = FormSchema::from_template(&template(vec![field(
            0,
            "Agente",
            InputType::Text,
            &[],
        )]));
        let agent = &schema.fields[0];
        let stranger = Uuid::new_v4();
        let answers = vec![
            input(agent, "João"),
            input(agent, "Rui"),
            AnswerInput {
                question_id: stranger,
                answer: "x".to_string(),
            },
        ];

        let errors = schema.validate(&answers).unwrap_err();

        assert_eq!(errors.0.len(), 2);
        assert_eq!(errors.0[0].message, "Question was answered more than once");
        assert_eq!(errors.0[1].question_id, Some(stranger));
    }

    #[test]
    fn test_number_rejects_text() {
        let schema = FormSchema::from_template(&template(vec![field(
            0,
            "Valor",
            InputType::Number,
            &[],
        )]));
        let errors = schema
            .validate(&[input(&schema.fields[0], "muito")])
            .unwrap_err();
        assert_eq!(errors.0[0].message, "Must be a number");
    }
}
