use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::assessment::{AnswerValue, Assessment, Question, QuestionKind};

/// Read-only projection of an assessment document into the fillable form a
/// candidate sees: each question maps to exactly one input control derived
/// from its variant. Rendering is independent of builder-side validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentForm {
    pub assessment_id: Uuid,
    pub title: String,
    pub description: String,
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    pub id: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub question_id: String,
    pub label: String,
    pub required: bool,
    pub control: InputControl,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InputControl {
    RadioGroup {
        options: Vec<String>,
    },
    CheckboxGroup {
        options: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    TextInput {
        max_length: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    TextArea {
        max_length: Option<i64>,
    },
    NumberInput {
        min: Option<i64>,
        max: Option<i64>,
    },
    FilePicker {
        accept: Option<Vec<String>>,
        hint: String,
    },
}

pub fn project(assessment: &Assessment) -> AssessmentForm {
    AssessmentForm {
        assessment_id: assessment.id,
        title: assessment.title.clone(),
        description: assessment.description.clone(),
        sections: assessment
            .sections
            .iter()
            .map(|section| FormSection {
                id: section.id.clone(),
                title: section.title.clone(),
                description: section.description.clone(),
                fields: section
                    .questions
                    .iter()
                    .map(|question| FormField {
                        question_id: question.id.clone(),
                        label: question.text.clone(),
                        required: question.required,
                        control: control_for(question),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn control_for(question: &Question) -> InputControl {
    match &question.kind {
        QuestionKind::SingleChoice { options } => InputControl::RadioGroup {
            options: options.clone(),
        },
        QuestionKind::MultiChoice { options } => InputControl::CheckboxGroup {
            options: options.clone(),
        },
        QuestionKind::ShortText { max_length } => InputControl::TextInput {
            max_length: *max_length,
        },
        QuestionKind::LongText { max_length } => InputControl::TextArea {
            max_length: *max_length,
        },
        QuestionKind::Numeric { min, max } => InputControl::NumberInput {
            min: *min,
            max: *max,
        },
        QuestionKind::FileUpload { accepted_formats } => InputControl::FilePicker {
            accept: accepted_formats.clone(),
            hint: match accepted_formats {
                Some(formats) if !formats.is_empty() => {
                    format!("Accepted formats: {}", formats.join(", "))
                }
                _ => "All file types accepted".to_string(),
            },
        },
    }
}

/// Check a submitted answers map against the document it answers: every key
/// must reference a question, every value must match the question's variant
/// and bounds, and every required question must have a non-empty answer.
pub fn validate_answers(
    assessment: &Assessment,
    answers: &HashMap<String, AnswerValue>,
) -> Result<()> {
    let by_id: HashMap<&str, &Question> = assessment
        .questions()
        .map(|q| (q.id.as_str(), q))
        .collect();

    for (question_id, value) in answers {
        let question = by_id.get(question_id.as_str()).ok_or_else(|| {
            Error::BadRequest(format!("Answer references unknown question: {question_id}"))
        })?;
        check_answer(question, value)?;
    }

    for question in assessment.questions() {
        if !question.required {
            continue;
        }
        match answers.get(&question.id) {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(Error::BadRequest(format!(
                    "Missing answer for required question: {}",
                    question.id
                )))
            }
        }
    }

    Ok(())
}

fn check_answer(question: &Question, value: &AnswerValue) -> Result<()> {
    match (&question.kind, value) {
        (QuestionKind::SingleChoice { options }, AnswerValue::Text(choice)) => {
            if !options.contains(choice) {
                return Err(Error::BadRequest(format!(
                    "Answer for question {} is not one of its options",
                    question.id
                )));
            }
            Ok(())
        }
        (QuestionKind::MultiChoice { options }, AnswerValue::Selections(choices)) => {
            for choice in choices {
                if !options.contains(choice) {
                    return Err(Error::BadRequest(format!(
                        "Answer for question {} contains an unknown option: {choice}",
                        question.id
                    )));
                }
            }
            Ok(())
        }
        (QuestionKind::ShortText { max_length }, AnswerValue::Text(text))
        | (QuestionKind::LongText { max_length }, AnswerValue::Text(text)) => {
            if let Some(limit) = max_length {
                if text.chars().count() as i64 > *limit {
                    return Err(Error::BadRequest(format!(
                        "Answer for question {} exceeds the maximum length of {limit}",
                        question.id
                    )));
                }
            }
            Ok(())
        }
        (QuestionKind::Numeric { min, max }, AnswerValue::Number(n)) => {
            if let Some(min) = min {
                if *n < *min as f64 {
                    return Err(Error::BadRequest(format!(
                        "Answer for question {} is below the minimum of {min}",
                        question.id
                    )));
                }
            }
            if let Some(max) = max {
                if *n > *max as f64 {
                    return Err(Error::BadRequest(format!(
                        "Answer for question {} is above the maximum of {max}",
                        question.id
                    )));
                }
            }
            Ok(())
        }
        (QuestionKind::FileUpload { accepted_formats }, AnswerValue::Text(file_name)) => {
            if let Some(formats) = accepted_formats {
                if !formats.is_empty() {
                    let name = file_name.to_lowercase();
                    let accepted = formats.iter().any(|f| name.ends_with(&f.to_lowercase()));
                    if !accepted {
                        return Err(Error::BadRequest(format!(
                            "File for question {} must be one of: {}",
                            question.id,
                            formats.join(", ")
                        )));
                    }
                }
            }
            Ok(())
        }
        _ => Err(Error::BadRequest(format!(
            "Answer for question {} does not match its question type",
            question.id
        ))),
    }
}
