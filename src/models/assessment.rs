use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A structured questionnaire tied to a job: ordered sections of ordered
/// questions. The whole sections tree is replaced on each save; there is no
/// per-question persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Closed sum over the six question variants. Each variant carries only its
/// own configuration; the serialized shape keeps the flat `type`-tagged
/// layout of the stored documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<String>,
    },
    MultiChoice {
        options: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    ShortText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    LongText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<i64>,
    },
    Numeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    FileUpload {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted_formats: Option<Vec<String>>,
    },
}

fn new_node_id() -> String {
    Uuid::new_v4().to_string()
}

impl Assessment {
    /// Assign missing node ids and recompute sibling `order` fields to the
    /// dense 0..N-1 sequence. Called after every structural mutation and
    /// before every save.
    pub fn normalize(&mut self) {
        for (index, section) in self.sections.iter_mut().enumerate() {
            if section.id.is_empty() {
                section.id = new_node_id();
            }
            section.order = index as i64;
            for (q_index, question) in section.questions.iter_mut().enumerate() {
                if question.id.is_empty() {
                    question.id = new_node_id();
                }
                question.order = q_index as i64;
            }
        }
    }

    /// Question ids key the response answers map, so they must be unique
    /// across the whole document.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for question in self.questions() {
            if !seen.insert(question.id.as_str()) {
                return Err(Error::BadRequest(format!(
                    "Duplicate question id: {}",
                    question.id
                )));
            }
        }
        Ok(())
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == question_id)
    }

    pub fn add_section(&mut self, title: &str) -> String {
        let section = Section {
            id: new_node_id(),
            title: title.to_string(),
            description: String::new(),
            order: self.sections.len() as i64,
            questions: Vec::new(),
        };
        let id = section.id.clone();
        self.sections.push(section);
        id
    }

    pub fn update_section(
        &mut self,
        section_id: &str,
        update: impl FnOnce(&mut Section),
    ) -> Result<()> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| Error::NotFound(format!("Section not found: {section_id}")))?;
        update(section);
        Ok(())
    }

    pub fn remove_section(&mut self, section_id: &str) -> Result<()> {
        let before = self.sections.len();
        self.sections.retain(|s| s.id != section_id);
        if self.sections.len() == before {
            return Err(Error::NotFound(format!("Section not found: {section_id}")));
        }
        self.normalize();
        Ok(())
    }

    pub fn add_question(
        &mut self,
        section_id: &str,
        text: &str,
        required: bool,
        kind: QuestionKind,
    ) -> Result<String> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| Error::NotFound(format!("Section not found: {section_id}")))?;
        let question = Question {
            id: new_node_id(),
            text: text.to_string(),
            required,
            order: section.questions.len() as i64,
            kind,
        };
        let id = question.id.clone();
        section.questions.push(question);
        Ok(id)
    }

    pub fn update_question(
        &mut self,
        question_id: &str,
        update: impl FnOnce(&mut Question),
    ) -> Result<()> {
        let question = self
            .sections
            .iter_mut()
            .flat_map(|s| s.questions.iter_mut())
            .find(|q| q.id == question_id)
            .ok_or_else(|| Error::NotFound(format!("Question not found: {question_id}")))?;
        update(question);
        Ok(())
    }

    pub fn remove_question(&mut self, question_id: &str) -> Result<()> {
        let mut removed = false;
        for section in &mut self.sections {
            let before = section.questions.len();
            section.questions.retain(|q| q.id != question_id);
            if section.questions.len() != before {
                removed = true;
            }
        }
        if !removed {
            return Err(Error::NotFound(format!("Question not found: {question_id}")));
        }
        self.normalize();
        Ok(())
    }

    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let sections: Vec<Section> = serde_json::from_str(&row.try_get::<String, _>("sections")?)?;

        Ok(Self {
            id: super::parse_db_uuid(&row.try_get::<String, _>("id")?)?,
            job_id: super::parse_db_uuid(&row.try_get::<String, _>("job_id")?)?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            sections,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// The value a candidate submitted for one question. The expected shape
/// depends on the referenced question's variant: a string for choice, text
/// and file-upload questions, a number for numeric ones, a string array for
/// multi-choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    Selections(Vec<String>),
}

impl AnswerValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Number(_) => false,
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Selections(items) => items.is_empty(),
        }
    }
}

/// One candidate's submission for an assessment. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub candidate_id: Uuid,
    pub answers: HashMap<String, AnswerValue>,
    pub submitted_at: DateTime<Utc>,
}

impl AssessmentResponse {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let answers: HashMap<String, AnswerValue> =
            serde_json::from_str(&row.try_get::<String, _>("answers")?)?;

        Ok(Self {
            id: super::parse_db_uuid(&row.try_get::<String, _>("id")?)?,
            assessment_id: super::parse_db_uuid(&row.try_get::<String, _>("assessment_id")?)?,
            candidate_id: super::parse_db_uuid(&row.try_get::<String, _>("candidate_id")?)?,
            answers,
            submitted_at: row.try_get("submitted_at")?,
        })
    }
}
