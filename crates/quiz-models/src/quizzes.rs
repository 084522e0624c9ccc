//! Quiz domain models and DTOs.

use crate::attachments::AttachmentMeta;
use crate::ids::{AttachmentId, QuizId, UserId};
use quiz_core::PaginationParams;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Who wrote a quiz, as shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub profile_name: Option<String>,
}

/// A quiz with its author and attachment eager-loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub question: String,
    pub answer: String,
    pub author_id: UserId,
    pub attachment_id: Option<AttachmentId>,
    pub author: Option<AuthorSummary>,
    pub attachment: Option<AttachmentMeta>,
    /// Whether the logged-in user has this quiz among their favourites
    pub favourite: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Flat row of `quizzes LEFT JOIN users LEFT JOIN attachments`.
#[derive(Debug, Clone, FromRow)]
pub struct QuizRow {
    pub id: QuizId,
    pub question: String,
    pub answer: String,
    pub author_id: UserId,
    pub attachment_id: Option<AttachmentId>,
    #[sqlx(default)]
    pub author_username: Option<String>,
    #[sqlx(default)]
    pub author_profile_name: Option<String>,
    #[sqlx(default)]
    pub attachment_mime: Option<String>,
    #[sqlx(default)]
    pub attachment_url: Option<String>,
    #[sqlx(default)]
    pub favourite: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        let author = row.author_username.map(|username| AuthorSummary {
            id: row.author_id,
            username,
            profile_name: row.author_profile_name,
        });
        Self {
            id: row.id,
            question: row.question,
            answer: row.answer,
            author_id: row.author_id,
            attachment_id: row.attachment_id,
            author,
            attachment: AttachmentMeta::from_columns(row.attachment_mime, row.attachment_url),
            favourite: row.favourite,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A quiz as presented to someone playing it: everything but the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: QuizId,
    pub question: String,
    pub author_id: UserId,
    pub author: Option<AuthorSummary>,
    pub attachment: Option<AttachmentMeta>,
    pub favourite: bool,
}

impl From<&Quiz> for QuizQuestion {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            question: quiz.question.clone(),
            author_id: quiz.author_id,
            author: quiz.author.clone(),
            attachment: quiz.attachment.clone(),
            favourite: quiz.favourite,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Text fields of the quiz form. The optional image travels next to it in the
/// same multipart body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizForm {
    #[validate(custom(function = "not_blank", message = "Question must not be empty"))]
    pub question: String,
    #[validate(custom(function = "not_blank", message = "Answer must not be empty"))]
    pub answer: String,
}

impl QuizForm {
    /// Trimmed copy, as stored.
    pub fn normalized(&self) -> Self {
        Self {
            question: self.question.trim().to_string(),
            answer: self.answer.trim().to_string(),
        }
    }
}

/// Query parameters of the quiz lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizFilterParams {
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayParams {
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckParams {
    #[serde(default)]
    pub answer: String,
}

/// `ILIKE` pattern for a search string: `"foo bar"` becomes `%foo%bar%`, so the
/// words must appear in order. `None` when there is nothing to search for.
pub fn search_pattern(search: &str) -> Option<String> {
    let words: Vec<String> = search
        .split_whitespace()
        .map(|word| {
            word.replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(format!("%{}%", words.join("%")))
    }
}

/// Trimmed, case-insensitive comparison of a given answer with the expected one.
pub fn answer_matches(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern_joins_words_in_order() {
        assert_eq!(search_pattern("capital  of\tspain"), Some("%capital%of%spain%".into()));
        assert_eq!(search_pattern("rome"), Some("%rome%".into()));
    }

    #[test]
    fn test_search_pattern_blank_is_none() {
        assert_eq!(search_pattern(""), None);
        assert_eq!(search_pattern("   "), None);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern("100%"), Some("%100\\%%".into()));
        assert_eq!(search_pattern("a_b"), Some("%a\\_b%".into()));
    }

    #[test]
    fn test_answer_matches() {
        assert!(answer_matches("Madrid", "  madrid "));
        assert!(answer_matches(" Rome", "ROME"));
        assert!(!answer_matches("Rome", "Paris"));
        assert!(!answer_matches("Rome", ""));
    }

    #[test]
    fn test_quiz_form_validation() {
        let form = QuizForm {
            question: "  ".into(),
            answer: "Rome".into(),
        };
        assert!(form.validate().is_err());

        let form = QuizForm {
            question: " Capital of Italy ".into(),
            answer: " Rome ".into(),
        };
        assert!(form.validate().is_ok());
        assert_eq!(form.normalized().question, "Capital of Italy");
    }

    #[test]
    fn test_quiz_question_hides_answer() {
        let now = chrono::Utc::now();
        let quiz = Quiz::from(QuizRow {
            id: QuizId(1),
            question: "Capital of Italy".into(),
            answer: "Rome".into(),
            author_id: UserId(2),
            attachment_id: None,
            author_username: Some("pepe".into()),
            author_profile_name: None,
            attachment_mime: None,
            attachment_url: None,
            favourite: true,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(quiz.author.as_ref().map(|a| a.username.as_str()), Some("pepe"));

        let json = serde_json::to_value(QuizQuestion::from(&quiz)).unwrap();
        assert!(json.get("answer").is_none());
        assert_eq!(json["favourite"], true);
    }
}
