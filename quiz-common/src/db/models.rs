//! Database models
//!
//! Reference data (difficulties, questions, game modes) is read-only for the
//! service. Highscores and answer statistics are appended by clients.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Difficulty {
    pub id: i64,
    pub name: String,
    pub points: i64,
}

/// A quiz question with four answer options
///
/// Field order is part of the content hash: questions are hashed over
/// their JSON serialization, which follows declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    /// References `Difficulty::id`
    pub difficulty: i64,
    pub question: String,
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
    pub answer4: String,
    /// 1-based index of the right answer
    pub solution: i64,
    /// Bible passage the question is based on
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GameMode {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Questions per round
    pub questions: i64,
    /// Seconds per question, `None` for untimed modes
    pub timelimit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Highscore {
    pub username: String,
    pub score: i64,
    pub difficulty: i64,
}

/// Highscore row in a single-difficulty listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct HighscoreEntry {
    pub username: String,
    pub score: i64,
}

/// One answered question, as reported by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AnswerStat {
    pub question: i64,
    pub answer: i64,
    #[serde(deserialize_with = "deserialize_flag")]
    pub correct: bool,
}

/// Clients send `correct` as a bool, a number or a numeric string
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n == 1,
        Flag::Text(s) => s.trim() == "1",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_flag_accepts_client_variants() {
        let parse = |json: &str| serde_json::from_str::<AnswerStat>(json).unwrap().correct;

        assert!(parse(r#"{"question": 1, "answer": 2, "correct": "1"}"#));
        assert!(parse(r#"{"question": 1, "answer": 2, "correct": 1}"#));
        assert!(parse(r#"{"question": 1, "answer": 2, "correct": true}"#));
        assert!(!parse(r#"{"question": 1, "answer": 2, "correct": "0"}"#));
        assert!(!parse(r#"{"question": 1, "answer": 2, "correct": 0}"#));
        assert!(!parse(r#"{"question": 1, "answer": 2, "correct": false}"#));
        // Only the numeric string marks a right answer
        assert!(!parse(r#"{"question": 1, "answer": 2, "correct": "true"}"#));
        assert!(!parse(r#"{"question": 1, "answer": 2, "correct": "TRUE"}"#));
        assert!(!parse(r#"{"question": 1, "answer": 2, "correct": 2}"#));
    }

    #[test]
    fn question_serializes_in_declaration_order() {
        let question = Question {
            id: 7,
            difficulty: 1,
            question: "Wer baute die Arche?".to_string(),
            answer1: "Noah".to_string(),
            answer2: "Mose".to_string(),
            answer3: "David".to_string(),
            answer4: "Jona".to_string(),
            solution: 1,
            reference: Some("1. Mose 6".to_string()),
        };

        let json = serde_json::to_string(&question).unwrap();
        assert!(json.starts_with(r#"{"id":7,"difficulty":1,"question":"#));
        assert!(json.ends_with(r#""solution":1,"reference":"1. Mose 6"}"#));
    }
}
