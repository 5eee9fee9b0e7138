#![allow(dead_code)]

//! Session state machine for the question/answer workflow.
//!
//! Each session walks the phases Idle → Extracted → Answering → AllAnswered →
//! Refined, strictly one answer at a time. The phase is derived from the data
//! on every read rather than stored, so it can never drift out of sync with
//! the answers and cursor that define it. No IO happens here — the handlers
//! run the pipeline stages and feed the results in.

pub mod store;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::refinement::extract::ExtractedEntities;

// ────────────────────────────────────────────────────────────────────────────
// Phases and errors
// ────────────────────────────────────────────────────────────────────────────

/// Where a session currently stands, derived from its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing extracted yet.
    Idle,
    /// Entities and questions are in, no answer recorded.
    Extracted,
    /// At least one answer in, at least one question still pending.
    Answering,
    /// Every question has an answer; refinement may run.
    AllAnswered,
    /// A refined description exists. Re-enterable: refining again or
    /// submitting a new extraction both work from here.
    Refined,
}

/// Rejected session transitions. A rejection never mutates the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no job description has been extracted in this session")]
    NothingExtracted,
    #[error("no question is currently awaiting an answer")]
    NoPendingQuestion,
    #[error("answer targets question {submitted} but question {expected} is current")]
    AnswerIndexMismatch { submitted: usize, expected: usize },
    #[error("question {index} has not been answered")]
    MissingAnswer { index: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// One user's refinement workflow: the submitted description, the latest
/// extraction run, collected answers, and the synthesized result.
///
/// Fields stay private so the cursor can only move through `record_answer`
/// and the answer map can never hold an index the cursor has not passed.
#[derive(Debug, Clone)]
pub struct RefinementSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    job_desc: String,
    entities: Option<ExtractedEntities>,
    questions: Vec<String>,
    answers: BTreeMap<usize, String>,
    cursor: usize,
    refined: Option<String>,
}

/// Everything the refine stage needs, gathered once the gate passes.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementInputs {
    pub job_desc: String,
    pub entities: ExtractedEntities,
    /// Answers in question order, index 0 first.
    pub answers: Vec<String>,
}

impl RefinementSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            job_desc: String::new(),
            entities: None,
            questions: Vec::new(),
            answers: BTreeMap::new(),
            cursor: 0,
            refined: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn job_desc(&self) -> &str {
        &self.job_desc
    }

    pub fn entities(&self) -> Option<&ExtractedEntities> {
        self.entities.as_ref()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    /// Index of the next unanswered question. Equal to the question count
    /// once every question has been answered.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The question currently awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.cursor).map(String::as_str)
    }

    pub fn refined(&self) -> Option<&str> {
        self.refined.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.entities.is_none() {
            SessionPhase::Idle
        } else if self.refined.is_some() {
            SessionPhase::Refined
        } else if self.cursor >= self.questions.len() {
            SessionPhase::AllAnswered
        } else if self.answers.is_empty() {
            SessionPhase::Extracted
        } else {
            SessionPhase::Answering
        }
    }

    /// Installs a fresh extraction run. Allowed from any phase; answers, the
    /// cursor, and any previous refined output are discarded.
    pub fn begin_run(
        &mut self,
        job_desc: String,
        entities: ExtractedEntities,
        questions: Vec<String>,
    ) {
        self.job_desc = job_desc;
        self.entities = Some(entities);
        self.questions = questions;
        self.answers.clear();
        self.cursor = 0;
        self.refined = None;
    }

    /// Records the answer to the current question and advances the cursor by
    /// exactly one. The submitted index must match the cursor; answers out of
    /// order or past the end are rejected without touching state.
    pub fn record_answer(&mut self, index: usize, answer: String) -> Result<(), SessionError> {
        if self.entities.is_none() || self.cursor >= self.questions.len() {
            return Err(SessionError::NoPendingQuestion);
        }
        if index != self.cursor {
            return Err(SessionError::AnswerIndexMismatch {
                submitted: index,
                expected: self.cursor,
            });
        }
        self.answers.insert(self.cursor, answer);
        self.cursor += 1;
        Ok(())
    }

    /// The refine gate: succeeds only when an extraction run exists and every
    /// question has an answer. Returns the inputs for the refine stage with
    /// answers gathered in question order.
    pub fn refinement_inputs(&self) -> Result<RefinementInputs, SessionError> {
        let entities = self.entities.as_ref().ok_or(SessionError::NothingExtracted)?;

        let mut answers = Vec::with_capacity(self.questions.len());
        for index in 0..self.questions.len() {
            match self.answers.get(&index) {
                Some(answer) => answers.push(answer.clone()),
                None => return Err(SessionError::MissingAnswer { index }),
            }
        }

        Ok(RefinementInputs {
            job_desc: self.job_desc.clone(),
            entities: entities.clone(),
            answers,
        })
    }

    /// Stores the synthesized description. Refinement stays re-enterable; the
    /// next `begin_run` clears it.
    pub fn record_refined(&mut self, text: String) {
        self.refined = Some(text);
    }
}

impl Default for RefinementSession {
    fn default() -> Self {
        Self::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extracted_session(questions: &[&str]) -> RefinementSession {
        let mut session = RefinementSession::new();
        session.begin_run(
            "We are hiring a backend engineer.".to_string(),
            ExtractedEntities::Entities(json!({"Job Title": "Backend Engineer"})),
            questions.iter().map(|q| q.to_string()).collect(),
        );
        session
    }

    #[test]
    fn test_fresh_session_is_idle() {
        let session = RefinementSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.cursor(), 0);
        assert!(session.current_question().is_none());
        assert!(session.entities().is_none());
        assert!(session.refined().is_none());
    }

    #[test]
    fn test_begin_run_enters_extracted_with_first_question_pending() {
        let session = extracted_session(&["1. What is the salary?", "2. Remote or onsite?"]);
        assert_eq!(session.phase(), SessionPhase::Extracted);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_question(), Some("1. What is the salary?"));
    }

    #[test]
    fn test_answer_advances_cursor_by_one() {
        let mut session = extracted_session(&["1. A?", "2. B?"]);
        session.record_answer(0, "first".to_string()).unwrap();

        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.current_question(), Some("2. B?"));
        assert_eq!(session.answers().get(&0), Some(&"first".to_string()));
    }

    #[test]
    fn test_single_question_salary_walkthrough() {
        let mut session = extracted_session(&["1. What is the salary range?"]);
        session.record_answer(0, "100k-120k".to_string()).unwrap();

        assert_eq!(session.cursor(), 1);
        assert_eq!(session.phase(), SessionPhase::AllAnswered);
        assert!(session.current_question().is_none());
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()[&0], "100k-120k");
    }

    #[test]
    fn test_stale_index_is_rejected_without_mutation() {
        let mut session = extracted_session(&["1. A?", "2. B?"]);
        session.record_answer(0, "first".to_string()).unwrap();

        // Re-submitting index 0 after the cursor moved on.
        let err = session.record_answer(0, "again".to_string()).unwrap_err();
        assert_eq!(
            err,
            SessionError::AnswerIndexMismatch {
                submitted: 0,
                expected: 1
            }
        );
        assert_eq!(session.cursor(), 1, "rejection must not move the cursor");
        assert_eq!(session.answers()[&0], "first", "rejection must not overwrite");
    }

    #[test]
    fn test_answer_after_exhaustion_is_rejected_noop() {
        let mut session = extracted_session(&["1. Only question?"]);
        session.record_answer(0, "done".to_string()).unwrap();

        let err = session.record_answer(1, "extra".to_string()).unwrap_err();
        assert_eq!(err, SessionError::NoPendingQuestion);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn test_answer_before_extraction_is_rejected() {
        let mut session = RefinementSession::new();
        let err = session.record_answer(0, "eager".to_string()).unwrap_err();
        assert_eq!(err, SessionError::NoPendingQuestion);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_cursor_never_exceeds_question_count() {
        let mut session = extracted_session(&["1. A?", "2. B?", "3. C?"]);
        for i in 0..3 {
            assert!(session.cursor() <= 3);
            session.record_answer(i, format!("answer {i}")).unwrap();
        }
        assert_eq!(session.cursor(), 3);
        assert!(session.record_answer(3, "overflow".to_string()).is_err());
        assert_eq!(session.cursor(), 3);
    }

    #[test]
    fn test_refinement_gate_rejects_idle_session() {
        let session = RefinementSession::new();
        assert_eq!(
            session.refinement_inputs().unwrap_err(),
            SessionError::NothingExtracted
        );
    }

    #[test]
    fn test_refinement_gate_names_first_missing_answer() {
        let mut session = extracted_session(&["1. A?", "2. B?"]);
        session.record_answer(0, "answered".to_string()).unwrap();

        assert_eq!(
            session.refinement_inputs().unwrap_err(),
            SessionError::MissingAnswer { index: 1 }
        );
        // The rejection leaves the session where it was.
        assert_eq!(session.phase(), SessionPhase::Answering);
    }

    #[test]
    fn test_refinement_inputs_carry_answers_in_question_order() {
        let mut session = extracted_session(&["1. A?", "2. B?"]);
        session.record_answer(0, "first".to_string()).unwrap();
        session.record_answer(1, "second".to_string()).unwrap();

        let inputs = session.refinement_inputs().unwrap();
        assert_eq!(inputs.job_desc, "We are hiring a backend engineer.");
        assert_eq!(inputs.answers, vec!["first", "second"]);
        assert_eq!(
            inputs.entities,
            ExtractedEntities::Entities(json!({"Job Title": "Backend Engineer"}))
        );
    }

    #[test]
    fn test_refined_phase_is_reenterable() {
        let mut session = extracted_session(&["1. A?"]);
        session.record_answer(0, "answer".to_string()).unwrap();
        session.record_refined("A refined description.".to_string());

        assert_eq!(session.phase(), SessionPhase::Refined);
        assert_eq!(session.refined(), Some("A refined description."));
        // Refining again is allowed: the gate still passes.
        assert!(session.refinement_inputs().is_ok());
    }

    #[test]
    fn test_new_extraction_resets_run_state() {
        let mut session = extracted_session(&["1. A?"]);
        session.record_answer(0, "answer".to_string()).unwrap();
        session.record_refined("Refined v1".to_string());

        session.begin_run(
            "A different job description.".to_string(),
            ExtractedEntities::Entities(json!({"Job Title": "Designer"})),
            vec!["1. New question?".to_string()],
        );

        assert_eq!(session.phase(), SessionPhase::Extracted);
        assert_eq!(session.cursor(), 0);
        assert!(session.answers().is_empty());
        assert!(session.refined().is_none());
        assert_eq!(session.job_desc(), "A different job description.");
        assert_eq!(session.current_question(), Some("1. New question?"));
    }

    #[test]
    fn test_error_form_extraction_still_runs_the_workflow() {
        let mut session = RefinementSession::new();
        session.begin_run(
            "unparseable".to_string(),
            ExtractedEntities::invalid_json(),
            vec!["1. What role is this for?".to_string()],
        );

        assert_eq!(session.phase(), SessionPhase::Extracted);
        session.record_answer(0, "A sales role".to_string()).unwrap();
        let inputs = session.refinement_inputs().unwrap();
        assert_eq!(inputs.entities, ExtractedEntities::invalid_json());
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(SessionPhase::AllAnswered).unwrap(),
            json!("all_answered")
        );
        assert_eq!(
            serde_json::to_value(SessionPhase::Idle).unwrap(),
            json!("idle")
        );
    }
}
