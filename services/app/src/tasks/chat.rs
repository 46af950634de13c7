//! services/app/src/tasks/chat.rs
//!
//! One question/answer exchange against the backend. Validation happens
//! locally before any request; a failed exchange leaves the conversation
//! log untouched so the caller can keep the question text for a retry.

use tracing::{debug, warn};

use copilot_core::ports::{PortError, QuestionService};
use copilot_core::store::CourseStore;

/// The input field's limit in the original form.
pub const MAX_QUESTION_LEN: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Please enter a question")]
    EmptyQuestion,
    #[error("Question is too long. Maximum length is {MAX_QUESTION_LEN} characters.")]
    QuestionTooLong,
    #[error("Failed to get response: {0}")]
    Backend(#[from] PortError),
}

/// Submits one trimmed question and, on success, appends the question and
/// the answer (in that order) to the conversation log.
pub async fn submit_question(
    store: &mut CourseStore,
    questions: &dyn QuestionService,
    raw: &str,
) -> Result<(), ChatError> {
    let question = raw.trim();
    if question.is_empty() {
        return Err(ChatError::EmptyQuestion);
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(ChatError::QuestionTooLong);
    }

    debug!(len = question.len(), "submitting question");
    let payload = questions.ask(question).await.map_err(|err| {
        warn!(error = %err, "question failed");
        err
    })?;
    store.record_exchange(question, payload.answer, payload.citations);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use copilot_core::domain::{ChatEntry, Citation};
    use copilot_core::ports::{AnswerPayload, PortResult};

    struct TestQuestionService {
        answer: Option<AnswerPayload>,
        asked: Arc<Mutex<Vec<String>>>,
    }

    impl TestQuestionService {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Some(AnswerPayload {
                    answer: answer.to_string(),
                    citations: vec![Citation {
                        source: "syllabus.pdf".into(),
                        content: None,
                    }],
                }),
                asked: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                asked: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl QuestionService for TestQuestionService {
        async fn ask(&self, question: &str) -> PortResult<AnswerPayload> {
            self.asked.lock().unwrap().push(question.to_string());
            match &self.answer {
                Some(payload) => Ok(payload.clone()),
                None => Err(PortError::Rejected("backend down".into())),
            }
        }
    }

    #[tokio::test]
    async fn a_successful_exchange_appends_question_then_answer() {
        let mut store = CourseStore::new();
        let service = TestQuestionService::answering("Recursion, mostly.");
        submit_question(&mut store, &service, "  What is module 2 about?  ")
            .await
            .unwrap();

        let log = store.conversation();
        assert_eq!(log.len(), 2);
        // The question is stored trimmed.
        assert!(
            matches!(&log[0], ChatEntry::Question { text, .. } if text == "What is module 2 about?")
        );
        assert!(matches!(&log[1], ChatEntry::Answer { citations, .. } if citations.len() == 1));
        assert_eq!(service.asked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_whitespace_question_never_reaches_the_backend() {
        let mut store = CourseStore::new();
        let service = TestQuestionService::answering("unused");
        let err = submit_question(&mut store, &service, "   \n\t ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyQuestion));
        assert_eq!(err.to_string(), "Please enter a question");
        assert!(service.asked.lock().unwrap().is_empty());
        assert!(store.conversation().is_empty());
    }

    #[tokio::test]
    async fn an_overlong_question_never_reaches_the_backend() {
        let mut store = CourseStore::new();
        let service = TestQuestionService::answering("unused");
        let long = "x".repeat(MAX_QUESTION_LEN + 1);
        assert!(matches!(
            submit_question(&mut store, &service, &long).await,
            Err(ChatError::QuestionTooLong)
        ));
        assert!(service.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_failed_exchange_appends_nothing() {
        let mut store = CourseStore::new();
        let service = TestQuestionService::failing();
        let err = submit_question(&mut store, &service, "Will this work?")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to get response:"));
        assert!(store.conversation().is_empty());
        // The request was actually issued.
        assert_eq!(service.asked.lock().unwrap().len(), 1);
    }
}
