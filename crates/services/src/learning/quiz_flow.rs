//! Quiz attempt lifecycle: `Lesson -> Taking -> Results -> Lesson`.
//!
//! Start preconditions are checked in order (section unlocked, lessons
//! complete, not already passed), each with its own rejection. Answers are
//! persisted to the server the moment they are selected, so a disconnect
//! mid-attempt loses at most the current selection. Grading is entirely
//! server-side.

use tracing::warn;

use course_core::QuizSession;
use course_core::model::{AnswerId, QuestionReview, QuizId, QuizResult};
use course_core::quiz_session::Advance;

use crate::error::{FlowError, Rejection};
use super::service::LearningFlowService;
use super::session::{LearningSession, QuizPhase};

/// Outcome of forward navigation inside an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved to the next question.
    NextQuestion,
    /// Forward on the last question submitted the attempt.
    Submitted(QuizResult),
}

/// Outcome of one countdown poll.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No timed attempt is active; the poll is a no-op. This is what makes a
    /// stale timer harmless after the session leaves `Taking`.
    Idle,
    /// Attempt still running, with the wall-clock-corrected seconds left.
    Running { remaining_seconds: i64 },
    /// The countdown hit zero; the attempt was force-submitted with whatever
    /// answers were recorded.
    AutoSubmitted(QuizResult),
}

impl LearningFlowService {
    /// Start an attempt for the given quiz.
    ///
    /// # Errors
    ///
    /// In precondition order: `Rejection::SectionLocked`,
    /// `Rejection::LessonsIncomplete`, then `Rejection::AlreadyPassed`
    /// (informational). Transport failures leave the phase unchanged.
    pub async fn start_quiz(
        &self,
        session: &mut LearningSession,
        quiz_id: QuizId,
    ) -> Result<(), FlowError> {
        if session.is_taking_quiz() {
            return Err(FlowError::AlreadyTakingQuiz);
        }

        let section = session
            .view()
            .section_for_quiz(quiz_id)
            .ok_or(FlowError::UnknownQuiz)?;
        if !section.is_unlocked() {
            return Err(Rejection::SectionLocked.into());
        }
        if !section.lessons_complete() {
            return Err(Rejection::LessonsIncomplete.into());
        }
        let status = section
            .section_quiz()
            .ok_or(FlowError::UnknownQuiz)?;
        if status.is_passed() {
            return Err(Rejection::AlreadyPassed.into());
        }
        let quiz = status.quiz().clone();

        let started = self.api().start_quiz(quiz_id).await?;
        let quiz_session = QuizSession::new(
            started.attempt_id,
            quiz,
            started.questions,
            started.started_at,
        )?;
        session.set_phase(QuizPhase::Taking(quiz_session));
        Ok(())
    }

    /// Record the learner's choice for the current question. The choice is
    /// persisted server-side first; nothing is recorded locally on failure,
    /// so the action can be retried as-is.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotTakingQuiz` outside an attempt,
    /// `QuizSessionError::UnknownAnswer` for a foreign answer id, and
    /// `FlowError::Api` on transport failure.
    pub async fn select_answer(
        &self,
        session: &mut LearningSession,
        answer_id: AnswerId,
    ) -> Result<(), FlowError> {
        let (attempt_id, question_id) = {
            let taking = session.taking().ok_or(FlowError::NotTakingQuiz)?;
            let question = taking.current_question();
            if !question.has_answer(answer_id) {
                return Err(course_core::QuizSessionError::UnknownAnswer.into());
            }
            (taking.attempt_id(), question.id())
        };

        self.api()
            .submit_answer(attempt_id, question_id, answer_id)
            .await?;

        let taking = session.taking_mut().ok_or(FlowError::NotTakingQuiz)?;
        taking.select_answer(answer_id)?;
        Ok(())
    }

    /// Move forward; on the last question this submits the attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoAnswerSelected` without a recorded answer
    /// for the current question, or submission errors.
    pub async fn advance(
        &self,
        session: &mut LearningSession,
    ) -> Result<AdvanceOutcome, FlowError> {
        let advance = {
            let taking = session.taking_mut().ok_or(FlowError::NotTakingQuiz)?;
            taking.advance()?
        };
        match advance {
            Advance::Moved => Ok(AdvanceOutcome::NextQuestion),
            Advance::ReadyToSubmit => {
                let result = self.finish_attempt(session).await?;
                Ok(AdvanceOutcome::Submitted(result))
            }
        }
    }

    /// Move backward one question. Unconditional above the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AtFirstQuestion` at the lower bound.
    pub fn go_back_question(&self, session: &mut LearningSession) -> Result<(), FlowError> {
        let taking = session.taking_mut().ok_or(FlowError::NotTakingQuiz)?;
        taking.go_back()?;
        Ok(())
    }

    /// Seconds left on the active attempt; `None` when untimed or not taking.
    #[must_use]
    pub fn remaining_seconds(&self, session: &LearningSession) -> Option<i64> {
        session
            .taking()
            .and_then(|t| t.remaining_seconds(self.clock().now()))
    }

    /// Countdown poll, driven by the host's scheduler. When the wall-clock
    /// countdown of a timed attempt has run out, the attempt is submitted
    /// with the answers recorded so far, no confirmation asked.
    ///
    /// # Errors
    ///
    /// Returns submission errors from a forced submit; the attempt then
    /// stays in `Taking` and the next poll retries.
    pub async fn tick(&self, session: &mut LearningSession) -> Result<TickOutcome, FlowError> {
        let now = self.clock().now();
        let Some(taking) = session.taking() else {
            return Ok(TickOutcome::Idle);
        };
        match taking.remaining_seconds(now) {
            None => Ok(TickOutcome::Idle),
            Some(0) => {
                let result = self.finish_attempt(session).await?;
                Ok(TickOutcome::AutoSubmitted(result))
            }
            Some(remaining_seconds) => Ok(TickOutcome::Running { remaining_seconds }),
        }
    }

    /// Discard the attempt result and re-enter the quiz, subject to the
    /// same start preconditions. Blocked if the quiz has since been passed.
    ///
    /// A transport failure during the restart puts the results screen back,
    /// so the action can be retried from where it was issued.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoResult` outside the results phase, plus any
    /// start rejection.
    pub async fn retry_quiz(&self, session: &mut LearningSession) -> Result<(), FlowError> {
        let QuizPhase::Results { quiz_id, .. } = *session.phase() else {
            return Err(FlowError::NoResult);
        };
        let results = session.phase().clone();
        session.set_phase(QuizPhase::Lesson);
        match self.start_quiz(session, quiz_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                // A rejection means the quiz can no longer be retaken;
                // only transient failures restore the results screen.
                if matches!(err, FlowError::Api(_)) {
                    session.set_phase(results);
                }
                Err(err)
            }
        }
    }

    /// Leave the quiz flow and return to browsing. Discards any active
    /// session or result; a countdown poll afterwards is a no-op.
    pub fn leave_quiz(&self, session: &mut LearningSession) {
        session.set_phase(QuizPhase::Lesson);
    }

    /// Per-question breakdown of the graded attempt, fetched lazily.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoResult` outside the results phase, or transport
    /// errors.
    pub async fn review_answers(
        &self,
        session: &LearningSession,
    ) -> Result<Vec<QuestionReview>, FlowError> {
        let QuizPhase::Results { attempt_id, .. } = *session.phase() else {
            return Err(FlowError::NoResult);
        };
        Ok(self.api().fetch_detailed_results(attempt_id).await?)
    }

    async fn finish_attempt(
        &self,
        session: &mut LearningSession,
    ) -> Result<QuizResult, FlowError> {
        let (attempt_id, quiz_id) = {
            let taking = session.taking().ok_or(FlowError::NotTakingQuiz)?;
            (taking.attempt_id(), taking.quiz().id())
        };

        // A failed submit leaves the phase at `Taking` so it can be retried.
        let result = self.api().submit_quiz(attempt_id).await?;
        session.set_phase(QuizPhase::Results {
            quiz_id,
            attempt_id,
            result: result.clone(),
        });

        // The submit is already committed server-side; a failed refetch only
        // delays how soon newly-unlocked sections show up.
        if let Err(err) = self.refresh(session).await {
            warn!(%err, "refresh after submit failed; keeping last known view");
        }
        Ok(result)
    }
}
