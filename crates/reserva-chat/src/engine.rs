//! Conversation engine: drives each conversation through its dialogue steps.
//!
//! Holds one [`ConversationState`] per conversation id. A turn copies the
//! state out, advances it (possibly awaiting the NLU adapter) and writes it
//! back. Two concurrent turns on the same id race; the later write wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use reserva_core::config::ChatConfig;
use reserva_core::types::ReservationStatus;
use reserva_core::validation;
use reserva_nlu::{NluAdapter, NluGuess};
use reserva_storage::{ReservationStore, StoreError};

use crate::error::ChatError;
use crate::intent::{self, MenuChoice};
use crate::replies;
use crate::state::{
    ConversationSnapshot, ConversationState, LastAction, ReservationDraft, ReservationField, Step,
};

/// Scripted multi-turn reservation dialogue.
pub struct ConversationEngine {
    store: Arc<ReservationStore>,
    nlu: Arc<dyn NluAdapter>,
    config: ChatConfig,
    conversations: Mutex<HashMap<String, ConversationState>>,
}

impl ConversationEngine {
    pub fn new(store: Arc<ReservationStore>, nlu: Arc<dyn NluAdapter>, config: ChatConfig) -> Self {
        Self {
            store,
            nlu,
            config,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one user message and return the reply text.
    ///
    /// Unknown conversation ids start a fresh conversation. Empty and
    /// over-long messages are rejected before any state is touched.
    pub async fn handle_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<String, ChatError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let mut state = self.load_state(conversation_id)?;
        let from = state.step.label();

        let reply = self.advance(&mut state, text).await?;

        tracing::debug!(
            conversation_id = %conversation_id,
            from = from,
            to = state.step.label(),
            "Conversation advanced"
        );
        self.save_state(conversation_id, state)?;
        Ok(reply)
    }

    /// Current state of a conversation, if it exists.
    pub fn snapshot(&self, conversation_id: &str) -> Option<ConversationSnapshot> {
        let conversations = self.conversations.lock().ok()?;
        conversations
            .get(conversation_id)
            .map(|state| ConversationSnapshot::new(conversation_id, state))
    }

    /// Forget a conversation. Returns false if it did not exist.
    pub fn reset(&self, conversation_id: &str) -> bool {
        match self.conversations.lock() {
            Ok(mut conversations) => {
                let removed = conversations.remove(conversation_id).is_some();
                if removed {
                    tracing::info!(conversation_id = %conversation_id, "Conversation reset");
                }
                removed
            }
            Err(_) => false,
        }
    }

    /// Number of conversations currently tracked.
    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().map(|c| c.len()).unwrap_or(0)
    }

    // ---- Dialogue steps ----

    async fn advance(&self, state: &mut ConversationState, text: &str) -> Result<String, ChatError> {
        let today = validation::today();

        match state.step.clone() {
            Step::Idle => {
                state.step = Step::ChoosingAction;
                Ok(replies::menu())
            }
            Step::ChoosingAction => Ok(self.choose_action(state, text, today).await),
            Step::NewCollecting { mut draft } => {
                if let Some(field) = draft.next_missing() {
                    if !draft.accept(field, text, today) {
                        return Ok(replies::invalid_field(field));
                    }
                }
                Ok(continue_draft(state, draft))
            }
            Step::NewConfirming { draft } => match intent::yes_no(text) {
                Some(true) => {
                    let reservation = self.store.create(draft)?;
                    state.last_reservation_id = Some(reservation.id.clone());
                    state.reset();
                    Ok(replies::created(&reservation))
                }
                Some(false) => {
                    state.reset();
                    Ok(replies::discarded())
                }
                None => Ok(replies::yes_or_no()),
            },
            Step::ModifyCollectingId => {
                let id = resolve_id(state, text);
                match self.store.get(&id) {
                    Ok(reservation) if reservation.status == ReservationStatus::Cancelled => {
                        Ok(replies::modify_cancelled())
                    }
                    Ok(reservation) => {
                        state.step = Step::ModifyCollectingField {
                            reservation_id: reservation.id.clone(),
                        };
                        Ok(replies::ask_modify_field(&reservation))
                    }
                    Err(StoreError::NotFound(_)) => Ok(replies::id_not_found()),
                    Err(e) => Err(e.into()),
                }
            }
            Step::ModifyCollectingField { reservation_id } => match ReservationField::parse(text) {
                Some(field) => {
                    state.step = Step::ModifyCollectingValue {
                        reservation_id,
                        field,
                    };
                    Ok(replies::ask_new_value(field))
                }
                None => Ok(replies::unknown_modify_field()),
            },
            Step::ModifyCollectingValue {
                reservation_id,
                field,
            } => {
                let Some(update) = field.to_update(text, today) else {
                    return Ok(replies::invalid_field(field));
                };
                match self.store.update(&reservation_id, update) {
                    Ok(reservation) => {
                        state.last_reservation_id = Some(reservation.id.clone());
                        state.reset();
                        Ok(replies::updated(&reservation))
                    }
                    Err(StoreError::NotFound(_)) => {
                        tracing::warn!(
                            reservation_id = %reservation_id,
                            "Reservation disappeared during modification, restarting flow"
                        );
                        state.reset();
                        Ok(replies::vanished())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Step::CancelCollectingId => {
                let id = resolve_id(state, text);
                match self.store.cancel(&id) {
                    Ok(reservation) => {
                        state.last_reservation_id = Some(reservation.id.clone());
                        state.reset();
                        Ok(replies::cancelled(&reservation))
                    }
                    Err(StoreError::NotFound(_)) => Ok(replies::id_not_found()),
                    Err(e) => Err(e.into()),
                }
            }
            Step::ConfirmCollectingId => {
                let id = resolve_id(state, text);
                match self.store.get(&id) {
                    Ok(reservation) => {
                        state.last_reservation_id = Some(reservation.id.clone());
                        state.reset();
                        Ok(replies::details(&reservation))
                    }
                    Err(StoreError::NotFound(_)) => Ok(replies::id_not_found()),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Route a menu answer. Keywords decide first; the NLU adapter is only
    /// asked when the keywords found nothing or a new booking (which it may
    /// pre-fill).
    async fn choose_action(&self, state: &mut ConversationState, text: &str, today: NaiveDate) -> String {
        let keyword_choice = intent::classify(text);

        let (choice, guess) = match keyword_choice {
            MenuChoice::New | MenuChoice::Unknown => {
                let guess = self.nlu.analyze(text).await;
                tracing::debug!(
                    adapter = self.nlu.name(),
                    intent = ?guess.intent,
                    notes = %guess.notes,
                    "NLU guess"
                );
                let choice = if keyword_choice == MenuChoice::Unknown {
                    MenuChoice::from(guess.intent)
                } else {
                    keyword_choice
                };
                (choice, Some(guess))
            }
            other => (other, None),
        };

        let last_id = state.last_reservation_id.clone();
        match choice {
            MenuChoice::New => {
                let mut draft = ReservationDraft::default();
                if let Some(guess) = &guess {
                    prefill(&mut draft, guess, today);
                }
                state.last_action = Some(LastAction::New);
                match draft.next_missing() {
                    Some(next) => {
                        let reply = replies::start_new(&draft, next);
                        state.step = Step::NewCollecting { draft };
                        reply
                    }
                    None => continue_draft(state, draft),
                }
            }
            MenuChoice::Modify => {
                state.begin(LastAction::Modify, Step::ModifyCollectingId);
                replies::ask_id("modify it", last_id.as_deref())
            }
            MenuChoice::Cancel => {
                state.begin(LastAction::Cancel, Step::CancelCollectingId);
                replies::ask_id("cancel it", last_id.as_deref())
            }
            MenuChoice::Confirm => {
                state.begin(LastAction::Confirm, Step::ConfirmCollectingId);
                replies::ask_id("see the details", last_id.as_deref())
            }
            MenuChoice::SmallTalk => replies::small_talk(),
            MenuChoice::Unknown => replies::not_understood(),
        }
    }

    // ---- State map ----

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ConversationState>>, ChatError> {
        self.conversations
            .lock()
            .map_err(|e| ChatError::StorageError(format!("conversation lock poisoned: {}", e)))
    }

    fn load_state(&self, conversation_id: &str) -> Result<ConversationState, ChatError> {
        Ok(self
            .lock()?
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_state(&self, conversation_id: &str, state: ConversationState) -> Result<(), ChatError> {
        self.lock()?.insert(conversation_id.to_string(), state);
        Ok(())
    }
}

/// Move a draft forward: ask for the next missing field, or ask for
/// confirmation once it is complete.
fn continue_draft(state: &mut ConversationState, draft: ReservationDraft) -> String {
    match draft.complete() {
        Some(complete) => {
            let reply = replies::confirm_new(&complete);
            state.step = Step::NewConfirming { draft: complete };
            reply
        }
        None => {
            let next = draft.next_missing();
            state.step = Step::NewCollecting { draft };
            next.map_or_else(replies::not_understood, |f| replies::ask_field(f).to_string())
        }
    }
}

/// Copy NLU-extracted fields into the draft. Each value goes through the
/// same validation as typed input; invalid values are dropped.
fn prefill(draft: &mut ReservationDraft, guess: &NluGuess, today: NaiveDate) {
    if let Some(date) = &guess.date {
        draft.accept(ReservationField::Date, date, today);
    }
    if let Some(time) = &guess.time {
        draft.accept(ReservationField::Time, time, today);
    }
    if let Some(guests) = guess.guests {
        if validation::is_valid_guests(guests) {
            draft.guests = Some(guests as u32);
        }
    }
    if let Some(name) = &guess.name {
        draft.accept(ReservationField::Name, name, today);
    }
}

/// `last` stands for the conversation's most recent reservation id.
fn resolve_id(state: &ConversationState, text: &str) -> String {
    match &state.last_reservation_id {
        Some(id) if text.eq_ignore_ascii_case("last") => id.clone(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use reserva_core::types::NewReservation;
    use reserva_nlu::{NluIntent, NullAdapter};

    /// Adapter that returns the same guess for every message.
    struct FixedGuess(NluGuess);

    #[async_trait]
    impl NluAdapter for FixedGuess {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn analyze(&self, _text: &str) -> NluGuess {
            self.0.clone()
        }
    }

    fn engine_with(nlu: Arc<dyn NluAdapter>) -> (ConversationEngine, Arc<ReservationStore>) {
        let store = Arc::new(ReservationStore::new());
        let engine = ConversationEngine::new(store.clone(), nlu, ChatConfig::default());
        (engine, store)
    }

    fn engine() -> (ConversationEngine, Arc<ReservationStore>) {
        engine_with(Arc::new(NullAdapter))
    }

    fn seeded(store: &ReservationStore) -> String {
        store
            .create(NewReservation {
                name: "Alex".to_string(),
                date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
                time: "18:30".to_string(),
                guests: 4,
            })
            .unwrap()
            .id
    }

    fn step_of(engine: &ConversationEngine, id: &str) -> String {
        engine.snapshot(id).unwrap().step
    }

    async fn say(engine: &ConversationEngine, text: &str) -> String {
        engine.handle_message("c1", text).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_message_shows_menu() {
        let (engine, _) = engine();
        let reply = say(&engine, "anything at all").await;
        assert!(reply.contains("1) New reservation"));
        assert!(reply.contains("4) Confirm (see details)"));
        assert_eq!(step_of(&engine, "c1"), "choosing_action");
    }

    #[tokio::test]
    async fn test_new_reservation_happy_path() {
        let (engine, store) = engine();
        say(&engine, "hi").await;

        let reply = say(&engine, "new reservation").await;
        assert!(reply.contains("What date would you like?"));
        assert!(say(&engine, "2099-01-01").await.contains("What time"));
        assert!(say(&engine, "19:30").await.contains("How many guests"));
        assert!(say(&engine, "4").await.contains("Under what name"));

        let reply = say(&engine, "Alex").await;
        assert!(reply.contains("Please confirm your reservation"));
        assert!(reply.contains("- Time: 19:30"));
        assert_eq!(step_of(&engine, "c1"), "new_confirming");
        assert!(store.is_empty());

        let reply = say(&engine, "yes").await;
        assert!(reply.contains("Your reservation is confirmed!"));
        assert!(reply.contains("Reservation ID: res_"));
        assert!(reply.contains("- Status: Confirmed"));

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Alex");
        assert_eq!(all[0].guests, 4);
        assert_eq!(all[0].status, ReservationStatus::Confirmed);

        let snapshot = engine.snapshot("c1").unwrap();
        assert_eq!(snapshot.step, "choosing_action");
        assert_eq!(snapshot.last_reservation_id.as_deref(), Some(all[0].id.as_str()));
        assert_eq!(snapshot.last_action, None);
    }

    #[tokio::test]
    async fn test_invalid_field_does_not_advance() {
        let (engine, _) = engine();
        say(&engine, "hi").await;
        say(&engine, "1").await;

        let reply = say(&engine, "next tuesday").await;
        assert!(reply.contains("The date is invalid"));
        assert_eq!(engine.snapshot("c1").unwrap().pending_field, Some(ReservationField::Date));

        say(&engine, "2099-01-01").await;
        assert!(say(&engine, "25:00").await.contains("time format is invalid"));
        say(&engine, "7pm").await;

        let reply = say(&engine, "25").await;
        assert!(reply.contains("Guests must be a number between 1 and 20"));
        assert_eq!(
            engine.snapshot("c1").unwrap().pending_field,
            Some(ReservationField::Guests)
        );
    }

    #[tokio::test]
    async fn test_past_date_rejected() {
        let (engine, _) = engine();
        say(&engine, "hi").await;
        say(&engine, "new").await;
        let yesterday = validation::today() - Duration::days(1);
        let reply = say(&engine, &yesterday.format("%Y-%m-%d").to_string()).await;
        assert!(reply.contains("The date is invalid"));
    }

    #[tokio::test]
    async fn test_confirming_no_discards() {
        let (engine, store) = engine();
        for text in ["hi", "new", "2099-01-01", "18:00", "2", "Sam"] {
            say(&engine, text).await;
        }
        assert!(say(&engine, "maybe").await.contains("Please reply with 'yes' or 'no'"));
        assert_eq!(step_of(&engine, "c1"), "new_confirming");

        assert!(say(&engine, "n").await.contains("was not created"));
        assert!(store.is_empty());
        assert_eq!(step_of(&engine, "c1"), "choosing_action");
    }

    #[tokio::test]
    async fn test_modify_flow() {
        let (engine, store) = engine();
        let id = seeded(&store);
        say(&engine, "hi").await;

        assert!(say(&engine, "modify").await.contains("reservation ID to modify"));
        assert!(say(&engine, "res_0000_nothere").await.contains("couldn't find"));
        assert_eq!(step_of(&engine, "c1"), "modify_collecting_id");

        let reply = say(&engine, &id).await;
        assert!(reply.contains("Found your reservation."));
        assert!(say(&engine, "colour").await.contains("Please type which field"));

        assert!(say(&engine, "TIME").await.contains("What is the new time?"));
        assert!(say(&engine, "noonish").await.contains("time format is invalid"));
        assert_eq!(step_of(&engine, "c1"), "modify_collecting_value");

        let reply = say(&engine, "8pm").await;
        assert!(reply.contains("Your reservation has been updated."));
        assert!(reply.contains("- Time: 20:00"));

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.time, "20:00");
        assert_eq!(stored.name, "Alex");
        assert_eq!(step_of(&engine, "c1"), "choosing_action");
    }

    #[tokio::test]
    async fn test_modify_date_rejects_invalid_then_updates() {
        let (engine, store) = engine();
        let id = seeded(&store);
        say(&engine, "hi").await;
        say(&engine, "modify").await;
        say(&engine, &id).await;

        assert!(say(&engine, "date").await.contains("What is the new date?"));
        let snapshot = engine.snapshot("c1").unwrap();
        assert_eq!(snapshot.step, "modify_collecting_value");
        assert_eq!(snapshot.pending_field, Some(ReservationField::Date));
        assert_eq!(snapshot.last_reservation_id, None);

        let yesterday = validation::today() - Duration::days(1);
        for bad in [
            "2099-02-30".to_string(),
            "15/03/2099".to_string(),
            yesterday.format("%Y-%m-%d").to_string(),
        ] {
            let reply = say(&engine, &bad).await;
            assert!(reply.contains("The date is invalid"), "{} gave {}", bad, reply);
            let snapshot = engine.snapshot("c1").unwrap();
            assert_eq!(snapshot.step, "modify_collecting_value");
            assert_eq!(snapshot.last_reservation_id, None);
        }
        assert_eq!(
            store.get(&id).unwrap().date,
            NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
        );

        let reply = say(&engine, "2099-03-15").await;
        assert!(reply.contains("Your reservation has been updated."));
        assert!(reply.contains("- Date: 2099-03-15"));

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.date, NaiveDate::from_ymd_opt(2099, 3, 15).unwrap());
        assert_eq!(stored.time, "18:30");
        assert_eq!(stored.status, ReservationStatus::Confirmed);

        let snapshot = engine.snapshot("c1").unwrap();
        assert_eq!(snapshot.step, "choosing_action");
        assert_eq!(snapshot.last_reservation_id.as_deref(), Some(id.as_str()));
        assert_eq!(snapshot.pending_field, None);
    }

    #[tokio::test]
    async fn test_modify_cancelled_reservation_is_refused() {
        let (engine, store) = engine();
        let id = seeded(&store);
        store.cancel(&id).unwrap();

        say(&engine, "hi").await;
        say(&engine, "2").await;
        let reply = say(&engine, &id).await;
        assert!(reply.contains("has been cancelled"));
        assert_eq!(step_of(&engine, "c1"), "modify_collecting_id");
    }

    #[tokio::test]
    async fn test_cancel_flow() {
        let (engine, store) = engine();
        let id = seeded(&store);
        say(&engine, "hi").await;

        assert!(say(&engine, "cancel").await.contains("reservation ID to cancel"));
        assert!(say(&engine, "bogus").await.contains("couldn't find"));
        assert_eq!(step_of(&engine, "c1"), "cancel_collecting_id");

        let reply = say(&engine, &id).await;
        assert!(reply.contains("Your reservation has been cancelled."));
        assert_eq!(store.get(&id).unwrap().status, ReservationStatus::Cancelled);
        assert_eq!(step_of(&engine, "c1"), "choosing_action");
    }

    #[tokio::test]
    async fn test_confirm_details_with_last() {
        let (engine, store) = engine();
        for text in ["hi", "new", "2099-02-02", "12:15", "3", "Kim", "yes"] {
            say(&engine, text).await;
        }
        let id = store.list().unwrap()[0].id.clone();

        let reply = say(&engine, "4").await;
        assert!(reply.contains("or type 'last'"));
        assert_eq!(step_of(&engine, "c1"), "confirm_collecting_id");

        let reply = say(&engine, "LAST").await;
        assert!(reply.contains("Here are your reservation details"));
        assert!(reply.contains(&id));
        assert!(reply.contains("- Status: Confirmed"));
        assert_eq!(step_of(&engine, "c1"), "choosing_action");
    }

    #[tokio::test]
    async fn test_confirm_details_unknown_id() {
        let (engine, _) = engine();
        say(&engine, "hi").await;
        let reply = say(&engine, "confirm").await;
        assert!(!reply.contains("'last'"));
        assert!(say(&engine, "last").await.contains("couldn't find"));
    }

    #[tokio::test]
    async fn test_small_talk_and_unknown_stay_in_menu() {
        let (engine, _) = engine();
        say(&engine, "hi").await;
        assert!(say(&engine, "thank you").await.contains("Happy to chat"));
        assert!(say(&engine, "purple monkey").await.contains("didn't quite get that"));
        assert_eq!(step_of(&engine, "c1"), "choosing_action");
    }

    #[tokio::test]
    async fn test_nlu_complete_prefill_goes_to_confirmation() {
        let guess = NluGuess {
            intent: NluIntent::NewReservation,
            date: Some("2099-03-03".to_string()),
            time: Some("4pm".to_string()),
            guests: Some(2.0),
            name: Some("Rahaf".to_string()),
            notes: "all fields".to_string(),
        };
        let (engine, store) = engine_with(Arc::new(FixedGuess(guess)));
        say(&engine, "hi").await;

        let reply = say(&engine, "book a table in March at 4pm for 2 under Rahaf").await;
        assert!(reply.contains("Please confirm your reservation"));
        assert!(reply.contains("- Time: 16:00"));
        assert_eq!(step_of(&engine, "c1"), "new_confirming");

        say(&engine, "y").await;
        assert_eq!(store.list().unwrap()[0].name, "Rahaf");
    }

    #[tokio::test]
    async fn test_nlu_invalid_prefill_is_dropped() {
        let guess = NluGuess {
            intent: NluIntent::NewReservation,
            date: Some("2000-01-01".to_string()),
            time: Some("19:00".to_string()),
            guests: Some(50.0),
            name: None,
            notes: "partial".to_string(),
        };
        let (engine, _) = engine_with(Arc::new(FixedGuess(guess)));
        say(&engine, "hi").await;

        let reply = say(&engine, "new reservation for 50 people").await;
        assert!(reply.contains("- Time: 19:00"));
        assert!(!reply.contains("- Guests"));
        assert!(reply.contains("What date would you like?"));

        let reply = say(&engine, "2099-01-01").await;
        assert!(reply.contains("How many guests?"));
    }

    #[tokio::test]
    async fn test_unknown_keywords_adopt_nlu_intent() {
        let (engine, _) = engine_with(Arc::new(FixedGuess(NluGuess {
            intent: NluIntent::CancelReservation,
            ..NluGuess::unknown("wants to drop it")
        })));
        say(&engine, "hi").await;
        let reply = say(&engine, "please drop it").await;
        assert!(reply.contains("reservation ID to cancel"));
        assert_eq!(engine.snapshot("c1").unwrap().last_action, Some(LastAction::Cancel));
    }

    #[tokio::test]
    async fn test_rejects_empty_and_long_messages() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.handle_message("c1", "   ").await,
            Err(ChatError::EmptyMessage)
        ));
        let long = "a".repeat(2001);
        assert!(matches!(
            engine.handle_message("c1", &long).await,
            Err(ChatError::MessageTooLong(2000))
        ));
        assert_eq!(engine.conversation_count(), 0);
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let (engine, _) = engine();
        engine.handle_message("a", "hi").await.unwrap();
        engine.handle_message("a", "new").await.unwrap();
        engine.handle_message("b", "hi").await.unwrap();

        assert_eq!(step_of(&engine, "a"), "new_collecting");
        assert_eq!(step_of(&engine, "b"), "choosing_action");
        assert_eq!(engine.conversation_count(), 2);

        assert!(engine.reset("a"));
        assert!(!engine.reset("a"));
        assert!(engine.snapshot("a").is_none());
        assert_eq!(engine.conversation_count(), 1);

        let reply = engine.handle_message("a", "2099-01-01").await.unwrap();
        assert!(reply.contains("What would you like to do?"));
    }
}
