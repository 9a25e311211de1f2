//! Auto-reply pipeline.
//!
//! Every incoming message goes through the same ladder:
//!
//! 1. the first message of a conversation gets the welcome text;
//! 2. a knowledge base hit is returned verbatim;
//! 3. otherwise the language model answers, primed with the knowledge base;
//! 4. if the model fails, a fixed apology is returned.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use relay_models::{KnowledgeBase, ProcessedReply, ReplySource};
use tracing::{error, info, warn};

use crate::conversation::ConversationTracker;
use crate::delivery::ReplySender;
use crate::matcher::find_answer;
use crate::ollama::LanguageModel;

/// Model phrases that mean the reply is useless to a contact.
const DEFLECTION_MARKERS: &[&str] = &["i don't know", "i am an ai", "as an ai"];

/// Texts the responder speaks with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderSettings {
    pub assistant_name: String,
    pub support_url: Option<String>,
    welcome_message: Option<String>,
}

impl ResponderSettings {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            support_url: None,
            welcome_message: None,
        }
    }

    pub fn with_support_url(mut self, url: impl Into<String>) -> Self {
        self.support_url = Some(url.into());
        self
    }

    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = Some(message.into());
        self
    }

    /// Greeting for the first message of a conversation.
    pub fn welcome(&self) -> String {
        if let Some(message) = &self.welcome_message {
            return message.clone();
        }
        let mut text = format!(
            "Welcome! This is the {} assistant. Ask me anything and I'll do my best to help.",
            self.assistant_name
        );
        if let Some(url) = &self.support_url {
            text.push_str(&format!(" You can also find more details at {}", url));
        }
        text
    }

    /// Replaces model output that admits ignorance or being an AI.
    pub fn deflection(&self) -> String {
        match &self.support_url {
            Some(url) => format!(
                "I'm made to assist with {}. For more details, please visit {}",
                self.assistant_name, url
            ),
            None => format!("I'm made to assist with {}.", self.assistant_name),
        }
    }

    /// Reply used when the model cannot be reached.
    pub fn trouble(&self) -> String {
        match &self.support_url {
            Some(url) => format!(
                "I'm having trouble processing your request. Please try again later or visit {} for more information.",
                url
            ),
            None => "I'm having trouble processing your request. Please try again later.".to_string(),
        }
    }

    /// Builds the system prompt for the language model.
    pub fn system_prompt(&self, kb: &KnowledgeBase, today: &str) -> String {
        let mut prompt = format!(
            "You are the {} assistant. Today is {}. Do not mention that you are an AI. \
             Here is a knowledge base to help you answer questions:",
            self.assistant_name, today
        );

        for entry in &kb.entries {
            prompt.push_str(&format!(
                "\n\nQuestion patterns: {}\nAnswer: {}",
                entry.questions.join(", "),
                entry.answer
            ));
        }

        match &self.support_url {
            Some(url) => prompt.push_str(&format!(
                "\n\nIf you don't know the answer, refer users to {} for more details.",
                url
            )),
            None => prompt.push_str("\n\nIf you don't know the answer, say that support will follow up."),
        }
        prompt.push_str(&format!(
            " Don't answer questions unrelated to {}.",
            self.assistant_name
        ));
        prompt
    }
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self::new("Support")
    }
}

fn is_deflection(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    DEFLECTION_MARKERS.iter().any(|m| lower.contains(m))
}

/// Produces and delivers automatic replies.
pub struct AutoResponder {
    tracker: ConversationTracker,
    model: Arc<dyn LanguageModel>,
    settings: ResponderSettings,
    respond_to_all: AtomicBool,
    enabled_users: RwLock<HashSet<i64>>,
}

impl AutoResponder {
    pub fn new(model: Arc<dyn LanguageModel>, settings: ResponderSettings) -> Self {
        Self::with_tracker(model, settings, ConversationTracker::new())
    }

    pub fn with_tracker(
        model: Arc<dyn LanguageModel>,
        settings: ResponderSettings,
        tracker: ConversationTracker,
    ) -> Self {
        Self {
            tracker,
            model,
            settings,
            respond_to_all: AtomicBool::new(false),
            enabled_users: RwLock::new(HashSet::new()),
        }
    }

    pub fn tracker(&self) -> &ConversationTracker {
        &self.tracker
    }

    pub fn settings(&self) -> &ResponderSettings {
        &self.settings
    }

    /// Produces a reply to `text` from `user_id`.
    ///
    /// Never fails; model errors become the trouble text.
    pub async fn process_message(&self, text: &str, user_id: i64, kb: &KnowledgeBase) -> ProcessedReply {
        self.process_message_at(text, user_id, kb, Utc::now()).await
    }

    /// Like [`process_message`](Self::process_message) with an explicit clock.
    pub async fn process_message_at(
        &self,
        text: &str,
        user_id: i64,
        kb: &KnowledgeBase,
        now: DateTime<Utc>,
    ) -> ProcessedReply {
        if self.tracker.touch(user_id, now) {
            return ProcessedReply::new(self.settings.welcome(), ReplySource::Welcome);
        }

        if let Some(answer) = find_answer(text, kb) {
            return ProcessedReply::new(answer, ReplySource::KnowledgeBase);
        }

        let system = self
            .settings
            .system_prompt(kb, &now.format("%Y-%m-%d").to_string());

        match self.model.generate(&system, text).await {
            Ok(output) => {
                let output = output.trim();
                if is_deflection(output) {
                    ProcessedReply::new(self.settings.deflection(), ReplySource::Ollama)
                } else {
                    ProcessedReply::new(output, ReplySource::Ollama)
                }
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Error processing message with Ollama");
                ProcessedReply::new(self.settings.trouble(), ReplySource::Error)
            }
        }
    }

    /// Whether automatic replies are on for `user_id`.
    pub fn should_respond(&self, user_id: i64) -> bool {
        self.respond_to_all()
            || self
                .enabled_users
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .contains(&user_id)
    }

    pub fn respond_to_all(&self) -> bool {
        self.respond_to_all.load(Ordering::SeqCst)
    }

    pub fn set_respond_to_all(&self, enabled: bool) {
        self.respond_to_all.store(enabled, Ordering::SeqCst);
        info!(enabled, "Auto-respond for all users updated");
    }

    pub fn enable_user(&self, user_id: i64) {
        self.enabled_users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id);
        info!(user_id = %user_id, "Auto-respond enabled");
    }

    pub fn disable_user(&self, user_id: i64) {
        self.enabled_users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&user_id);
        info!(user_id = %user_id, "Auto-respond disabled");
    }

    /// Users with auto-respond switched on individually, ascending.
    pub fn enabled_users(&self) -> Vec<i64> {
        let mut users: Vec<i64> = self
            .enabled_users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .copied()
            .collect();
        users.sort_unstable();
        users
    }

    /// Replies to an incoming message if auto-respond covers its sender.
    ///
    /// Returns the reply that was produced, even when delivery failed.
    pub async fn handle_incoming(
        &self,
        user_id: i64,
        text: &str,
        kb: &KnowledgeBase,
        sender: &dyn ReplySender,
    ) -> Option<ProcessedReply> {
        if !self.should_respond(user_id) {
            return None;
        }

        let reply = self.process_message(text, user_id, kb).await;
        match sender.send_text(user_id, &reply.response).await {
            Ok(()) => info!(user_id = %user_id, source = %reply.source, "Auto-responded"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to deliver auto-reply"),
        }
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryError;
    use crate::ollama::OllamaError;
    use chrono::TimeZone;
    use relay_models::KnowledgeEntry;
    use std::sync::Mutex;

    struct FixedModel(&'static str);

    #[async_trait::async_trait]
    impl LanguageModel for FixedModel {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, OllamaError> {
            Ok(self.0.to_string())
        }
    }

    struct RecordingModel(Mutex<Vec<(String, String)>>);

    #[async_trait::async_trait]
    impl LanguageModel for RecordingModel {
        async fn generate(&self, system: &str, prompt: &str) -> Result<String, OllamaError> {
            self.0
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok("  recorded  ".to_string())
        }
    }

    struct FailingModel;

    #[async_trait::async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, OllamaError> {
            Err(OllamaError::Api("offline".into()))
        }
    }

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(i64, String)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ReplySender for Outbox {
        async fn send_text(&self, user_id: i64, text: &str) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::NotConnected);
            }
            self.sent.lock().unwrap().push((user_id, text.to_string()));
            Ok(())
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase {
            entries: vec![KnowledgeEntry::new(
                "Setup takes five minutes.",
                vec!["how long does setup take".into()],
                vec!["setup".into()],
            )],
        }
    }

    fn settings() -> ResponderSettings {
        ResponderSettings::new("Acme").with_support_url("https://acme.example")
    }

    fn responder(model: impl LanguageModel + 'static) -> AutoResponder {
        AutoResponder::new(Arc::new(model), settings())
    }

    #[tokio::test]
    async fn test_first_message_gets_welcome() {
        let r = responder(FixedModel("unused"));
        let reply = r.process_message_at("how long does setup take", 7, &kb(), at(0)).await;
        assert_eq!(reply.source, ReplySource::Welcome);
        assert_eq!(reply.response, settings().welcome());
    }

    #[tokio::test]
    async fn test_knowledge_base_answer() {
        let r = responder(FixedModel("unused"));
        r.process_message_at("hi", 7, &kb(), at(0)).await;

        let reply = r.process_message_at("How long does setup take?", 7, &kb(), at(10)).await;
        assert_eq!(reply.source, ReplySource::KnowledgeBase);
        assert_eq!(reply.response, "Setup takes five minutes.");
    }

    #[tokio::test]
    async fn test_model_answer_is_trimmed_and_prompted() {
        let model = Arc::new(RecordingModel(Mutex::new(Vec::new())));
        let r = AutoResponder::new(model.clone(), settings());
        r.process_message_at("hi", 7, &kb(), at(0)).await;

        let reply = r.process_message_at("what colour is it", 7, &kb(), at(10)).await;
        assert_eq!(reply.source, ReplySource::Ollama);
        assert_eq!(reply.response, "recorded");

        let calls = model.0.lock().unwrap();
        let (system, prompt) = &calls[0];
        assert_eq!(prompt, "what colour is it");
        assert!(system.contains("Today is 2024-03-01"));
        assert!(system.contains("Question patterns: how long does setup take\nAnswer: Setup takes five minutes."));
        assert!(system.contains("https://acme.example"));
    }

    #[tokio::test]
    async fn test_model_deflection_is_replaced() {
        let r = responder(FixedModel("As an AI language model, I cannot say."));
        r.process_message_at("hi", 7, &kb(), at(0)).await;

        let reply = r.process_message_at("tell me a joke", 7, &kb(), at(10)).await;
        assert_eq!(reply.source, ReplySource::Ollama);
        assert_eq!(reply.response, settings().deflection());
    }

    #[tokio::test]
    async fn test_model_error_becomes_trouble_text() {
        let r = responder(FailingModel);
        r.process_message_at("hi", 7, &kb(), at(0)).await;

        let reply = r.process_message_at("anything else", 7, &kb(), at(10)).await;
        assert_eq!(reply.source, ReplySource::Error);
        assert_eq!(reply.response, settings().trouble());
    }

    #[tokio::test]
    async fn test_conversation_timeout_welcomes_again() {
        let r = responder(FixedModel("fine"));
        r.process_message_at("hi", 7, &kb(), at(0)).await;
        let reply = r.process_message_at("hi again", 7, &kb(), at(3601)).await;
        assert_eq!(reply.source, ReplySource::Welcome);
    }

    #[test]
    fn test_toggles() {
        let r = responder(FixedModel(""));
        assert!(!r.should_respond(1));

        r.enable_user(1);
        assert!(r.should_respond(1));
        assert!(!r.should_respond(2));

        r.set_respond_to_all(true);
        assert!(r.should_respond(2));

        r.set_respond_to_all(false);
        r.disable_user(1);
        assert!(!r.should_respond(1));
        assert!(r.enabled_users().is_empty());
    }

    #[tokio::test]
    async fn test_handle_incoming_skips_disabled_users() {
        let r = responder(FixedModel("ok"));
        let outbox = Outbox::default();

        assert!(r.handle_incoming(5, "hi", &kb(), &outbox).await.is_none());
        assert!(outbox.sent.lock().unwrap().is_empty());
        assert!(r.tracker().is_empty());
    }

    #[tokio::test]
    async fn test_handle_incoming_delivers_reply() {
        let r = responder(FixedModel("ok"));
        r.enable_user(5);
        let outbox = Outbox::default();

        let reply = r.handle_incoming(5, "hi", &kb(), &outbox).await.unwrap();
        assert_eq!(reply.source, ReplySource::Welcome);
        assert_eq!(outbox.sent.lock().unwrap().as_slice(), &[(5, settings().welcome())]);
    }

    #[tokio::test]
    async fn test_handle_incoming_delivery_failure_still_returns_reply() {
        let r = responder(FixedModel("ok"));
        r.set_respond_to_all(true);
        let outbox = Outbox {
            fail: true,
            ..Default::default()
        };

        assert!(r.handle_incoming(5, "hi", &kb(), &outbox).await.is_some());
    }

    #[test]
    fn test_custom_welcome_and_no_support_url() {
        let s = ResponderSettings::new("Acme").with_welcome_message("Hello there");
        assert_eq!(s.welcome(), "Hello there");
        assert_eq!(s.deflection(), "I'm made to assist with Acme.");
        assert!(!s.trouble().contains("visit"));
    }
}
