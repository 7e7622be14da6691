//! Symptom log and advice-ticket threads.
//!
//! Symptoms are an append-only log. Tickets carry an ordered message thread;
//! creating a ticket seeds the thread with the patient's description and a
//! canned AI suggestion, and a clinician reply moves an open ticket to
//! in-progress. Resolution is a separate explicit transition.

use crate::repo::{generate_id, Collection, Owned, Record};
use crate::storage::Backend;
use crate::{
    AdviceTicket, Error, MessageSender, Result, Symptom, SymptomSeverity, TicketMessage,
    TicketPriority, TicketStatus, User, UserRole, VitalSigns,
};
use chrono::Utc;
use std::sync::Arc;

const SYMPTOMS_KEY: &str = "symptoms";
const TICKETS_KEY: &str = "tickets";

/// Symptom names offered for quick selection
pub const COMMON_SYMPTOMS: &[&str] = &[
    "Headache",
    "Dizziness",
    "Nausea",
    "Fatigue",
    "Fever",
    "Chest Pain",
    "Shortness of Breath",
    "Abdominal Pain",
    "Rash",
    "Muscle Pain",
    "Joint Pain",
    "Insomnia",
    "Anxiety",
    "Depression",
];

const AI_SUGGESTION: &str = "AI Suggestion: Based on your symptoms and medication history, \
consider monitoring these symptoms closely. If they persist or worsen, contact your \
healthcare provider immediately.";

impl Record for Symptom {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Owned for Symptom {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Record for AdviceTicket {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Owned for AdviceTicket {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Fields supplied when logging a symptom
#[derive(Clone, Debug)]
pub struct NewSymptom {
    pub symptom_name: String,
    pub severity: SymptomSeverity,
    pub description: String,
    pub related_medications: Vec<String>,
    pub vital_signs: Option<VitalSigns>,
}

/// Fields supplied when opening an advice ticket
#[derive(Clone, Debug)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub medications: Vec<String>,
    pub priority: TicketPriority,
}

/// Owns symptom logs and advice-ticket threads for the active user
pub struct SymptomStore {
    backend: Arc<dyn Backend>,
    user: User,
}

impl SymptomStore {
    pub fn new(backend: Arc<dyn Backend>, user: User) -> Self {
        Self { backend, user }
    }

    fn symptom_collection(&self) -> Collection<Symptom> {
        Collection::new(SYMPTOMS_KEY)
    }

    fn ticket_collection(&self) -> Collection<AdviceTicket> {
        Collection::new(TICKETS_KEY)
    }

    /// The active user's symptom log, newest first
    pub fn symptoms(&self) -> Vec<Symptom> {
        self.symptom_collection()
            .for_owner(self.backend.as_ref(), &self.user.id)
    }

    /// Append a symptom to the log. Symptoms are never edited or deleted.
    pub fn add_symptom(&self, draft: NewSymptom) -> Result<Symptom> {
        let symptom = Symptom {
            id: generate_id("symptom"),
            user_id: self.user.id.clone(),
            symptom_name: draft.symptom_name,
            severity: draft.severity,
            description: draft.description,
            timestamp: Utc::now(),
            related_medications: draft.related_medications,
            vital_signs: draft.vital_signs,
        };

        let mut mine = self.symptoms();
        mine.insert(0, symptom.clone());
        self.symptom_collection()
            .replace_for_owner(self.backend.as_ref(), &self.user.id, &mine)?;

        tracing::info!("Logged symptom {}", symptom.symptom_name);
        Ok(symptom)
    }

    /// Tickets visible to the active user: their own, or every ticket for a
    /// clinician-role session.
    pub fn tickets(&self) -> Vec<AdviceTicket> {
        if self.user.role == UserRole::Clinician {
            self.ticket_collection().load(self.backend.as_ref())
        } else {
            self.ticket_collection()
                .for_owner(self.backend.as_ref(), &self.user.id)
        }
    }

    pub fn get_ticket(&self, id: &str) -> Option<AdviceTicket> {
        self.tickets().into_iter().find(|t| t.id == id)
    }

    /// Open a new ticket. The thread is seeded with the patient's description
    /// as the first message, and the canned AI suggestion is attached.
    pub fn create_ticket(&self, draft: NewTicket) -> Result<AdviceTicket> {
        let now = Utc::now();
        let ticket = AdviceTicket {
            id: generate_id("ticket"),
            user_id: self.user.id.clone(),
            patient_name: self.user.name.clone(),
            subject: draft.subject,
            description: draft.description.clone(),
            symptoms: draft.symptoms,
            medications: draft.medications,
            status: TicketStatus::Open,
            priority: draft.priority,
            timestamp: now,
            clinician_response: None,
            ai_suggestion: Some(AI_SUGGESTION.into()),
            thread: vec![TicketMessage {
                id: generate_id("msg"),
                sender: MessageSender::Patient,
                sender_name: self.user.name.clone(),
                message: draft.description,
                timestamp: now,
            }],
        };

        let mut mine = self
            .ticket_collection()
            .for_owner(self.backend.as_ref(), &self.user.id);
        mine.push(ticket.clone());
        self.ticket_collection()
            .replace_for_owner(self.backend.as_ref(), &self.user.id, &mine)?;

        tracing::info!("Opened ticket {} ({})", ticket.id, ticket.subject);
        Ok(ticket)
    }

    /// Append a reply to a ticket thread.
    ///
    /// A clinician reply moves an open ticket to in-progress; a resolved
    /// ticket keeps its status (reopening requires an explicit
    /// [`update_status`](Self::update_status)).
    pub fn add_reply(
        &self,
        ticket_id: &str,
        message: &str,
        sender: MessageSender,
    ) -> Result<AdviceTicket> {
        let sender_name = self.sender_name(sender);
        let reply = TicketMessage {
            id: generate_id("msg"),
            sender,
            sender_name,
            message: message.to_string(),
            timestamp: Utc::now(),
        };

        self.ticket_collection()
            .update_by_id(self.backend.as_ref(), ticket_id, |ticket| {
                ticket.thread.push(reply);
                if sender == MessageSender::Clinician && ticket.status != TicketStatus::Resolved {
                    ticket.status = TicketStatus::InProgress;
                }
            })?
            .ok_or_else(|| Error::NotFound(format!("ticket {}", ticket_id)))
    }

    /// Explicit status transition, optionally attaching a clinician response
    pub fn update_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        response: Option<String>,
    ) -> Result<AdviceTicket> {
        self.ticket_collection()
            .update_by_id(self.backend.as_ref(), ticket_id, |ticket| {
                ticket.status = status;
                if response.is_some() {
                    ticket.clinician_response = response;
                }
            })?
            .ok_or_else(|| Error::NotFound(format!("ticket {}", ticket_id)))
    }

    fn sender_name(&self, sender: MessageSender) -> String {
        match sender {
            MessageSender::Patient => self.user.name.clone(),
            MessageSender::Clinician if self.user.role == UserRole::Clinician => {
                self.user.name.clone()
            }
            MessageSender::Clinician => "Dr. Smith".into(),
            MessageSender::Ai => "AI Assistant".into(),
        }
    }
}
