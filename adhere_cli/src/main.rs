use adhere_core::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dosetrack")]
#[command(about = "Medication adherence tracking system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and open a session
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        /// Account role (patient, caregiver, clinician)
        #[arg(long, default_value = "patient")]
        role: String,
    },

    /// Log in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Close the current session
    Logout,

    /// Show the active session user
    Whoami,

    /// Update the active user's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u8>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        emergency_contact: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },

    /// Manage medications
    Med {
        #[command(subcommand)]
        command: MedCommands,
    },

    /// Manage reminders
    Remind {
        #[command(subcommand)]
        command: RemindCommands,
    },

    /// Record a dose taken
    Dose {
        /// Medication id the dose belongs to
        #[arg(long)]
        medication: Option<String>,
    },

    /// Log and review symptoms
    Symptom {
        #[command(subcommand)]
        command: SymptomCommands,
    },

    /// Advice tickets
    Ticket {
        #[command(subcommand)]
        command: TicketCommands,
    },

    /// Notifications
    Notify {
        #[command(subcommand)]
        command: NotifyCommands,
    },

    /// Medication precautions
    Precaution {
        #[command(subcommand)]
        command: PrecautionCommands,
    },

    /// Clinician patient roster
    Clinician {
        #[command(subcommand)]
        command: ClinicianCommands,
    },

    /// Roll up the dose journal to CSV
    Export {
        /// Clean up processed journal files after export
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum MedCommands {
    /// Add a medication
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        dosage: String,
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Time of day, e.g. 08:00
        #[arg(long, default_value = "08:00")]
        schedule: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// List medications
    List,
    /// Edit a medication (only the given fields change)
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        dosage: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        schedule: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a medication (reminders and precautions are kept)
    Rm { id: String },
    /// Pause a medication
    Pause { id: String },
    /// Resume a paused medication
    Resume { id: String },
}

#[derive(Subcommand)]
enum RemindCommands {
    /// Add a reminder for a medication
    Add {
        /// Medication id
        #[arg(long)]
        medication: String,
        /// Time of day, e.g. 08:00
        #[arg(long)]
        time: String,
        /// Comma-separated day abbreviations, e.g. mon,wed,fri
        #[arg(long, default_value = "mon,tue,wed,thu,fri,sat,sun")]
        days: String,
    },
    /// List reminders
    List,
    /// Remove a reminder
    Rm { id: String },
    /// Enable or disable a reminder
    Toggle { id: String },
    /// Snooze a reminder
    Snooze {
        id: String,
        #[arg(long, default_value_t = 10)]
        minutes: u32,
    },
}

#[derive(Subcommand)]
enum SymptomCommands {
    /// Log a symptom
    Log {
        #[arg(long)]
        name: String,
        /// mild, moderate or severe
        #[arg(long, default_value = "mild")]
        severity: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List logged symptoms
    List,
}

#[derive(Subcommand)]
enum TicketCommands {
    /// Open an advice ticket
    Open {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// List visible tickets
    List,
    /// Show one ticket's thread
    Show { id: String },
    /// Reply to a ticket
    Reply {
        id: String,
        #[arg(long)]
        message: String,
    },
    /// Resolve a ticket with a response
    Resolve {
        id: String,
        #[arg(long)]
        response: String,
    },
}

#[derive(Subcommand)]
enum NotifyCommands {
    /// List notifications
    List,
    /// Mark a notification read
    Read { id: String },
    /// Acknowledge a notification (implies read)
    Ack { id: String },
    /// Mark everything read
    ReadAll,
    /// Delete all notifications
    Clear,
}

#[derive(Subcommand)]
enum PrecautionCommands {
    /// List recorded precautions
    List {
        /// Only precautions for this medication id
        #[arg(long)]
        medication: Option<String>,
    },
    /// Add a precaution to a medication
    Add {
        /// Medication id
        #[arg(long)]
        medication: String,
        /// food, activity or other
        #[arg(long, default_value = "other")]
        kind: String,
        #[arg(long)]
        description: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        severity: String,
    },
    /// Look up a medicine in the bundled reference dataset
    Lookup { name: String },
}

#[derive(Subcommand)]
enum ClinicianCommands {
    /// List the patient roster
    Patients,
    /// Show a patient's timeline
    Events { patient_id: String },
    /// Show a patient's notes
    Notes { patient_id: String },
    /// Attach a note to a patient
    Note {
        patient_id: String,
        #[arg(long)]
        text: String,
        /// observation, treatment_plan, follow_up or general
        #[arg(long, default_value = "general")]
        category: String,
    },
    /// Update a patient's risk level
    Risk {
        patient_id: String,
        /// low, medium or high
        #[arg(long)]
        level: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    adhere_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;

    let backend: Arc<dyn Backend> = Arc::new(FileBackend::new(&data_dir));

    match cli.command {
        Commands::Signup {
            email,
            password,
            name,
            role,
        } => cmd_signup(backend, &email, &password, &name, &role),
        Commands::Login { email, password } => cmd_login(backend, &email, &password),
        Commands::Logout => cmd_logout(backend),
        Commands::Whoami => cmd_whoami(backend),
        Commands::Profile {
            name,
            age,
            contact,
            emergency_contact,
            timezone,
            language,
        } => cmd_profile(
            backend,
            ProfilePatch {
                name,
                age,
                contact,
                emergency_contact,
                timezone,
                language,
            },
        ),
        Commands::Med { command } => cmd_med(backend, command),
        Commands::Remind { command } => cmd_remind(backend, command),
        Commands::Dose { medication } => cmd_dose(backend, &data_dir, medication),
        Commands::Symptom { command } => cmd_symptom(backend, command),
        Commands::Ticket { command } => cmd_ticket(backend, command),
        Commands::Notify { command } => cmd_notify(backend, command),
        Commands::Precaution { command } => cmd_precaution(backend, command),
        Commands::Clinician { command } => {
            cmd_clinician(backend, command, config.demo.seed_clinician_data)
        }
        Commands::Export { cleanup } => cmd_export(&data_dir, cleanup),
    }
}

fn require_user(backend: &Arc<dyn Backend>) -> Result<User> {
    IdentityStore::new(backend.clone())
        .current_user()
        .ok_or_else(|| Error::Auth("Not logged in - run `dosetrack login` first".into()))
}

fn cmd_signup(
    backend: Arc<dyn Backend>,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> Result<()> {
    let role = UserRole::parse(role)
        .ok_or_else(|| Error::Validation(format!("Unknown role: {}", role)))?;

    let identity = IdentityStore::new(backend.clone());
    let user = identity.signup(email, password, name, role)?;

    println!("✓ Account created for {}", user.email);
    println!("  Welcome, {}!", user.name);

    // One-time getting-started tour for new patients
    let onboarding = OnboardingStore::new(backend);
    if user.role == UserRole::Patient && !onboarding.is_completed(&user.id) {
        println!();
        println!("  Getting started:");
        println!("    dosetrack med add --name <name> --dosage <dose>   add a medication");
        println!("    dosetrack remind add --medication <id> --time <t> set up a reminder");
        println!("    dosetrack dose                                    record a dose taken");
        onboarding.complete(&user.id)?;
    }
    Ok(())
}

fn cmd_login(backend: Arc<dyn Backend>, email: &str, password: &str) -> Result<()> {
    let identity = IdentityStore::new(backend);
    let user = identity.login(email, password)?;

    println!("✓ Logged in as {}", user.email);
    Ok(())
}

fn cmd_logout(backend: Arc<dyn Backend>) -> Result<()> {
    IdentityStore::new(backend).logout()?;
    println!("✓ Logged out");
    Ok(())
}

fn cmd_whoami(backend: Arc<dyn Backend>) -> Result<()> {
    match IdentityStore::new(backend).current_user() {
        Some(user) => {
            println!("{} <{}> [{:?}]", user.name, user.email, user.role);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

fn cmd_profile(backend: Arc<dyn Backend>, patch: ProfilePatch) -> Result<()> {
    require_user(&backend)?;
    let user = IdentityStore::new(backend).update_profile(patch)?;
    println!("✓ Profile updated for {}", user.email);
    Ok(())
}

fn cmd_med(backend: Arc<dyn Backend>, command: MedCommands) -> Result<()> {
    let user = require_user(&backend)?;
    let meds = MedicationStore::new(backend.clone(), user.id.clone());

    match command {
        MedCommands::Add {
            name,
            dosage,
            frequency,
            schedule,
            start_date,
            end_date,
            notes,
            color,
        } => {
            let start_date = start_date
                .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());

            let existing = meds.list();
            let med = meds.add(NewMedication {
                name,
                dosage,
                frequency,
                schedule,
                start_date,
                end_date,
                notes,
                color,
                interactions: vec![],
            })?;

            println!("✓ Added {} ({})", med.name, med.id);

            // Check the new medication against the rest of the cabinet
            let notifications = NotificationStore::new(backend, user.id);
            for other in &existing {
                if let Some(warning) = interactions_between(&med.name, &other.name) {
                    println!("  ⚠ Interaction with {}: {}", other.name, warning);
                    notifications.add(NewNotification {
                        kind: NotificationKind::InteractionAlert,
                        title: format!("Interaction: {} + {}", med.name, other.name),
                        message: warning.to_string(),
                        severity: AlertSeverity::High,
                        action_url: None,
                        metadata: Some(NotificationMeta {
                            medication_id: Some(med.id.clone()),
                            medication_name: Some(med.name.clone()),
                            ..Default::default()
                        }),
                    })?;
                }
            }
            Ok(())
        }

        MedCommands::List => {
            let list = meds.list();
            if list.is_empty() {
                println!("No medications.");
                return Ok(());
            }
            for med in list {
                let paused = if med.is_paused { "  [paused]" } else { "" };
                println!(
                    "{}  {} {} ({} at {}){}",
                    med.id, med.name, med.dosage, med.frequency, med.schedule, paused
                );
            }
            Ok(())
        }

        MedCommands::Edit {
            id,
            name,
            dosage,
            frequency,
            schedule,
            notes,
            color,
        } => {
            let med = meds.update(
                &id,
                MedicationPatch {
                    name,
                    dosage,
                    frequency,
                    schedule,
                    end_date: None,
                    notes,
                    color,
                    is_paused: None,
                },
            )?;
            println!("✓ Updated {} ({} at {})", med.name, med.dosage, med.schedule);
            Ok(())
        }

        MedCommands::Rm { id } => {
            meds.delete(&id)?;
            println!("✓ Removed medication {}", id);
            println!("  Reminders and precautions for it were kept.");
            Ok(())
        }

        MedCommands::Pause { id } => {
            let med = meds.pause(&id)?;
            println!("✓ Paused {}", med.name);
            Ok(())
        }

        MedCommands::Resume { id } => {
            let med = meds.resume(&id)?;
            println!("✓ Resumed {}", med.name);
            Ok(())
        }
    }
}

fn cmd_remind(backend: Arc<dyn Backend>, command: RemindCommands) -> Result<()> {
    let user = require_user(&backend)?;
    let reminders = ReminderStore::new(backend.clone(), user.id.clone());

    match command {
        RemindCommands::Add {
            medication,
            time,
            days,
        } => {
            // The medication may already be deleted; keep the name best-effort
            let meds = MedicationStore::new(backend, user.id);
            let medication_name = meds
                .get(&medication)
                .map(|m| m.name)
                .unwrap_or_else(|| medication.clone());

            let reminder = reminders.add(NewReminder {
                medication_id: medication,
                medication_name,
                time,
                days: days.split(',').map(|d| d.trim().to_lowercase()).collect(),
            })?;

            println!(
                "✓ Reminder {} set for {} at {}",
                reminder.id, reminder.medication_name, reminder.time
            );
            Ok(())
        }

        RemindCommands::List => {
            let list = reminders.list();
            if list.is_empty() {
                println!("No reminders.");
                return Ok(());
            }
            for reminder in list {
                let state = if reminder.is_enabled { "on" } else { "off" };
                println!(
                    "{}  {} at {} ({}) [{}]",
                    reminder.id,
                    reminder.medication_name,
                    reminder.time,
                    reminder.days.join(","),
                    state
                );
            }
            Ok(())
        }

        RemindCommands::Rm { id } => {
            reminders.delete(&id)?;
            println!("✓ Removed reminder {}", id);
            Ok(())
        }

        RemindCommands::Toggle { id } => {
            let reminder = reminders.toggle(&id)?;
            let state = if reminder.is_enabled {
                "enabled"
            } else {
                "disabled"
            };
            println!("✓ Reminder {} {}", reminder.id, state);
            Ok(())
        }

        RemindCommands::Snooze { id, minutes } => {
            let reminder = reminders.snooze(&id, minutes)?;
            println!("✓ Snoozed {} for {} minutes", reminder.id, minutes);
            Ok(())
        }
    }
}

fn cmd_dose(
    backend: Arc<dyn Backend>,
    data_dir: &Path,
    medication_id: Option<String>,
) -> Result<()> {
    let user = require_user(&backend)?;

    let medication = match medication_id {
        Some(ref id) => {
            let meds = MedicationStore::new(backend.clone(), user.id.clone());
            Some(
                meds.get(id)
                    .ok_or_else(|| Error::NotFound(format!("medication {}", id)))?,
            )
        }
        None => None,
    };

    let gamification = GamificationStore::new(backend, user.id.clone());
    let outcome = gamification.record_dose_taken()?;

    let mut journal = JsonlJournal::new(data_dir.join("journal").join("dose_events.jsonl"));
    journal.append(&DoseEvent {
        id: uuid::Uuid::new_v4(),
        user_id: user.id,
        medication_id: medication.as_ref().map(|m| m.id.clone()),
        medication_name: medication.as_ref().map(|m| m.name.clone()),
        taken_at: chrono::Utc::now(),
    })?;

    println!("✓ Dose recorded!");
    println!(
        "  Streak: {} (longest {})",
        outcome.streak.current_streak, outcome.streak.longest_streak
    );
    println!("  Total doses: {}", outcome.streak.total_doses_taken);

    for achievement in &outcome.unlocked {
        println!(
            "  {} Achievement unlocked: {}",
            achievement.icon, achievement.name
        );
    }

    if outcome.streak.current_streak > 0 && outcome.streak.current_streak % 7 == 0 {
        println!(
            "  🔥 {}-day streak! Keep it up!",
            outcome.streak.current_streak
        );
    }

    Ok(())
}

fn cmd_symptom(backend: Arc<dyn Backend>, command: SymptomCommands) -> Result<()> {
    let user = require_user(&backend)?;
    let store = SymptomStore::new(backend, user);

    match command {
        SymptomCommands::Log {
            name,
            severity,
            description,
        } => {
            let severity = SymptomSeverity::parse(&severity)
                .ok_or_else(|| Error::Validation(format!("Unknown severity: {}", severity)))?;

            let symptom = store.add_symptom(NewSymptom {
                symptom_name: name,
                severity,
                description,
                related_medications: vec![],
                vital_signs: None,
            })?;

            println!("✓ Logged {} ({:?})", symptom.symptom_name, symptom.severity);
            Ok(())
        }

        SymptomCommands::List => {
            let list = store.symptoms();
            if list.is_empty() {
                println!("No symptoms logged.");
                return Ok(());
            }
            for symptom in list {
                println!(
                    "{}  {} [{:?}] {}",
                    symptom.timestamp.format("%Y-%m-%d %H:%M"),
                    symptom.symptom_name,
                    symptom.severity,
                    symptom.description
                );
            }
            Ok(())
        }
    }
}

fn cmd_ticket(backend: Arc<dyn Backend>, command: TicketCommands) -> Result<()> {
    let user = require_user(&backend)?;
    let sender = if user.role == UserRole::Clinician {
        MessageSender::Clinician
    } else {
        MessageSender::Patient
    };
    let store = SymptomStore::new(backend.clone(), user.clone());

    match command {
        TicketCommands::Open {
            subject,
            description,
            priority,
        } => {
            let priority = TicketPriority::parse(&priority)
                .ok_or_else(|| Error::Validation(format!("Unknown priority: {}", priority)))?;

            let ticket = store.create_ticket(NewTicket {
                subject,
                description,
                symptoms: vec![],
                medications: vec![],
                priority,
            })?;

            println!("✓ Opened ticket {} ({})", ticket.id, ticket.subject);
            if let Some(suggestion) = &ticket.ai_suggestion {
                println!("  {}", suggestion);
            }
            Ok(())
        }

        TicketCommands::List => {
            let list = store.tickets();
            if list.is_empty() {
                println!("No tickets.");
                return Ok(());
            }
            for ticket in list {
                println!(
                    "{}  [{:?}] {} ({} message(s))",
                    ticket.id,
                    ticket.status,
                    ticket.subject,
                    ticket.thread.len()
                );
            }
            Ok(())
        }

        TicketCommands::Show { id } => {
            let ticket = store
                .get_ticket(&id)
                .ok_or_else(|| Error::NotFound(format!("ticket {}", id)))?;

            println!("{} [{:?}] {}", ticket.id, ticket.status, ticket.subject);
            if let Some(suggestion) = &ticket.ai_suggestion {
                println!("  {}", suggestion);
            }
            for message in &ticket.thread {
                println!(
                    "  {} {} ({:?}): {}",
                    message.timestamp.format("%Y-%m-%d %H:%M"),
                    message.sender_name,
                    message.sender,
                    message.message
                );
            }
            if let Some(response) = &ticket.clinician_response {
                println!("  Response: {}", response);
            }
            Ok(())
        }

        TicketCommands::Reply { id, message } => {
            let ticket = store.add_reply(&id, &message, sender)?;
            println!("✓ Reply added to {} [{:?}]", ticket.id, ticket.status);

            // A clinician reply surfaces as advice for the ticket owner
            if sender == MessageSender::Clinician {
                NotificationStore::new(backend, ticket.user_id.clone()).add(NewNotification {
                    kind: NotificationKind::DoctorAdvice,
                    title: format!("Reply on: {}", ticket.subject),
                    message,
                    severity: AlertSeverity::Medium,
                    action_url: None,
                    metadata: Some(NotificationMeta {
                        ticket_id: Some(ticket.id),
                        ..Default::default()
                    }),
                })?;
            }
            Ok(())
        }

        TicketCommands::Resolve { id, response } => {
            let ticket = store.update_status(&id, TicketStatus::Resolved, Some(response))?;
            println!("✓ Resolved ticket {}", ticket.id);
            Ok(())
        }
    }
}

fn cmd_notify(backend: Arc<dyn Backend>, command: NotifyCommands) -> Result<()> {
    let user = require_user(&backend)?;
    let store = NotificationStore::new(backend, user.id);

    match command {
        NotifyCommands::List => {
            let list = store.list();
            if list.is_empty() {
                println!("No notifications.");
                return Ok(());
            }
            println!("{} unread", store.unread_count());
            for n in list {
                let mut flags = String::new();
                if !n.is_read {
                    flags.push_str(" [unread]");
                }
                if n.is_acknowledged {
                    flags.push_str(" [ack]");
                }
                println!(
                    "{}  [{:?}/{:?}] {}: {}{}",
                    n.id, n.kind, n.severity, n.title, n.message, flags
                );
            }
            Ok(())
        }

        NotifyCommands::Read { id } => {
            store.mark_read(&id)?;
            println!("✓ Marked {} read", id);
            Ok(())
        }

        NotifyCommands::Ack { id } => {
            store.acknowledge(&id)?;
            println!("✓ Acknowledged {}", id);
            Ok(())
        }

        NotifyCommands::ReadAll => {
            store.mark_all_read()?;
            println!("✓ All notifications marked read");
            Ok(())
        }

        NotifyCommands::Clear => {
            store.clear()?;
            println!("✓ Notifications cleared");
            Ok(())
        }
    }
}

fn cmd_precaution(backend: Arc<dyn Backend>, command: PrecautionCommands) -> Result<()> {
    match command {
        PrecautionCommands::List { medication } => {
            let user = require_user(&backend)?;
            let meds = MedicationStore::new(backend.clone(), user.id);
            let store = PrecautionStore::new(backend);

            // First access seeds one default per existing medication
            let seeded = store.seed_defaults(&meds.list())?;
            if seeded > 0 {
                println!("Seeded {} default precaution(s).", seeded);
            }

            let list = match medication {
                Some(id) => store.for_medication(&id),
                None => store.list(),
            };
            if list.is_empty() {
                println!("No precautions.");
                return Ok(());
            }
            for p in list {
                println!(
                    "{}  {} [{:?}/{:?}] {}",
                    p.id, p.medication_name, p.kind, p.severity, p.description
                );
            }
            Ok(())
        }

        PrecautionCommands::Add {
            medication,
            kind,
            description,
            severity,
        } => {
            let user = require_user(&backend)?;
            let kind = PrecautionKind::parse(&kind)
                .ok_or_else(|| Error::Validation(format!("Unknown precaution kind: {}", kind)))?;
            let severity = AlertSeverity::parse(&severity)
                .ok_or_else(|| Error::Validation(format!("Unknown severity: {}", severity)))?;

            let meds = MedicationStore::new(backend.clone(), user.id);
            let medication_name = meds
                .get(&medication)
                .map(|m| m.name)
                .unwrap_or_else(|| medication.clone());

            let store = PrecautionStore::new(backend);
            let precaution = store.add(NewPrecaution {
                medication_id: medication,
                medication_name,
                kind,
                description,
                severity,
            })?;

            println!("✓ Added precaution {} for {}", precaution.id, precaution.medication_name);
            Ok(())
        }

        PrecautionCommands::Lookup { name } => {
            let record = lookup_medicine(&name)
                .ok_or_else(|| Error::NotFound(format!("no reference entry for {}", name)))?;

            println!("{} ({})", record.name, record.generic_name);
            println!("  Precautions:");
            for p in &record.precautions {
                println!("    [{:?}/{:?}] {}", p.kind, p.severity, p.description);
            }
            if !record.interactions.is_empty() {
                println!("  Interactions:");
                for i in &record.interactions {
                    println!("    - {}: {}", i.with, i.warning);
                }
            }
            Ok(())
        }
    }
}

fn cmd_clinician(
    backend: Arc<dyn Backend>,
    command: ClinicianCommands,
    seed_demo_data: bool,
) -> Result<()> {
    let user = require_user(&backend)?;
    let store = ClinicianStore::new(backend, user, seed_demo_data);

    match command {
        ClinicianCommands::Patients => {
            let patients = store.patients();
            if patients.is_empty() {
                println!("No patients.");
                return Ok(());
            }
            for p in patients {
                println!(
                    "{}  {} ({}) adherence {}% [{:?}] {}",
                    p.id,
                    p.name,
                    p.age,
                    p.adherence_rate,
                    p.risk_level,
                    p.conditions.join(", ")
                );
            }
            Ok(())
        }

        ClinicianCommands::Events { patient_id } => {
            let events = store.patient_events(&patient_id);
            if events.is_empty() {
                println!("No events.");
                return Ok(());
            }
            for e in events {
                println!(
                    "{}  [{:?}] {}",
                    e.timestamp.format("%Y-%m-%d %H:%M"),
                    e.kind,
                    e.details
                );
            }
            Ok(())
        }

        ClinicianCommands::Notes { patient_id } => {
            let notes = store.patient_notes(&patient_id);
            if notes.is_empty() {
                println!("No notes.");
                return Ok(());
            }
            for n in notes {
                println!(
                    "{}  [{:?}] {}: {}",
                    n.timestamp.format("%Y-%m-%d %H:%M"),
                    n.category,
                    n.clinician_name,
                    n.note
                );
            }
            Ok(())
        }

        ClinicianCommands::Note {
            patient_id,
            text,
            category,
        } => {
            let category = NoteCategory::parse(&category)
                .ok_or_else(|| Error::Validation(format!("Unknown note category: {}", category)))?;

            let note = store.add_note(NewNote {
                patient_id,
                note: text,
                category,
            })?;
            println!("✓ Note {} added for {}", note.id, note.patient_id);
            Ok(())
        }

        ClinicianCommands::Risk { patient_id, level } => {
            let level = RiskLevel::parse(&level)
                .ok_or_else(|| Error::Validation(format!("Unknown risk level: {}", level)))?;

            let patient = store.update_patient_risk(&patient_id, level)?;
            println!("✓ {} risk set to {:?}", patient.name, patient.risk_level);
            Ok(())
        }
    }
}

fn cmd_export(data_dir: &Path, cleanup: bool) -> Result<()> {
    let journal_dir = data_dir.join("journal");
    let journal_path = journal_dir.join("dose_events.jsonl");
    let csv_path = data_dir.join("dose_history.csv");

    if journal_path.exists() {
        let count = adhere_core::journal::export_to_csv(&journal_path, &csv_path)?;
        println!("✓ Exported {} dose events to CSV", count);
        println!("  CSV: {}", csv_path.display());
    } else {
        println!("No dose journal found - nothing to export.");
    }

    if cleanup {
        let cleaned = adhere_core::journal::cleanup_processed(&journal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}
