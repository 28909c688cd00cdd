//! Main TUI application state and logic

use std::collections::HashSet;
use std::future::Future;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::Terminal;
use secrecy::SecretString;
use tokio::sync::mpsc;

use crate::api::{CustomExercise, ExerciseHandler, LeaderboardEntry, LeaderboardHandler};
use crate::core::config::Config;
use crate::core::counter::{ExerciseChange, ExerciseKind, OptimisticCounter, PendingChange};
use crate::core::session::{AutoLogin, Session};
use crate::error::{PeakError, Result};
use crate::tui::event::{
    counter_change, is_back_key, is_interrupt_key, is_quit_key, AppEvent, EventHandler,
};
use crate::tui::forms::{InputField, LoginForm, RegisterForm, SettingsForm, SettingsItem};
use crate::tui::ui;

/// Event loop tick
const TICK_RATE: Duration = Duration::from_millis(250);

/// Message type for async operation results
#[derive(Debug)]
pub enum AsyncMessage {
    // ─────────────────────────────────────────────────────────────────────────
    // Session messages
    // ─────────────────────────────────────────────────────────────────────────
    /// Stored credentials were accepted at start-up
    AutoLoginRestored { username: String },
    /// Nothing stored, show the login screen
    AutoLoginSkipped,
    /// Stored credentials were refused or unreadable
    AutoLoginFailed(String),
    /// Login succeeded
    LoggedIn { username: String, message: String },
    /// Login failed
    LoginError(String),
    /// Account created and logged in
    Registered { username: String, message: String },
    /// Registration failed
    RegisterError(String),
    /// Logout succeeded
    LoggedOut(String),
    /// Logout failed
    LogoutError(String),
    /// Account settings changed
    SettingsUpdated {
        message: String,
        new_username: Option<String>,
    },
    /// Settings change failed
    SettingsError(String),
    /// Account deleted
    AccountDeleted(String),
    /// Account deletion failed
    AccountDeleteError(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Leaderboard messages
    // ─────────────────────────────────────────────────────────────────────────
    /// Leaderboard loaded successfully
    LeaderboardLoaded(Vec<LeaderboardEntry>),
    /// Leaderboard load failed
    LeaderboardError(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Counter messages
    // ─────────────────────────────────────────────────────────────────────────
    /// Built-in count fetched (`initial` on first load, otherwise a refresh)
    CountLoaded {
        kind: ExerciseKind,
        count: i64,
        initial: bool,
    },
    /// Built-in count fetch failed
    CountLoadError {
        kind: ExerciseKind,
        error: String,
        initial: bool,
    },
    /// Server accepted a built-in counter change
    CountUpdated {
        kind: ExerciseKind,
        pending: PendingChange,
        count: i64,
    },
    /// Built-in counter change failed
    CountUpdateError {
        kind: ExerciseKind,
        pending: PendingChange,
        error: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Custom exercise messages
    // ─────────────────────────────────────────────────────────────────────────
    /// Custom exercise list loaded
    ExercisesLoaded {
        exercises: Vec<CustomExercise>,
        initial: bool,
    },
    /// Custom exercise list load failed
    ExercisesError { error: String, initial: bool },
    /// Custom exercise created
    ExerciseAdded(String),
    /// Custom exercise creation failed
    ExerciseAddError(String),
    /// Custom exercise deleted on the server
    ExerciseDeleted { id: i64, message: String },
    /// Custom exercise deletion failed
    ExerciseDeleteError(String),
    /// Server accepted a custom counter change
    CustomCountUpdated {
        id: i64,
        pending: PendingChange,
        count: i64,
    },
    /// Custom counter change failed
    CustomCountUpdateError {
        id: i64,
        pending: PendingChange,
        error: String,
    },
}

/// A background task's message, tagged with the session that started it
#[derive(Debug)]
pub struct TaskResult {
    pub generation: u64,
    pub message: AsyncMessage,
}

/// Current screen in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Connecting,
    Login,
    Register,
    Leaderboard,
    Pullups,
    Pushups,
    CustomExercises,
    CustomExerciseDetail(i64),
    Settings,
}

impl Screen {
    /// Main tabs in display order
    pub const TABS: [Screen; 5] = [
        Screen::Leaderboard,
        Screen::Pullups,
        Screen::Pushups,
        Screen::CustomExercises,
        Screen::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Connecting => "Connecting",
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::Leaderboard => "Leaderboard",
            Screen::Pullups => "Pull-ups",
            Screen::Pushups => "Pushups",
            Screen::CustomExercises => "Custom Exercises",
            Screen::CustomExerciseDetail(_) => "Custom Exercise",
            Screen::Settings => "Settings",
        }
    }

    /// Index of the tab this screen belongs to
    pub fn tab_index(&self) -> Option<usize> {
        match self {
            Screen::CustomExerciseDetail(_) => Some(3),
            screen => Self::TABS.iter().position(|tab| tab == screen),
        }
    }

    /// Built-in counter shown on this screen
    pub fn counter_kind(&self) -> Option<ExerciseKind> {
        match self {
            Screen::Pushups => Some(ExerciseKind::Pushups),
            Screen::Pullups => Some(ExerciseKind::Pullups),
            _ => None,
        }
    }
}

/// List selection state
#[derive(Debug, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Total items in the list
    pub total: usize,
}

impl ListState {
    pub fn new(total: usize) -> Self {
        Self { selected: 0, total }
    }

    pub fn next(&mut self) {
        if self.total > 0 {
            self.selected = (self.selected + 1) % self.total;
        }
    }

    pub fn previous(&mut self) {
        if self.total > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.total - 1);
        }
    }

    /// Change the length, keeping the selection in range
    pub fn resize(&mut self, total: usize) {
        self.total = total;
        self.selected = self.selected.min(total.saturating_sub(1));
    }
}

/// Error popup for displaying important errors that require user acknowledgment
#[derive(Debug, Clone)]
pub struct ErrorPopup {
    /// Title of the error popup (e.g., "Login Status", "Update Failed")
    pub title: String,
    /// The full error message to display
    pub message: String,
}

/// Destructive action awaiting a yes/no answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeleteExercise { id: i64, name: String },
    DeleteAccount,
}

/// A custom exercise as shown in the list and detail screens
#[derive(Debug, Clone)]
pub struct CustomExerciseView {
    pub id: i64,
    pub name: String,
    pub counter: OptimisticCounter,
}

/// Merge a freshly fetched exercise list into the displayed one
///
/// Server order wins. Exercises with changes in flight keep their local
/// value; new exercises start from the server count.
pub fn merge_custom_exercises(
    mut current: Vec<CustomExerciseView>,
    fresh: Vec<CustomExercise>,
) -> Vec<CustomExerciseView> {
    fresh
        .into_iter()
        .map(|exercise| match current.iter().position(|v| v.id == exercise.id) {
            Some(idx) => {
                let mut view = current.swap_remove(idx);
                view.name = exercise.name;
                view.counter.refresh(exercise.count);
                view
            }
            None => CustomExerciseView {
                id: exercise.id,
                name: exercise.name,
                counter: OptimisticCounter::from_server(exercise.count),
            },
        })
        .collect()
}

/// Main TUI application
pub struct App {
    /// Whether the app is running
    pub running: bool,
    /// Current screen
    pub current_screen: Screen,
    /// Navigation history for back navigation
    pub navigation_stack: Vec<Screen>,
    /// Status message to display
    pub status_message: Option<String>,
    /// Whether to show the help overlay
    pub show_help: bool,
    /// Tick counter for spinner animation and refresh timing
    pub tick_counter: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Async communication
    // ─────────────────────────────────────────────────────────────────────────
    /// Sender for async messages (cloned into tasks)
    pub async_tx: mpsc::Sender<TaskResult>,
    /// Receiver for async messages
    pub async_rx: mpsc::Receiver<TaskResult>,
    /// Bumped when a session ends; results from older tasks are dropped
    pub generation: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    session: Session,
    /// Logged-in user, if any
    pub username: Option<String>,
    /// Server address shown on the connecting screen
    pub server: String,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,

    // ─────────────────────────────────────────────────────────────────────────
    // Leaderboard data
    // ─────────────────────────────────────────────────────────────────────────
    pub leaderboard: Vec<LeaderboardEntry>,
    pub leaderboard_loading: bool,
    /// Whether we've attempted to fetch the leaderboard
    pub leaderboard_fetched: bool,
    pub leaderboard_error: Option<String>,
    pub leaderboard_selection: ListState,

    // ─────────────────────────────────────────────────────────────────────────
    // Built-in counters
    // ─────────────────────────────────────────────────────────────────────────
    pub pushups: OptimisticCounter,
    pub pullups: OptimisticCounter,
    /// Counters with a fetch in progress
    pub counts_loading: HashSet<ExerciseKind>,
    /// Error from the last initial counter load
    pub counter_error: Option<String>,
    /// Ticks between periodic refreshes of the visible counter
    refresh_ticks: u64,
    /// Tick of the last periodic refresh
    last_refresh_tick: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Custom exercises
    // ─────────────────────────────────────────────────────────────────────────
    pub custom_exercises: Vec<CustomExerciseView>,
    pub custom_loading: bool,
    pub custom_fetched: bool,
    pub custom_error: Option<String>,
    pub custom_selection: ListState,
    /// Whether the new-exercise name input is open
    pub custom_input_mode: bool,
    pub custom_name_input: InputField,
    /// Whether an add request is in progress
    pub custom_adding: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────
    pub settings_form: SettingsForm,
    pub settings_selection: ListState,

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────
    /// Pending yes/no confirmation
    pub confirmation: Option<Confirmation>,
    /// Error popup to display (requires user dismissal)
    pub error_popup: Option<ErrorPopup>,
}

impl App {
    /// Create a new app instance
    pub fn new(config: &Config) -> Result<Self> {
        let (async_tx, async_rx) = mpsc::channel(32);
        let session = Session::from_config(config)?;
        let refresh_ticks =
            (config.refresh_interval().as_millis() / TICK_RATE.as_millis()).max(1) as u64;

        Ok(Self {
            running: true,
            current_screen: Screen::Connecting,
            navigation_stack: Vec::new(),
            status_message: None,
            show_help: false,
            tick_counter: 0,

            // Async
            async_tx,
            async_rx,
            generation: 0,

            // Session
            server: session.api().base_url().to_string(),
            session,
            username: None,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),

            // Leaderboard
            leaderboard: Vec::new(),
            leaderboard_loading: false,
            leaderboard_fetched: false,
            leaderboard_error: None,
            leaderboard_selection: ListState::default(),

            // Counters
            pushups: OptimisticCounter::default(),
            pullups: OptimisticCounter::default(),
            counts_loading: HashSet::new(),
            counter_error: None,
            refresh_ticks,
            last_refresh_tick: 0,

            // Custom exercises
            custom_exercises: Vec::new(),
            custom_loading: false,
            custom_fetched: false,
            custom_error: None,
            custom_selection: ListState::default(),
            custom_input_mode: false,
            custom_name_input: InputField::default(),
            custom_adding: false,

            // Settings
            settings_form: SettingsForm::default(),
            settings_selection: ListState::new(SettingsItem::ALL.len()),

            // Dialogs
            confirmation: None,
            error_popup: None,
        })
    }

    /// Setup terminal for TUI
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| PeakError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| PeakError::Terminal(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| PeakError::Terminal(e.to_string()))?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| PeakError::Terminal(e.to_string()))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| PeakError::Terminal(e.to_string()))?;
        terminal
            .show_cursor()
            .map_err(|e| PeakError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        Self::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut events = EventHandler::new(TICK_RATE);
        self.start_auto_login();

        // Main event loop
        while self.running {
            // Draw the UI
            terminal
                .draw(|frame| ui::render(frame, self))
                .map_err(|e| PeakError::Terminal(e.to_string()))?;

            // Check for async messages (non-blocking)
            while let Ok(result) = self.async_rx.try_recv() {
                self.receive(result);
            }

            // Handle events
            if let Some(event) = events.next().await {
                match event {
                    AppEvent::Key(key) => self.handle_key_event(key),
                    AppEvent::Resize(_, _) => {
                        // Terminal resize is handled automatically by ratatui
                    }
                    AppEvent::Tick => {
                        self.tick_counter = self.tick_counter.wrapping_add(1);
                        self.maybe_refresh_visible_counter();
                    }
                }
            }
        }

        Ok(())
    }

    /// Run a background task whose result comes back through the channel
    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = AsyncMessage> + Send + 'static,
    {
        let tx = self.async_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let message = task.await;
            let _ = tx.send(TaskResult { generation, message }).await;
        });
    }

    /// Handle a task result unless its session has ended
    fn receive(&mut self, result: TaskResult) {
        if result.generation != self.generation {
            tracing::debug!(
                generation = result.generation,
                current = self.generation,
                "Dropping result from an ended session"
            );
            return;
        }
        self.handle_async_message(result.message);
    }

    /// Handle async message from background tasks
    fn handle_async_message(&mut self, msg: AsyncMessage) {
        match msg {
            AsyncMessage::AutoLoginRestored { username } => {
                self.status_message = Some(format!("Welcome back, {}", username));
                self.username = Some(username);
                self.enter_main_tabs();
            }
            AsyncMessage::AutoLoginSkipped => {
                self.current_screen = Screen::Login;
            }
            AsyncMessage::AutoLoginFailed(err) => {
                // Not worth a popup: the user simply logs in again
                tracing::warn!(error = %err, "Automatic login failed");
                self.current_screen = Screen::Login;
            }
            AsyncMessage::LoggedIn { username, message } => {
                self.login_form = LoginForm::default();
                self.username = Some(username);
                self.enter_main_tabs();
                self.status_message = Some(message);
            }
            AsyncMessage::LoginError(err) => {
                self.login_form.submitting = false;
                self.show_error("Login Status", err);
            }
            AsyncMessage::Registered { username, message } => {
                self.register_form = RegisterForm::default();
                self.username = Some(username);
                self.enter_main_tabs();
                self.status_message = Some(message);
            }
            AsyncMessage::RegisterError(err) => {
                self.register_form.submitting = false;
                self.show_error("Registration Status", err);
            }
            AsyncMessage::LoggedOut(message) => {
                self.end_session();
                self.status_message = Some(message);
            }
            AsyncMessage::LogoutError(err) => {
                self.settings_form.submitting = false;
                self.show_error("Logout Failed", err);
            }
            AsyncMessage::SettingsUpdated {
                message,
                new_username,
            } => {
                self.settings_form.submitting = false;
                self.settings_form.clear();
                if let Some(name) = new_username {
                    self.username = Some(name);
                }
                self.status_message = Some(message);
            }
            AsyncMessage::SettingsError(err) => {
                self.settings_form.submitting = false;
                self.show_error("Settings", err);
            }
            AsyncMessage::AccountDeleted(message) => {
                self.end_session();
                self.status_message = Some(message);
            }
            AsyncMessage::AccountDeleteError(err) => {
                self.settings_form.submitting = false;
                self.show_error("Delete Account Failed", err);
            }

            AsyncMessage::LeaderboardLoaded(entries) => {
                self.leaderboard_loading = false;
                self.leaderboard_fetched = true;
                self.leaderboard_error = None;
                self.leaderboard_selection = ListState::new(entries.len());
                self.leaderboard = entries;
                if self.current_screen == Screen::Leaderboard {
                    self.status_message = Some(format!("{} athletes", self.leaderboard.len()));
                }
            }
            AsyncMessage::LeaderboardError(err) => {
                self.leaderboard_loading = false;
                self.leaderboard_fetched = true;
                self.leaderboard_error = Some(err.clone());
                self.show_error("Leaderboard", err);
            }

            AsyncMessage::CountLoaded {
                kind,
                count,
                initial,
            } => {
                self.counts_loading.remove(&kind);
                self.counter_error = None;
                let counter = self.counter_mut(kind);
                if initial && !counter.is_syncing() {
                    counter.reset(count);
                } else if !counter.refresh(count) {
                    tracing::debug!(%kind, "Refresh skipped, changes in flight");
                }
            }
            AsyncMessage::CountLoadError {
                kind,
                error,
                initial,
            } => {
                self.counts_loading.remove(&kind);
                if initial {
                    self.counter_error = Some(error.clone());
                    self.show_error("Load Failed", error);
                } else {
                    tracing::warn!(%kind, error = %error, "Counter refresh failed");
                }
            }
            AsyncMessage::CountUpdated {
                kind,
                pending,
                count,
            } => {
                self.counter_mut(kind).confirm(pending, count);
            }
            AsyncMessage::CountUpdateError {
                kind,
                pending,
                error,
            } => {
                self.counter_mut(kind).rollback(pending);
                self.show_error("Update Failed", error);
            }

            AsyncMessage::ExercisesLoaded { exercises, initial } => {
                self.custom_loading = false;
                self.custom_fetched = true;
                self.custom_error = None;
                let current = std::mem::take(&mut self.custom_exercises);
                self.custom_exercises = merge_custom_exercises(current, exercises);
                self.custom_selection.resize(self.custom_exercises.len());

                if let Screen::CustomExerciseDetail(id) = self.current_screen {
                    if self.exercise(id).is_none() {
                        self.go_back();
                        self.status_message = Some("That exercise no longer exists".to_string());
                    }
                } else if initial && self.current_screen == Screen::CustomExercises {
                    self.status_message =
                        Some(format!("{} custom exercises", self.custom_exercises.len()));
                }
            }
            AsyncMessage::ExercisesError { error, initial } => {
                self.custom_loading = false;
                self.custom_fetched = true;
                if initial {
                    self.custom_error = Some(error.clone());
                    self.show_error("Custom Exercises", error);
                } else {
                    tracing::warn!(error = %error, "Exercise refresh failed");
                }
            }
            AsyncMessage::ExerciseAdded(message) => {
                self.custom_adding = false;
                self.status_message = Some(message);
                self.fetch_custom_exercises(false);
            }
            AsyncMessage::ExerciseAddError(err) => {
                self.custom_adding = false;
                self.show_error("Add Exercise", err);
            }
            AsyncMessage::ExerciseDeleted { id, message } => {
                self.custom_exercises.retain(|e| e.id != id);
                self.custom_selection.resize(self.custom_exercises.len());
                if self.current_screen == Screen::CustomExerciseDetail(id) {
                    self.go_back();
                }
                self.status_message = Some(message);
            }
            AsyncMessage::ExerciseDeleteError(err) => {
                self.show_error("Delete Exercise", err);
            }
            AsyncMessage::CustomCountUpdated { id, pending, count } => {
                match self.exercise_mut(id) {
                    Some(view) => view.counter.confirm(pending, count),
                    None => tracing::debug!(id, "Change confirmed for a removed exercise"),
                }
            }
            AsyncMessage::CustomCountUpdateError { id, pending, error } => {
                if let Some(view) = self.exercise_mut(id) {
                    view.counter.rollback(pending);
                }
                self.show_error("Update Failed", error);
            }
        }
    }

    fn show_error(&mut self, title: &str, message: String) {
        self.error_popup = Some(ErrorPopup {
            title: title.to_string(),
            message,
        });
    }

    pub fn counter(&self, kind: ExerciseKind) -> &OptimisticCounter {
        match kind {
            ExerciseKind::Pushups => &self.pushups,
            ExerciseKind::Pullups => &self.pullups,
        }
    }

    fn counter_mut(&mut self, kind: ExerciseKind) -> &mut OptimisticCounter {
        match kind {
            ExerciseKind::Pushups => &mut self.pushups,
            ExerciseKind::Pullups => &mut self.pullups,
        }
    }

    pub fn exercise(&self, id: i64) -> Option<&CustomExerciseView> {
        self.custom_exercises.iter().find(|e| e.id == id)
    }

    fn exercise_mut(&mut self, id: i64) -> Option<&mut CustomExerciseView> {
        self.custom_exercises.iter_mut().find(|e| e.id == id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session tasks
    // ─────────────────────────────────────────────────────────────────────────

    /// Replay stored credentials in the background
    fn start_auto_login(&mut self) {
        self.current_screen = Screen::Connecting;

        let session = self.session.clone();

        self.spawn_task(async move {
            match session.auto_login().await {
                AutoLogin::Restored { username, .. } => AsyncMessage::AutoLoginRestored { username },
                AutoLogin::NoCredentials => AsyncMessage::AutoLoginSkipped,
                AutoLogin::Failed(e) => AsyncMessage::AutoLoginFailed(e.summary()),
            }
        });
    }

    fn submit_login(&mut self) {
        if self.login_form.submitting {
            return;
        }
        if !self.login_form.is_complete() {
            self.show_error(
                "Login Status",
                "Please enter your username and password".to_string(),
            );
            return;
        }

        self.login_form.submitting = true;
        self.status_message = Some("Logging in...".to_string());

        let session = self.session.clone();
        let username = self.login_form.username.value().trim().to_string();
        let password = SecretString::from(self.login_form.password.value().to_string());

        self.spawn_task(async move {
            match session.login(&username, &password).await {
                Ok(message) => AsyncMessage::LoggedIn { username, message },
                Err(e) => AsyncMessage::LoginError(e.summary()),
            }
        });
    }

    fn submit_register(&mut self) {
        if self.register_form.submitting {
            return;
        }

        let form = self.register_form.to_registration();
        if let Err(e) = form.validate() {
            self.show_error("Registration Status", e.summary());
            return;
        }

        self.register_form.submitting = true;
        self.status_message = Some("Creating account...".to_string());

        let session = self.session.clone();

        self.spawn_task(async move {
            match session.register(&form).await {
                Ok(message) => AsyncMessage::Registered {
                    username: form.username.clone(),
                    message,
                },
                Err(e) => AsyncMessage::RegisterError(e.summary()),
            }
        });
    }

    fn submit_settings(&mut self) {
        if self.settings_form.submitting {
            return;
        }

        let update = self.settings_form.to_update();
        if update.is_empty() {
            self.show_error("Settings", "Nothing to update".to_string());
            return;
        }

        self.settings_form.submitting = true;
        self.status_message = Some("Updating settings...".to_string());

        let session = self.session.clone();

        self.spawn_task(async move {
            let new_username = update.new_username.clone();
            match session.update_settings(update).await {
                Ok(message) => AsyncMessage::SettingsUpdated {
                    message,
                    new_username,
                },
                Err(e) => AsyncMessage::SettingsError(e.summary()),
            }
        });
    }

    fn logout(&mut self) {
        if self.settings_form.submitting {
            return;
        }
        self.settings_form.submitting = true;
        self.status_message = Some("Logging out...".to_string());

        let session = self.session.clone();

        self.spawn_task(async move {
            match session.logout().await {
                Ok(message) => AsyncMessage::LoggedOut(message),
                Err(e) => AsyncMessage::LogoutError(e.summary()),
            }
        });
    }

    fn delete_account(&mut self) {
        if self.settings_form.submitting {
            return;
        }
        self.settings_form.submitting = true;
        self.status_message = Some("Deleting account...".to_string());

        let session = self.session.clone();

        self.spawn_task(async move {
            match session.delete_account().await {
                Ok(message) => AsyncMessage::AccountDeleted(message),
                Err(e) => AsyncMessage::AccountDeleteError(e.summary()),
            }
        });
    }

    /// Drop everything tied to the logged-in user and show the login screen
    fn end_session(&mut self) {
        // Anything still running belongs to the old session
        self.generation += 1;
        self.leaderboard_loading = false;
        self.counts_loading.clear();
        self.custom_loading = false;
        self.custom_adding = false;

        self.username = None;
        self.navigation_stack.clear();
        self.current_screen = Screen::Login;

        self.leaderboard.clear();
        self.leaderboard_fetched = false;
        self.leaderboard_error = None;
        self.leaderboard_selection = ListState::default();

        self.pushups = OptimisticCounter::default();
        self.pullups = OptimisticCounter::default();
        self.counter_error = None;

        self.custom_exercises.clear();
        self.custom_fetched = false;
        self.custom_error = None;
        self.custom_selection = ListState::default();
        self.custom_input_mode = false;
        self.confirmation = None;

        self.settings_form = SettingsForm::default();
        self.settings_selection = ListState::new(SettingsItem::ALL.len());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Data loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Spawn a task to fetch the leaderboard
    pub fn fetch_leaderboard(&mut self) {
        if self.leaderboard_loading {
            return;
        }
        self.leaderboard_loading = true;
        self.leaderboard_error = None;
        self.status_message = Some("Loading leaderboard...".to_string());

        let session = self.session.clone();

        self.spawn_task(async move {
            match LeaderboardHandler::new(session.api()).fetch().await {
                Ok(entries) => AsyncMessage::LeaderboardLoaded(entries),
                Err(e) => AsyncMessage::LeaderboardError(e.summary()),
            }
        });
    }

    /// Spawn a task to fetch a built-in count
    fn fetch_count(&mut self, kind: ExerciseKind, initial: bool) {
        if !self.counts_loading.insert(kind) {
            return; // Already loading
        }

        let session = self.session.clone();

        self.spawn_task(async move {
            match ExerciseHandler::new(session.api()).get_count(kind).await {
                Ok(count) => AsyncMessage::CountLoaded {
                    kind,
                    count,
                    initial,
                },
                Err(e) => AsyncMessage::CountLoadError {
                    kind,
                    error: e.summary(),
                    initial,
                },
            }
        });
    }

    /// Load both built-in counters together so the tabs open populated
    fn prefetch_counts(&mut self) {
        let kinds = [ExerciseKind::Pushups, ExerciseKind::Pullups];
        if kinds.iter().any(|kind| self.counts_loading.contains(kind)) {
            return;
        }
        self.counts_loading.extend(kinds);

        let tx = self.async_tx.clone();
        let generation = self.generation;
        let session = self.session.clone();

        tokio::spawn(async move {
            let handler = ExerciseHandler::new(session.api());
            let (pushups, pullups) = futures::future::join(
                handler.get_count(ExerciseKind::Pushups),
                handler.get_count(ExerciseKind::Pullups),
            )
            .await;

            for (kind, result) in kinds.into_iter().zip([pushups, pullups]) {
                let message = match result {
                    Ok(count) => AsyncMessage::CountLoaded {
                        kind,
                        count,
                        initial: true,
                    },
                    Err(e) => AsyncMessage::CountLoadError {
                        kind,
                        error: e.summary(),
                        initial: true,
                    },
                };
                let _ = tx.send(TaskResult { generation, message }).await;
            }
        });
    }

    /// Spawn a task to fetch the custom exercise list
    fn fetch_custom_exercises(&mut self, initial: bool) {
        if self.custom_loading {
            return;
        }
        self.custom_loading = true;

        let session = self.session.clone();

        self.spawn_task(async move {
            match ExerciseHandler::new(session.api()).list_custom().await {
                Ok(exercises) => AsyncMessage::ExercisesLoaded { exercises, initial },
                Err(e) => AsyncMessage::ExercisesError {
                    error: e.summary(),
                    initial,
                },
            }
        });
    }

    /// Re-read the counter on screen every refresh interval
    ///
    /// Skipped while that counter has changes in flight.
    fn maybe_refresh_visible_counter(&mut self) {
        let ticks_since_refresh = self.tick_counter.wrapping_sub(self.last_refresh_tick);
        if ticks_since_refresh < self.refresh_ticks {
            return;
        }

        match self.current_screen {
            Screen::Pushups | Screen::Pullups => {
                let Some(kind) = self.current_screen.counter_kind() else {
                    return;
                };
                if self.counter(kind).is_syncing() {
                    return;
                }
                self.last_refresh_tick = self.tick_counter;
                self.fetch_count(kind, false);
            }
            Screen::CustomExerciseDetail(id) => {
                let syncing = self
                    .exercise(id)
                    .map(|e| e.counter.is_syncing())
                    .unwrap_or(false);
                if syncing {
                    return;
                }
                self.last_refresh_tick = self.tick_counter;
                self.fetch_custom_exercises(false);
            }
            _ => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Counter changes
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a change to a built-in counter now and confirm it in the background
    fn change_count(&mut self, kind: ExerciseKind, change: ExerciseChange) {
        if self.counter(kind).last_synced().is_none() {
            return; // Nothing loaded to change yet
        }

        let pending = self.counter_mut(kind).apply(change);
        let session = self.session.clone();

        self.spawn_task(async move {
            match ExerciseHandler::new(session.api())
                .update_count(kind, change)
                .await
            {
                Ok(count) => AsyncMessage::CountUpdated {
                    kind,
                    pending,
                    count,
                },
                Err(e) => AsyncMessage::CountUpdateError {
                    kind,
                    pending,
                    error: e.summary(),
                },
            }
        });
    }

    /// Apply a change to a custom exercise now and confirm it in the background
    fn change_custom_count(&mut self, id: i64, change: ExerciseChange) {
        let Some(view) = self.exercise_mut(id) else {
            return;
        };

        let pending = view.counter.apply(change);
        let session = self.session.clone();

        self.spawn_task(async move {
            match ExerciseHandler::new(session.api())
                .update_custom(id, change)
                .await
            {
                Ok(count) => AsyncMessage::CustomCountUpdated { id, pending, count },
                Err(e) => AsyncMessage::CustomCountUpdateError {
                    id,
                    pending,
                    error: e.summary(),
                },
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Custom exercise actions
    // ─────────────────────────────────────────────────────────────────────────

    fn add_custom_exercise(&mut self) {
        let name = self.custom_name_input.value().trim().to_string();
        if name.is_empty() {
            self.show_error("Add Exercise", "Exercise name cannot be empty".to_string());
            return;
        }

        self.custom_input_mode = false;
        self.custom_name_input.clear();
        self.custom_adding = true;
        self.status_message = Some(format!("Adding '{}'...", name));

        let session = self.session.clone();

        self.spawn_task(async move {
            match ExerciseHandler::new(session.api()).add_custom(&name).await {
                Ok(message) => AsyncMessage::ExerciseAdded(message),
                Err(e) => AsyncMessage::ExerciseAddError(e.summary()),
            }
        });
    }

    /// Delete on the server; the list changes only once it confirms
    fn delete_custom_exercise(&mut self, id: i64) {
        let session = self.session.clone();

        self.spawn_task(async move {
            match ExerciseHandler::new(session.api()).delete_custom(id).await {
                Ok(message) => AsyncMessage::ExerciseDeleted { id, message },
                Err(e) => AsyncMessage::ExerciseDeleteError(e.summary()),
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if is_interrupt_key(&key) {
            self.quit();
            return;
        }

        // If help is shown, any key dismisses it
        if self.show_help {
            self.show_help = false;
            return;
        }

        // If error popup is shown, only allow dismissal keys
        if self.error_popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                self.error_popup = None;
            }
            return; // Block all other input while popup is shown
        }

        if self.confirmation.is_some() {
            self.handle_confirmation_key(key);
            return;
        }

        // Pre-login screens are all text input
        match self.current_screen {
            Screen::Connecting => {
                if is_quit_key(&key) || key.code == KeyCode::Esc {
                    self.quit();
                }
                return;
            }
            Screen::Login => {
                self.handle_login_key(key);
                return;
            }
            Screen::Register => {
                self.handle_register_key(key);
                return;
            }
            _ => {}
        }

        // Text input modes bypass global handlers
        if self.custom_input_mode {
            self.handle_custom_input_key(key);
            return;
        }
        if self.settings_form.editing {
            self.handle_settings_input_key(key);
            return;
        }

        // Global key handlers
        if key.code == KeyCode::Char('?') {
            self.show_help = true;
            return;
        }

        if is_quit_key(&key) {
            if self.navigation_stack.is_empty() {
                self.quit();
            } else {
                self.go_back();
            }
            return;
        }

        if is_back_key(&key) {
            self.go_back();
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.cycle_tab(1);
                return;
            }
            KeyCode::BackTab => {
                self.cycle_tab(Screen::TABS.len() - 1);
                return;
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.switch_tab(Screen::TABS[idx]);
                return;
            }
            _ => {}
        }

        // Screen-specific handlers
        match self.current_screen {
            Screen::Leaderboard => self.handle_leaderboard_key(key),
            Screen::Pushups | Screen::Pullups => self.handle_counter_key(key),
            Screen::CustomExercises => self.handle_custom_list_key(key),
            Screen::CustomExerciseDetail(id) => self.handle_custom_detail_key(key, id),
            Screen::Settings => self.handle_settings_key(key),
            Screen::Connecting | Screen::Login | Screen::Register => {}
        }
    }

    fn handle_confirmation_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match self.confirmation.take() {
                    Some(Confirmation::DeleteExercise { id, name }) => {
                        self.status_message = Some(format!("Deleting '{}'...", name));
                        self.delete_custom_exercise(id);
                    }
                    Some(Confirmation::DeleteAccount) => self.delete_account(),
                    None => {}
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
                self.confirmation = None;
                self.status_message = Some("Cancelled".to_string());
            }
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        if self.login_form.submitting {
            return;
        }

        match key.code {
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.current_screen = Screen::Register;
                self.status_message = None;
            }
            KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::Down => self.login_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.login_form.previous_field(),
            KeyCode::Enter => {
                if self.login_form.field + 1 < LoginForm::FIELDS {
                    self.login_form.next_field();
                } else {
                    self.submit_login();
                }
            }
            KeyCode::Backspace => self.login_form.focused_mut().pop(),
            KeyCode::Char(c) => self.login_form.focused_mut().push(c),
            _ => {}
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        if self.register_form.submitting {
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.current_screen = Screen::Login;
                self.status_message = None;
            }
            KeyCode::Tab | KeyCode::Down => self.register_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.register_form.previous_field(),
            KeyCode::Enter => {
                if self.register_form.field + 1 < RegisterForm::FIELDS {
                    self.register_form.next_field();
                } else {
                    self.submit_register();
                }
            }
            KeyCode::Backspace => self.register_form.focused_mut().pop(),
            KeyCode::Char(c) => self.register_form.focused_mut().push(c),
            _ => {}
        }
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.leaderboard_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.leaderboard_selection.previous(),
            KeyCode::Char('r') => self.fetch_leaderboard(),
            _ => {}
        }
    }

    fn handle_counter_key(&mut self, key: KeyEvent) {
        let Some(kind) = self.current_screen.counter_kind() else {
            return;
        };

        if let Some(change) = counter_change(&key) {
            self.change_count(kind, change);
        } else if key.code == KeyCode::Char('r') {
            let initial = self.counter(kind).last_synced().is_none();
            self.last_refresh_tick = self.tick_counter;
            self.fetch_count(kind, initial);
        }
    }

    fn handle_custom_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.custom_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.custom_selection.previous(),
            KeyCode::Enter => {
                if let Some(exercise) = self.custom_exercises.get(self.custom_selection.selected) {
                    let id = exercise.id;
                    self.navigate_to(Screen::CustomExerciseDetail(id));
                }
            }
            KeyCode::Char('a') => {
                if !self.custom_adding {
                    self.custom_input_mode = true;
                    self.custom_name_input.clear();
                    self.status_message = Some("Enter a name, then press Enter".to_string());
                }
            }
            KeyCode::Char('d') => {
                if let Some(exercise) = self.custom_exercises.get(self.custom_selection.selected) {
                    self.confirmation = Some(Confirmation::DeleteExercise {
                        id: exercise.id,
                        name: exercise.name.clone(),
                    });
                }
            }
            KeyCode::Char('r') => self.fetch_custom_exercises(true),
            _ => {}
        }
    }

    fn handle_custom_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.custom_input_mode = false;
                self.custom_name_input.clear();
                self.status_message = Some("Cancelled".to_string());
            }
            KeyCode::Enter => self.add_custom_exercise(),
            KeyCode::Backspace => self.custom_name_input.pop(),
            KeyCode::Char(c) => self.custom_name_input.push(c),
            _ => {}
        }
    }

    fn handle_custom_detail_key(&mut self, key: KeyEvent, id: i64) {
        if let Some(change) = counter_change(&key) {
            self.change_custom_count(id, change);
            return;
        }

        match key.code {
            KeyCode::Char('r') => {
                self.last_refresh_tick = self.tick_counter;
                self.fetch_custom_exercises(false);
            }
            KeyCode::Char('d') => {
                if let Some(exercise) = self.exercise(id) {
                    self.confirmation = Some(Confirmation::DeleteExercise {
                        id,
                        name: exercise.name.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    fn selected_setting(&self) -> SettingsItem {
        SettingsItem::ALL
            .get(self.settings_selection.selected)
            .copied()
            .unwrap_or(SettingsItem::NewUsername)
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        if self.settings_form.submitting {
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.settings_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.settings_selection.previous(),
            KeyCode::Enter => match self.selected_setting() {
                item if item.is_text() => {
                    self.settings_form.editing = true;
                    self.status_message =
                        Some("Type the new value, then press Enter".to_string());
                }
                SettingsItem::Update => self.submit_settings(),
                SettingsItem::Logout => self.logout(),
                SettingsItem::DeleteAccount => {
                    self.confirmation = Some(Confirmation::DeleteAccount);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_settings_input_key(&mut self, key: KeyEvent) {
        let item = self.selected_setting();
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => {
                self.settings_form.editing = false;
                self.status_message = None;
            }
            KeyCode::Backspace => {
                if let Some(field) = self.settings_form.field_mut(item) {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.settings_form.field_mut(item) {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    fn enter_main_tabs(&mut self) {
        self.switch_tab(Screen::Leaderboard);
        self.prefetch_counts();
    }

    /// Switch to a main tab, dropping any pushed screens
    pub fn switch_tab(&mut self, screen: Screen) {
        self.navigation_stack.clear();
        self.current_screen = screen;
        self.status_message = None;
        self.on_enter(screen);
    }

    fn cycle_tab(&mut self, step: usize) {
        let current = self.current_screen.tab_index().unwrap_or(0);
        let next = (current + step) % Screen::TABS.len();
        self.switch_tab(Screen::TABS[next]);
    }

    /// Navigate to a new screen
    pub fn navigate_to(&mut self, screen: Screen) {
        self.navigation_stack.push(self.current_screen);
        self.current_screen = screen;
        self.status_message = None; // Clear stale messages on screen change
        self.on_enter(screen);
    }

    /// Trigger data loading based on screen
    fn on_enter(&mut self, screen: Screen) {
        match screen {
            Screen::Leaderboard => {
                if !self.leaderboard_fetched && !self.leaderboard_loading {
                    self.fetch_leaderboard();
                }
            }
            Screen::Pushups | Screen::Pullups => {
                if let Some(kind) = screen.counter_kind() {
                    let initial = self.counter(kind).last_synced().is_none();
                    self.last_refresh_tick = self.tick_counter;
                    self.fetch_count(kind, initial);
                }
            }
            Screen::CustomExercises => {
                self.fetch_custom_exercises(!self.custom_fetched);
            }
            Screen::CustomExerciseDetail(_) => {
                self.last_refresh_tick = self.tick_counter;
            }
            Screen::Settings => {
                self.settings_form.editing = false;
            }
            Screen::Connecting | Screen::Login | Screen::Register => {}
        }
    }

    /// Go back to the previous screen
    pub fn go_back(&mut self) {
        if let Some(screen) = self.navigation_stack.pop() {
            self.current_screen = screen;
            self.status_message = None; // Clear stale messages on screen change
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let config = Config {
            // Nothing listens here; any request fails fast
            api_url: "http://127.0.0.1:9/api".to_string(),
            ..Config::default()
        };
        App::new(&config).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view(id: i64, name: &str, count: i64) -> CustomExerciseView {
        CustomExerciseView {
            id,
            name: name.to_string(),
            counter: OptimisticCounter::from_server(count),
        }
    }

    fn exercise(id: i64, name: &str, count: i64) -> CustomExercise {
        CustomExercise {
            id,
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_failed_update_rolls_back_and_reports() {
        let mut app = test_app();
        app.pushups.reset(5);
        let pending = app.pushups.apply(ExerciseChange::IncreaseTen);
        assert_eq!(app.pushups.value(), 15);

        app.handle_async_message(AsyncMessage::CountUpdateError {
            kind: ExerciseKind::Pushups,
            pending,
            error: "offline".to_string(),
        });

        assert_eq!(app.pushups.value(), 5);
        assert!(!app.pushups.is_syncing());
        let popup = app.error_popup.as_ref().unwrap();
        assert_eq!(popup.title, "Update Failed");
        assert_eq!(popup.message, "offline");
    }

    #[test]
    fn test_confirmed_update_takes_server_count() {
        let mut app = test_app();
        app.pullups.reset(3);
        let pending = app.pullups.apply(ExerciseChange::Increase);

        app.handle_async_message(AsyncMessage::CountUpdated {
            kind: ExerciseKind::Pullups,
            pending,
            count: 9,
        });

        assert_eq!(app.pullups.value(), 9);
        assert!(app.error_popup.is_none());
    }

    #[test]
    fn test_refresh_does_not_clobber_in_flight_change() {
        let mut app = test_app();
        app.pushups.reset(5);
        let _pending = app.pushups.apply(ExerciseChange::Increase);

        app.handle_async_message(AsyncMessage::CountLoaded {
            kind: ExerciseKind::Pushups,
            count: 100,
            initial: false,
        });
        assert_eq!(app.pushups.value(), 6);
    }

    #[test]
    fn test_background_refresh_failure_is_silent() {
        let mut app = test_app();
        app.handle_async_message(AsyncMessage::CountLoadError {
            kind: ExerciseKind::Pullups,
            error: "timeout".to_string(),
            initial: false,
        });
        assert!(app.error_popup.is_none());
    }

    #[test]
    fn test_register_validation_shows_popup() {
        let mut app = test_app();
        app.current_screen = Screen::Register;
        for c in "alex".chars() {
            app.register_form.username.push(c);
        }
        for c in "Short1".chars() {
            app.register_form.password.push(c);
            app.register_form.confirm_password.push(c);
        }

        app.submit_register();

        let popup = app.error_popup.as_ref().unwrap();
        assert_eq!(popup.title, "Registration Status");
        assert_eq!(popup.message, "Password must be at least 8 characters long");
        assert!(!app.register_form.submitting);
    }

    #[test]
    fn test_incomplete_login_shows_popup() {
        let mut app = test_app();
        app.current_screen = Screen::Login;
        app.submit_login();
        assert_eq!(app.error_popup.as_ref().unwrap().title, "Login Status");
    }

    #[test]
    fn test_popup_blocks_input_until_dismissed() {
        let mut app = test_app();
        app.current_screen = Screen::Settings;
        app.show_error("Settings", "Nothing to update".to_string());

        app.handle_key_event(key(KeyCode::Char('j')));
        assert_eq!(app.settings_selection.selected, 0);
        assert!(app.error_popup.is_some());

        app.handle_key_event(key(KeyCode::Enter));
        assert!(app.error_popup.is_none());

        app.handle_key_event(key(KeyCode::Char('j')));
        assert_eq!(app.settings_selection.selected, 1);
    }

    #[test]
    fn test_auto_login_failure_goes_to_login_quietly() {
        let mut app = test_app();
        app.handle_async_message(AsyncMessage::AutoLoginFailed("Invalid credentials".into()));
        assert_eq!(app.current_screen, Screen::Login);
        assert!(app.error_popup.is_none());
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs() {
        let mut app = test_app();
        app.current_screen = Screen::Settings;

        app.handle_key_event(key(KeyCode::Char('2')));
        assert_eq!(app.current_screen, Screen::Pullups);

        app.handle_key_event(key(KeyCode::BackTab));
        assert_eq!(app.current_screen, Screen::Leaderboard);

        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.current_screen, Screen::Pullups);
    }

    #[tokio::test]
    async fn test_login_success_enters_main_tabs() {
        let mut app = test_app();
        app.current_screen = Screen::Login;

        app.handle_async_message(AsyncMessage::LoggedIn {
            username: "alex".to_string(),
            message: "Logged in successfully".to_string(),
        });

        assert_eq!(app.current_screen, Screen::Leaderboard);
        assert_eq!(app.username.as_deref(), Some("alex"));
        assert!(app.leaderboard_loading);
    }

    #[test]
    fn test_settings_text_field_captures_keys() {
        let mut app = test_app();
        app.current_screen = Screen::Settings;

        app.handle_key_event(key(KeyCode::Enter));
        assert!(app.settings_form.editing);

        // Digits and 'q' are text here, not tab switches or quit
        for c in "q2".chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
        assert_eq!(app.settings_form.new_username.value(), "q2");
        assert_eq!(app.current_screen, Screen::Settings);
        assert!(app.running);
    }

    #[test]
    fn test_delete_confirmation_can_be_cancelled() {
        let mut app = test_app();
        app.current_screen = Screen::CustomExercises;
        app.custom_exercises = vec![view(1, "Squats", 10)];
        app.custom_selection = ListState::new(1);

        app.handle_key_event(key(KeyCode::Char('d')));
        assert_eq!(
            app.confirmation,
            Some(Confirmation::DeleteExercise {
                id: 1,
                name: "Squats".to_string()
            })
        );

        app.handle_key_event(key(KeyCode::Char('n')));
        assert!(app.confirmation.is_none());
        assert_eq!(app.custom_exercises.len(), 1);
    }

    #[test]
    fn test_deleted_exercise_leaves_detail_screen() {
        let mut app = test_app();
        app.custom_exercises = vec![view(1, "Squats", 10), view(2, "Dips", 4)];
        app.custom_selection = ListState::new(2);
        app.current_screen = Screen::CustomExercises;
        app.navigation_stack.push(Screen::CustomExercises);
        app.current_screen = Screen::CustomExerciseDetail(2);

        app.handle_async_message(AsyncMessage::ExerciseDeleted {
            id: 2,
            message: "Exercise deleted successfully".to_string(),
        });

        assert_eq!(app.current_screen, Screen::CustomExercises);
        assert_eq!(app.custom_exercises.len(), 1);
        assert_eq!(app.custom_selection.total, 1);
        assert_eq!(app.custom_selection.selected, 0);
    }

    #[test]
    fn test_custom_rollback_on_failure() {
        let mut app = test_app();
        app.custom_exercises = vec![view(7, "Lunges", 20)];
        let pending = app.custom_exercises[0]
            .counter
            .apply(ExerciseChange::DecreaseTen);

        app.handle_async_message(AsyncMessage::CustomCountUpdateError {
            id: 7,
            pending,
            error: "Failed to update count".to_string(),
        });

        assert_eq!(app.custom_exercises[0].counter.value(), 20);
        assert!(app.error_popup.is_some());
    }

    #[test]
    fn test_merge_keeps_in_flight_counters() {
        let mut squats = view(1, "Squats", 10);
        let _pending = squats.counter.apply(ExerciseChange::Increase);
        let current = vec![squats, view(2, "Dips", 4)];

        let merged = merge_custom_exercises(
            current,
            vec![
                exercise(3, "Plank", 0),
                exercise(2, "Dips", 8),
                exercise(1, "Squats", 10),
            ],
        );

        let ids: Vec<_> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, [3, 2, 1]);
        assert_eq!(merged[1].counter.value(), 8);
        assert_eq!(merged[2].counter.value(), 11);
        assert!(merged[2].counter.is_syncing());
    }

    #[test]
    fn test_logout_returns_to_login_and_clears_data() {
        let mut app = test_app();
        app.username = Some("alex".to_string());
        app.current_screen = Screen::Settings;
        app.pushups.reset(40);
        app.custom_exercises = vec![view(1, "Squats", 10)];

        app.handle_async_message(AsyncMessage::LoggedOut("Logged out successfully".into()));

        assert_eq!(app.current_screen, Screen::Login);
        assert!(app.username.is_none());
        assert!(app.custom_exercises.is_empty());
        assert!(app.pushups.last_synced().is_none());
    }

    #[test]
    fn test_results_from_ended_session_are_dropped() {
        let mut app = test_app();
        app.username = Some("alex".to_string());
        app.current_screen = Screen::Pushups;
        app.pushups.reset(40);
        let pending = app.pushups.apply(ExerciseChange::Increase);
        let old_generation = app.generation;

        app.receive(TaskResult {
            generation: old_generation,
            message: AsyncMessage::LoggedOut("Logged out successfully".into()),
        });
        assert_eq!(app.current_screen, Screen::Login);
        assert_ne!(app.generation, old_generation);

        app.receive(TaskResult {
            generation: old_generation,
            message: AsyncMessage::CountUpdated {
                kind: ExerciseKind::Pushups,
                pending,
                count: 41,
            },
        });
        app.receive(TaskResult {
            generation: old_generation,
            message: AsyncMessage::LeaderboardLoaded(vec![LeaderboardEntry {
                username: "alex".to_string(),
                pushups: 41,
                pullups: 0,
                points: 41,
            }]),
        });

        assert!(app.pushups.last_synced().is_none());
        assert!(app.leaderboard.is_empty());
        assert!(!app.leaderboard_fetched);
    }

    #[test]
    fn test_current_session_results_are_handled() {
        let mut app = test_app();
        app.current_screen = Screen::Leaderboard;
        app.leaderboard_loading = true;

        app.receive(TaskResult {
            generation: app.generation,
            message: AsyncMessage::LeaderboardLoaded(Vec::new()),
        });

        assert!(app.leaderboard_fetched);
        assert!(!app.leaderboard_loading);
    }

    #[test]
    fn test_list_state_resize_clamps_selection() {
        let mut state = ListState::new(3);
        state.selected = 2;
        state.resize(1);
        assert_eq!(state.selected, 0);
        state.resize(0);
        assert_eq!(state.selected, 0);
    }
}
