use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;

use crate::catalog::{self, Country, CATEGORIES, COUNTRIES, MAX_CATEGORIES};
use crate::config::AppConfig;
use crate::digest::{DeliveryReport, DigestClient, SubmissionPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Country,
    Categories,
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    Confirm,  // Submit confirmation (y/n)
    Result,   // Backend response or failure message
}

/// Text fields of the details box, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    ApiKey,
    GmailUser,
    GmailPass,
}

pub const FIELDS: &[Field] = &[
    Field::Name,
    Field::Email,
    Field::ApiKey,
    Field::GmailUser,
    Field::GmailPass,
];

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::ApiKey => "News API key",
            Field::GmailUser => "Gmail user",
            Field::GmailPass => "Gmail app password",
        }
    }

    /// Masked in the UI, never logged
    pub fn is_secret(&self) -> bool {
        matches!(self, Field::GmailPass)
    }
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    // Country box: the cursor IS the selection, exactly one at all times
    pub country_cursor: usize,

    // Categories box
    pub category_cursor: usize,
    pub selected_categories: Vec<&'static str>,

    // Details box
    pub field_cursor: usize,
    pub editing: bool,
    pub name: String,
    pub email: String,
    pub api_key: String,
    pub gmail_user: String,
    pub gmail_pass: String,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Outcome of the most recent submission, shown in the Result popup
    pub last_report: Option<DeliveryReport>,

    // Config
    pub config: AppConfig,

    client: DigestClient,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let client = DigestClient::new(config.endpoint.clone());

        let country_cursor = config
            .defaults
            .country
            .as_deref()
            .and_then(catalog::country_index)
            .unwrap_or_else(|| catalog::country_index("us").unwrap_or(0));

        let mut app = Self {
            section: Section::Country,
            popup: Popup::None,

            country_cursor,

            category_cursor: 0,
            selected_categories: Vec::new(),

            field_cursor: 0,
            editing: false,
            name: config.defaults.name.clone(),
            email: config.defaults.email.clone(),
            api_key: String::new(),
            gmail_user: String::new(),
            gmail_pass: String::new(),

            status_message: None,
            status_message_time: None,

            last_report: None,

            config,

            client,
        };

        // Restore remembered categories through the same gate the UI uses
        let remembered: Vec<String> = app.config.defaults.categories.clone();
        for name in remembered {
            if let Some(cat) = catalog::category(&name) {
                app.toggle_category(cat);
            }
        }

        app
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn selected_country(&self) -> Country {
        COUNTRIES[self.country_cursor]
    }

    /// Flip one category in or out of the selection
    ///
    /// Removal is always allowed; adding past the cap is silently dropped,
    /// matching the form's behavior of ignoring a fifth pick.
    pub fn toggle_category(&mut self, category: &'static str) {
        if let Some(pos) = self.selected_categories.iter().position(|c| *c == category) {
            self.selected_categories.remove(pos);
        } else if self.selected_categories.len() < MAX_CATEGORIES {
            self.selected_categories.push(category);
        }
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        self.selected_categories.iter().any(|c| *c == category)
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::ApiKey => &self.api_key,
            Field::GmailUser => &self.gmail_user,
            Field::GmailPass => &self.gmail_pass,
        }
    }

    fn field_value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::ApiKey => &mut self.api_key,
            Field::GmailUser => &mut self.gmail_user,
            Field::GmailPass => &mut self.gmail_pass,
        }
    }

    /// Build the wire body from current state
    ///
    /// `preferences[0]` is always the country code; the category names
    /// follow in selection order.
    pub fn build_payload(&self) -> SubmissionPayload {
        let mut preferences = vec![self.selected_country().code.to_string()];
        preferences.extend(self.selected_categories.iter().map(|c| c.to_string()));

        SubmissionPayload {
            email: self.email.trim().to_string(),
            name: self.name.trim().to_string(),
            preferences,
            api_key: self.api_key.trim().to_string(),
            gmail_user: self.gmail_user.trim().to_string(),
            gmail_pass: self.gmail_pass.clone(),
        }
    }

    /// Required-field check, run before anything goes on the wire
    pub fn validate(&self) -> std::result::Result<(), String> {
        for field in FIELDS {
            if self.field_value(*field).trim().is_empty() {
                return Err(format!("{} is required", field.label()));
            }
        }
        if !self.email.contains('@') {
            return Err("Email does not look like an address".to_string());
        }
        Ok(())
    }

    /// Send the current form to the backend and record the outcome
    pub async fn submit(&mut self) -> Result<()> {
        if let Err(msg) = self.validate() {
            self.set_status(msg);
            return Ok(());
        }

        let payload = self.build_payload();
        self.set_status(format!("Sending digest request for {}...", payload.email));

        let report: DeliveryReport = self.client.send(&payload).await.into();

        if report.is_sent() {
            self.remember_defaults();
        }

        self.last_report = Some(report);
        self.popup = Popup::Result;
        self.status_message = None;
        self.status_message_time = None;
        Ok(())
    }

    /// Persist everything except credentials for the next session
    fn remember_defaults(&mut self) {
        self.config.defaults.name = self.name.trim().to_string();
        self.config.defaults.email = self.email.trim().to_string();
        self.config.defaults.country = Some(self.selected_country().code.to_string());
        self.config.defaults.categories = self
            .selected_categories
            .iter()
            .map(|c| c.to_string())
            .collect();
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save form defaults: {}", e);
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key).await;
        }

        if self.editing {
            self.handle_edit_key(key);
            return Ok(());
        }

        self.handle_normal_key(key).await
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Navigation between sections (Country ↔ Categories ↔ Details)
            KeyCode::Tab => {
                self.section = match self.section {
                    Section::Country => Section::Categories,
                    Section::Categories => Section::Details,
                    Section::Details => Section::Country,
                };
            }
            KeyCode::BackTab => {
                self.section = match self.section {
                    Section::Country => Section::Details,
                    Section::Categories => Section::Country,
                    Section::Details => Section::Categories,
                };
            }

            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Actions based on section
            KeyCode::Char(' ') | KeyCode::Enter => match self.section {
                Section::Categories => {
                    self.toggle_category(CATEGORIES[self.category_cursor]);
                }
                Section::Details => {
                    self.editing = true;
                }
                Section::Country => {}
            },

            // Edit the highlighted field directly
            KeyCode::Char('e') => {
                if self.section == Section::Details {
                    self.editing = true;
                }
            }

            // Clear the highlighted field
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.section == Section::Details {
                    let field = FIELDS[self.field_cursor];
                    self.field_value_mut(field).clear();
                }
            }

            // Submit (after validation, behind a confirm popup)
            KeyCode::Char('s') => match self.validate() {
                Ok(()) => {
                    self.set_status(format!(
                        "Send digest to {}? (y/n)",
                        self.email.trim()
                    ));
                    self.popup = Popup::Confirm;
                }
                Err(msg) => self.set_status(msg),
            },

            // Help (? or h)
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    async fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc
                        | KeyCode::Char('?')
                        | KeyCode::Char('h')
                        | KeyCode::Enter
                        | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
                Ok(())
            }
            Popup::Confirm => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        self.popup = Popup::None;
                        self.submit().await?;
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        self.popup = Popup::None;
                        self.status_message = None;
                        self.status_message_time = None;
                    }
                    _ => {}
                }
                Ok(())
            }
            Popup::Result => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
                Ok(())
            }
            Popup::None => Ok(()),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let field = FIELDS[self.field_cursor];
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = false;
            }
            KeyCode::Tab => {
                // Commit and jump to the next field
                self.field_cursor = (self.field_cursor + 1) % FIELDS.len();
            }
            KeyCode::Backspace => {
                self.field_value_mut(field).pop();
            }
            KeyCode::Char(c) => {
                self.field_value_mut(field).push(c);
            }
            _ => {}
        }
    }

    fn move_down(&mut self) {
        match self.section {
            Section::Country => {
                self.country_cursor = (self.country_cursor + 1) % COUNTRIES.len();
            }
            Section::Categories => {
                self.category_cursor = (self.category_cursor + 1) % CATEGORIES.len();
            }
            Section::Details => {
                self.field_cursor = (self.field_cursor + 1) % FIELDS.len();
            }
        }
    }

    fn move_up(&mut self) {
        match self.section {
            Section::Country => {
                self.country_cursor = self
                    .country_cursor
                    .checked_sub(1)
                    .unwrap_or(COUNTRIES.len() - 1);
            }
            Section::Categories => {
                self.category_cursor = self
                    .category_cursor
                    .checked_sub(1)
                    .unwrap_or(CATEGORIES.len() - 1);
            }
            Section::Details => {
                self.field_cursor = self
                    .field_cursor
                    .checked_sub(1)
                    .unwrap_or(FIELDS.len() - 1);
            }
        }
    }

    pub fn tick(&mut self) {
        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(AppConfig::default())
    }

    fn filled_app(endpoint: &str) -> App {
        let mut config = AppConfig::default();
        config.endpoint = endpoint.to_string();
        let mut app = App::new(config);
        app.name = "Jon".to_string();
        app.email = "jon@example.com".to_string();
        app.api_key = "key-123".to_string();
        app.gmail_user = "sender@gmail.com".to_string();
        app.gmail_pass = "app-pass".to_string();
        app
    }

    #[test]
    fn test_selection_never_exceeds_cap() {
        let mut app = test_app();

        // Hammer the toggle in varying orders; the cap must hold throughout
        for round in 0..5 {
            for (i, cat) in CATEGORIES.iter().enumerate() {
                if (i + round) % 2 == 0 {
                    app.toggle_category(*cat);
                }
                assert!(app.selected_categories.len() <= MAX_CATEGORIES);
            }
        }
    }

    #[test]
    fn test_removal_allowed_at_cap() {
        let mut app = test_app();
        for cat in &CATEGORIES[..4] {
            app.toggle_category(*cat);
        }
        assert_eq!(app.selected_categories.len(), 4);

        app.toggle_category(CATEGORIES[0]);
        assert_eq!(app.selected_categories.len(), 3);
        assert!(!app.is_category_selected(CATEGORIES[0]));
    }

    #[test]
    fn test_fifth_pick_is_silently_dropped() {
        let mut app = test_app();
        for cat in ["World", "Nation", "Business", "Technology"] {
            app.toggle_category(catalog::category(cat).unwrap());
        }

        app.toggle_category(catalog::category("Health").unwrap());

        assert_eq!(
            app.selected_categories,
            vec!["World", "Nation", "Business", "Technology"]
        );
    }

    #[test]
    fn test_payload_leads_with_country_code() {
        let mut app = filled_app("http://127.0.0.1:5000");
        let payload = app.build_payload();
        assert_eq!(payload.preferences, vec!["us"]);

        app.toggle_category(catalog::category("Science").unwrap());
        app.toggle_category(catalog::category("Sports").unwrap());
        let payload = app.build_payload();

        assert_eq!(payload.preferences[0], "us");
        assert!((1..=5).contains(&payload.preferences.len()));
        assert_eq!(&payload.preferences[1..], ["Science", "Sports"]);
    }

    #[test]
    fn test_country_change_keeps_categories() {
        let mut app = test_app();
        app.toggle_category(catalog::category("World").unwrap());
        app.toggle_category(catalog::category("Health").unwrap());

        let before = app.selected_categories.clone();
        app.country_cursor = catalog::country_index("jp").unwrap();

        assert_eq!(app.selected_categories, before);
    }

    #[test]
    fn test_france_world_health_payload() {
        let mut app = filled_app("http://127.0.0.1:5000");
        app.country_cursor = catalog::country_index("fr").unwrap();
        app.toggle_category(catalog::category("World").unwrap());
        app.toggle_category(catalog::category("Health").unwrap());

        let payload = app.build_payload();
        assert_eq!(payload.preferences, vec!["fr", "World", "Health"]);
    }

    #[test]
    fn test_validation_requires_all_fields() {
        let mut app = filled_app("http://127.0.0.1:5000");
        assert!(app.validate().is_ok());

        app.api_key.clear();
        let err = app.validate().unwrap_err();
        assert!(err.contains("News API key"));
    }

    #[test]
    fn test_validation_rejects_mail_without_at() {
        let mut app = filled_app("http://127.0.0.1:5000");
        app.email = "not-an-address".to_string();
        assert!(app.validate().is_err());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_message() {
        // Connection refused; the submit must not panic and must leave a
        // visible failure report carrying the error detail
        let mut app = filled_app("http://127.0.0.1:9");

        app.submit().await.unwrap();

        let report = app.last_report.as_ref().expect("report recorded");
        assert!(!report.is_sent());
        assert!(report.message().starts_with("Failed to send digest: "));
        assert_eq!(app.popup, Popup::Result);
    }

    #[tokio::test]
    async fn test_invalid_form_never_hits_the_wire() {
        let mut app = filled_app("http://127.0.0.1:9");
        app.name.clear();

        app.submit().await.unwrap();

        assert!(app.last_report.is_none());
        assert!(app.status_message.as_deref().unwrap().contains("Name"));
        assert_eq!(app.popup, Popup::None);
    }

    #[test]
    fn test_restored_defaults_respect_catalog_and_cap() {
        let mut config = AppConfig::default();
        config.defaults.country = Some("fr".to_string());
        config.defaults.categories = vec![
            "World".to_string(),
            "Bogus".to_string(),
            "Nation".to_string(),
            "Business".to_string(),
            "Technology".to_string(),
            "Health".to_string(),
        ];

        let app = App::new(config);

        assert_eq!(app.selected_country().code, "fr");
        assert_eq!(
            app.selected_categories,
            vec!["World", "Nation", "Business", "Technology"]
        );
    }
}
