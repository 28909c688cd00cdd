//! Text input state for the login, registration and settings screens

use crate::api::SettingsUpdate;
use crate::core::validation::RegistrationForm;

/// Longest value accepted by any input field
const MAX_INPUT_CHARS: usize = 64;

/// A single-line text input
#[derive(Debug, Clone, Default)]
pub struct InputField {
    value: String,
    masked: bool,
}

impl InputField {
    /// Field whose contents are shown as bullets
    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() && self.value.chars().count() < MAX_INPUT_CHARS {
            self.value.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Text to render, masked if needed
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Login screen fields (0 = username, 1 = password)
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: InputField,
    pub password: InputField,
    pub field: usize,
    pub submitting: bool,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: InputField::default(),
            password: InputField::masked(),
            field: 0,
            submitting: false,
        }
    }
}

impl LoginForm {
    pub const FIELDS: usize = 2;

    pub fn focused_mut(&mut self) -> &mut InputField {
        match self.field {
            0 => &mut self.username,
            _ => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % Self::FIELDS;
    }

    pub fn previous_field(&mut self) {
        self.field = (self.field + Self::FIELDS - 1) % Self::FIELDS;
    }

    pub fn is_complete(&self) -> bool {
        !self.username.value().trim().is_empty() && !self.password.value().is_empty()
    }
}

/// Registration screen fields (0 = username, 1 = password, 2 = confirmation)
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: InputField,
    pub password: InputField,
    pub confirm_password: InputField,
    pub field: usize,
    pub submitting: bool,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            username: InputField::default(),
            password: InputField::masked(),
            confirm_password: InputField::masked(),
            field: 0,
            submitting: false,
        }
    }
}

impl RegisterForm {
    pub const FIELDS: usize = 3;

    pub fn focused_mut(&mut self) -> &mut InputField {
        match self.field {
            0 => &mut self.username,
            1 => &mut self.password,
            _ => &mut self.confirm_password,
        }
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % Self::FIELDS;
    }

    pub fn previous_field(&mut self) {
        self.field = (self.field + Self::FIELDS - 1) % Self::FIELDS;
    }

    pub fn to_registration(&self) -> RegistrationForm {
        RegistrationForm::new(
            self.username.value(),
            self.password.value(),
            self.confirm_password.value(),
        )
    }
}

/// Settings screen rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    NewUsername,
    NewPassword,
    Update,
    Logout,
    DeleteAccount,
}

impl SettingsItem {
    pub const ALL: [SettingsItem; 5] = [
        SettingsItem::NewUsername,
        SettingsItem::NewPassword,
        SettingsItem::Update,
        SettingsItem::Logout,
        SettingsItem::DeleteAccount,
    ];

    pub fn is_text(&self) -> bool {
        matches!(self, SettingsItem::NewUsername | SettingsItem::NewPassword)
    }
}

/// Settings screen inputs
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub new_username: InputField,
    pub new_password: InputField,
    /// Whether keystrokes go into the selected text field
    pub editing: bool,
    pub submitting: bool,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            new_username: InputField::default(),
            new_password: InputField::masked(),
            editing: false,
            submitting: false,
        }
    }
}

impl SettingsForm {
    pub fn field_mut(&mut self, item: SettingsItem) -> Option<&mut InputField> {
        match item {
            SettingsItem::NewUsername => Some(&mut self.new_username),
            SettingsItem::NewPassword => Some(&mut self.new_password),
            _ => None,
        }
    }

    pub fn to_update(&self) -> SettingsUpdate {
        SettingsUpdate::from_fields(self.new_username.value(), self.new_password.value())
    }

    pub fn clear(&mut self) {
        self.new_username.clear();
        self.new_password.clear();
        self.editing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_field_hides_value() {
        let mut field = InputField::masked();
        for c in "Pässword".chars() {
            field.push(c);
        }
        assert_eq!(field.value(), "Pässword");
        assert_eq!(field.display(), "••••••••");
    }

    #[test]
    fn test_field_ignores_control_chars_and_caps_length() {
        let mut field = InputField::default();
        field.push('\n');
        assert_eq!(field.value(), "");

        for _ in 0..100 {
            field.push('x');
        }
        assert_eq!(field.value().len(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_login_field_cycling() {
        let mut form = LoginForm::default();
        form.previous_field();
        assert_eq!(form.field, 1);
        form.next_field();
        assert_eq!(form.field, 0);

        form.focused_mut().push('a');
        assert_eq!(form.username.value(), "a");
        assert!(!form.is_complete());
    }

    #[test]
    fn test_settings_form_builds_update() {
        let mut form = SettingsForm::default();
        if let Some(field) = form.field_mut(SettingsItem::NewPassword) {
            field.push('X');
        }
        let update = form.to_update();
        assert_eq!(update.new_username, None);
        assert_eq!(update.new_password.as_deref(), Some("X"));
        assert!(form.field_mut(SettingsItem::Logout).is_none());
    }
}
