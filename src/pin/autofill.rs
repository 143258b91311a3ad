//! Filling PIN inputs from the saved team PIN.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::pin::manager::PinManager;
use crate::pin::store::KeyValueStore;
use crate::utils::PinResult;

/// Class added to a field filled from the saved PIN.
pub const AUTO_FILLED_CLASS: &str = "auto-filled";

/// Class that marks a field as a PIN input regardless of its other attributes.
pub const PIN_FIELD_CLASS: &str = "team-pin-field";

/// A text input as seen by the autofill logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinField {
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub classes: Vec<String>,
    pub hidden: bool,
    pub value: String,
    pub auto_filled: bool,
}

impl PinField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn mark_auto_filled(&mut self, pin: &str) {
        self.value = pin.to_string();
        self.auto_filled = true;
        if !self.has_class(AUTO_FILLED_CLASS) {
            self.classes.push(AUTO_FILLED_CLASS.to_string());
        }
    }

    fn unmark_auto_filled(&mut self) {
        self.value.clear();
        self.auto_filled = false;
        self.classes.retain(|c| c != AUTO_FILLED_CLASS);
    }
}

/// One rule for recognising a PIN input. Attribute matches are substring and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinFieldSelector {
    PlaceholderContains(String),
    NameContains(String),
    IdContains(String),
    HasClass(String),
}

impl PinFieldSelector {
    /// Masked placeholders, `pin` in the name or id, or the dedicated class.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::PlaceholderContains("*".into()),
            Self::NameContains("pin".into()),
            Self::IdContains("pin".into()),
            Self::HasClass(PIN_FIELD_CLASS.into()),
        ]
    }

    pub fn matches(&self, field: &PinField) -> bool {
        match self {
            Self::PlaceholderContains(s) => field.placeholder.contains(s.as_str()),
            Self::NameContains(s) => field.name.contains(s.as_str()),
            Self::IdContains(s) => field.id.contains(s.as_str()),
            Self::HasClass(class) => field.has_class(class),
        }
    }
}

/// Keeps PIN inputs filled with the saved team PIN and learns new PINs as they are typed.
pub struct PinAutofill<S> {
    manager: PinManager<S>,
    selectors: Vec<PinFieldSelector>,
}

impl<S: KeyValueStore> PinAutofill<S> {
    pub fn new(manager: PinManager<S>) -> Self {
        Self::with_selectors(manager, PinFieldSelector::defaults())
    }

    pub fn with_selectors(manager: PinManager<S>, selectors: Vec<PinFieldSelector>) -> Self {
        Self { manager, selectors }
    }

    pub fn manager(&self) -> &PinManager<S> {
        &self.manager
    }

    pub fn is_pin_field(&self, field: &PinField) -> bool {
        self.selectors.iter().any(|selector| selector.matches(field))
    }

    /// Fills every visible, empty PIN field with the saved PIN.
    ///
    /// Returns how many fields were filled. Fields with a value are left alone.
    pub async fn autofill(&self, fields: &mut [PinField]) -> PinResult<usize> {
        let Some(pin) = self.manager.get().await? else {
            return Ok(0);
        };

        let mut filled = 0;
        for field in fields.iter_mut() {
            if field.hidden || !field.value.is_empty() || !self.is_pin_field(field) {
                continue;
            }
            field.mark_auto_filled(&pin);
            filled += 1;
        }

        if filled > 0 {
            debug!("Auto-filled {} PIN field(s)", filled);
        }
        Ok(filled)
    }

    /// Handles text typed or pasted into a PIN field.
    ///
    /// A valid PIN (after trimming) is saved and `true` is returned, meaning
    /// the other fields should be re-filled.
    pub async fn on_input(&self, value: &str) -> PinResult<bool> {
        self.manager.save(value.trim()).await
    }

    /// Forgets the saved PIN and empties the fields that were filled from it.
    pub async fn clear_saved(&self, fields: &mut [PinField]) -> PinResult<()> {
        self.manager.clear().await?;
        fields
            .iter_mut()
            .filter(|field| field.auto_filled)
            .for_each(PinField::unmark_auto_filled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::store::MemoryStore;

    fn autofill() -> PinAutofill<MemoryStore> {
        PinAutofill::new(PinManager::with_default_key(MemoryStore::new()))
    }

    #[test]
    fn default_selectors() {
        let af = autofill();
        assert!(af.is_pin_field(&PinField::new().with_placeholder("******")));
        assert!(af.is_pin_field(&PinField::new().with_name("team_pin")));
        assert!(af.is_pin_field(&PinField::new().with_id("pin-input")));
        assert!(af.is_pin_field(&PinField::new().with_class(PIN_FIELD_CLASS)));

        assert!(!af.is_pin_field(&PinField::new().with_name("email").with_placeholder("you@example.com")));
        // case-sensitive, like attribute selectors
        assert!(!af.is_pin_field(&PinField::new().with_name("TeamPIN")));
    }

    #[tokio::test]
    async fn nothing_saved_fills_nothing() {
        let mut fields = vec![PinField::new().with_name("pin")];
        assert_eq!(autofill().autofill(&mut fields).await.unwrap(), 0);
        assert!(fields[0].value.is_empty());
    }

    #[tokio::test]
    async fn fills_only_visible_empty_pin_fields() {
        let af = autofill();
        assert!(af.on_input("  ABC123 ").await.unwrap());

        let mut fields = vec![
            PinField::new().with_name("pin"),
            PinField::new().with_id("pin").hidden(),
            PinField::new().with_placeholder("***").with_value("ZZZ999"),
            PinField::new().with_name("username"),
            PinField::new().with_class(PIN_FIELD_CLASS),
        ];

        assert_eq!(af.autofill(&mut fields).await.unwrap(), 2);
        assert_eq!(fields[0].value, "ABC123");
        assert!(fields[0].auto_filled && fields[0].has_class(AUTO_FILLED_CLASS));
        assert!(fields[1].value.is_empty());
        assert_eq!(fields[2].value, "ZZZ999");
        assert!(fields[3].value.is_empty());
        assert_eq!(fields[4].value, "ABC123");

        // already filled, so a second pass is a no-op
        assert_eq!(af.autofill(&mut fields).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_input_is_not_saved() {
        let af = autofill();
        assert!(!af.on_input("ABC12").await.unwrap());
        assert!(!af.on_input("ABC12!").await.unwrap());
        assert_eq!(af.manager().get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_saved_resets_auto_filled_fields() {
        let af = autofill();
        af.on_input("QWE456").await.unwrap();

        let mut fields = vec![
            PinField::new().with_name("pin"),
            PinField::new().with_name("pin_confirm").with_value("typed1"),
        ];
        af.autofill(&mut fields).await.unwrap();
        af.clear_saved(&mut fields).await.unwrap();

        assert_eq!(af.manager().get().await.unwrap(), None);
        assert!(fields[0].value.is_empty());
        assert!(!fields[0].auto_filled && !fields[0].has_class(AUTO_FILLED_CLASS));
        assert_eq!(fields[1].value, "typed1");
    }
}
